use crate::db::model::Child;
use crate::pdf::interface::PdfGenerator;
use anyhow::anyhow;

// A4 in points
const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 50.0;
const CAPTION_SPACE: f64 = 60.0;

/// Writes one A4 page per child: the current photo scaled to fit, with the
/// child's name and unique identifier underneath. Only JPEG photos are
/// embedded (passed through as `DCTDecode`); anything else gets a
/// caption-only page.
pub struct PhotoSheet;

#[derive(Debug, PartialEq)]
struct JpegInfo {
    width: u32,
    height: u32,
    components: u8,
}

/// Reads dimensions from the first SOF segment.
fn jpeg_info(data: &[u8]) -> Option<JpegInfo> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }
    let mut i = 2;
    while i + 4 <= data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        match marker {
            0xFF => {
                i += 1;
                continue;
            }
            0x01 | 0xD0..=0xD8 => {
                i += 2;
                continue;
            }
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if len < 2 {
            return None;
        }
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            if i + 9 >= data.len() {
                return None;
            }
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some(JpegInfo {
                width,
                height,
                components: data[i + 9],
            });
        }
        i += 2 + len;
    }
    None
}

fn pdf_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn stream(dict: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!("<< {dict} /Length {} >>\nstream\n", data.len()).into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\nendstream");
    body
}

#[derive(Default)]
struct PdfWriter {
    objects: Vec<Option<Vec<u8>>>,
}

impl PdfWriter {
    fn reserve(&mut self) -> usize {
        self.objects.push(None);
        self.objects.len()
    }

    fn set(&mut self, id: usize, body: Vec<u8>) {
        self.objects[id - 1] = Some(body);
    }

    fn add(&mut self, body: Vec<u8>) -> usize {
        self.objects.push(Some(body));
        self.objects.len()
    }

    fn finish(self, root: usize) -> Result<Vec<u8>, anyhow::Error> {
        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (idx, object) in self.objects.into_iter().enumerate() {
            let body = object.ok_or_else(|| anyhow!("pdf object {} never written", idx + 1))?;
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", idx + 1).as_bytes());
            out.extend_from_slice(&body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_at = out.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root {root} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            offsets.len() + 1
        ));
        out.extend_from_slice(tail.as_bytes());
        Ok(out)
    }
}

impl PhotoSheet {
    fn page(&self, writer: &mut PdfWriter, child: &Child, pages: usize, font: usize) -> usize {
        let page_id = writer.reserve();
        let mut content = String::new();
        let mut xobjects = String::new();

        let image = child
            .current_photo()
            .filter(|photo| photo.is_jpeg())
            .and_then(|photo| jpeg_info(&photo.data).map(|info| (photo, info)));

        if let Some((photo, info)) = &image {
            let color_space = match info.components {
                1 => "/DeviceGray",
                4 => "/DeviceCMYK",
                _ => "/DeviceRGB",
            };
            let image_id = writer.add(stream(
                &format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {color_space} /BitsPerComponent 8 /Filter /DCTDecode",
                    info.width, info.height
                ),
                &photo.data,
            ));
            xobjects = format!("/XObject << /Im1 {image_id} 0 R >>");

            let box_w = PAGE_WIDTH - 2.0 * MARGIN;
            let box_h = PAGE_HEIGHT - 2.0 * MARGIN - CAPTION_SPACE;
            let scale = (box_w / info.width.max(1) as f64).min(box_h / info.height.max(1) as f64);
            let w = info.width as f64 * scale;
            let h = info.height as f64 * scale;
            let x = MARGIN + (box_w - w) / 2.0;
            let y = MARGIN + CAPTION_SPACE + (box_h - h);
            content.push_str(&format!("q {w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm /Im1 Do Q\n"));
        }

        content.push_str(&format!(
            "BT /F1 14 Tf {MARGIN:.2} {:.2} Td ({}) Tj 0 -18 Td (Unique identifier: {}) Tj",
            MARGIN + CAPTION_SPACE - 20.0,
            pdf_text(&child.name()),
            pdf_text(&child.unique_identifier())
        ));
        if image.is_none() {
            content.push_str(" 0 -18 Td (No photo available) Tj");
        }
        content.push_str(" ET\n");

        let content_id = writer.add(stream("", content.as_bytes()));
        writer.set(
            page_id,
            format!(
                "<< /Type /Page /Parent {pages} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] /Resources << /Font << /F1 {font} 0 R >> {xobjects} >> /Contents {content_id} 0 R >>"
            )
            .into_bytes(),
        );
        page_id
    }
}

impl PdfGenerator for PhotoSheet {
    fn child_photos(&self, children: &[Child]) -> Result<Vec<u8>, anyhow::Error> {
        let mut writer = PdfWriter::default();
        let catalog = writer.reserve();
        let pages = writer.reserve();
        let font = writer.add(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );

        let kids: Vec<String> = children
            .iter()
            .map(|child| format!("{} 0 R", self.page(&mut writer, child, pages, font)))
            .collect();

        writer.set(
            pages,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                kids.len()
            )
            .into_bytes(),
        );
        writer.set(
            catalog,
            format!("<< /Type /Catalog /Pages {pages} 0 R >>").into_bytes(),
        );
        writer.finish(catalog)
    }
}
