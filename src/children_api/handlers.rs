use crate::attachments::model::{UpdatePayload, Upload};
use crate::children_api::controller::ChildrenController;
use crate::db::model::FieldValue;
use crate::error::AppError;
use crate::render::csv::{CSV_CONTENT_TYPE, CSV_FILENAME};
use crate::render::html::{self, CHILDREN_PATH};
use crate::search::model::{Format, SearchParams};
use crate::utils::funcs::field_param_name;
use actix_multipart::Multipart;
use actix_web::http::header::{self, ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, web};
use futures::StreamExt;

pub const USER_HEADER: &str = "X-User-Name";
const ANONYMOUS: &str = "anonymous";
/// Photo-PDF selections post one `id=selected` pair per child and must fit
/// several hundred ids.
pub const FORM_LIMIT: usize = 1024 * 1024;

type Controller = web::Data<ChildrenController>;

fn current_user_name(req: &HttpRequest) -> String {
    req.headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

fn html_page(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn attachment_disposition(filename: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename.to_string())],
    }
}

/// Same query with `format=csv`, keeping the caller's encoding.
fn csv_href(req: &HttpRequest) -> String {
    let mut pairs: Vec<&str> = req
        .query_string()
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("format="))
        .collect();
    pairs.push("format=csv");
    format!("{CHILDREN_PATH}/search?{}", pairs.join("&"))
}

/// Collects a multipart form. Parts with a filename are uploads, the rest
/// are text fields.
async fn read_payload(mut multipart: Multipart) -> Result<UpdatePayload, AppError> {
    let mut payload = UpdatePayload::default();

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| AppError::Upload(e.to_string()))?;
        let raw_name = field.name().map(str::to_string);
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::Upload(e.to_string()))?;
            data.extend_from_slice(&chunk);
        }

        let Some(raw_name) = raw_name else {
            continue;
        };
        let name = field_param_name(&raw_name).to_string();
        if name == "_method" {
            continue;
        }

        match filename {
            Some(filename) => payload.uploads.push(Upload {
                field: name,
                filename: Some(filename),
                content_type,
                data,
            }),
            None => {
                let text = String::from_utf8(data)
                    .map_err(|_| AppError::Upload(format!("field '{name}' is not UTF-8")))?;
                payload.fields.push((name, FieldValue::Text(text)));
            }
        }
    }
    Ok(payload)
}

pub async fn index(controller: Controller) -> Result<HttpResponse, AppError> {
    let children = controller.index()?;
    Ok(html_page(html::index(&children)))
}

pub async fn show(
    controller: Controller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let child = controller.show(&path.into_inner())?;
    Ok(html_page(html::show(&child, controller.forms())))
}

pub async fn new_child(controller: Controller) -> HttpResponse {
    let child = controller.new_child();
    html_page(html::new_child(&child, controller.forms()))
}

pub async fn edit(
    controller: Controller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let child = controller.edit(&path.into_inner())?;
    Ok(html_page(html::edit_child(&child, controller.forms())))
}

pub async fn create(
    controller: Controller,
    req: HttpRequest,
    multipart: Multipart,
) -> Result<HttpResponse, AppError> {
    let payload = read_payload(multipart).await?;
    let child = controller.create(payload, &current_user_name(&req))?;
    Ok(redirect(&format!("{CHILDREN_PATH}/{}", child.id)))
}

pub async fn update(
    controller: Controller,
    path: web::Path<String>,
    multipart: Multipart,
) -> Result<HttpResponse, AppError> {
    let payload = read_payload(multipart).await?;
    let child = controller.update(&path.into_inner(), payload)?;
    Ok(html_page(html::show(&child, controller.forms())))
}

pub async fn destroy(
    controller: Controller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    controller.destroy(&path.into_inner())?;
    Ok(redirect(CHILDREN_PATH))
}

pub async fn photo(
    controller: Controller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let photo = controller.photo(&path.into_inner())?;
    Ok(HttpResponse::Ok()
        .content_type(photo.content_type)
        .body(photo.data))
}

pub async fn search(
    controller: Controller,
    req: HttpRequest,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let outcome = controller.search(&params).await?;

    match params.format {
        Format::Csv => Ok(HttpResponse::Ok()
            .content_type(CSV_CONTENT_TYPE)
            .insert_header(attachment_disposition(CSV_FILENAME))
            .body(controller.search_csv(&outcome))),
        Format::Html => Ok(html_page(html::search_results(&outcome, &csv_href(&req)))),
    }
}

pub async fn photo_pdf(
    controller: Controller,
    req: HttpRequest,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let export = controller.photo_pdf(&form, &current_user_name(&req))?;
    Ok(HttpResponse::Ok()
        .content_type(export.content_type)
        .insert_header(attachment_disposition(&export.filename))
        .body(export.data))
}

/// Mounts the `/children` resource. Fixed segments come before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(CHILDREN_PATH)
            .app_data(web::FormConfig::default().limit(FORM_LIMIT))
            .route("", web::get().to(index))
            .route("", web::post().to(create))
            .route("/new", web::get().to(new_child))
            .route("/search", web::get().to(search))
            .route("/photo_pdf", web::post().to(photo_pdf))
            .route("/{id}", web::get().to(show))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::post().to(update))
            .route("/{id}", web::delete().to(destroy))
            .route("/{id}/edit", web::get().to(edit))
            .route("/{id}/photo", web::get().to(photo)),
    );
}
