use crate::db::model::Child;

pub const CSV_FILENAME: &str = "rapidftr_search_results.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Header row of `field_names`, then one row per child with values in the
/// same order. Values are joined as-is: no quoting, no escaping.
pub fn render_csv(field_names: &[String], results: &[Child]) -> String {
    let mut out = String::new();
    out.push_str(&field_names.join(","));
    out.push('\n');

    for child in results {
        let row: Vec<String> = field_names.iter().map(|f| child.field_text(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
