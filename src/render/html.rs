use crate::db::model::Child;
use crate::forms::loader::FormConfig;
use crate::forms::model::{FieldType, FormField};
use crate::search::model::SearchOutcome;
use crate::utils::funcs::escape_html;

pub const CHILDREN_PATH: &str = "/children";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>RapidFTR - {}</title></head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn search_box() -> String {
    format!(
        "<form class=\"search\" action=\"{CHILDREN_PATH}/search\" method=\"get\">\
         <input type=\"text\" name=\"child_name\">\
         <input type=\"text\" name=\"unique_identifier\">\
         <label><input type=\"checkbox\" name=\"show_thumbnails\" value=\"1\"> Show thumbnails</label>\
         <input type=\"submit\" value=\"Search\"></form>\n"
    )
}

pub fn index(children: &[Child]) -> String {
    let mut body = String::from("<h1>Children</h1>\n");
    body.push_str(&search_box());
    body.push_str("<ul class=\"children\">\n");
    for child in children {
        body.push_str(&format!(
            "<li><a href=\"{CHILDREN_PATH}/{id}\">{name}</a></li>\n",
            id = escape_html(&child.id),
            name = escape_html(&child.name()),
        ));
    }
    body.push_str("</ul>\n");
    body.push_str(&format!("<a href=\"{CHILDREN_PATH}/new\">New child</a>\n"));
    layout("Children", &body)
}

pub fn show(child: &Child, forms: &FormConfig) -> String {
    let id = escape_html(&child.id);
    let mut body = format!("<h1>{}</h1>\n", escape_html(&child.name()));
    if child.current_photo().is_some() {
        body.push_str(&format!("<img class=\"photo\" src=\"{CHILDREN_PATH}/{id}/photo\">\n"));
    }
    body.push_str("<dl>\n");
    body.push_str(&format!(
        "<dt>Unique identifier</dt><dd>{}</dd>\n",
        escape_html(&child.unique_identifier())
    ));
    for section in forms.enabled_sections() {
        for field in section.fields.iter().filter(|f| !f.is_upload()) {
            body.push_str(&format!(
                "<dt>{}</dt><dd>{}</dd>\n",
                escape_html(field.label()),
                escape_html(&child.field_text(&field.name))
            ));
        }
    }
    body.push_str("</dl>\n");
    body.push_str(&format!(
        "<a href=\"{CHILDREN_PATH}/{id}/edit\">Edit</a> <a href=\"{CHILDREN_PATH}\">Back</a>\n"
    ));
    layout(&child.name(), &body)
}

fn field_input(field: &FormField, child: &Child) -> String {
    let name = format!("child[{}]", escape_html(&field.name));
    let value = escape_html(&child.field_text(&field.name));
    let input = match field.field_type {
        FieldType::TextField => format!("<input type=\"text\" name=\"{name}\" value=\"{value}\">"),
        FieldType::NumericField => {
            format!("<input type=\"number\" name=\"{name}\" value=\"{value}\">")
        }
        FieldType::Textarea => format!("<textarea name=\"{name}\">{value}</textarea>"),
        FieldType::PhotoUploadBox => format!("<input type=\"file\" name=\"{name}\">"),
    };
    format!(
        "<p><label>{}</label> {input}</p>\n",
        escape_html(field.label())
    )
}

/// One fieldset per enabled form section.
fn child_form(action: &str, child: &Child, forms: &FormConfig) -> String {
    let mut form = format!(
        "<form action=\"{action}\" method=\"post\" enctype=\"multipart/form-data\">\n"
    );
    for section in forms.enabled_sections() {
        form.push_str(&format!(
            "<fieldset class=\"form_section\" id=\"{}\"><legend>{}</legend>\n",
            escape_html(&section.unique_id),
            escape_html(&section.name)
        ));
        for field in &section.fields {
            form.push_str(&field_input(field, child));
        }
        form.push_str("</fieldset>\n");
    }
    form.push_str("<input type=\"submit\" value=\"Save\">\n</form>\n");
    form
}

pub fn new_child(child: &Child, forms: &FormConfig) -> String {
    let body = format!("<h1>New child</h1>\n{}", child_form(CHILDREN_PATH, child, forms));
    layout("New child", &body)
}

pub fn edit_child(child: &Child, forms: &FormConfig) -> String {
    let action = format!("{CHILDREN_PATH}/{}", escape_html(&child.id));
    let body = format!(
        "<h1>Edit {}</h1>\n{}",
        escape_html(&child.name()),
        child_form(&action, child, forms)
    );
    layout("Edit child", &body)
}

/// Empty results get a message and neither the CSV link nor the photo form.
pub fn search_results(outcome: &SearchOutcome, csv_href: &str) -> String {
    let mut body = String::from("<h1>Search results</h1>\n");
    body.push_str(&search_box());

    if outcome.is_empty() {
        body.push_str("<p class=\"no_results\">No results found</p>\n");
        return layout("Search", &body);
    }

    if outcome.offers_csv_export() {
        body.push_str(&format!(
            "<a class=\"csv_export\" href=\"{}\">Export to CSV</a>\n",
            escape_html(csv_href)
        ));
    }

    body.push_str(&format!(
        "<form action=\"{CHILDREN_PATH}/photo_pdf\" method=\"post\">\n<table class=\"results\">\n"
    ));
    for child in &outcome.results {
        let id = escape_html(&child.id);
        let thumbnail = if outcome.show_thumbnails && child.current_photo_key.is_some() {
            format!("<img class=\"thumbnail\" src=\"{CHILDREN_PATH}/{id}/photo\" width=\"60\">")
        } else {
            String::new()
        };
        body.push_str(&format!(
            "<tr><td><input type=\"checkbox\" name=\"{id}\" value=\"selected\"></td>\
             <td>{thumbnail}</td><td><a href=\"{CHILDREN_PATH}/{id}\">{name}</a></td><td>{uid}</td></tr>\n",
            name = escape_html(&child.name()),
            uid = escape_html(&child.unique_identifier()),
        ));
    }
    body.push_str("</table>\n<input type=\"submit\" value=\"Export photos to PDF\">\n</form>\n");
    layout("Search", &body)
}
