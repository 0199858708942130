//! Minimal server-rendered pages for the items application.

use crate::domain::model::{Fields, Record};
use crate::domain::outcome::{Flash, Form, Target};
use serde_json::Value as JsonValue;
use std::fmt::Write;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn display(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => escape(s),
        Some(other) => escape(&other.to_string()),
    }
}

fn flash_html(flash: Option<&Flash>) -> String {
    let Some(flash) = flash else {
        return String::new();
    };
    match &flash.message {
        Some(message) => format!(
            "<div class=\"flash flash-{}\">{}</div>\n",
            flash.level.as_str(),
            escape(message)
        ),
        None => String::new(),
    }
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n{flash}{body}</body>\n</html>\n",
        title = escape(title),
        flash = flash_html(flash),
        body = body
    )
}

pub fn index_page(base: &str, label: &str, records: &[Record], flash: Option<&Flash>) -> String {
    let mut body = format!(
        "<p><a href=\"{}\">Create {}</a></p>\n",
        Target::Create.path(base),
        escape(&label.to_lowercase())
    );

    if records.is_empty() {
        let _ = writeln!(body, "<p>No {}s found.</p>", escape(&label.to_lowercase()));
        return layout(&format!("{}s", label), flash, &body);
    }

    body.push_str("<table>\n<tr><th>ID</th><th>Name</th><th>Description</th><th>Created</th><th></th></tr>\n");
    for record in records {
        let id = record.id().unwrap_or_default();
        let _ = writeln!(
            body,
            "<tr><td>{id}</td><td><a href=\"{show}\">{name}</a></td><td>{description}</td><td>{created}</td>\
             <td><a href=\"{edit}\">Edit</a> \
             <form method=\"post\" action=\"{show}\"><input type=\"hidden\" name=\"_method\" value=\"DELETE\">\
             <button type=\"submit\">Delete</button></form></td></tr>",
            id = escape(&id),
            show = escape(&Target::Show(id.clone()).path(base)),
            edit = escape(&Target::Edit(id.clone()).path(base)),
            name = display(record.get("name")),
            description = display(record.get("description")),
            created = display(record.get("created_at")),
        );
    }
    body.push_str("</table>\n");
    layout(&format!("{}s", label), flash, &body)
}

pub fn show_page(base: &str, label: &str, record: &Record, flash: Option<&Flash>) -> String {
    let mut body = String::from("<dl>\n");
    for (field, value) in record.fields() {
        let _ = writeln!(
            body,
            "<dt>{}</dt><dd>{}</dd>",
            escape(field),
            display(Some(value))
        );
    }
    body.push_str("</dl>\n");
    let id = record.id().unwrap_or_default();
    let _ = writeln!(
        body,
        "<p><a href=\"{}\">Edit</a> | <a href=\"{}\">Back</a></p>",
        escape(&Target::Edit(id).path(base)),
        escape(base)
    );
    layout(label, flash, &body)
}

/// Create/edit form. Input echoed through the flash wins over stored values.
pub fn form_page(base: &str, label: &str, form: &Form, flash: Option<&Flash>) -> String {
    let (title, action, method) = match &form.target {
        Target::Edit(id) => (
            format!("Edit {}", label),
            Target::Show(id.clone()).path(base),
            Some("PUT"),
        ),
        _ => (format!("Create {}", label), base.to_string(), None),
    };

    let echoed: Option<&Fields> = flash.map(|f| &f.input).filter(|input| !input.is_empty());
    let mut body = format!("<form method=\"post\" action=\"{}\">\n", escape(&action));
    if let Some(method) = method {
        let _ = writeln!(body, "<input type=\"hidden\" name=\"_method\" value=\"{}\">", method);
    }

    for (field, stored) in &form.values {
        let value = echoed
            .and_then(|input| input.get(field))
            .or(Some(stored));
        let value = display(value);
        let _ = write!(body, "<label for=\"{0}\">{0}</label>\n", escape(field));
        if field == "description" {
            let _ = writeln!(
                body,
                "<textarea id=\"{0}\" name=\"{0}\">{1}</textarea>",
                escape(field),
                value
            );
        } else {
            let _ = writeln!(
                body,
                "<input id=\"{0}\" name=\"{0}\" value=\"{1}\">",
                escape(field),
                value
            );
        }
        if let Some(flash) = flash {
            for message in flash.errors.get(field) {
                let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(message));
            }
        }
    }

    body.push_str("<button type=\"submit\">Save</button>\n</form>\n");
    let _ = writeln!(body, "<p><a href=\"{}\">Back</a></p>", escape(base));
    layout(&title, flash, &body)
}

pub fn message_page(title: &str, message: &str, flash: Option<&Flash>) -> String {
    layout(title, flash, &format!("<p>{}</p>\n", escape(message)))
}
