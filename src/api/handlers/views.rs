//! Server-rendered pages.

use std::fmt::Write;

use crate::gate::{FieldErrors, Realm};

/// Escape text for HTML element and attribute content.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

fn field_errors(errors: &FieldErrors, field: &str) -> String {
    let mut html = String::new();
    for message in errors.get(field) {
        let _ = writeln!(html, "<p class=\"error\" role=\"alert\">{}</p>", escape(message));
    }
    html
}

pub fn login_page(realm: &Realm, email: &str, next: Option<&str>, errors: &FieldErrors) -> String {
    let prefix = realm.prefix();
    let next_field = next.map_or_else(String::new, |next| {
        format!(
            "<input type=\"hidden\" name=\"next\" value=\"{}\">\n",
            escape(next)
        )
    });
    let body = format!(
        "<h1>{realm} login</h1>\n\
         <form method=\"post\" action=\"{prefix}/login\">\n\
         {next_field}\
         <label for=\"email\">Email</label>\n\
         <input id=\"email\" type=\"email\" name=\"email\" value=\"{email}\" required autofocus>\n\
         {email_errors}\
         <label for=\"password\">Password</label>\n\
         <input id=\"password\" type=\"password\" name=\"password\" required>\n\
         {password_errors}\
         <button type=\"submit\">Login</button>\n\
         </form>\n",
        realm = escape(realm.as_str()),
        email = escape(email),
        email_errors = field_errors(errors, "email"),
        password_errors = field_errors(errors, "password"),
    );
    layout(&format!("{realm} login"), &body)
}

pub fn home_page(realm: &Realm, subject_id: &str) -> String {
    let body = format!(
        "<h1>{realm}</h1>\n\
         <p>Signed in as <strong>{subject}</strong>.</p>\n\
         <form method=\"post\" action=\"{prefix}/logout\">\n\
         <button type=\"submit\">Logout</button>\n\
         </form>\n",
        realm = escape(realm.as_str()),
        subject = escape(subject_id),
        prefix = realm.prefix(),
    );
    layout(realm.as_str(), &body)
}
