//! Admin screen: one selector per feature, persisted on submit.
//!
//! Form fields are `<feature>=<origin-token>` plus `_token` (the admin
//! secret). Unknown features and invalid tokens are dropped before the
//! snapshot is stored.

use std::fmt::Write;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, Redirect},
    Form,
};

use fpolicy_core::admin::{fields, FieldView};
use fpolicy_core::SettingsSnapshot;

use super::{authorize, ApiError};
use crate::app_state::AppState;

pub const ADMIN_PATH: &str = "/admin/feature-policies";

/// Form field carrying the admin token.
const TOKEN_FIELD: &str = "_token";

const LEARN_MORE_URL: &str = "https://developers.google.com/web/updates/2018/06/feature-policy";

pub async fn render(State(state): State<AppState>) -> Html<String> {
    let settings = state.load_settings().await;
    Html(render_page(&fields(state.catalog(), &settings)))
}

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    let form_token = pairs
        .iter()
        .find(|(k, _)| k == TOKEN_FIELD)
        .map(|(_, v)| v.as_str());
    authorize(&state, &headers, form_token)?;

    let snapshot = SettingsSnapshot::from_selections(
        state.catalog(),
        pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    state.store_settings(snapshot, "admin").await?;
    Ok(Redirect::to(ADMIN_PATH))
}

fn render_page(fields: &[FieldView]) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Feature Policies</title></head><body>\n");
    out.push_str("<div class=\"wrap\">\n<h1>Feature Policies</h1>\n");
    let _ = writeln!(
        out,
        "<p>Feature Policy grants you control over how certain browser APIs and web features act on your site. \
         <a class=\"external-link\" href=\"{LEARN_MORE_URL}\" target=\"_blank\">Learn more about Feature Policy\
         <span class=\"screen-reader-text\"> (opens in a new tab)</span></a></p>"
    );
    let _ = writeln!(out, "<form action=\"{ADMIN_PATH}\" method=\"post\" novalidate=\"novalidate\">");
    out.push_str("<table class=\"form-table\">\n");
    for f in fields {
        render_field(&mut out, f);
    }
    out.push_str("</table>\n");
    let _ = writeln!(
        out,
        "<p><label for=\"{TOKEN_FIELD}\">Admin token</label> <input type=\"password\" id=\"{TOKEN_FIELD}\" name=\"{TOKEN_FIELD}\" autocomplete=\"off\"></p>"
    );
    out.push_str("<p class=\"submit\"><button type=\"submit\">Save Changes</button></p>\n</form>\n</div>\n</body></html>\n");
    out
}

fn render_field(out: &mut String, f: &FieldView) {
    let name = escape_html(&f.name);
    let _ = writeln!(
        out,
        "<tr><th scope=\"row\"><label for=\"{name}\">{}</label></th><td>",
        escape_html(&f.title)
    );
    let _ = writeln!(out, "<select id=\"{name}\" name=\"{name}\">");
    for c in &f.choices {
        let selected = if c.selected { " selected=\"selected\"" } else { "" };
        let default = if c.is_default { " (default)" } else { "" };
        let _ = writeln!(
            out,
            "<option value=\"{}\"{selected}>{}{default}</option>",
            escape_html(c.token),
            escape_html(c.label)
        );
    }
    out.push_str("</select></td></tr>\n");
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}
