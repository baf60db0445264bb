//! HTML pages.
//!
//! Templates live in `templates/` and are compiled into the binary. Placeholders
//! are written `{{ name }}`; values are substituted in a single pass, so text
//! coming from users is never re-scanned for placeholders. Everything
//! user-controlled goes through [`html_escape`].

use super::session::Flash;
use axum::response::Html;

const BASE: &str = include_str!("../../templates/base.html");
const INDEX: &str = include_str!("../../templates/index.html");
const REGISTER: &str = include_str!("../../templates/register.html");
const LOGIN: &str = include_str!("../../templates/login.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Register,
    Login,
}

impl Page {
    const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Register => "Register",
            Self::Login => "Log in",
        }
    }
}

/// Render `page` for the current user with the drained flash messages.
#[must_use]
pub fn render(page: Page, user: Option<&str>, flashes: &[Flash]) -> Html<String> {
    let content = match page {
        Page::Home => {
            let greeting = user.map_or_else(
                || "Welcome".to_string(),
                |name| format!("Welcome, {}", html_escape(name)),
            );
            fill(INDEX, &[("greeting", greeting.as_str())])
        }
        Page::Register => REGISTER.to_string(),
        Page::Login => LOGIN.to_string(),
    };

    let nav = nav(user);
    let flashes = render_flashes(flashes);

    Html(fill(
        BASE,
        &[
            ("title", page.title()),
            ("nav", nav.as_str()),
            ("flashes", flashes.as_str()),
            ("content", content.as_str()),
        ],
    ))
}

fn nav(user: Option<&str>) -> String {
    match user {
        Some(name) => format!(
            r#"<span class="user">Signed in as <strong>{}</strong></span> <a href="/logout">Log out</a>"#,
            html_escape(name)
        ),
        None => r#"<a href="/register">Register</a> <a href="/login">Log in</a>"#.to_string(),
    }
}

fn render_flashes(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<div class="flash {}" role="alert">{}</div>"#,
                flash.level.as_str(),
                html_escape(&flash.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Replace `{{ key }}` placeholders. Unknown placeholders render empty.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        if let Some((_, value)) = values.iter().find(|(k, _)| *k == key) {
            out.push_str(value);
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
