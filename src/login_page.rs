//! Login-page inspection: form-field harvesting and session-state markers.
//!
//! The legacy site serves a login-prompt page in place of content once a
//! session lapses, and reports bad credentials with a literal phrase in the
//! response body. Everything here is string/DOM inspection; no network.

use regex::Regex;
use scraper::{Html, Selector};

use crate::config::Config;

/// Extract the input fields of the named form as (name, value) pairs.
///
/// Returns `None` when no form with that `name` attribute exists. Inputs
/// without a `name` are skipped; a missing `value` becomes an empty string
/// (hidden CSRF-style tokens always carry both).
pub fn extract_form_fields(body: &str, form_name: &str) -> Option<Vec<(String, String)>> {
    let document = Html::parse_document(body);
    let form_selector =
        Selector::parse(&format!("form[name=\"{}\"]", form_name)).expect("Invalid CSS selector");
    let input_selector = Selector::parse("input").expect("Invalid CSS selector");

    let form = document.select(&form_selector).next()?;

    let mut fields = Vec::new();
    for input in form.select(&input_selector) {
        if let Some(name) = input.value().attr("name") {
            let value = input.value().attr("value").unwrap_or("");
            fields.push((name.to_string(), value.to_string()));
        }
    }

    Some(fields)
}

/// Does this page ask the visitor to log in before showing content?
///
/// Matches an `<h1>` heading containing "Please login first", which is how
/// the legacy site signals an expired session on any content URL.
pub fn is_login_prompt(body: &str) -> bool {
    let document = Html::parse_document(body);
    let heading_selector = Selector::parse("h1").expect("Invalid CSS selector");
    let pattern = Regex::new(Config::LOGIN_PROMPT_PATTERN).expect("Invalid login prompt pattern");

    document
        .select(&heading_selector)
        .any(|h| pattern.is_match(&h.text().collect::<String>()))
}

/// Did a login POST bounce with rejected credentials?
pub fn indicates_login_failure(body: &str) -> bool {
    body.contains(Config::LOGIN_FAILURE_PHRASE)
}
