//! Markup parsers: raw response bodies in, typed records out.
//!
//! Every parser is a pure function over a body string. Missing optional
//! fields degrade to empty strings/lists; a missing *required* anchor (the
//! element central to the page) is a hard error, because it means the user
//! does not exist or the page shape changed.
//!
//! The site's HTML structure is an implicit external contract with no
//! version negotiation. Parsers are built against fixture snapshots of real
//! markup and kept isolated from the transport layer so a site-format change
//! only ever touches this module.

pub mod chat;
pub mod friends;
pub mod pictures;
pub mod profile;
pub mod search;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static CSRF_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta name="csrf_token" content="(.*?)""#)
        .expect("csrf token pattern is valid")
});

static VISITOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("div.vBottomTxt a"));

/// Parses a CSS selector known at compile time.
///
/// An invalid selector string is a bug in this crate, not in the input; it
/// is logged and replaced by a selector matching nothing so parsing degrades
/// to "field absent" instead of panicking.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| {
        log::error!("invalid selector '{css}': {e}");
        Selector::parse("*:not(*)").expect("fallback selector is valid")
    })
}

/// Collects the text of an element the way the site renders it: each text
/// node trimmed, empties dropped, fragments joined with single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true when the element carries `class` in its class list.
pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|list| list.split_whitespace().any(|c| c == class))
}

/// Extracts one query-string parameter from an href-like string.
pub(crate) fn query_param(href: &str, name: &str) -> Option<String> {
    let query = href.split_once('?').map(|(_, q)| q)?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Finds the per-session CSRF token embedded in site pages.
///
/// The token is required as a form parameter on search and mutating
/// requests; it is fetched once per operation and reused.
pub fn find_csrf_token(body: &str) -> Option<String> {
    CSRF_TOKEN_RE
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// Parses the "who viewed me" page into a list of usernames.
pub fn parse_visitors(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    document
        .select(&VISITOR_SELECTOR)
        .filter_map(|link| link.value().attr("href"))
        .map(|href| {
            let path = href.strip_prefix('/').unwrap_or(href);
            path.split('?').next().unwrap_or("").to_string()
        })
        .filter(|user| !user.is_empty())
        .collect()
}
