//! `data-region` marker on the root element.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::region::Region;

static HTML_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html([^>]*)>").expect("Invalid html tag regex"));

static DATA_REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sdata-region\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("Invalid data-region regex")
});

/// Tag the first `<html>` start tag with `data-region="<ID>"`.
///
/// An existing `data-region` attribute has its value replaced, so the marker
/// appears exactly once however many times this runs. Pages without an
/// `<html>` tag are returned unchanged.
pub fn inject_region_marker(html: &str, region: Region) -> String {
    let Some(attrs) = HTML_OPEN_RE.captures(html).and_then(|caps| caps.get(1)) else {
        tracing::debug!(region = %region, "No <html> tag, skipping region marker");
        return html.to_string();
    };

    let marker = format!(r#" data-region="{}""#, region.id());
    let existing = attrs.as_str();

    let new_attrs = if DATA_REGION_RE.is_match(existing) {
        DATA_REGION_RE
            .replace(existing, NoExpand(&marker))
            .into_owned()
    } else {
        format!("{existing}{marker}")
    };

    let mut out = String::with_capacity(html.len() + marker.len());
    out.push_str(&html[..attrs.start()]);
    out.push_str(&new_attrs);
    out.push_str(&html[attrs.end()..]);
    out
}
