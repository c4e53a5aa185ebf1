use scraper::{ElementRef, Selector};
use url::Url;

use super::clean_text;

/// Build a selector from a literal known to be valid. Used for `Lazy` statics.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("Invalid selector {css:?}: {e:?}"))
}

/// Whitespace-normalised text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// First descendant of `scope` matching `selector`.
pub fn find<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Non-empty attribute value of an element.
pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolve `href` against `base`. Absolute links pass through unchanged.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}
