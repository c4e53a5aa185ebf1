use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::SkipReason;
use crate::parsers::html::{attr, element_text, find, resolve_url, selector};
use crate::sources::{PageRules, RawArticle};

/// Longest body shown in an Al-Ahram caption.
const BODY_LIMIT: usize = 1000;

static OUTER_NEWS_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ContentPlaceHolder1_dlNewsContentUrgent_divOuterNews_\d+$")
        .expect("Invalid outer news regex")
});
static OUTER_NEWS: Lazy<Selector> =
    Lazy::new(|| selector(r#"div[id^="ContentPlaceHolder1_dlNewsContentUrgent_divOuterNews_"]"#));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h1#ContentPlaceHolder1_divTitle"));
static IMAGE: Lazy<Selector> =
    Lazy::new(|| selector("div#ContentPlaceHolder1_divMainImage img[src]"));
static CONTENT: Lazy<Selector> = Lazy::new(|| selector("div#ContentPlaceHolder1_divContent"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

/// Al-Ahram Gate urgent news.
pub struct GateAhramRules;

impl PageRules for GateAhramRules {
    fn listing_links(&self, document: &Html, base_url: &str) -> Vec<String> {
        document
            .select(&OUTER_NEWS)
            .filter(|block| block.value().id().is_some_and(|id| OUTER_NEWS_ID.is_match(id)))
            .filter_map(|block| find(block, &LINK))
            .filter_map(|link| attr(link, "href"))
            .filter_map(|href| resolve_url(base_url, &href))
            .collect()
    }

    fn parse_article(&self, document: &Html, page_url: &str) -> Result<RawArticle, SkipReason> {
        let root = document.root_element();

        let title = find(root, &TITLE)
            .map(element_text)
            .ok_or(SkipReason::MissingElement("title"))?;
        let image_url = find(root, &IMAGE)
            .and_then(|img| attr(img, "src"))
            .and_then(|src| resolve_url(page_url, &src))
            .ok_or(SkipReason::MissingElement("lead image"))?;
        let content = find(root, &CONTENT).ok_or(SkipReason::MissingElement("article content"))?;

        let body = content
            .select(&PARAGRAPH)
            .map(|p| format!("\n{}\n", element_text(p)))
            .collect::<String>();

        Ok(RawArticle {
            title,
            body,
            image_url,
        })
    }

    fn body_limit(&self) -> Option<usize> {
        Some(BODY_LIMIT)
    }
}
