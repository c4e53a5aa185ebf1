use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::SkipReason;
use crate::parsers::html::{attr, element_text, find, resolve_url, selector};
use crate::sources::{PageRules, RawArticle};

static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static HEADER: Lazy<Selector> = Lazy::new(|| selector("header"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static BODY: Lazy<Selector> = Lazy::new(|| selector("div.ue-l-article__body"));
static HEADER_CONTENT: Lazy<Selector> = Lazy::new(|| selector("div.ue-l-article__header-content"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img.ue-c-article__image"));
static HEADLINE: Lazy<Selector> = Lazy::new(|| selector("h1.ue-c-article__headline"));
static STANDFIRST: Lazy<Selector> = Lazy::new(|| selector("p.ue-c-article__standfirst"));

/// Marca, Real Madrid section. Articles are Spanish and get translated.
pub struct MarcaRules;

impl PageRules for MarcaRules {
    fn listing_links(&self, document: &Html, base_url: &str) -> Vec<String> {
        document
            .select(&ARTICLE)
            .filter_map(|article| find(article, &HEADER))
            .filter_map(|header| find(header, &LINK))
            .filter_map(|link| attr(link, "href"))
            .filter_map(|href| resolve_url(base_url, &href))
            .collect()
    }

    fn parse_article(&self, document: &Html, page_url: &str) -> Result<RawArticle, SkipReason> {
        let root = document.root_element();
        let body = find(root, &BODY).ok_or(SkipReason::MissingElement("article body"))?;
        let header = find(root, &HEADER_CONTENT).ok_or(SkipReason::MissingElement("article header"))?;

        let image_url = find(body, &IMAGE)
            .and_then(|img| attr(img, "src"))
            .and_then(|src| resolve_url(page_url, &src))
            .ok_or(SkipReason::MissingElement("lead image"))?;
        let title = find(header, &HEADLINE)
            .map(element_text)
            .ok_or(SkipReason::MissingElement("headline"))?;
        let standfirst = find(header, &STANDFIRST)
            .map(element_text)
            .ok_or(SkipReason::MissingElement("standfirst"))?;

        Ok(RawArticle {
            title,
            body: standfirst,
            image_url,
        })
    }

    fn translates(&self) -> bool {
        true
    }
}
