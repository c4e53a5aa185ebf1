use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::SkipReason;
use crate::parsers::html::{attr, element_text, find, resolve_url, selector};
use crate::sources::{PageRules, RawArticle};

static NEWS_LIST: Lazy<Selector> = Lazy::new(|| selector("div.rm-news__list"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static HEADER: Lazy<Selector> = Lazy::new(|| selector("header"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h1"));
static EXCERPT: Lazy<Selector> = Lazy::new(|| selector("div.news-detail__excerpt p"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img.news-detail__img"));

/// realmadrid.com news. Links on the listing are site-relative.
pub struct RealMadridRules;

impl PageRules for RealMadridRules {
    fn listing_links(&self, document: &Html, base_url: &str) -> Vec<String> {
        document
            .select(&NEWS_LIST)
            .flat_map(|list| list.select(&LINK))
            .filter_map(|link| attr(link, "href"))
            .filter_map(|href| resolve_url(base_url, &href))
            .collect()
    }

    fn parse_article(&self, document: &Html, page_url: &str) -> Result<RawArticle, SkipReason> {
        let article =
            find(document.root_element(), &ARTICLE).ok_or(SkipReason::MissingElement("article"))?;
        let header = find(article, &HEADER).ok_or(SkipReason::MissingElement("header"))?;

        let title = find(header, &TITLE)
            .map(element_text)
            .ok_or(SkipReason::MissingElement("title"))?;
        let body = find(header, &EXCERPT)
            .map(element_text)
            .ok_or(SkipReason::MissingElement("excerpt"))?;
        let image_url = find(header, &IMAGE)
            .and_then(|img| attr(img, "src"))
            .and_then(|src| resolve_url(page_url, &src))
            .ok_or(SkipReason::MissingElement("lead image"))?;

        Ok(RawArticle {
            title,
            body,
            image_url,
        })
    }
}
