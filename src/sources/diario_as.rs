use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::SkipReason;
use crate::parsers::html::{attr, element_text, find, resolve_url, selector};
use crate::sources::{PageRules, RawArticle};

static LINKS_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("div.b_gr.b_gr-nh"));
static STORY: Lazy<Selector> = Lazy::new(|| selector("div.s_h"));
static STORY_LINK: Lazy<Selector> = Lazy::new(|| selector("h3.s_t a[href]"));
static WRAPPER: Lazy<Selector> = Lazy::new(|| selector("div.wr-c"));
static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static HEADER: Lazy<Selector> = Lazy::new(|| selector("header"));
static TEXT_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("div.a_e_txt"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h1.a_t"));
static SUMMARY: Lazy<Selector> = Lazy::new(|| selector(".a_st"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("div.a_e_m img[src]"));

/// Diario AS, Real Madrid section. Articles are Spanish and get translated.
pub struct AsRules;

impl PageRules for AsRules {
    fn listing_links(&self, document: &Html, base_url: &str) -> Vec<String> {
        let Some(container) = find(document.root_element(), &LINKS_CONTAINER) else {
            return Vec::new();
        };

        container
            .select(&STORY)
            .filter_map(|story| find(story, &STORY_LINK))
            .filter_map(|link| attr(link, "href"))
            .filter_map(|href| resolve_url(base_url, &href))
            .collect()
    }

    fn parse_article(&self, document: &Html, page_url: &str) -> Result<RawArticle, SkipReason> {
        let wrapper =
            find(document.root_element(), &WRAPPER).ok_or(SkipReason::MissingElement("div.wr-c"))?;
        let article = find(wrapper, &ARTICLE).ok_or(SkipReason::MissingElement("article"))?;
        let header = find(article, &HEADER).ok_or(SkipReason::MissingElement("header"))?;
        let text = find(header, &TEXT_CONTAINER).ok_or(SkipReason::MissingElement("text container"))?;

        let title = find(text, &TITLE)
            .map(element_text)
            .ok_or(SkipReason::MissingElement("title"))?;
        let body = find(text, &SUMMARY)
            .map(element_text)
            .ok_or(SkipReason::MissingElement("summary"))?;
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

    fn translates(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn listing_reads_story_headlines() {
        let document = Html::parse_document(
            r#"
            <div class="b_gr b_gr-nh">
              <div class="s_h"><h3 class="s_t"><a href="https://as.com/futbol/b.html">B</a></h3></div>
              <div class="s_h"><p>no headline</p></div>
              <div class="s_h"><h3 class="s_t"><a href="/futbol/a.html">A</a></h3></div>
            </div>
            <div class="s_h"><h3 class="s_t"><a href="/outside.html">X</a></h3></div>
            "#,
        );

        assert_eq!(
            AsRules.listing_links(&document, "https://as.com"),
            vec!["https://as.com/futbol/b.html", "https://as.com/futbol/a.html"]
        );
    }

    #[test]
    fn listing_without_container_is_empty() {
        let document = Html::parse_document("<main></main>");
        assert!(AsRules.listing_links(&document, "https://as.com").is_empty());
    }

    #[test]
    fn article_reads_header_fields() {
        let document = Html::parse_document(
            r#"
            <div class="wr-c"><article><header>
              <div class="a_e_txt"><h1 class="a_t">Ancelotti habla</h1><h2 class="a_st">Rueda de prensa</h2></div>
              <div class="a_e_m"><img src="https://img.as.com/1.jpg"></div>
            </header></article></div>
            "#,
        );

        let article = AsRules.parse_article(&document, "https://as.com/futbol/a.html").unwrap();
        assert_eq!(article.title, "Ancelotti habla");
        assert_eq!(article.body, "Rueda de prensa");
        assert_eq!(article.image_url, "https://img.as.com/1.jpg");
    }

    #[test]
    fn missing_header_skips() {
        let document = Html::parse_document(r#"<div class="wr-c"><article></article></div>"#);
        assert!(matches!(
            AsRules.parse_article(&document, "https://as.com/x"),
            Err(SkipReason::MissingElement("header"))
        ));
    }
}
