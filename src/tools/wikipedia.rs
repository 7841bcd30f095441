// src/tools/wikipedia.rs

use std::sync::LazyLock;

use crate::tools::Tool;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

const USER_AGENT: &str = concat!(
    "research-agent/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/research-agent/research-agent)"
);

static LIST_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("static list item selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("static link selector"));

#[derive(Debug, Error)]
pub enum WikipediaError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("Page id \"{0}\" does not match any pages. Try another id!")]
    PageNotFound(String),

    #[error("\"{0}\" is a disambiguation page with no listed alternatives")]
    NoAlternatives(String),

    #[error("\"{0}\" may refer to several articles and the first alternative is ambiguous too")]
    StillAmbiguous(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Result of fetching a title: an article, or the candidate titles of a
/// disambiguation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    Article(Article),
    Disambiguation(Vec<String>),
}

/// Search and fetch operations of an encyclopedic text source.
pub trait EncyclopediaSource {
    fn search(&self, query: &str) -> Result<Vec<String>, WikipediaError>;
    fn fetch(&self, title: &str) -> Result<PageFetch, WikipediaError>;
}

/// MediaWiki action API client.
pub struct WikipediaClient {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl WikipediaClient {
    pub fn new(api_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    /// MediaWiki answers failed calls with 200 and an `error` object.
    fn call<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, WikipediaError> {
        let response: ApiResponse<T> = self
            .client
            .get(&self.api_url)
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()?
            .error_for_status()?
            .json()?;
        response.into_body()
    }

    fn disambiguation_links(&self, title: &str) -> Result<Vec<String>, WikipediaError> {
        let body: ParseBody = self.call(&[
            ("action", "parse"),
            ("prop", "text"),
            ("disableeditsection", "1"),
            ("redirects", "1"),
            ("page", title),
        ])?;
        Ok(body
            .parse
            .map(|page| disambiguation_options(&page.text))
            .unwrap_or_default())
    }
}

/// Candidate titles on a rendered disambiguation page, in page order: the
/// first article link of every list item.
fn disambiguation_options(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&LIST_ITEM)
        .filter(|li| !li.value().classes().any(|class| class.starts_with("tocsection")))
        .filter_map(|li| li.select(&LINK).next())
        .filter(|a| a.value().attr("href").is_some_and(|href| href.starts_with("/wiki/")))
        .filter_map(|a| a.value().attr("title"))
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(flatten)]
    body: T,
}

#[derive(Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

impl<T> ApiResponse<T> {
    fn into_body(self) -> Result<T, WikipediaError> {
        match self.error {
            Some(ApiError { code, info }) => Err(WikipediaError::Api { code, info }),
            None => Ok(self.body),
        }
    }
}

#[derive(Deserialize)]
struct QueryBody<T> {
    #[serde(default)]
    query: T,
}

#[derive(Deserialize, Default)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize, Default)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<PageInfo>,
}

#[derive(Deserialize)]
struct PageInfo {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ParseBody {
    #[serde(default)]
    parse: Option<ParsedPage>,
}

#[derive(Deserialize)]
struct ParsedPage {
    #[serde(default)]
    text: String,
}

impl EncyclopediaSource for WikipediaClient {
    fn search(&self, query: &str) -> Result<Vec<String>, WikipediaError> {
        let response: QueryBody<SearchQuery> = self.call(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", "10"),
            ("srprop", ""),
        ])?;
        Ok(response.query.search.into_iter().map(|hit| hit.title).collect())
    }

    fn fetch(&self, title: &str) -> Result<PageFetch, WikipediaError> {
        let response: QueryBody<PagesQuery> = self.call(&[
            ("action", "query"),
            ("prop", "extracts|info|pageprops"),
            ("exintro", "1"),
            ("explaintext", "1"),
            ("inprop", "url"),
            ("ppprop", "disambiguation"),
            ("redirects", "1"),
            ("titles", title),
        ])?;

        let page = response
            .query
            .pages
            .into_iter()
            .next()
            .filter(|page| !page.missing)
            .ok_or_else(|| WikipediaError::PageNotFound(title.to_string()))?;

        let is_disambiguation = page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some());
        if is_disambiguation {
            return Ok(PageFetch::Disambiguation(self.disambiguation_links(&page.title)?));
        }

        let url = page.fullurl.unwrap_or_else(|| {
            format!(
                "https://en.wikipedia.org/wiki/{}",
                page.title.replace(' ', "_")
            )
        });
        Ok(PageFetch::Article(Article {
            title: page.title,
            summary: page.extract.unwrap_or_default().trim().to_string(),
            url,
        }))
    }
}

/// Encyclopedic lookup tool: search, take the top hit, resolve a
/// disambiguation page to its first alternative.
pub struct WikipediaTool<S = WikipediaClient> {
    source: S,
}

impl<S: EncyclopediaSource> WikipediaTool<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn lookup(&self, query: &str) -> Result<String, WikipediaError> {
        let titles = self.source.search(query)?;
        let Some(top) = titles.first() else {
            return Ok(format!("No Wikipedia results found for: {query}"));
        };

        let article = match self.source.fetch(top)? {
            PageFetch::Article(article) => article,
            PageFetch::Disambiguation(options) => {
                let alternative = options
                    .first()
                    .ok_or_else(|| WikipediaError::NoAlternatives(top.clone()))?;
                tracing::debug!(title = %top, %alternative, "resolving disambiguation to first alternative");
                match self.source.fetch(alternative)? {
                    PageFetch::Article(article) => article,
                    PageFetch::Disambiguation(_) => {
                        return Err(WikipediaError::StillAmbiguous(alternative.clone()));
                    }
                }
            }
        };

        Ok(format!(
            "Title: {}\n\nSummary: {}\n\nURL: {}",
            article.title, article.summary, article.url
        ))
    }
}

impl<S: EncyclopediaSource> Tool for WikipediaTool<S> {
    fn name(&self) -> &str {
        "WikipediaTool"
    }

    fn description(&self) -> &str {
        "Useful for retrieving information about people, places, events, concepts, etc. Input should be a search query. The tool will return a summary of the Wikipedia article. Use this when you need factual information or background knowledge."
    }

    fn execute(&self, input: &str) -> String {
        match self.lookup(input) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, query = input, "wikipedia lookup failed");
                format!("Error retrieving information from Wikipedia: {e}")
            }
        }
    }
}
