//! Scraper for the ThoughtWorks Technology Radar site.
//!
//! Fetching is isolated behind [`TechniqueSource`] so the pipeline can be
//! driven by a stub in tests. The HTML extraction itself is pure functions
//! over the page text, unit-tested without any network.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{error, info, warn};

use praxis_common::{Movement, PraxisError, Quadrant, RadarTechnique, Ring};

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Fallbacks when the edition banner cannot be parsed from the landing page.
const DEFAULT_VOLUME: i64 = 32;
const DEFAULT_EDITION_DATE: &str = "2025-04";

/// Source of radar techniques. The production impl scrapes the live site;
/// tests substitute a canned source.
#[async_trait]
pub trait TechniqueSource: Send + Sync {
    /// List paths of all technique summary pages, e.g.
    /// "/techniques/summary/fuzz-testing".
    async fn list_techniques(&self) -> Result<Vec<String>, PraxisError>;

    /// Scrape one technique page. Returns None when the page cannot be
    /// fetched or parsed; the failure is logged, not propagated, so a bad
    /// page never aborts a batch run.
    async fn scrape_technique(&self, path: &str) -> Option<RadarTechnique>;
}

pub struct RadarScraper {
    client: reqwest::Client,
    base_url: String,
}

impl RadarScraper {
    pub fn new(base_url: &str) -> Result<Self, PraxisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PraxisError::Scraping(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, PraxisError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PraxisError::Scraping(format!("GET {url}: {e}")))?
            .error_for_status()
            .map_err(|e| PraxisError::Scraping(format!("GET {url}: {e}")))?;
        resp.text()
            .await
            .map_err(|e| PraxisError::Scraping(format!("read body of {url}: {e}")))
    }

    /// Parse the edition banner (volume and date) from the radar landing
    /// page, falling back to the current defaults when absent.
    async fn edition_info(&self) -> (i64, String) {
        match self.fetch(&self.base_url).await {
            Ok(html) => extract_edition(&html),
            Err(e) => {
                warn!(error = %e, "Failed to fetch edition info, using defaults");
                (DEFAULT_VOLUME, DEFAULT_EDITION_DATE.to_string())
            }
        }
    }
}

#[async_trait]
impl TechniqueSource for RadarScraper {
    async fn list_techniques(&self) -> Result<Vec<String>, PraxisError> {
        let url = format!("{}/techniques", self.base_url);
        let html = self.fetch(&url).await?;
        let paths = extract_technique_links(&html);
        info!(count = paths.len(), "Listed radar techniques");
        Ok(paths)
    }

    async fn scrape_technique(&self, path: &str) -> Option<RadarTechnique> {
        let url = format!("{}{}", self.base_url, path);
        let html = match self.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                error!(path, error = %e, "Failed to scrape technique");
                return None;
            }
        };

        let name = match extract_technique_name(path, &html) {
            Some(name) => name,
            None => {
                warn!(url, "Could not extract technique name");
                return None;
            }
        };

        let description = extract_description(&html)
            .unwrap_or_else(|| format!("Technology Radar technique: {name}"));
        let ring = infer_ring(&html).unwrap_or(Ring::Assess);
        let related_blips = extract_related_blips(&html);
        let (volume, edition_date) = self.edition_info().await;

        Some(RadarTechnique {
            name,
            quadrant: Quadrant::Techniques,
            ring,
            movement: Movement::NoChange,
            description,
            volume,
            edition_date,
            source_url: Some(url),
            related_blips,
        })
    }
}

// --- Pure extraction helpers ---

/// Collect hrefs of technique summary links, deduplicated in page order.
pub fn extract_technique_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    let mut seen = std::collections::HashSet::new();
    let mut paths = Vec::new();
    for el in doc.select(&selector) {
        if let Some(href) = el.value().attr("href") {
            if href.contains("/techniques/summary/") && seen.insert(href.to_string()) {
                paths.push(href.to_string());
            }
        }
    }
    paths
}

/// Derive the technique name from the trailing path segment (slug to title
/// case), falling back to the page's h1 or title.
pub fn extract_technique_name(path: &str, html: &str) -> Option<String> {
    if let Some(slug) = path.rsplit('/').next().filter(|s| !s.is_empty()) {
        return Some(title_case(&slug.replace('-', " ")));
    }

    let doc = Html::parse_document(html);
    for sel in ["h1", "title"] {
        let selector = Selector::parse(sel).unwrap();
        if let Some(el) = doc.select(&selector).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull the description out of the page: prefer the first two paragraphs of
/// a content-ish div, otherwise any paragraph with substantial text.
pub fn extract_description(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let div_selector = Selector::parse("div[class]").unwrap();
    let p_selector = Selector::parse("p").unwrap();
    for div in doc.select(&div_selector) {
        let classes = div.value().attr("class").unwrap_or_default();
        if ["content", "main", "description"]
            .iter()
            .any(|c| classes.contains(c))
        {
            let paragraphs: Vec<String> = div
                .select(&p_selector)
                .take(2)
                .map(|p| p.text().collect::<String>().trim().to_string())
                .collect();
            if !paragraphs.is_empty() {
                return Some(paragraphs.join(" "));
            }
        }
    }

    for p in doc.select(&p_selector) {
        let text = p.text().collect::<String>().trim().to_string();
        if text.chars().count() > 100 {
            return Some(text);
        }
    }

    None
}

/// Infer the ring from co-occurrence of the ring word and a characteristic
/// editorial phrase anywhere in the page text.
pub fn infer_ring(html: &str) -> Option<Ring> {
    let doc = Html::parse_document(html);
    let text = doc.root_element().text().collect::<String>().to_lowercase();

    if text.contains("adopt")
        && (text.contains("we feel strongly") || text.contains("should be adopting"))
    {
        Some(Ring::Adopt)
    } else if text.contains("trial")
        && (text.contains("worth pursuing") || text.contains("try this technology"))
    {
        Some(Ring::Trial)
    } else if text.contains("assess")
        && (text.contains("promising") || text.contains("worth exploring"))
    {
        Some(Ring::Assess)
    } else if text.contains("hold")
        && (text.contains("proceed with caution") || text.contains("serious problems"))
    {
        Some(Ring::Hold)
    } else {
        None
    }
}

/// Link texts under the element that announces "Related blips".
pub fn extract_related_blips(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let any_selector = Selector::parse("*").unwrap();
    let a_selector = Selector::parse("a").unwrap();

    let mut best: Option<scraper::ElementRef> = None;
    for el in doc.select(&any_selector) {
        let own_text: String = el
            .children()
            .filter_map(|c| c.value().as_text().map(|t| t.to_string()))
            .collect();
        if own_text.contains("Related blips") {
            best = Some(el);
        }
    }

    let mut blips = Vec::new();
    if let Some(section) = best {
        let scope = scraper::ElementRef::wrap(section.parent().unwrap_or(*section)).unwrap_or(section);
        for link in scope.select(&a_selector) {
            let text = link.text().collect::<String>().trim().to_string();
            if text.chars().count() > 3 {
                blips.push(text);
            }
        }
    }
    blips
}

/// Parse "Volume N" and a "Month YYYY" date out of the landing page,
/// defaulting to the current edition when missing.
pub fn extract_edition(html: &str) -> (i64, String) {
    let doc = Html::parse_document(html);
    let text = doc.root_element().text().collect::<String>();

    let volume = Regex::new(r"Volume (\d+)")
        .unwrap()
        .captures(&text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_VOLUME);

    let edition_date = Regex::new(r"([A-Za-z]+ \d{4})")
        .unwrap()
        .captures(&text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| DEFAULT_EDITION_DATE.to_string());

    (volume, edition_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_from_slug_is_title_cased() {
        let name = extract_technique_name("/techniques/summary/fuzz-testing", "").unwrap();
        assert_eq!(name, "Fuzz Testing");

        let name =
            extract_technique_name("/techniques/summary/software-bill-of-materials", "").unwrap();
        assert_eq!(name, "Software Bill Of Materials");
    }

    #[test]
    fn technique_links_deduplicated_in_order() {
        let html = r#"
            <html><body>
            <a href="/techniques/summary/fuzz-testing">Fuzz testing</a>
            <a href="/about">About</a>
            <a href="/techniques/summary/threat-modeling">Threat modeling</a>
            <a href="/techniques/summary/fuzz-testing">Fuzz testing again</a>
            </body></html>"#;
        let links = extract_technique_links(html);
        assert_eq!(
            links,
            vec![
                "/techniques/summary/fuzz-testing",
                "/techniques/summary/threat-modeling"
            ]
        );
    }

    #[test]
    fn description_prefers_content_div() {
        let html = r#"
            <html><body>
            <p>Short intro.</p>
            <div class="article-content">
              <p>First paragraph of the technique.</p>
              <p>Second paragraph with more detail.</p>
              <p>Third paragraph that should be ignored.</p>
            </div>
            </body></html>"#;
        let desc = extract_description(html).unwrap();
        assert_eq!(
            desc,
            "First paragraph of the technique. Second paragraph with more detail."
        );
    }

    #[test]
    fn description_falls_back_to_long_paragraph() {
        let long = "x".repeat(150);
        let html = format!("<html><body><p>tiny</p><p>{long}</p></body></html>");
        let desc = extract_description(&html).unwrap();
        assert_eq!(desc, long);
    }

    #[test]
    fn description_absent_when_nothing_substantial() {
        let html = "<html><body><p>tiny</p></body></html>";
        assert!(extract_description(html).is_none());
    }

    #[test]
    fn ring_inferred_from_cooccurrence() {
        let html = "<html><body><p>We feel strongly the industry should adopt this.</p></body></html>";
        assert_eq!(infer_ring(html), Some(Ring::Adopt));

        let html = "<html><body><p>In trial, worth pursuing for most teams.</p></body></html>";
        assert_eq!(infer_ring(html), Some(Ring::Trial));

        let html = "<html><body><p>Assess: promising but early.</p></body></html>";
        assert_eq!(infer_ring(html), Some(Ring::Assess));

        let html =
            "<html><body><p>On hold, proceed with caution with this one.</p></body></html>";
        assert_eq!(infer_ring(html), Some(Ring::Hold));
    }

    #[test]
    fn ring_requires_both_word_and_phrase() {
        // Ring word alone is not enough.
        let html = "<html><body><p>You could adopt this someday.</p></body></html>";
        assert_eq!(infer_ring(html), None);
        // Phrase alone is not enough either.
        let html = "<html><body><p>We feel strongly about many things.</p></body></html>";
        assert_eq!(infer_ring(html), None);
    }

    #[test]
    fn related_blips_from_section() {
        let html = r#"
            <html><body>
            <div>
              <h3>Related blips</h3>
              <ul>
                <li><a href="/a">Contract testing</a></li>
                <li><a href="/b">ab</a></li>
                <li><a href="/c">Chaos engineering</a></li>
              </ul>
            </div>
            <a href="/elsewhere">Unrelated link</a>
            </body></html>"#;
        let blips = extract_related_blips(html);
        assert_eq!(blips, vec!["Contract testing", "Chaos engineering"]);
    }

    #[test]
    fn edition_parses_banner_or_defaults() {
        let html = "<html><body><p>Volume 31, published October 2024</p></body></html>";
        assert_eq!(extract_edition(html), (31, "October 2024".to_string()));

        let html = "<html><body><p>nothing useful</p></body></html>";
        assert_eq!(extract_edition(html), (32, "2025-04".to_string()));
    }
}
