//! Directory-listing extraction from the mirror's index pages.
//!
//! Index pages render one table row per entry, with the link in the
//! name column (`td.n`). Directories are the entries whose `href` ends
//! in `/`.

use std::sync::OnceLock;

use scraper::{Html, Selector};

use crate::acquisition::http_client::HttpClient;
use crate::error::Result;

fn name_column_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table tr td.n a").expect("name column selector is valid"))
}

fn anchor_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("a").expect("anchor selector is valid"))
}

/// Names of the directories listed in an index page, trailing `/` stripped.
///
/// Document order, duplicates kept.
pub fn directory_names(document: &Html) -> Vec<String> {
    document
        .select(name_column_selector())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| href.strip_suffix('/'))
        .map(str::to_string)
        .collect()
}

/// Every anchor `href` in the page, in document order.
pub fn anchor_hrefs(document: &Html) -> Vec<String> {
    document
        .select(anchor_selector())
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Fetch an index page and return its directory names.
pub async fn list_directories(client: &HttpClient, url: &str) -> Result<Vec<String>> {
    let document = client.fetch_html(url).await?;
    Ok(directory_names(&document))
}

/// Fetch an index page and return all of its anchor hrefs.
pub async fn list_hrefs(client: &HttpClient, url: &str) -> Result<Vec<String>> {
    let document = client.fetch_html(url).await?;
    Ok(anchor_hrefs(&document))
}
