//! Version history page scraping

use crate::extract::{ExtractError, ExtractResult};
use scraper::{Html, Selector};

fn selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{css}: {e:?}")))
}

/// Extracts the version labels listed on a `content_info` page
///
/// Labels are returned in the host's order, newest first.
///
/// # Example
///
/// ```
/// use legacy_populate::extract::extract_versions;
///
/// let html = r#"<div id="cnx_history_section">
///   <a class="cnxn" href="/content/m1/1.2/">1.2</a>
///   <a class="cnxn" href="/content/m1/1.1/">1.1</a>
/// </div>"#;
/// assert_eq!(extract_versions(html).unwrap(), vec!["1.2", "1.1"]);
/// ```
pub fn extract_versions(html: &str) -> ExtractResult<Vec<String>> {
    let document = Html::parse_document(html);
    let section_selector = selector("div#cnx_history_section")?;
    let link_selector = selector("a.cnxn")?;

    let section = document
        .select(&section_selector)
        .next()
        .ok_or(ExtractError::MissingHistory)?;

    let versions: Vec<String> = section
        .select(&link_selector)
        .map(|link| link.text().collect::<String>().trim().to_string())
        .filter(|version| !version.is_empty())
        .collect();

    if versions.is_empty() {
        return Err(ExtractError::NoVersions);
    }

    Ok(versions)
}
