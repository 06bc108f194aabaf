// src/phosphosite/client.rs
use crate::utils::error::SiteError;
use reqwest::header;
use std::time::Duration;

// IMPORTANT: Replace with your actual details or make configurable
const PHOSPHOSITE_USER_AGENT: &str = "phospho_extractor/0.1 (academic research use)";
// Be polite to the site: one page per run, small fixed delay before the request.
const PHOSPHOSITE_REQUEST_DELAY_MS: u64 = 250;
const SITE_PAGE_BASE: &str = "https://www.phosphosite.org/siteAction.action";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Builds the fixed-pattern URL for a numeric site id.
pub fn site_page_url(site_id: u64) -> String {
    format!("{}?id={}", SITE_PAGE_BASE, site_id)
}

/// Creates a reqwest client configured for phosphosite.org interaction.
fn build_site_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(PHOSPHOSITE_USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
}

/// Downloads the site page HTML for the given site id.
/// Includes an explicit User-Agent and basic rate limiting.
pub async fn fetch_site_page(site_id: u64) -> Result<String, SiteError> {
    let client = build_site_client()?; // Propagate client build error if any
    let url = site_page_url(site_id);

    tracing::info!("Downloading site page from: {}", url);
    tracing::debug!("Using User-Agent: {}", PHOSPHOSITE_USER_AGENT);

    tokio::time::sleep(Duration::from_millis(PHOSPHOSITE_REQUEST_DELAY_MS)).await;

    let response = client
        .get(&url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await?; // Propagates reqwest::Error as SiteError::Network

    // Check if the request was successful (status code 2xx)
    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!("Received 404 Not Found for site id {}", site_id);
            return Err(SiteError::PageNotFound(site_id));
        }
        return Err(SiteError::Http(status));
    }

    // Read the response body as text
    let body = response.text().await?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}
