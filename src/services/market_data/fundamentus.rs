use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, DNT, USER_AGENT},
    Client, StatusCode,
};
use spinners_rs::{Spinner, Spinners};
use tracing::{debug, info};

use crate::services::{errors::ProventosError, pipeline::PipelineContext};

pub const DEFAULT_BASE_URL: &str = "https://www.fundamentus.com.br/proventos.php";

pub fn proventos_url(base_url: &str, ticker: &str) -> String {
    format!("{base_url}?tipo=2&papel={ticker}")
}

/// The site turns away clients that don't look like a browser.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.98 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers
}

pub async fn fetch_proventos_page(ctx: &PipelineContext) -> Result<String, ProventosError> {
    let url = proventos_url(&ctx.base_url, &ctx.ticker);
    let message = format!("Fetching dividends for {}", ctx.ticker);
    let mut sp = Spinner::new(Spinners::Point, message.as_str());
    sp.start();
    let page = request_page(ctx, &url).await;
    sp.stop();
    page
}

async fn request_page(ctx: &PipelineContext, url: &str) -> Result<String, ProventosError> {
    let fetch_error = |source: reqwest::Error| ProventosError::Fetch {
        url: url.to_string(),
        source,
    };

    info!(target: "fetch", "GET {}", url);
    let client = Client::builder()
        .default_headers(ctx.headers.clone())
        .timeout(ctx.timeout)
        .build()
        .map_err(fetch_error)?;

    let res = client.get(url).send().await.map_err(fetch_error)?;
    let status = res.status();
    if status != StatusCode::OK {
        return Err(ProventosError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let body = res.text().await.map_err(fetch_error)?;
    debug!(target: "fetch", "Received {} bytes", body.len());
    Ok(body)
}
