use crate::api::{
    SiteConfig,
    views::{self, SitemapEntry},
};
use axum::{
    extract::Extension,
    http::{
        HeaderMap,
        header::{CONTENT_TYPE, HOST},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use url::Url;

const PAGES: [(&str, &str, &str); 3] = [
    ("/", "daily", "0.9"),
    ("/login", "monthly", "0.6"),
    ("/signup", "monthly", "0.6"),
];

// axum handler for GET /sitemap.xml
pub async fn sitemap(headers: HeaderMap, site: Extension<Arc<SiteConfig>>) -> impl IntoResponse {
    let root = site_root(site.public_url(), &headers);

    let entries: Vec<SitemapEntry> = PAGES
        .iter()
        .map(|&(path, changefreq, priority)| SitemapEntry {
            loc: format!("{root}{path}"),
            changefreq,
            priority,
        })
        .collect();

    ([(CONTENT_TYPE, "application/xml")], views::sitemap(&entries))
}

/// Site root without a trailing slash: the configured public URL if any,
/// otherwise rebuilt from the request's `Host` and `X-Forwarded-Proto`.
fn site_root(public_url: Option<&Url>, headers: &HeaderMap) -> String {
    if let Some(url) = public_url {
        return url.as_str().trim_end_matches('/').to_string();
    }

    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .filter(|proto| matches!(*proto, "http" | "https"))
        .unwrap_or("http");

    format!("{scheme}://{host}")
}
