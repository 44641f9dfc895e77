use url::Url;

const PROXY_SEGMENT: &str = "media-proxy";

/// Public URL of a media asset behind the backend proxy.
///
/// Media is only ever addressed through the proxy so no upstream
/// credentials reach the client.
pub fn media_proxy_url(base: &Url, media_id: i64) -> Option<String> {
    if media_id <= 0 {
        return None;
    }
    Some(format!(
        "{}/{}/public/{}",
        base.as_str().trim_end_matches('/'),
        PROXY_SEGMENT,
        media_id
    ))
}

pub fn is_proxy_url(url: &str) -> bool {
    url.contains("/media-proxy/")
}

/// Accepts both `/media-proxy/{id}` and `/media-proxy/public/{id}`.
pub fn extract_media_id(url: &str) -> Option<i64> {
    let (_, rest) = url.split_once("/media-proxy/")?;
    let rest = rest.strip_prefix("public/").unwrap_or(rest);
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
