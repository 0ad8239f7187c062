//! Identity federation redirect URL.

use url::Url;

/// Placeholder sent when no session token exists
pub const MISSING_TOKEN: &str = "null";

/// Build `{base}?client_id={client_id}&token={token}`.
///
/// Existing query parameters on `base` are kept. A missing token is sent as
/// the literal `null`.
pub fn federation_url(base: &Url, client_id: &str, token: Option<&str>) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("token", token.unwrap_or(MISSING_TOKEN));
    url
}
