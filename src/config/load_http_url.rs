use super::load_required::load_required;
use anyhow::{bail, Context, Result};
use reqwest::Url;

/// Loads a required `http(s)://` URL setting and returns it as given (trimmed).
pub(crate) fn load_http_url(name: &str, value: Option<&str>) -> Result<String> {
    let raw = load_required(name, value)?;
    let url = Url::parse(&raw).with_context(|| format!("Invalid `{name}` {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("`{name}` must be an http:// or https:// URL");
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_http_url() {
        let onion = "http://robosatsy56bwqn56qyadmcxkx767hnabg4mihxlmgyt6if5gnuxvzad.onion";
        assert_eq!(load_http_url("ROBOSATS_ONION_URL", Some(onion)).unwrap(), onion);
        assert!(load_http_url("ROBOSATS_ONION_URL", Some("robosats.onion")).is_err());
        assert!(load_http_url("ROBOSATS_REFERRAL_URL", Some("ws://x")).is_err());
    }
}
