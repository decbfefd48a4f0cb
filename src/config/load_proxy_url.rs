use super::load_required::load_required;
use anyhow::{bail, Context, Result};
use reqwest::Url;

const PROXY_URL_ENV_VAR: &str = "TOR_PROXY_URL";
const PROXY_PORT_ENV_VAR: &str = "TOR_PROXY_PORT";

/// Joins the proxy host and port into one proxy URL.
///
/// A bare host is taken as a SOCKS5 proxy. `socks5://` becomes `socks5h://`
/// so that `.onion` names are resolved by Tor, never locally.
pub(crate) fn load_proxy_url(url: Option<&str>, port: Option<&str>) -> Result<String> {
    let url = load_required(PROXY_URL_ENV_VAR, url)?;
    let port = load_required(PROXY_PORT_ENV_VAR, port)?;

    let port: u16 = port
        .parse()
        .with_context(|| format!("Invalid `{PROXY_PORT_ENV_VAR}` {port:?}"))?;
    if port < 1 {
        bail!("`{PROXY_PORT_ENV_VAR}` must be between 1 and 65535");
    }

    let url = url.trim_end_matches('/');
    let url = match url.split_once("://") {
        Some(("socks5", rest)) => format!("socks5h://{rest}"),
        Some(_) => url.to_string(),
        None => format!("socks5h://{url}"),
    };

    let mut parsed = Url::parse(&url).with_context(|| format!("Invalid `{PROXY_URL_ENV_VAR}`"))?;
    match parsed.scheme() {
        "socks5h" | "http" | "https" => {}
        other => bail!("Unsupported proxy scheme `{other}` in `{PROXY_URL_ENV_VAR}`"),
    }
    if parsed.host_str().is_none() {
        bail!("`{PROXY_URL_ENV_VAR}` has no host");
    }
    if parsed.port().is_some() {
        bail!("`{PROXY_URL_ENV_VAR}` must not carry a port; set `{PROXY_PORT_ENV_VAR}` instead");
    }
    parsed
        .set_port(Some(port))
        .map_err(|_| anyhow::anyhow!("Cannot set a port on `{PROXY_URL_ENV_VAR}`"))?;

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socks5_upgraded() {
        assert_eq!(
            load_proxy_url(Some("socks5://127.0.0.1"), Some("9050")).unwrap(),
            "socks5h://127.0.0.1:9050"
        );
    }

    #[test]
    fn test_bare_host_defaults_to_socks() {
        assert_eq!(
            load_proxy_url(Some("tor"), Some("9050")).unwrap(),
            "socks5h://tor:9050"
        );
    }

    #[test]
    fn test_http_proxy_kept() {
        assert_eq!(
            load_proxy_url(Some("http://proxy.local/"), Some("8118")).unwrap(),
            "http://proxy.local:8118"
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(load_proxy_url(Some("socks5h://127.0.0.1"), Some("tor")).is_err());
        assert!(load_proxy_url(Some("socks5h://127.0.0.1"), Some("0")).is_err());
        assert!(load_proxy_url(Some("socks5h://127.0.0.1:9050"), Some("9050")).is_err());
        assert!(load_proxy_url(Some("ftp://127.0.0.1"), Some("21")).is_err());
        assert!(load_proxy_url(None, Some("9050")).is_err());
    }
}
