use super::load_required::load_required;
use anyhow::{bail, Context, Result};
use reqwest::Url;

const RELAYS_ENV_VAR: &str = "NOSTR_RELAYS";

/// Splits the comma-separated relay list, dropping blanks and repeats.
/// Every entry must be a `ws://` or `wss://` URL.
pub(crate) fn load_relays(raw: Option<&str>) -> Result<Vec<String>> {
    let raw = load_required(RELAYS_ENV_VAR, raw)?;

    let mut relays: Vec<String> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let url = Url::parse(entry).with_context(|| format!("Invalid relay URL {entry:?}"))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            bail!("Relay URL {entry:?} must use ws:// or wss://");
        }
        if !relays.iter().any(|r| r == entry) {
            relays.push(entry.to_string());
        }
    }

    if relays.is_empty() {
        bail!("`{RELAYS_ENV_VAR}` lists no relays");
    }
    Ok(relays)
}
