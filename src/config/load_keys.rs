use super::load_required::load_required;
use crate::nostr::Keys;
use anyhow::{Context, Result};

const PRIVKEY_ENV_VAR: &str = "NOSTR_PRIVKEY";

/// Parses the hex secret key the announcements are signed with.
pub(crate) fn load_keys(raw: Option<&str>) -> Result<Keys> {
    let secret = load_required(PRIVKEY_ENV_VAR, raw)?;
    Keys::from_hex(&secret).with_context(|| format!("Invalid `{PRIVKEY_ENV_VAR}`"))
}
