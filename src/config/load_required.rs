use anyhow::{bail, Result};

/// Returns the trimmed value of a required setting.
///
/// `name` is the environment variable the setting is read from and only
/// shows up in the error.
pub(crate) fn load_required(name: &str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        Some(_) => bail!("`{name}` is set but empty"),
        None => bail!("`{name}` is not set"),
    }
}
