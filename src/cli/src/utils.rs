use std::path::Path;

use anyhow::Context;
use raven_client::events::Extra;
use serde_json::Value;

pub fn ensure_dir_exists<P: AsRef<Path>>(dir: P) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(())
}

pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Values that are valid JSON keep their type; anything else is sent as a string.
pub fn extra_from_pairs(pairs: &[(String, String)]) -> Extra {
    pairs
        .iter()
        .map(|(key, value)| {
            let value =
                serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
            (key.clone(), value)
        })
        .collect()
}
