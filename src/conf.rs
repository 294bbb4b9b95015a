//! Presentation-only configuration for the `dump` CLI command. Never
//! affects codec behavior — only how a decoded container is printed.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DumpConfig {
    /// Number of leading pool bytes to hex-preview per resource.
    #[serde(default = "DumpConfig::default_preview_len")]
    pub preview_len: usize,

    /// Whether to print a bitmap's 256-entry palette table.
    #[serde(default)]
    pub show_palette: bool,

    /// Whether to print every section header offset/size, not just names.
    #[serde(default)]
    pub show_offsets: bool,
}

impl DumpConfig {
    fn default_preview_len() -> usize {
        16
    }

    pub fn load(path: &std::path::Path) -> Result<DumpConfig, crate::error::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for DumpConfig {
    fn default() -> Self {
        DumpConfig {
            preview_len: Self::default_preview_len(),
            show_palette: false,
            show_offsets: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_default_impl() {
        let parsed: DumpConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.preview_len, DumpConfig::default().preview_len);
        assert!(!parsed.show_palette);
        assert!(!parsed.show_offsets);
    }

    #[test]
    fn overrides_apply_individually() {
        let parsed: DumpConfig = serde_json::from_str(r#"{"show_palette": true}"#).unwrap();
        assert!(parsed.show_palette);
        assert_eq!(parsed.preview_len, DumpConfig::default_preview_len());
    }
}
