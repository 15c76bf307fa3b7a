//! Capacity hints for building notebooks, loadable from TOML.
//!
//! ```
//! use the_notebook::NotebookConfig;
//!
//! let config = NotebookConfig::from_toml("fragments = 4096\nslab-bytes = 65536").unwrap();
//! assert_eq!(config.fragments, 4096);
//! assert_eq!(config.links, 0);
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid notebook config: {0}")]
  Parse(#[from] toml::de::Error),
}

/// Storage to reserve up front. Every field defaults to zero, meaning nothing
/// is reserved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct NotebookConfig {
  /// Packed elements to reserve.
  pub fragments:  usize,
  /// Slab bytes to reserve for text that does not fit inline.
  pub slab_bytes: usize,
  /// Link overlay entries to reserve.
  pub links:      usize,
}

impl NotebookConfig {
  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }
}
