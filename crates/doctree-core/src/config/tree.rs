//! Tree storage and startup sweep configuration.

use serde::{Deserialize, Serialize};

/// Settings for the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// JRN prefix of the internal root namespace, hidden from listings
    /// unless explicitly requested.
    #[serde(default = "default_internal_jrn_prefix")]
    pub internal_jrn_prefix: String,
    /// Length of the random suffix appended to derived slugs.
    #[serde(default = "default_slug_suffix_len")]
    pub slug_suffix_len: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            internal_jrn_prefix: default_internal_jrn_prefix(),
            slug_suffix_len: default_slug_suffix_len(),
        }
    }
}

/// Settings for the one-shot repair sweep run at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the sweep runs after migrations.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_internal_jrn_prefix() -> String {
    "jrn:internal:".to_string()
}

fn default_slug_suffix_len() -> usize {
    7
}

fn default_true() -> bool {
    true
}
