//! Index-wide settings shared by ingestion and queries.

use thiserror::Error;

use crate::core::types::{SourceIndex, DEFAULT_GAP};

/// Environment variable holding the first index a fresh registry hands out,
/// read by the `load` command's `--index-base`
pub const INDEX_BASE_ENV: &str = "FILE_INDEX_START";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Quantization gap must be positive, got {0}")]
    InvalidGap(i32),
}

/// Quantization step and registry base for one index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Step between stored coordinates of one interval, fixed at store creation
    pub gap: i32,
    /// First index assigned by a fresh accession registry
    pub index_base: SourceIndex,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            index_base: 0,
        }
    }
}

impl IndexConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidGap` unless `gap` is positive.
    pub fn new(gap: i32, index_base: SourceIndex) -> Result<Self, ConfigError> {
        if gap <= 0 {
            return Err(ConfigError::InvalidGap(gap));
        }
        Ok(Self { gap, index_base })
    }
}
