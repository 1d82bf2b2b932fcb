//! Reader limits.
//!
//! Options come from code, from a `serde_json::Value`, or from the
//! environment. Priority for [`ReaderOptions::load`]: environment variables
//! (`COMPOSER_LOCK_MAX_FILE_SIZE`, `COMPOSER_LOCK_MAX_DEPTH`) > defaults.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::DECODER_DEPTH_LIMIT;
use crate::error::{LockError, Result};

/// Largest lockfile the reader accepts (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Deepest array/object nesting the decoder accepts. Also the largest
/// value [`ReaderOptions::validate`] allows.
pub const DEFAULT_MAX_DEPTH: usize = DECODER_DEPTH_LIMIT;

const ENV_PREFIX: &str = "COMPOSER_LOCK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Files larger than this many bytes are rejected before reading.
    pub max_file_size: u64,

    /// Nesting limit passed to the decoder, at most 127.
    pub max_depth: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReaderOptions {
    /// Create from serde_json::Value. Missing fields keep their defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use composer_lock::ReaderOptions;
    /// use serde_json::json;
    ///
    /// let options = ReaderOptions::from_value(json!({"max_depth": 64})).unwrap();
    /// assert_eq!(options.max_depth, 64);
    /// assert_eq!(options.max_file_size, composer_lock::options::DEFAULT_MAX_FILE_SIZE);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let options: ReaderOptions =
            serde_json::from_value(value).map_err(|e| LockError::InvalidConfig(e.to_string()))?;
        options.validate()
    }

    /// Load defaults overridden by `COMPOSER_LOCK_*` environment variables.
    pub fn load() -> Result<Self> {
        let options: ReaderOptions = Self::figment()
            .extract()
            .map_err(|e| LockError::InvalidConfig(e.to_string()))?;
        options.validate()
    }

    /// The provider stack behind [`load`](Self::load), for callers that
    /// want to merge their own sources on top.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the nesting limit, capped at the decoder's own limit (127).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.min(DECODER_DEPTH_LIMIT);
        self
    }

    /// Reject limits the reader cannot honour.
    pub fn validate(self) -> Result<Self> {
        if self.max_file_size == 0 {
            return Err(LockError::InvalidConfig(
                "max_file_size must be greater than zero".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(LockError::InvalidConfig(
                "max_depth must be greater than zero".to_string(),
            ));
        }
        if self.max_depth > DECODER_DEPTH_LIMIT {
            return Err(LockError::InvalidConfig(format!(
                "max_depth must be at most {DECODER_DEPTH_LIMIT}, got {}",
                self.max_depth
            )));
        }
        Ok(self)
    }
}
