//! Runtime configuration.
//!
//! The only tunable is the call-depth limit. Native builds default to
//! unbounded (the stack grows on demand); WASM defaults to a fixed bound.

use thiserror::Error;

/// Environment variable read by [`RuntimeConfig::from_env`].
pub const MAX_DEPTH_ENV: &str = "MOTE_MAX_DEPTH";

/// Error parsing configuration from the environment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer or `unlimited`, got `{value}`")]
    InvalidDepth { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of frames above top level. `None` means unlimited.
    pub max_call_depth: Option<usize>,
}

impl RuntimeConfig {
    /// Depth limit used when nothing else is configured.
    pub fn default_max_depth() -> Option<usize> {
        #[cfg(target_arch = "wasm32")]
        {
            Some(200)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = RuntimeConfig::default();
        if let Some(raw) = lookup(MAX_DEPTH_ENV) {
            config.max_call_depth = parse_depth(&raw).ok_or(ConfigError::InvalidDepth {
                var: MAX_DEPTH_ENV,
                value: raw,
            })?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            max_call_depth: Self::default_max_depth(),
        }
    }
}

/// Parse a depth setting: a count, or `unlimited`.
pub fn parse_depth(raw: &str) -> Option<Option<usize>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unlimited") {
        return Some(None);
    }
    raw.parse::<usize>().ok().map(Some)
}
