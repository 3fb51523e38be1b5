//! Codec selection.
//!
//! The active codec is resolved once per process: the first available codec
//! in preference order, unless the `BASE64_KERNELS_FORCE` environment
//! variable names another one.

use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::codec::{self, Codec};

/// Environment variable that forces a codec by name (`auto` to detect).
pub const FORCE_ENV: &str = "BASE64_KERNELS_FORCE";

/// Codec requested through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Force {
    /// Pick the fastest available codec.
    #[default]
    Auto,
    /// Use this codec if it can run here.
    Codec(&'static Codec),
}

/// Resolved codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// What was asked for.
    pub requested: Force,
    /// What will run: the requested codec clamped to what this CPU supports.
    pub effective: &'static Codec,
}

impl Config {
    /// Reads [`FORCE_ENV`].
    pub fn from_env() -> Config {
        Config::parse(std::env::var(FORCE_ENV).ok().as_deref())
    }

    /// Builds a configuration from a raw override value.
    ///
    /// Unknown names are ignored, and a forced codec that cannot run on this
    /// CPU falls back to detection. Both cases log a warning.
    pub fn parse(value: Option<&str>) -> Config {
        let requested = parse_force(value);
        let effective = match requested {
            Force::Codec(c) if c.is_available() => c,
            Force::Codec(c) => {
                warn!(
                    codec = c.name(),
                    feature = %c.feature(),
                    "forced base64 codec is not available, selecting automatically"
                );
                detect()
            }
            Force::Auto => detect(),
        };
        Config {
            requested,
            effective,
        }
    }
}

fn parse_force(value: Option<&str>) -> Force {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Force::Auto;
    };
    if value.eq_ignore_ascii_case("auto") {
        return Force::Auto;
    }
    if value.eq_ignore_ascii_case("portable") {
        return Force::Codec(codec::scalar());
    }
    match codec::codec(value) {
        Some(c) => Force::Codec(c),
        None => {
            warn!(value, env = FORCE_ENV, "unknown base64 codec, selecting automatically");
            Force::Auto
        }
    }
}

/// The first codec in preference order that can run on this CPU.
pub fn detect() -> &'static Codec {
    codec::codecs()
        .iter()
        .find(|c| c.is_available())
        .unwrap_or(codec::scalar())
}

static ACTIVE: OnceLock<Config> = OnceLock::new();

/// The process-wide configuration, resolved on first use.
pub fn config() -> Config {
    *ACTIVE.get_or_init(|| {
        let config = Config::from_env();
        debug!(
            codec = config.effective.name(),
            feature = %config.effective.feature(),
            forced = matches!(config.requested, Force::Codec(_)),
            "selected base64 codec"
        );
        config
    })
}

/// The codec used by [`crate::encode`] and [`crate::decode`].
pub fn active() -> &'static Codec {
    config().effective
}
