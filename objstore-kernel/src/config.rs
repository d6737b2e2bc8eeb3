//! Store configuration
//!
//! Plain constructor parameters, not a builder macro or external
//! config-parsing crate: values are passed straight to the constructors
//! that need them, with one `OBJSTORE_DEBUG` environment variable read
//! directly via `std::env::var_os` rather than through a configuration
//! layer.

use crate::sequence::InstanceIdSequence;

/// Configuration for an [`InstanceIdSequence`].
#[derive(Debug, Clone, Copy)]
pub struct SequenceConfig {
    /// The first value the sequence will produce.
    pub origin: u64,
    /// The distance between successive values.
    pub stride: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        SequenceConfig { origin: 10_000, stride: 1 }
    }
}

impl From<SequenceConfig> for InstanceIdSequence {
    fn from(cfg: SequenceConfig) -> Self {
        InstanceIdSequence::new(cfg.origin, cfg.stride)
    }
}

/// Configuration for an [`crate::store::ObjectStore`].
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Parameters for the instance id sequence.
    pub sequence: SequenceConfig,
    /// Whether lifecycle and dispatch events are logged at `debug` level.
    ///
    /// Defaults to whatever `OBJSTORE_DEBUG` says via [`StoreConfig::from_env`].
    pub debug: bool,
}

impl StoreConfig {
    /// Read `debug` from the `OBJSTORE_DEBUG` environment variable
    /// (`"1"` enables it), leaving the sequence at its defaults.
    pub fn from_env() -> Self {
        let debug = matches!(std::env::var_os("OBJSTORE_DEBUG"), Some(v) if v == "1");
        StoreConfig { sequence: SequenceConfig::default(), debug }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig { sequence: SequenceConfig::default(), debug: false }
    }
}
