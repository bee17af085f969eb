//! Uniform reload/shutdown for long-lived components

use crate::config::TimberConfig;
use crate::core::types::Result;

/// A component that survives across chops and follows the config lifecycle.
///
/// The coordinator owns an ordered set of these and calls `reset` on every
/// reload and `shutdown` when the host disables the feature.
pub trait Component {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Re-read whatever this component derives from configuration.
    fn reset(&mut self, config: &TimberConfig) -> Result<()>;

    /// Drop all transient state.
    fn shutdown(&mut self);
}
