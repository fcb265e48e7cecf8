/*!
 * Settings Module
 * Process-wide key-pool store with merge-on-read defaults
 */

pub mod manager;

// Re-exports
pub use manager::{PoolAccessor, SettingsError, SettingsManager, SettingsResult};
