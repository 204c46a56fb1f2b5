//! Review source registry and factory
//!
//! This module provides:
//! - The `ReviewSource` abstraction (see `adapter`)
//! - A factory resolving a source by its configured name
//!
//! Store-specific request and parsing logic lives in the
//! dedicated source modules only.

pub mod adapter;
pub mod google_play;

use std::sync::Arc;

use adapter::ReviewSource;

use crate::config::SourceConfig;
use crate::error::FetchError;

/// Returns a review source instance by name.
///
/// RETURNS:
/// - `Ok(Some(source))` if the name is supported
/// - `Ok(None)` if the name is unknown
/// - `Err(_)` if the HTTP client could not be built
///
/// CONTRACT:
/// - `cfg.name` MUST match `ReviewSource::name()` of the adapter
///
pub fn get_source(cfg: &SourceConfig) -> Result<Option<Arc<dyn ReviewSource>>, FetchError> {
    match cfg.name.as_str() {
        "google_play" => {
            let adapter = google_play::GooglePlayAdapter::from_config(cfg)?;
            Ok(Some(Arc::new(adapter)))
        }
        _ => Ok(None),
    }
}
