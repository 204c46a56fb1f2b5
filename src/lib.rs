// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// - config:    Configuration structs loaded from JSON
// - schema:    Review records, output rows, fetch outcomes
// - error:     Collector and review source error types
// - util:      File naming and date helpers
// - sources:   Review source trait and store adapters
// - collector: Per-app fetch / skip / persist orchestration
// - metrics:   Per-run outcome counters
//
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod schema;
pub mod sources;
pub mod util;

pub use collector::{Collector, SourceMapping};
pub use error::{CollectorError, FetchError};
pub use schema::{FetchOutcome, ReviewRecord};
pub use sources::adapter::{FetchParams, ReviewSource, SortOrder};
