/// Collector module
///
/// This module groups the orchestration logic:
/// - The app id -> display name mapping (`mapping`)
/// - The per-app fetch / skip / persist workflow (`runner`)
///
/// The collector sits between:
/// - A review source (Google Play, ...)
/// - The raw data directory on disk
///
/// Design notes:
/// - Store-specific logic MUST NOT live here
/// - One app failing never stops the others
pub mod mapping;
pub mod runner;

pub use mapping::SourceMapping;
pub use runner::Collector;
