use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use log::{error, info, warn};

use crate::{
    collector::mapping::SourceMapping,
    error::CollectorError,
    metrics::RunMetrics,
    schema::{FetchOutcome, OutputRow, ReviewRecord},
    sources::adapter::{FetchParams, ReviewSource},
    util,
};

/// Batch review collector.
///
/// For every app in the mapping it:
/// - Skips the fetch if today's raw file already exists
/// - Otherwise fetches all reviews once from the review source
/// - Writes them to `{name}_raw_{YYYYMMDD}.csv`
///
/// GUARANTEES:
/// - The run date is fixed at construction, so every file of one
///   instance carries the same date stamp
/// - An existing file for the run date is never rewritten
/// - Apps are processed strictly one after another
///
/// Fetch and write errors are logged and reduced to "no file for
/// this app"; only construction can fail.
pub struct Collector {
    apps: SourceMapping,
    output_dir: PathBuf,
    run_date: NaiveDate,
    source: Arc<dyn ReviewSource>,
    params: FetchParams,
    metrics: RunMetrics,
}

impl Collector {
    /// Creates a collector dated today (local time) and makes sure
    /// `output_dir` exists.
    pub fn new(
        apps: SourceMapping,
        output_dir: impl Into<PathBuf>,
        source: Arc<dyn ReviewSource>,
        params: FetchParams,
    ) -> Result<Self, CollectorError> {
        Self::with_run_date(apps, output_dir, source, params, util::today_local())
    }

    /// Same as `new` with an explicit run date.
    pub fn with_run_date(
        apps: SourceMapping,
        output_dir: impl Into<PathBuf>,
        source: Arc<dyn ReviewSource>,
        params: FetchParams,
        run_date: NaiveDate,
    ) -> Result<Self, CollectorError> {
        let output_dir = output_dir.into();
        if output_dir.to_string_lossy().trim().is_empty() {
            return Err(CollectorError::InvalidConfiguration(
                "output directory path must not be empty".into(),
            ));
        }

        ensure_output_dir(&output_dir)?;
        info!(
            "Collector ready: {} apps from {} ({}), saving raw data to {}",
            apps.len(),
            source.label(),
            source.name(),
            output_dir.display()
        );

        Ok(Self {
            apps,
            output_dir,
            run_date,
            source,
            params,
            metrics: RunMetrics::default(),
        })
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Today's output path for `app_id`, `None` if the app is unknown.
    pub fn raw_path(&self, app_id: &str) -> Option<PathBuf> {
        self.apps.name(app_id).map(|name| self.raw_path_for(name))
    }

    fn raw_path_for(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(util::raw_file_name(name, self.run_date))
    }

    /// Fetches reviews for one app with the collector's parameters.
    pub async fn fetch_one(&self, app_id: &str) -> FetchOutcome {
        self.fetch_one_with(app_id, &self.params).await
    }

    /// Fetches reviews for one app.
    ///
    /// Never fails: unknown apps, existing files and source errors
    /// are all reported through the returned outcome.
    pub async fn fetch_one_with(&self, app_id: &str, params: &FetchParams) -> FetchOutcome {
        let Some(name) = self.apps.name(app_id) else {
            warn!("App id '{}' is not in the app mapping, skipping", app_id);
            RunMetrics::incr(&self.metrics.not_applicable);
            return FetchOutcome::NotApplicable;
        };

        let path = self.raw_path_for(name);
        if path.exists() {
            info!(
                "Raw data for {} already exists today at {}, skipping fetch",
                name,
                path.display()
            );
            RunMetrics::incr(&self.metrics.skipped);
            return FetchOutcome::Skipped;
        }

        info!("Fetching reviews for {} ({}) via {}", app_id, name, self.source.name());
        match self.try_fetch(app_id, name, params).await {
            Ok(records) => {
                info!("Fetched {} reviews for {}", records.len(), name);
                RunMetrics::incr(&self.metrics.fetched);
                RunMetrics::add(&self.metrics.reviews_received, records.len());
                FetchOutcome::Fetched(records)
            }
            Err(e) => {
                error!("{e}");
                RunMetrics::incr(&self.metrics.fetch_errors);
                FetchOutcome::FetchFailed
            }
        }
    }

    async fn try_fetch(
        &self,
        app_id: &str,
        name: &str,
        params: &FetchParams,
    ) -> Result<Vec<ReviewRecord>, CollectorError> {
        self.source
            .fetch_reviews(app_id, params)
            .await
            .map_err(|source| CollectorError::FetchFailure {
                app_id: app_id.to_string(),
                name: name.to_string(),
                source,
            })
    }

    /// Persists the outcome of `fetch_one` and returns the path of
    /// today's file for `app_id`, if there is one.
    ///
    /// - `NotApplicable`, `FetchFailed`: no file, `None`
    /// - `Skipped`: the existing path, untouched
    /// - `Fetched` with no records: the existing path if any, else `None`
    /// - `Fetched` with records: the newly written path, or `None` if
    ///   writing failed
    pub fn persist(&self, outcome: &FetchOutcome, app_id: &str) -> Option<PathBuf> {
        self.persist_with(outcome, app_id, create_output_file)
    }

    /// `persist` with a custom opener for the output file.
    pub(crate) fn persist_with<W, F>(
        &self,
        outcome: &FetchOutcome,
        app_id: &str,
        open: F,
    ) -> Option<PathBuf>
    where
        W: Write,
        F: FnOnce(&Path) -> io::Result<W>,
    {
        let records = match outcome {
            FetchOutcome::NotApplicable => return None,
            FetchOutcome::FetchFailed => {
                warn!("Nothing to save for {}: fetch failed", app_id);
                return None;
            }
            FetchOutcome::Skipped => return self.existing_path(app_id),
            FetchOutcome::Fetched(records) if records.is_empty() => {
                info!("No new reviews to save for {}", app_id);
                let existing = self.existing_path(app_id);
                if existing.is_none() {
                    RunMetrics::incr(&self.metrics.empty_unsaved);
                }
                return existing;
            }
            FetchOutcome::Fetched(records) => records,
        };

        let path = self.raw_path(app_id)?;
        if path.exists() {
            warn!(
                "{} appeared since the fetch started, keeping it as is",
                path.display()
            );
            return Some(path);
        }

        match self.write_rows(&path, records, app_id, open) {
            Ok(()) => {
                info!("Saved {} reviews for {} to {}", records.len(), app_id, path.display());
                RunMetrics::incr(&self.metrics.files_written);
                RunMetrics::add(&self.metrics.rows_written, records.len());
                Some(path)
            }
            Err(e) => {
                error!("{e}");
                RunMetrics::incr(&self.metrics.persist_errors);
                None
            }
        }
    }

    fn existing_path(&self, app_id: &str) -> Option<PathBuf> {
        self.raw_path(app_id).filter(|path| path.exists())
    }

    /// Writes a fresh file; a partially written file is removed so a
    /// later run on the same day fetches again.
    fn write_rows<W, F>(
        &self,
        path: &Path,
        records: &[ReviewRecord],
        app_id: &str,
        open: F,
    ) -> Result<(), CollectorError>
    where
        W: Write,
        F: FnOnce(&Path) -> io::Result<W>,
    {
        let persist_failure = |source: csv::Error| CollectorError::PersistFailure {
            path: path.to_path_buf(),
            source,
        };

        let file = open(path).map_err(|e| persist_failure(e.into()))?;

        if let Err(e) = write_csv(file, records, app_id, self.source.label()) {
            if let Err(remove_err) = fs::remove_file(path) {
                warn!(
                    "Could not remove partial file {}: {}; it will count as today's output",
                    path.display(),
                    remove_err
                );
            }
            return Err(persist_failure(e));
        }
        Ok(())
    }

    /// Runs fetch + persist for every app in mapping order.
    ///
    /// RETURNS:
    /// - Paths of all raw files available for today (new or
    ///   pre-existing), in mapping order
    ///
    pub async fn run_all(&self) -> Vec<PathBuf> {
        let total = self.apps.len();
        info!("--- Starting batch review collection ({} apps) ---", total);

        let mut manifest = Vec::with_capacity(total);
        for (idx, (app_id, name)) in self.apps.iter().enumerate() {
            info!("[{}/{}] {} ({})", idx + 1, total, name, app_id);

            let outcome = self.fetch_one(app_id).await;
            if let Some(path) = self.persist(&outcome, app_id) {
                manifest.push(path);
            }
        }

        info!("--- Batch review collection complete ---");
        info!("Raw files: {:?}", manifest);
        info!("{}", self.metrics.summary());
        manifest
    }
}

/// Never truncates: an existing file for the run date is authoritative.
fn create_output_file(path: &Path) -> io::Result<fs::File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn ensure_output_dir(dir: &Path) -> Result<(), CollectorError> {
    let failure = |source: io::Error| CollectorError::OutputDirectory {
        path: dir.to_path_buf(),
        source,
    };

    if dir.exists() && !dir.is_dir() {
        return Err(failure(io::Error::other("path exists but is not a directory")));
    }
    fs::create_dir_all(dir).map_err(failure)
}

/// Header + one row per record, in record order.
fn write_csv<W: Write>(
    writer: W,
    records: &[ReviewRecord],
    app_id: &str,
    source: &str,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(OutputRow::from_record(record, app_id, source))?;
    }
    wtr.flush()?;
    Ok(())
}
