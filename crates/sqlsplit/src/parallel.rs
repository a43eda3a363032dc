//! Concurrent multi-file parsing.
//!
//! One task per [`ParseJob`], a single collector, and one completion:
//!
//! ```text
//! ┌──────────┐   spawn    ┌────────────┐  (id, outcome)  ┌────────────────┐
//! │ jobs ... │ ─────────► │ worker × N │ ──────────────► │ collector loop │
//! └──────────┘            └────────────┘   mpsc channel  └───────┬────────┘
//!                          split on the                          │ once
//!                          blocking pool                         ▼
//!                                                         AggregateResult
//! ```
//!
//! - Workers share nothing but the vendor classifier (read-only) and the
//!   channel sender. Each builds its own `Splitter` state.
//! - The collector loop is the only writer of the aggregate map, and each
//!   entry is inserted once as a complete `Result`.
//! - An optional semaphore caps how many workers split at the same time.
//! - When the deadline passes or the caller cancels, the collector stops
//!   and drops the receiver. Workers still running are abandoned; their late
//!   sends fail and the results are discarded.
//!
//! ## Usage
//!
//! ```no_run
//! use sqlsplit::{ConcurrentFileParser, ParseJob, VendorRegistry};
//!
//! # async fn demo() -> sqlsplit::Result<()> {
//! let parser = ConcurrentFileParser::for_vendor(VendorRegistry::builtin(), "oracle")?;
//! let result = parser
//!     .parse_all(vec![
//!         ParseJob::from_text("a.sql", "SELECT 1 FROM dual;"),
//!         ParseJob::from_path("migrations/002_procs.sql"),
//!     ])
//!     .await;
//!
//! for (id, outcome) in result.entries() {
//!     match outcome {
//!         Ok(script) => println!("{id}: {} statements", script.len()),
//!         Err(error) => eprintln!("{error}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{FileError, Result};
use crate::registry::VendorRegistry;
use crate::splitter::Splitter;
use crate::statement::ParsedScript;
use crate::vendors::VendorClassifier;

/// Outcome recorded for one file.
pub type FileOutcome = std::result::Result<ParsedScript, FileError>;

/// Where a job's script text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// Text already in memory
    Text(String),
    /// A file the worker reads itself
    Path(PathBuf),
}

/// One file submitted to the concurrent parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseJob {
    id: String,
    source: JobSource,
}

impl ParseJob {
    /// A job over in-memory script text.
    #[must_use]
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: JobSource::Text(text.into()),
        }
    }

    /// A job that reads its script from `path`; the id is the path as given.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            source: JobSource::Path(path),
        }
    }

    /// The file identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The job's source.
    #[must_use]
    pub fn source(&self) -> &JobSource {
        &self.source
    }
}

/// How a parse run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Every job reported
    Complete,
    /// The deadline passed before every job reported
    DeadlineExpired,
    /// The caller cancelled before every job reported
    Cancelled,
}

/// Per-file results of one parse run.
#[derive(Debug)]
pub struct AggregateResult {
    entries: HashMap<String, FileOutcome>,
    pending: Vec<String>,
    status: RunStatus,
    submitted: usize,
    elapsed: Duration,
}

impl AggregateResult {
    /// Outcome for one file, if it reported.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FileOutcome> {
        self.entries.get(id)
    }

    /// All recorded outcomes keyed by file id.
    #[must_use]
    pub fn entries(&self) -> &HashMap<String, FileOutcome> {
        &self.entries
    }

    /// Recorded outcomes sorted by file id, for deterministic output.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, &FileOutcome)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(id, outcome)| (id.as_str(), outcome))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    /// Successfully parsed files.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &ParsedScript)> {
        self.entries
            .iter()
            .filter_map(|(id, o)| o.as_ref().ok().map(|s| (id.as_str(), s)))
    }

    /// Files that failed.
    pub fn failures(&self) -> impl Iterator<Item = &FileError> {
        self.entries.values().filter_map(|o| o.as_ref().err())
    }

    /// Ids of jobs that had not reported when the run ended, sorted.
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// How the run ended.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns `true` if every submitted job reported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    /// Number of distinct jobs submitted.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no outcome was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Tuning for a parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of files split at the same time; unbounded if `None`
    pub max_concurrency: Option<NonZeroUsize>,
    /// Wall-clock limit for the whole run; unlimited if `None`
    pub deadline: Option<Duration>,
}

/// Fans the splitter out over many files.
#[derive(Debug, Clone)]
pub struct ConcurrentFileParser {
    vendor: Arc<dyn VendorClassifier>,
    options: ParseOptions,
}

impl ConcurrentFileParser {
    /// A parser for `vendor` with default options.
    #[must_use]
    pub fn new(vendor: Arc<dyn VendorClassifier>) -> Self {
        Self {
            vendor,
            options: ParseOptions::default(),
        }
    }

    /// Resolve `name` in `registry` and build a parser for it.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedVendor` before any job exists.
    pub fn for_vendor(registry: &VendorRegistry, name: &str) -> Result<Self> {
        Ok(Self::new(registry.get(name)?))
    }

    /// Replace all options.
    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Cap the number of files split at the same time.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: NonZeroUsize) -> Self {
        self.options.max_concurrency = Some(limit);
        self
    }

    /// Stop waiting for results after `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.options.deadline = Some(deadline);
        self
    }

    /// The vendor used for every job.
    #[must_use]
    pub fn vendor(&self) -> &Arc<dyn VendorClassifier> {
        &self.vendor
    }

    /// The configured options.
    #[must_use]
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse every job and wait for all of them, or for the deadline.
    pub async fn parse_all(&self, jobs: impl IntoIterator<Item = ParseJob>) -> AggregateResult {
        self.parse_all_until(jobs, std::future::pending::<()>()).await
    }

    /// Like [`parse_all`](Self::parse_all), but stops waiting when `cancel`
    /// resolves.
    ///
    /// Entries recorded before cancellation stay valid; jobs still running
    /// are listed in [`AggregateResult::pending`].
    pub async fn parse_all_until<C>(
        &self,
        jobs: impl IntoIterator<Item = ParseJob>,
        cancel: C,
    ) -> AggregateResult
    where
        C: Future<Output = ()>,
    {
        let started = Instant::now();
        let deadline = self.options.deadline.map(|d| tokio::time::Instant::now() + d);
        let jobs = dedupe(jobs);
        let submitted = jobs.len();
        let mut pending: HashSet<String> = jobs.iter().map(|j| j.id.clone()).collect();

        info!(
            vendor = self.vendor.name(),
            files = submitted,
            max_concurrency = self.options.max_concurrency.map(NonZeroUsize::get),
            "Starting parse run"
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<(String, FileOutcome)>();
        let limiter = self
            .options
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n.get())));

        for job in jobs {
            let tx = tx.clone();
            let vendor = Arc::clone(&self.vendor);
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let id = job.id.clone();
                let outcome = run_job(job, vendor).await;
                // The collector is gone after a deadline or cancellation.
                let _ = tx.send((id, outcome));
            });
        }
        drop(tx);

        let mut entries = HashMap::with_capacity(submitted);
        let sleep = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(sleep);
        tokio::pin!(cancel);

        let status = loop {
            tokio::select! {
                message = rx.recv() => match message {
                    Some((id, outcome)) => {
                        if let Err(error) = &outcome {
                            warn!(file = %id, kind = %error.kind, "{}", error.message);
                        } else {
                            debug!(file = %id, "File parsed");
                        }
                        pending.remove(&id);
                        entries.insert(id, outcome);
                    }
                    None => break RunStatus::Complete,
                },
                () = &mut sleep => break RunStatus::DeadlineExpired,
                () = &mut cancel => break RunStatus::Cancelled,
            }
        };
        drop(rx);

        let mut pending: Vec<String> = pending.into_iter().collect();
        pending.sort();
        let elapsed = started.elapsed();

        match status {
            RunStatus::Complete => info!(
                files = entries.len(),
                failed = entries.values().filter(|o| o.is_err()).count(),
                ?elapsed,
                "Parse run complete"
            ),
            RunStatus::DeadlineExpired | RunStatus::Cancelled => warn!(
                ?status,
                reported = entries.len(),
                abandoned = pending.len(),
                ?elapsed,
                "Parse run stopped early"
            ),
        }

        AggregateResult {
            entries,
            pending,
            status,
            submitted,
            elapsed,
        }
    }

    /// Run in the background and hand the aggregate to `on_complete`
    /// exactly once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(self, jobs: Vec<ParseJob>, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(AggregateResult) + Send + 'static,
    {
        tokio::spawn(async move {
            let result = self.parse_all(jobs).await;
            on_complete(result);
        })
    }
}

/// Keep the first job for every id.
fn dedupe(jobs: impl IntoIterator<Item = ParseJob>) -> Vec<ParseJob> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| {
            let fresh = seen.insert(job.id.clone());
            if !fresh {
                warn!(file = %job.id, "Duplicate parse job ignored");
            }
            fresh
        })
        .collect()
}

/// Load and split one job; every failure becomes a `FileError`.
async fn run_job(job: ParseJob, vendor: Arc<dyn VendorClassifier>) -> FileOutcome {
    let ParseJob { id, source } = job;
    let text = match source {
        JobSource::Text(text) => text,
        JobSource::Path(path) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FileError::io_error(id.clone(), &e))?,
    };

    let task_id = id.clone();
    let joined = tokio::task::spawn_blocking(move || {
        Splitter::new(vendor.as_ref())
            .split(&text)
            .map_err(|e| FileError::split_failed(task_id, &e))
    })
    .await;

    match joined {
        Ok(outcome) => outcome,
        Err(join_error) => Err(FileError::worker_panicked(id, join_error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileErrorKind;
    use crate::vendors::Vendor;

    fn oracle_parser() -> ConcurrentFileParser {
        ConcurrentFileParser::new(Vendor::Oracle.shared())
    }

    #[tokio::test]
    async fn empty_job_set_completes_immediately() {
        let result = oracle_parser().parse_all(Vec::new()).await;

        assert!(result.is_complete());
        assert!(result.is_empty());
        assert_eq!(result.submitted(), 0);
    }

    #[tokio::test]
    async fn duplicate_ids_run_once() {
        let result = oracle_parser()
            .parse_all(vec![
                ParseJob::from_text("a.sql", "SELECT 1 FROM dual;"),
                ParseJob::from_text("a.sql", "SELECT 'broken"),
            ])
            .await;

        assert_eq!(result.submitted(), 1);
        assert_eq!(result.len(), 1);
        assert!(result.get("a.sql").is_some_and(|o| o.is_ok()));
    }

    #[tokio::test]
    async fn split_failure_is_recorded_with_location() {
        let result = oracle_parser()
            .parse_all(vec![ParseJob::from_text("bad.sql", "SELECT 1;\n/* open")])
            .await;

        let error = result
            .get("bad.sql")
            .and_then(|o| o.as_ref().err())
            .expect("bad.sql should fail");
        assert_eq!(error.kind, FileErrorKind::SplitFailed);
        assert_eq!(error.location.map(|l| l.line), Some(2));
    }

    #[tokio::test]
    async fn cancelled_run_reports_status() {
        let result = oracle_parser()
            .parse_all_until(vec![ParseJob::from_text("a.sql", "SELECT 1;")], async {})
            .await;

        // Cancellation is ready immediately, but a fast worker may still win.
        assert!(matches!(
            result.status(),
            RunStatus::Cancelled | RunStatus::Complete
        ));
        assert_eq!(result.len() + result.pending().len(), 1);
    }

    #[test]
    fn from_path_uses_path_as_id() {
        let job = ParseJob::from_path("scripts/init.sql");
        assert_eq!(job.id(), "scripts/init.sql");
        assert_eq!(job.source(), &JobSource::Path(PathBuf::from("scripts/init.sql")));
    }
}
