//! Tests for the concurrent multi-file parser.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sqlsplit::{
    BlockEnd, ConcurrentFileParser, FileErrorKind, ParseJob, RunStatus, Vendor,
    VendorClassifier, VendorRegistry,
};
use tempfile::TempDir;

/// Classifier that stalls on statements starting with `SLOW` and panics on
/// `PANIC`, and records how many splits run at once.
#[derive(Default)]
struct InstrumentedVendor {
    active: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
}

impl InstrumentedVendor {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

impl VendorClassifier for InstrumentedVendor {
    fn name(&self) -> &str {
        "instrumented"
    }

    fn is_procedural_start(&self, text: &str) -> bool {
        assert!(!text.starts_with("PANIC"), "classifier exploded");

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if text.starts_with("SLOW") {
            std::thread::sleep(Duration::from_secs(1));
        } else {
            std::thread::sleep(self.delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        false
    }

    fn block_end(&self) -> BlockEnd<'_> {
        BlockEnd::ActiveDelimiter
    }
}

fn oracle() -> ConcurrentFileParser {
    ConcurrentFileParser::for_vendor(VendorRegistry::builtin(), "oracle").expect("oracle")
}

// === Aggregation ===

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_broken_file_among_many() {
    let mut jobs: Vec<ParseJob> = (0..8)
        .map(|i| ParseJob::from_text(format!("file_{i}.sql"), format!("SELECT {i} FROM dual;\nSELECT 'x;y' FROM dual;")))
        .collect();
    jobs.push(ParseJob::from_text("broken.sql", "SELECT 1 FROM dual;\nSELECT 'unterminated"));

    let result = oracle().parse_all(jobs).await;

    assert!(result.is_complete());
    assert_eq!(result.len(), 9);
    assert_eq!(result.successes().count(), 8);
    for (_, script) in result.successes() {
        assert_eq!(script.len(), 2);
    }

    let broken = result
        .get("broken.sql")
        .expect("entry for broken file")
        .as_ref()
        .expect_err("broken file should fail");
    assert_eq!(broken.kind, FileErrorKind::SplitFailed);
    assert_eq!(broken.location.map(|l| (l.line, l.column)), Some((2, 8)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn results_preserve_statement_order_per_file() {
    let script = (1..=50)
        .map(|i| format!("INSERT INTO t VALUES ({i});"))
        .collect::<Vec<_>>()
        .join("\n");

    let result = ConcurrentFileParser::new(Vendor::PostgreSql.shared())
        .parse_all(vec![ParseJob::from_text("inserts.sql", script)])
        .await;

    let parsed = result
        .get("inserts.sql")
        .and_then(|o| o.as_ref().ok())
        .expect("parsed");
    let numbers: Vec<usize> = parsed.numbered().map(|(n, _)| n).collect();
    assert_eq!(numbers, (1..=50).collect::<Vec<_>>());
    assert_eq!(parsed.statements()[49].text(), "INSERT INTO t VALUES (50)");
}

// === Path Jobs ===

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn path_jobs_read_files_and_isolate_io_errors() {
    let dir = TempDir::new().expect("create temp dir");
    let good = dir.path().join("001_tables.sql");
    let binary = dir.path().join("002_binary.sql");
    let missing = dir.path().join("003_missing.sql");
    std::fs::write(&good, "CREATE TABLE t (x NUMBER);\nBEGIN\n  NULL;\nEND;\n/\n").expect("write");
    std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x41]).expect("write");

    let result = oracle()
        .parse_all(vec![
            ParseJob::from_path(&good),
            ParseJob::from_path(&binary),
            ParseJob::from_path(&missing),
        ])
        .await;

    assert_eq!(result.len(), 3);

    let parsed = result
        .get(&good.display().to_string())
        .and_then(|o| o.as_ref().ok())
        .expect("good file parsed");
    assert_eq!(parsed.procedural_count(), 1);

    let kind_of = |path: &std::path::Path| {
        result
            .get(&path.display().to_string())
            .and_then(|o| o.as_ref().err())
            .map(|e| e.kind)
    };
    assert_eq!(kind_of(&binary), Some(FileErrorKind::EncodingError));
    assert_eq!(kind_of(&missing), Some(FileErrorKind::IoError));
}

// === Failure Isolation ===

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_worker_is_recorded_as_file_error() {
    let vendor = Arc::new(InstrumentedVendor::default());
    let result = ConcurrentFileParser::new(vendor)
        .parse_all(vec![
            ParseJob::from_text("ok.sql", "SELECT 1;"),
            ParseJob::from_text("boom.sql", "PANIC;"),
        ])
        .await;

    assert!(result.is_complete());
    assert!(result.get("ok.sql").is_some_and(Result::is_ok));

    let error = result
        .get("boom.sql")
        .and_then(|o| o.as_ref().err())
        .expect("panic recorded");
    assert_eq!(error.kind, FileErrorKind::WorkerPanicked);
    assert!(error.kind.is_internal_error());
}

// === Deadline And Cancellation ===

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deadline_returns_partial_results() {
    let vendor = Arc::new(InstrumentedVendor::default());
    let result = ConcurrentFileParser::new(vendor)
        .with_deadline(Duration::from_millis(300))
        .parse_all(vec![
            ParseJob::from_text("fast.sql", "SELECT 1;"),
            ParseJob::from_text("slow.sql", "SLOW 1;"),
        ])
        .await;

    assert_eq!(result.status(), RunStatus::DeadlineExpired);
    assert!(result.get("fast.sql").is_some_and(Result::is_ok));
    assert!(result.get("slow.sql").is_none());
    assert_eq!(result.pending(), ["slow.sql".to_string()]);
    assert_eq!(result.submitted(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_stops_waiting() {
    let vendor = Arc::new(InstrumentedVendor::default());
    let parser = ConcurrentFileParser::new(vendor);

    let result = parser
        .parse_all_until(
            vec![ParseJob::from_text("slow.sql", "SLOW 1;")],
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await;

    assert_eq!(result.status(), RunStatus::Cancelled);
    assert!(result.is_empty());
    assert_eq!(result.pending().len(), 1);
}

// === Scheduling ===

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_cap_is_respected() {
    let vendor = Arc::new(InstrumentedVendor::with_delay(Duration::from_millis(50)));
    let jobs: Vec<ParseJob> = (0..8)
        .map(|i| ParseJob::from_text(format!("{i}.sql"), "SELECT 1;"))
        .collect();

    let result = ConcurrentFileParser::new(Arc::clone(&vendor) as Arc<dyn VendorClassifier>)
        .with_max_concurrency(NonZeroUsize::new(2).expect("non-zero"))
        .parse_all(jobs)
        .await;

    assert!(result.is_complete());
    assert_eq!(result.successes().count(), 8);
    let peak = vendor.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak concurrency was {peak}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawn_delivers_exactly_one_completion() {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let handle = oracle().spawn(
        vec![
            ParseJob::from_text("a.sql", "SELECT 1 FROM dual;"),
            ParseJob::from_text("b.sql", "SELECT 2 FROM dual;"),
        ],
        move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(result);
        },
    );

    let result = tokio::time::timeout(Duration::from_secs(10), rx)
        .await
        .expect("completion within 10s")
        .expect("callback ran");
    handle.await.expect("background task finished");

    assert_eq!(result.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
