#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

/// Environment variable holding the log filter for tests.
pub const LOG_ENV: &str = "JSONFACE_LOG";

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::TRACE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_timer(Uptime)
                .with_target(false)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_test_writer()
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Set up a tracing subscriber for tests.
///
/// Call it first thing in every test. The subscriber is installed once per
/// process through a [`LazyLock`], so repeated calls are free, and it works
/// the same under `cargo test` and `cargo nextest run`.
///
/// Output goes through the test writer, so it only shows for failing tests
/// (or with `--nocapture`). Each line carries the time since the first call,
/// the level and the source location.
///
/// # Filtering
///
/// Everything down to `TRACE` is shown by default, which includes every
/// derive decision and resolver call. Narrow it with [`LOG_ENV`], using the
/// `tracing_subscriber` targets syntax:
///
/// ```text
/// JSONFACE_LOG=jsonface::reconcile=trace,warn cargo nextest run
/// ```
///
/// A value that does not parse falls back to the default.
///
/// # Recommendation
///
/// Prefer `cargo nextest run`: one process per test keeps the process-wide
/// resolver registry from leaking between tests. Without nextest, a one-time
/// tip is printed to stderr. See <https://nexte.st>.
pub fn setup() {
    let is_nextest = std::env::var("NEXTEST").as_deref() == Ok("1");
    if !is_nextest {
        static NEXTEST_TIP: LazyLock<()> = LazyLock::new(|| {
            eprintln!("Tip: `cargo nextest run` gives one process per test and nicer output.");
            eprintln!("   More info: https://nexte.st");
            eprintln!();
        });
        #[allow(clippy::let_unit_value)]
        let _ = *NEXTEST_TIP;
    }

    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

/// An error type that panics when it's built (such as when you use `?`
/// to coerce to it)
#[derive(Debug)]
pub struct IPanic;

impl<E> From<E> for IPanic
where
    E: core::error::Error + Send + Sync,
{
    #[track_caller]
    fn from(value: E) -> Self {
        panic!("from: {}: {value}", core::panic::Location::caller())
    }
}
