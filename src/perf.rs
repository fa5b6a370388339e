//! Opt-in timing of parse, serialize, render and upload steps, plus a debug
//! event log.
//!
//! Scopes are cheap when timing is off: dropping one only checks a flag.
//! With timing on, each scope adds its duration to a per-name total that
//! [`report`] prints when the command finishes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

static ENABLED: AtomicBool = AtomicBool::new(false);
static TOTALS: LazyLock<Mutex<BTreeMap<&'static str, ScopeTotal>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));
static EVENT_LOG: LazyLock<Mutex<Option<EventLog>>> = LazyLock::new(|| Mutex::new(None));

/// First line of every debug log.
pub const DEBUG_LOG_HEADER: &str = "newsdesk debug log start";

/// Accumulated time for one scope name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScopeTotal {
    pub calls: u64,
    pub elapsed: Duration,
}

/// Adds its lifetime to the scope totals on drop when timing is enabled.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed = self.start.elapsed();
        trace!(scope = self.name, elapsed_us = elapsed.as_micros(), "perf scope");
        let mut totals = lock(&TOTALS);
        let total = totals.entry(self.name).or_default();
        total.calls += 1;
        total.elapsed += elapsed;
    }
}

#[derive(Debug)]
struct EventLog {
    start: Instant,
    writer: BufWriter<File>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Scope totals recorded so far, ordered by name.
pub fn totals() -> Vec<(&'static str, ScopeTotal)> {
    lock(&TOTALS).iter().map(|(name, total)| (*name, *total)).collect()
}

/// Print scope totals to stderr. Does nothing when timing is off.
pub fn report() {
    if !is_enabled() {
        return;
    }
    for (name, total) in totals() {
        eprintln!(
            "[perf] {name}: {} call(s), {:.2} ms",
            total.calls,
            total.elapsed.as_secs_f64() * 1000.0
        );
    }
}

/// Start writing events to `path`, or stop when `None`.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut log = lock(&EVENT_LOG);
    *log = None;
    if let Some(path) = path {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{DEBUG_LOG_HEADER}")?;
        writer.flush()?;
        *log = Some(EventLog {
            start: Instant::now(),
            writer,
        });
    }
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    lock(&EVENT_LOG).is_some()
}

/// Record an event in the debug log, stamped with the time since it opened.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let detail = detail.as_ref();
    debug!(event = name, detail, "debug event");
    let mut log = lock(&EVENT_LOG);
    let Some(log) = log.as_mut() else {
        return;
    };
    let elapsed_ms = log.start.elapsed().as_secs_f64() * 1000.0;
    let _ = writeln!(log.writer, "[{elapsed_ms:>10.3} ms] {name}: {detail}");
    let _ = log.writer.flush();
}
