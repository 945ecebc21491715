//! Progress reporting for a pipeline run
//!
//! A single-line textual bar tracking how many discovered candidates have
//! been resolved (passed through extraction, rejected, or lost to a failure).

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Point-in-time view of a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Announced number of candidates
    pub total: u64,

    /// Displayed progress, never above `total`
    pub current: u64,

    /// Number of `advance` calls, including any beyond `total`
    pub resolved: u64,
}

struct DrawRegion {
    sink: Box<dyn Write + Send>,
    finished: bool,
}

/// Thread-safe counter with a fixed total that redraws a bar on every update
///
/// `current` only moves through an atomic saturating increment, so
/// `0 <= current <= total` holds at every observation. Drawing is serialized
/// through a mutex so concurrent updates never interleave partial lines.
pub struct ProgressTracker {
    total: u64,
    current: AtomicU64,
    resolved: AtomicU64,
    width: usize,
    region: Mutex<DrawRegion>,
}

impl ProgressTracker {
    /// Creates a tracker drawing into `sink`
    pub fn new(total: u64, width: usize, sink: Box<dyn Write + Send>) -> Self {
        Self {
            total,
            current: AtomicU64::new(0),
            resolved: AtomicU64::new(0),
            width,
            region: Mutex::new(DrawRegion {
                sink,
                finished: false,
            }),
        }
    }

    /// Creates a tracker drawing to stdout
    pub fn stdout(total: u64, width: usize) -> Self {
        Self::new(total, width, Box::new(std::io::stdout()))
    }

    /// Creates a tracker that draws nowhere
    pub fn hidden(total: u64) -> Self {
        Self::new(total, 0, Box::new(std::io::sink()))
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Records one resolved candidate and redraws
    pub fn advance(&self) {
        self.resolved.fetch_add(1, Ordering::SeqCst);
        let total = self.total;
        let _ = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                (c < total).then_some(c + 1)
            });
        self.draw();
    }

    /// Redraws the bar; emits the trailing line break once `current` reaches `total`
    pub fn draw(&self) {
        let mut region = self.lock_region();
        if region.finished {
            return;
        }

        if self.total == 0 {
            region.finished = true;
            return;
        }

        let current = self.current().min(self.total);
        let line = render_bar(current, self.total, self.width);
        let _ = write!(region.sink, "\r{}", line);
        if current >= self.total {
            let _ = writeln!(region.sink);
            region.finished = true;
        }
        let _ = region.sink.flush();
    }

    /// Closes the bar line if the run ended short of the announced total
    pub fn finish(&self) {
        let mut region = self.lock_region();
        if region.finished {
            return;
        }
        if self.total > 0 {
            let _ = writeln!(region.sink);
            let _ = region.sink.flush();
        }
        region.finished = true;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total,
            current: self.current(),
            resolved: self.resolved.load(Ordering::SeqCst),
        }
    }

    fn lock_region(&self) -> MutexGuard<'_, DrawRegion> {
        match self.region.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Renders `[####----] current/total (pct%)`
///
/// `filled = floor(width * current / total)`, clamped to `width`.
pub fn render_bar(current: u64, total: u64, width: usize) -> String {
    if total == 0 {
        return format!("[{}] 0/0 (0%)", "-".repeat(width));
    }
    let current = current.min(total);
    let filled = ((width as u64 * current) / total).min(width as u64) as usize;
    let percent = current * 100 / total;
    format!(
        "[{}{}] {}/{} ({}%)",
        "#".repeat(filled),
        "-".repeat(width - filled),
        current,
        total,
        percent
    )
}
