//! Progress reporting for long query runs

/// Observer of batch completion.
///
/// Implementations only report; they must not block the run.
pub trait ProgressReporter {
    /// Called once before the first batch with the number of components
    fn start(&mut self, _total: usize) {}

    /// Called after each batch with the components it accounted for
    fn advance(&mut self, count: usize);

    /// Called once after the last batch
    fn finish(&mut self) {}
}

/// Reports progress through the log
#[derive(Debug, Default)]
pub struct LogProgress {
    total: usize,
    done: usize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Components accounted for so far
    pub fn done(&self) -> usize {
        self.done
    }
}

impl ProgressReporter for LogProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }

    fn advance(&mut self, count: usize) {
        self.done += count;
        let percent = if self.total == 0 {
            100.0
        } else {
            self.done as f64 * 100.0 / self.total as f64
        };
        log::info!("Progress: {}/{} parts ({:.0}%)", self.done, self.total, percent);
    }

    fn finish(&mut self) {
        log::debug!("Progress finished at {}/{} parts", self.done, self.total);
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn advance(&mut self, _count: usize) {}
}
