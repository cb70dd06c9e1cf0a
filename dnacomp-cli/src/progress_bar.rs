use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dnacomp::progress::{ByteNum, ProgressNotifier};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str = "{wide_bar} {bytes}/{total_bytes} [ETA {eta}] {msg}";
const SPINNER_TEMPLATE: &str = "{spinner} {bytes}/? ({bytes_per_sec}) {msg}";

#[derive(Debug, Default)]
struct DnaProgressBarState {
    total_bytes: u64,
    initialized: bool,
}

#[derive(Debug)]
struct RecordCounter {
    total: AtomicU64,
    finished: AtomicU64,
}

/// Byte-based progress bar shown on stderr, with a record counter as its
/// message.
#[derive(Debug, Clone)]
pub(crate) struct DnaProgressBar {
    bar: ProgressBar,
    state: Arc<Mutex<DnaProgressBarState>>,
    records: Arc<RecordCounter>,
}

impl DnaProgressBar {
    pub fn new() -> DnaProgressBar {
        let bar = ProgressBar::hidden();
        bar.set_style(ProgressStyle::default_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message("Reading input...");

        Self {
            bar,
            state: Arc::new(Mutex::new(DnaProgressBarState::default())),
            records: Arc::new(RecordCounter {
                total: AtomicU64::new(0),
                finished: AtomicU64::new(0),
            }),
        }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    /// Sets the number of bytes the bar counts up to; 0 means unknown.
    pub fn set_total_bytes(&self, total_bytes: u64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        state.initialized = false;
        state.total_bytes = total_bytes;
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }

    fn init(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.initialized {
            return;
        }

        let style = if state.total_bytes == 0 {
            ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)
        } else {
            self.bar.set_length(state.total_bytes);
            ProgressStyle::default_bar().template(BAR_TEMPLATE)
        };
        if let Ok(style) = style {
            self.bar.set_style(style);
        }
        self.bar.set_position(0);

        state.initialized = true;
    }

    fn update_message(&self) {
        let total = self.records.total.load(Ordering::Relaxed);
        let finished = self.records.finished.load(Ordering::Relaxed);
        self.bar.set_message(format!("{}/{} records", finished, total));
    }
}

impl ProgressNotifier for DnaProgressBar {
    fn processed_bytes(&self, bytes: ByteNum) {
        self.init();
        self.bar.inc(bytes.get() as u64);
    }

    fn set_record_num(&self, record_num: u64) {
        self.records.total.store(record_num, Ordering::Relaxed);
        self.records.finished.store(0, Ordering::Relaxed);
        self.init();
        self.update_message();
    }

    fn record_finished(&self) {
        self.records.finished.fetch_add(1, Ordering::Relaxed);
        self.update_message();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use dnacomp::progress::{ByteNum, ProgressNotifier};

    use crate::progress_bar::DnaProgressBar;

    #[test]
    fn test_hidden_bar_counts() {
        let bar = DnaProgressBar::new();
        bar.set_total_bytes(100);
        bar.set_record_num(2);
        bar.processed_bytes(ByteNum::new(40));
        bar.record_finished();

        assert!(bar.is_hidden());
        assert_eq!(bar.bar.position(), 40);
        assert_eq!(bar.records.total.load(Ordering::Relaxed), 2);
        assert_eq!(bar.records.finished.load(Ordering::Relaxed), 1);
    }
}
