//! Plan-run observers.
//!
//! The assembler reports each phase of a run through [`Progress`]; the HTTP
//! surface passes [`NoopProgress`] and the CLI draws a terminal bar with
//! [`IndicatifProgress`].

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Hooks called while one request is planned. All default to no-ops.
pub trait Progress: Send + Sync {
    /// A pipeline phase started.
    fn phase(&self, _label: &str) {}
    /// The request was split into `steps` actions.
    fn decomposed(&self, _steps: usize) {}
    /// One step finished, in completion order rather than plan order.
    fn step_settled(&self, _action: &str, _resolved: bool) {}
    /// The plan is complete.
    fn done(&self, _resolved: usize, _total: usize) {}
}

#[derive(Default, Clone, Copy)]
pub struct NoopProgress;

impl Progress for NoopProgress {}

/// Terminal bar sized to the decomposed step count.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Starts as a spinner; becomes a bar once the steps are known.
    pub fn for_terminal() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl Progress for IndicatifProgress {
    fn phase(&self, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn decomposed(&self, steps: usize) {
        if let Ok(style) = ProgressStyle::with_template("[{bar:24}] {pos}/{len} steps {msg}") {
            self.bar.set_style(style.progress_chars("=> "));
        }
        self.bar.set_length(steps as u64);
        self.bar.set_message("resolving");
    }

    fn step_settled(&self, action: &str, resolved: bool) {
        let mark = if resolved { "ok" } else { "no match" };
        self.bar.inc(1);
        self.bar.set_message(format!("{action}: {mark}"));
    }

    fn done(&self, resolved: usize, total: usize) {
        self.bar
            .finish_with_message(format!("{resolved} of {total} steps resolved"));
    }
}
