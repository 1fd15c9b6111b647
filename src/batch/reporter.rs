use super::BatchSummary;
use barrett_common::RowOutcome;
use indicatif::{ProgressBar, ProgressStyle};

/// 進捗と集計の出力先
pub trait Reporter {
    fn start(&mut self, total: usize);
    fn row_started(&mut self, index: usize, name: &str);
    fn row_finished(&mut self, index: usize, name: &str, outcome: &RowOutcome);
    fn finish(&mut self, summary: &BatchSummary);
}

/// プログレスバー表示
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for ConsoleReporter {
    fn start(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        self.bar = Some(bar);
    }

    fn row_started(&mut self, _index: usize, name: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(name.to_string());
        }
    }

    fn row_finished(&mut self, _index: usize, name: &str, outcome: &RowOutcome) {
        if let Some(bar) = &self.bar {
            let mark = if outcome.is_success() { "✔" } else { "✘" };
            bar.println(format!("  {} {}: {}", mark, name, outcome));
            bar.inc(1);
        }
    }

    fn finish(&mut self, _summary: &BatchSummary) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
