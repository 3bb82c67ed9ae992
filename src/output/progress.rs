use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, cyan, dim};

/// Progress tracking for the project crawl.
///
/// Per-project lines are printed through `suspend` so they survive when
/// stderr is not a terminal (the bar itself is hidden in that case).
pub struct CrawlProgress {
    pb: ProgressBar,
}

impl CrawlProgress {
    pub fn start(project_count: usize) -> Self {
        eprintln!("{}  {}", bright("🔎"), bright("Projects").underlined());

        let pb = ProgressBar::new(project_count as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::with_template("  {spinner} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { pb }
    }

    pub fn enter_project(&self, project: &str) {
        self.pb.set_message(project.to_string());
        self.pb
            .suspend(|| eprintln!("\n{} {}", dim("Project:"), cyan(project)));
    }

    /// Prints an indented line under the current project.
    pub fn note(&self, line: impl std::fmt::Display) {
        self.pb.suspend(|| eprintln!("  {line}"));
    }

    pub fn finish_project(&self) {
        self.pb.inc(1);
    }

    pub fn finish(self, rows_written: usize) {
        self.pb.finish_and_clear();
        eprintln!(
            "\n  {}\n",
            bright_green(format!("Crawl complete, {rows_written} pipelines with warnings ✓"))
        );
    }
}
