mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::{resolve_output_path, ReportWriter};
pub use progress::CrawlProgress;
pub use styling::{bright_green, bright_yellow, cyan};
use styling::{dim, magenta_bold};
pub use summary::print_summary;

/// Prints the `buildwarn` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⚠️ buildwarn"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Azure DevOps build warning report")
    );
}
