use std::fmt::Write;
use std::io;

use crate::report::{RunSummary, SkipReason};

use super::styling::{bright, bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{color_coded_warning_cell, create_table, cyan_header};

/// Prints a human-readable summary of a report run to stderr.
///
/// Displays:
/// - Overview: output file, scan counts, total warnings
/// - Pipelines with warnings: one line per CSV row, grouped by project
/// - Skipped pipelines: how many were skipped and why
///
/// Warning counts are color coded: green below 3, yellow below 10, red otherwise.
pub fn print_summary(summary: &RunSummary) {
    let _ = write_summary(&mut io::stderr().lock(), summary);
}

fn write_summary(out: &mut impl io::Write, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "{}", render_summary(summary))
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn render_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let output_path = summary
        .output_path
        .as_ref()
        .map_or_else(|| "not written".to_string(), |path| path.display().to_string());

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        dim("Report:"),
        cyan(output_path),
        dim("Started:"),
        dim(summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")),
        dim("Projects scanned:"),
        bright_yellow(summary.projects_scanned),
        dim("Pipelines scanned:"),
        bright_yellow(summary.pipelines_scanned),
        dim("Pipelines with warnings:"),
        bright_yellow(summary.rows.len()),
        dim("Total warnings:"),
        bright_yellow(summary.total_warnings()),
    );

    add_section_header(&mut output, "⚠️", "Pipelines with warnings");

    if summary.rows.is_empty() {
        let _ = writeln!(output, "  {}\n", bright_green("No pipelines with warnings ✓"));
    } else {
        let mut table = create_table();
        table.set_header(cyan_header(&["Project", "Pipeline", "Build", "Warnings", "Link"]));

        for (project, rows) in summary.rows_by_project() {
            for (index, row) in rows.iter().enumerate() {
                let project_cell = if index == 0 { project } else { "" };
                table.add_row(vec![
                    comfy_table::Cell::new(project_cell),
                    comfy_table::Cell::new(&row.pipeline_name),
                    comfy_table::Cell::new(row.build_id),
                    color_coded_warning_cell(row.warning_count),
                    comfy_table::Cell::new(&row.link),
                ]);
            }
        }

        let _ = writeln!(output, "{table}\n");
    }

    let skipped_total: usize = summary.skipped.values().sum();
    if skipped_total > 0 {
        add_section_header(&mut output, "⏭️", "Skipped pipelines");

        let mut table = create_table();
        table.set_header(cyan_header(&["Reason", "Pipelines"]));
        for (reason, count) in &summary.skipped {
            table.add_row(vec![reason.label().to_string(), count.to_string()]);
        }
        let _ = writeln!(output, "{table}");

        let failed = summary.skipped(SkipReason::LookupFailed);
        if failed > 0 {
            let _ = writeln!(
                output,
                "\n  {}",
                bright_red(format!(
                    "{failed} pipelines could not be checked (API failures after retries). Their warnings may be missing from the report."
                ))
            );
        }
    }

    output
}
