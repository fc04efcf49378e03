use std::io::Write;
use std::path::Path;
use std::time::Duration;

use docrank_core::report::Report;
use docrank_core::{Query, Section};
use docrank_ingest::SkippedDocument;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn shorten(text: &str, max_chars: usize) -> String {
    let collapsed = docrank_core::text_utils::collapse_whitespace(text);
    if collapsed.chars().count() > max_chars {
        format!("{}...", docrank_core::text_utils::truncate_chars(&collapsed, max_chars))
    } else {
        collapsed
    }
}

/// Print the persona, task and document count before a run.
pub fn print_run_header(w: &mut dyn Write, query: &Query, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Persona:".bold(), query.persona().cyan())?;
        writeln!(w, "{} {}", "Task:   ".bold(), query.task())?;
    } else {
        writeln!(w, "Persona: {}", query.persona())?;
        writeln!(w, "Task:    {}", query.task())?;
    }
    writeln!(w, "Analyzing {} documents...", query.documents.len())?;
    writeln!(w)?;
    Ok(())
}

/// Print documents left out under the skip-unreadable policy.
pub fn print_skipped(
    w: &mut dyn Write,
    skipped: &[SkippedDocument],
    color: ColorMode,
) -> std::io::Result<()> {
    for doc in skipped {
        if color.enabled() {
            writeln!(
                w,
                "{} skipped {}: {}",
                "WARNING:".yellow(),
                doc.document,
                doc.reason.dimmed()
            )?;
        } else {
            writeln!(w, "WARNING: skipped {}: {}", doc.document, doc.reason)?;
        }
    }
    if !skipped.is_empty() {
        writeln!(w)?;
    }
    Ok(())
}

/// Print the ranked sections of a finished report with their summaries.
pub fn print_report(w: &mut dyn Write, report: &Report, color: ColorMode) -> std::io::Result<()> {
    if report.extracted_sections.is_empty() {
        if color.enabled() {
            writeln!(w, "{}", "No sections found in the input documents.".yellow())?;
        } else {
            writeln!(w, "No sections found in the input documents.")?;
        }
        return Ok(());
    }

    for (section, analysis) in report
        .extracted_sections
        .iter()
        .zip(&report.subsection_analysis)
    {
        if color.enabled() {
            writeln!(
                w,
                "{} {}",
                format!("[{}]", section.importance_rank).bold().yellow(),
                section.section_title.bold()
            )?;
            writeln!(
                w,
                "    {}",
                format!("{} (page {})", section.document, section.page_number).dimmed()
            )?;
        } else {
            writeln!(w, "[{}] {}", section.importance_rank, section.section_title)?;
            writeln!(w, "    {} (page {})", section.document, section.page_number)?;
        }
        writeln!(w, "    {}", shorten(&analysis.refined_text, 200))?;
        writeln!(w)?;
    }
    Ok(())
}

/// Print where the report went and how long the run took.
pub fn print_summary(
    w: &mut dyn Write,
    out_path: &Path,
    sections_considered: usize,
    elapsed: Duration,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!(
        "Wrote {} ({} sections considered, {:.2?})",
        out_path.display(),
        sections_considered,
        elapsed
    );
    if color.enabled() {
        writeln!(w, "{}", line.green())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Dry-run listing of assembled sections.
pub fn print_sections(
    w: &mut dyn Write,
    file_name: &str,
    sections: &[Section],
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} sections)\n",
            "DRY RUN:".bold().cyan(),
            file_name.bold(),
            sections.len()
        )?;
    } else {
        writeln!(w, "DRY RUN: {} ({} sections)\n", file_name, sections.len())?;
    }

    for section in sections {
        if color.enabled() {
            writeln!(
                w,
                "{} {}",
                format!("p.{:<4}", section.page).bold().yellow(),
                section.heading
            )?;
        } else {
            writeln!(w, "p.{:<4} {}", section.page, section.heading)?;
        }
        let preview = shorten(&section.body, 100);
        let chars = section.body.chars().count();
        if color.enabled() {
            writeln!(w, "       {}", format!("{chars} chars: {preview}").dimmed())?;
        } else {
            writeln!(w, "       {chars} chars: {preview}")?;
        }
    }

    writeln!(w)?;
    writeln!(w, "Total: {} sections", sections.len())?;
    Ok(())
}
