//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! the progress bar fed by the organizer's progress events, preview listings
//! and batch summaries.

use crate::file_organizer::{ProcessingProgress, ProcessingResult};
use crate::preview::PreviewReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[VISTA PREVIA] {}", message).yellow());
    }

    /// Creates a percentage-based progress bar for a batch.
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Applies a progress event to a bar created by [`create_progress_bar`](Self::create_progress_bar).
    pub fn update_progress(pb: &ProgressBar, progress: &ProcessingProgress) {
        pb.set_position(u64::from(progress.percentage));
        pb.set_message(progress.status.clone());
    }

    /// Prints a preview listing.
    ///
    /// Processable items show their target label; the rest show why they
    /// would be skipped.
    pub fn preview(report: &PreviewReport) {
        Self::header("VISTA PREVIA");

        if report.items.is_empty() {
            Self::info("No hay archivos para procesar.");
        }

        for item in &report.items {
            if item.will_process {
                println!(" {} {}", "•".green(), item.file_name);
                if let Some(label) = &item.target_path_label {
                    println!("   → {}", label.cyan());
                }
            } else {
                println!(" {} {}", "•".dimmed(), item.file_name.dimmed());
                if let Some(reason) = &item.reason {
                    println!("   {}", reason.yellow());
                }
            }
        }

        println!("{}", "-".repeat(40));
        println!(
            "{} {} / {} {}",
            "Procesables:".bold(),
            report.processable_files.to_string().green().bold(),
            report.total_files,
            if report.total_files == 1 {
                "archivo"
            } else {
                "archivos"
            }
        );
    }

    /// Prints the summary of a finished batch.
    pub fn summary(result: &ProcessingResult) {
        Self::header("RESUMEN");

        if let Some(error) = &result.error {
            Self::error(error);
            return;
        }

        let word = if result.processed == 1 {
            "archivo procesado"
        } else {
            "archivos procesados"
        };
        Self::success(&format!("{} {}", result.processed, word));

        for error in &result.errors {
            if error.starts_with("Advertencia") {
                Self::warning(error);
            } else {
                Self::error(error);
            }
        }
    }
}
