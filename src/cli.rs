//! Command-line interface module for hemeroteca.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Settings loading and remembering the last input folder
//! - Preview and organize orchestration for both workflows
//! - Progress and result rendering (text or JSON)

use crate::config::Settings;
use crate::extractor::SystemExtractor;
use crate::file_organizer::{DateOperation, FileOrganizer, ProcessingProgress, ProcessingResult};
use crate::output::OutputFormatter;
use crate::preview::{self, PreviewReport};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extract periodical archives and file them by year, month and publication.
#[derive(Debug, Parser)]
#[command(name = "hemeroteca", version, about)]
pub struct Cli {
    /// Settings file to use instead of the default lookup.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print previews and results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: OrganizeCommand,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum OrganizeCommand {
    /// Show where each archive of the input folder would be filed.
    Preview {
        /// Input folder; defaults to the last one used.
        input: Option<PathBuf>,
        #[command(flatten)]
        date_folder: DateFolderArgs,
    },
    /// Extract the selected archives and file their contents.
    Organize {
        /// Input folder; defaults to the last one used.
        input: Option<PathBuf>,
        #[command(flatten)]
        date_folder: DateFolderArgs,
        /// Delete each archive after its contents were filed.
        #[arg(long)]
        delete_originals: bool,
        /// Archive to process (repeatable); defaults to every processable one.
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,
    },
    /// Show where each file would go based on the date in its name.
    PreviewDates {
        /// Input folder; defaults to the last one used.
        input: Option<PathBuf>,
    },
    /// Move (or copy) files into year/month/day folders by the date in their name.
    OrganizeDates {
        /// Input folder; defaults to the last one used.
        input: Option<PathBuf>,
        /// Copy instead of move.
        #[arg(long)]
        copy: bool,
        /// File to process (repeatable); defaults to every file with a date.
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,
    },
}

impl OrganizeCommand {
    fn input(&self) -> Option<&Path> {
        match self {
            Self::Preview { input, .. }
            | Self::Organize { input, .. }
            | Self::PreviewDates { input }
            | Self::OrganizeDates { input, .. } => input.as_deref(),
        }
    }
}

/// Overrides for the `use_date_folder` setting.
#[derive(Debug, Clone, Copy, Args)]
pub struct DateFolderArgs {
    /// Add a date folder below the publication folder.
    #[arg(long, conflicts_with = "no_date_folder")]
    pub date_folder: bool,
    /// Never add a date folder, whatever the settings say.
    #[arg(long)]
    pub no_date_folder: bool,
}

impl DateFolderArgs {
    fn resolve(self, settings: &Settings) -> bool {
        if self.date_folder {
            true
        } else if self.no_date_folder {
            false
        } else {
            settings.use_date_folder
        }
    }
}

/// Runs the CLI application with parsed arguments.
///
/// Returns a printable message when the command could not run or the batch
/// could not start.
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let (mut settings, source) = Settings::load_with_source(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    let input = cli
        .command
        .input()
        .map(Path::to_path_buf)
        .or_else(|| settings.last_input_path.clone())
        .ok_or_else(|| {
            "No input folder given and none remembered from a previous run".to_string()
        })?;
    let destination_root = settings.destination_root();
    log::debug!(
        "Input {}, destination {}",
        input.display(),
        destination_root.display()
    );

    let organizer = || {
        FileOrganizer::new(
            &destination_root,
            Box::new(SystemExtractor::new(settings.seven_zip_command.clone())),
        )
        .with_settle_delay(settings.settle_delay())
    };

    let result = match cli.command {
        OrganizeCommand::Preview { date_folder, .. } => {
            let use_date_folder = date_folder.resolve(&settings);
            let report = preview::preview(&input, &destination_root, use_date_folder)
                .map_err(|e| e.to_string())?;
            print_preview(&report, cli.json);
            None
        }
        OrganizeCommand::Organize {
            date_folder,
            delete_originals,
            select,
            ..
        } => {
            let use_date_folder = date_folder.resolve(&settings);
            let selected = if select.is_empty() {
                preview::preview(&input, &destination_root, use_date_folder)
                    .map_err(|e| e.to_string())?
                    .processable_names()
            } else {
                select
            };
            let result = with_progress(cli.json, |on_progress| {
                organizer().process_batch(
                    &input,
                    &selected,
                    delete_originals,
                    use_date_folder,
                    on_progress,
                )
            });
            Some(result)
        }
        OrganizeCommand::PreviewDates { .. } => {
            let report = preview::preview_date_files(&input, &destination_root)
                .map_err(|e| e.to_string())?;
            print_preview(&report, cli.json);
            None
        }
        OrganizeCommand::OrganizeDates { copy, select, .. } => {
            let operation = if copy {
                DateOperation::Copy
            } else {
                DateOperation::Move
            };
            let selected = if select.is_empty() {
                preview::preview_date_files(&input, &destination_root)
                    .map_err(|e| e.to_string())?
                    .processable_names()
            } else {
                select
            };
            let result = with_progress(cli.json, |on_progress| {
                organizer().organize_by_date(&input, &selected, operation, on_progress)
            });
            Some(result)
        }
    };

    if let Some(result) = result {
        if cli.json {
            print_json(&result);
        } else {
            OutputFormatter::summary(&result);
        }
        if let Some(error) = result.error {
            return Err(error);
        }
        if settings.auto_open {
            open_folder(&destination_root);
        }
    }

    remember_input(&mut settings, source, input);
    Ok(())
}

/// Runs a batch, rendering its progress events as a bar unless JSON output
/// was requested.
fn with_progress<F>(json: bool, run: F) -> ProcessingResult
where
    F: FnOnce(&mut dyn FnMut(&ProcessingProgress)) -> ProcessingResult,
{
    if json {
        return run(&mut |progress: &ProcessingProgress| {
            log::debug!("{}% {}", progress.percentage, progress.status)
        });
    }

    let pb = OutputFormatter::create_progress_bar();
    let result = run(&mut |progress: &ProcessingProgress| {
        OutputFormatter::update_progress(&pb, progress)
    });
    pb.finish_and_clear();
    result
}

fn print_preview(report: &PreviewReport, json: bool) {
    if json {
        print_json(report);
    } else {
        OutputFormatter::dry_run_notice("No se modificará ningún archivo.");
        OutputFormatter::preview(report);
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => OutputFormatter::error(&format!("Could not serialize output: {}", e)),
    }
}

/// Stores the input folder for the next run, in the file the settings came
/// from or the user config file.
fn remember_input(settings: &mut Settings, source: Option<PathBuf>, input: PathBuf) {
    if settings.last_input_path.as_ref() == Some(&input) {
        return;
    }
    let Some(path) = source.or_else(Settings::user_config_path) else {
        return;
    };
    settings.last_input_path = Some(input);
    if let Err(e) = settings.save(&path) {
        log::warn!("Could not remember input folder in {}: {}", path.display(), e);
    }
}

/// Opens a folder in the platform's file browser. Failures are only logged.
fn open_folder(path: &Path) {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    if let Err(e) = std::process::Command::new(program).arg(path).spawn() {
        log::warn!("Could not open {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_organize_with_selection() {
        let cli = Cli::try_parse_from([
            "hemeroteca",
            "organize",
            "/scans",
            "--date-folder",
            "--delete-originals",
            "--select",
            "a.zip",
            "--select",
            "b.rar",
        ])
        .unwrap();

        match cli.command {
            OrganizeCommand::Organize {
                input,
                date_folder,
                delete_originals,
                select,
            } => {
                assert_eq!(input, Some(PathBuf::from("/scans")));
                assert!(date_folder.resolve(&Settings::default()));
                assert!(delete_originals);
                assert_eq!(select, vec!["a.zip", "b.rar"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_date_folder_flags_override_settings() {
        let enabled = Settings {
            use_date_folder: true,
            ..Default::default()
        };
        let none = DateFolderArgs {
            date_folder: false,
            no_date_folder: false,
        };
        let off = DateFolderArgs {
            date_folder: false,
            no_date_folder: true,
        };
        assert!(none.resolve(&enabled));
        assert!(!off.resolve(&enabled));
        assert!(!none.resolve(&Settings::default()));
    }

    #[test]
    fn test_conflicting_date_folder_flags_rejected() {
        let result = Cli::try_parse_from([
            "hemeroteca",
            "preview",
            "--date-folder",
            "--no-date-folder",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_organize_dates_global_json_flag() {
        let cli = Cli::try_parse_from(["hemeroteca", "organize-dates", "--copy", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            OrganizeCommand::OrganizeDates { copy: true, input: None, .. }
        ));
    }
}
