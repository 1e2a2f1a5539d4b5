//! Dry-run classification of an input folder.
//!
//! Previews read the input directory (not its subdirectories) and report what
//! an organize run would do, without touching the filesystem. The archive
//! preview lists only the archives that will be processed; the date preview
//! lists every file and explains why the ones without a date are left alone.

use crate::destination;
use crate::extractor::ArchiveKind;
use crate::filename_parser;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How one file of the input folder would be handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewItem {
    pub file_name: String,
    pub will_process: bool,
    pub target_path: Option<PathBuf>,
    pub target_path_label: Option<String>,
    /// Why the file would be left alone, when `will_process` is false.
    pub reason: Option<String>,
    /// The parsed metadata or date, as JSON.
    pub parsed_info: Option<serde_json::Value>,
    pub date_folder_name: Option<String>,
}

/// Everything a preview found in the input folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewReport {
    pub items: Vec<PreviewItem>,
    /// Regular files found in the input folder.
    pub total_files: usize,
    /// Items that an organize run would act on.
    pub processable_files: usize,
}

impl PreviewReport {
    /// Names of the files an organize run would act on, in listing order.
    pub fn processable_names(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.will_process)
            .map(|item| item.file_name.clone())
            .collect()
    }
}

/// Errors that prevent a preview from being produced.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("La carpeta de entrada no existe: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("No se pudo leer la carpeta {}: {source}", .path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Previews the archive workflow for `input_dir`.
///
/// Only supported archives whose names classify are listed; everything else
/// is counted in `total_files` but omitted.
pub fn preview(
    input_dir: &Path,
    destination_root: &Path,
    use_date_folder: bool,
) -> Result<PreviewReport, PreviewError> {
    let files = list_files(input_dir)?;
    let total_files = files.len();

    let items: Vec<PreviewItem> = files
        .into_iter()
        .filter(|name| ArchiveKind::is_supported(name))
        .filter_map(|name| {
            let metadata = filename_parser::parse(&name)?;
            let target = destination::resolve(destination_root, &metadata, use_date_folder);
            Some(PreviewItem {
                file_name: name,
                will_process: true,
                target_path: Some(target.full_path),
                target_path_label: Some(target.label),
                reason: None,
                parsed_info: serde_json::to_value(&metadata).ok(),
                date_folder_name: target.date_folder_name,
            })
        })
        .collect();

    Ok(PreviewReport {
        processable_files: items.len(),
        total_files,
        items,
    })
}

/// Previews the date-only workflow for `input_dir`.
///
/// Every regular file is listed. Files with a recognizable date in their name
/// are marked for processing with their target folder.
pub fn preview_date_files(
    input_dir: &Path,
    destination_root: &Path,
) -> Result<PreviewReport, PreviewError> {
    let files = list_files(input_dir)?;

    let items: Vec<PreviewItem> = files
        .into_iter()
        .map(|name| match filename_parser::parse_date(&name) {
            Some(date) => {
                let target = destination::resolve_date(destination_root, &date);
                PreviewItem {
                    file_name: name,
                    will_process: true,
                    target_path: Some(target.full_path),
                    target_path_label: Some(target.label),
                    reason: None,
                    parsed_info: serde_json::to_value(date).ok(),
                    date_folder_name: target.date_folder_name,
                }
            }
            None => PreviewItem {
                file_name: name,
                will_process: false,
                target_path: None,
                target_path_label: None,
                reason: Some("No se detectó una fecha en el nombre".to_string()),
                parsed_info: None,
                date_folder_name: None,
            },
        })
        .collect();

    Ok(PreviewReport {
        total_files: items.len(),
        processable_files: items.iter().filter(|item| item.will_process).count(),
        items,
    })
}

/// Names of the regular files directly inside `dir`, sorted.
fn list_files(dir: &Path) -> Result<Vec<String>, PreviewError> {
    if !dir.is_dir() {
        return Err(PreviewError::InputNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| PreviewError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| match entry.file_name().into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                log::warn!("Skipping {:?}: file name is not valid UTF-8", raw);
                None
            }
        })
        .collect();
    names.sort();
    Ok(names)
}
