/// Batch organization of periodical archives and dated files.
///
/// This module drives the whole pipeline for a batch: for each selected archive
/// it extracts into a private working directory, resolves the destination from
/// the archive's name, moves the extracted entries there, cleans up, and
/// optionally deletes the original. A second workflow moves or copies plain
/// files into a year/month/day tree based only on the date in their names.
///
/// Files are processed one at a time, in the order given. A failure affects
/// only its own file; only missing input or destination directories abort the
/// batch.
use crate::destination::{self, TargetInfo};
use crate::extractor::{ArchiveExtractor, ArchiveKind, ExtractionError};
use crate::filename_parser::{self, FileMetadata};
use crate::retry::SafeRemover;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Default pause after extraction so the tool's file handles are released.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// A snapshot of batch progress, pushed to the caller's sink.
///
/// Consumers must not rely on seeing every value of `current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingProgress {
    /// Number of files finished before this snapshot.
    pub current: usize,
    /// Number of files in the batch.
    pub total: usize,
    /// File being worked on, empty at the start and end of a batch.
    pub current_file: String,
    /// Human-readable status line.
    pub status: String,
    /// Completion in percent, 0–100.
    pub percentage: u8,
}

impl ProcessingProgress {
    fn starting(total: usize) -> Self {
        Self {
            current: 0,
            total,
            current_file: String::new(),
            status: format!("Iniciando ({} archivos)", total),
            percentage: 0,
        }
    }

    fn processing(index: usize, total: usize, file_name: &str) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            (index * 100 / total) as u8
        };
        Self {
            current: index,
            total,
            current_file: file_name.to_string(),
            status: format!("Procesando {} ({}/{})", file_name, index + 1, total),
            percentage,
        }
    }

    fn finished(total: usize) -> Self {
        Self {
            current: total,
            total,
            current_file: String::new(),
            status: "Completado".to_string(),
            percentage: 100,
        }
    }
}

/// Outcome of a batch.
///
/// `success` is false only when the batch could not start; per-file problems
/// are listed in `errors` while `success` stays true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub processed: usize,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    fn failure(error: &OrganizeError) -> Self {
        Self {
            success: false,
            processed: 0,
            errors: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// What to do with each file in the date-only workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateOperation {
    #[default]
    Move,
    Copy,
}

/// Errors that can occur while organizing a batch or one of its files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The input directory does not exist. Aborts the batch.
    #[error("La carpeta de entrada no existe: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The destination root does not exist. Aborts the batch.
    #[error("La carpeta de destino no existe: {}", .0.display())]
    DestinationNotFound(PathBuf),

    #[error("el archivo no existe: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("no se detectó una fecha en el nombre")]
    DateNotDetected,

    #[error("no se pudo crear el directorio temporal: {0}")]
    WorkDirFailed(#[source] io::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("no se pudo leer el contenido extraído en {}: {source}", .path.display())]
    ReadExtracted { path: PathBuf, source: io::Error },

    #[error("no se pudo crear el directorio {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("no se pudo mover {} a {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("no se pudo copiar {} a {}: {source}", .from.display(), .to.display())]
    FileCopyFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Organizes archives and dated files into the destination tree.
///
/// The destination root and the extractor are injected; the organizer never
/// discovers paths or spawns processes on its own.
pub struct FileOrganizer {
    destination_root: PathBuf,
    extractor: Box<dyn ArchiveExtractor>,
    remover: SafeRemover,
    settle_delay: Duration,
    temp_base: Option<PathBuf>,
}

impl FileOrganizer {
    /// Creates an organizer writing below `destination_root`.
    pub fn new(destination_root: impl Into<PathBuf>, extractor: Box<dyn ArchiveExtractor>) -> Self {
        Self {
            destination_root: destination_root.into(),
            extractor,
            remover: SafeRemover::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            temp_base: None,
        }
    }

    /// Sets the pause taken after each extraction.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets how temporary working directories are removed.
    pub fn with_remover(mut self, remover: SafeRemover) -> Self {
        self.remover = remover;
        self
    }

    /// Creates working directories under `dir` instead of the system temp dir.
    pub fn with_temp_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_base = Some(dir.into());
        self
    }

    /// Extracts and files every selected archive of `input_dir`.
    ///
    /// Selected names that are not supported archives or whose names cannot be
    /// classified are skipped without an error. Progress is reported once
    /// before the batch, once before each file, and once at the end.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hemeroteca::extractor::SystemExtractor;
    /// use hemeroteca::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let organizer = FileOrganizer::new("/home/me/Archivos", Box::new(SystemExtractor::default()));
    /// let result = organizer.process_batch(
    ///     Path::new("/home/me/Descargas"),
    ///     &["La Tercera - 11 de diciembre de 1989.zip".to_string()],
    ///     false,
    ///     true,
    ///     |progress| println!("{}%", progress.percentage),
    /// );
    /// println!("{} procesados", result.processed);
    /// ```
    pub fn process_batch(
        &self,
        input_dir: &Path,
        selected: &[String],
        delete_originals: bool,
        use_date_folder: bool,
        mut on_progress: impl FnMut(&ProcessingProgress),
    ) -> ProcessingResult {
        if let Err(e) = self.check_preconditions(input_dir) {
            log::error!("{}", e);
            return ProcessingResult::failure(&e);
        }

        let total = selected.len();
        let mut result = ProcessingResult {
            success: true,
            ..Default::default()
        };
        on_progress(&ProcessingProgress::starting(total));

        for (index, name) in selected.iter().enumerate() {
            on_progress(&ProcessingProgress::processing(index, total, name));

            let archive = input_dir.join(name);
            let metadata = match classify_archive(name) {
                Some(metadata) => metadata,
                None => {
                    log::info!("Skipping {}: not a classifiable archive name", name);
                    continue;
                }
            };

            match self.process_archive(&archive, &metadata, use_date_folder) {
                Ok(target) => {
                    result.processed += 1;
                    log::info!("{} -> {}", name, target.label);
                    if delete_originals && let Err(e) = fs::remove_file(&archive) {
                        log::warn!("Could not delete {}: {}", archive.display(), e);
                        result
                            .errors
                            .push(format!("Advertencia: no se pudo eliminar {}: {}", name, e));
                    }
                }
                Err(e) => {
                    log::warn!("Failed to process {}: {}", name, e);
                    result
                        .errors
                        .push(format!("Error procesando {}: {}", name, e));
                }
            }
        }

        on_progress(&ProcessingProgress::finished(total));
        result
    }

    /// Moves or copies each selected file into the folder for the date found
    /// in its name.
    ///
    /// Unlike archives, a selected file without a recognizable date is
    /// reported as an error, since it was explicitly chosen.
    pub fn organize_by_date(
        &self,
        input_dir: &Path,
        selected: &[String],
        operation: DateOperation,
        mut on_progress: impl FnMut(&ProcessingProgress),
    ) -> ProcessingResult {
        if let Err(e) = self.check_preconditions(input_dir) {
            log::error!("{}", e);
            return ProcessingResult::failure(&e);
        }

        let total = selected.len();
        let mut result = ProcessingResult {
            success: true,
            ..Default::default()
        };
        on_progress(&ProcessingProgress::starting(total));

        for (index, name) in selected.iter().enumerate() {
            on_progress(&ProcessingProgress::processing(index, total, name));

            match self.organize_dated_file(&input_dir.join(name), name, operation) {
                Ok(target) => {
                    result.processed += 1;
                    log::info!("{} -> {} ({:?})", name, target.label, operation);
                }
                Err(e) => {
                    log::warn!("Failed to organize {}: {}", name, e);
                    result
                        .errors
                        .push(format!("Error procesando {}: {}", name, e));
                }
            }
        }

        on_progress(&ProcessingProgress::finished(total));
        result
    }

    fn check_preconditions(&self, input_dir: &Path) -> OrganizeResult<()> {
        if !input_dir.is_dir() {
            return Err(OrganizeError::InputNotFound(input_dir.to_path_buf()));
        }
        if !self.destination_root.is_dir() {
            return Err(OrganizeError::DestinationNotFound(
                self.destination_root.clone(),
            ));
        }
        Ok(())
    }

    /// Runs one archive through extract, resolve and move, always cleaning
    /// up the working directory afterwards.
    fn process_archive(
        &self,
        archive: &Path,
        metadata: &FileMetadata,
        use_date_folder: bool,
    ) -> OrganizeResult<TargetInfo> {
        if !archive.is_file() {
            return Err(OrganizeError::SourceNotFound(archive.to_path_buf()));
        }

        let work_dir = self.create_work_dir()?;
        let outcome = self.extract_and_move(archive, work_dir.path(), metadata, use_date_folder);
        self.remover.remove_directory(work_dir.path());
        outcome
    }

    fn create_work_dir(&self) -> OrganizeResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("hemeroteca-");
        let work_dir = match &self.temp_base {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        };
        work_dir.map_err(OrganizeError::WorkDirFailed)
    }

    fn extract_and_move(
        &self,
        archive: &Path,
        work_dir: &Path,
        metadata: &FileMetadata,
        use_date_folder: bool,
    ) -> OrganizeResult<TargetInfo> {
        self.extractor.extract(archive, work_dir)?;
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        let entries = list_entries(work_dir)?;
        if entries.is_empty() {
            return Err(ExtractionError::Empty.into());
        }

        let target = destination::resolve(&self.destination_root, metadata, use_date_folder);
        ensure_dir(&target.full_path)?;

        for entry in &entries {
            let Some(file_name) = entry.file_name() else {
                continue;
            };
            move_entry(entry, &target.full_path.join(file_name))?;
        }
        log::debug!(
            "Moved {} entries from {} into {}",
            entries.len(),
            work_dir.display(),
            target.full_path.display()
        );

        Ok(target)
    }

    fn organize_dated_file(
        &self,
        path: &Path,
        name: &str,
        operation: DateOperation,
    ) -> OrganizeResult<TargetInfo> {
        if !path.is_file() {
            return Err(OrganizeError::SourceNotFound(path.to_path_buf()));
        }
        let date = filename_parser::parse_date(name).ok_or(OrganizeError::DateNotDetected)?;
        let target = destination::resolve_date(&self.destination_root, &date);
        ensure_dir(&target.full_path)?;

        let destination_path = target.full_path.join(name);
        match operation {
            DateOperation::Move => move_entry(path, &destination_path)?,
            DateOperation::Copy => copy_entry(path, &destination_path)?,
        }
        Ok(target)
    }
}

/// Returns metadata for a selected archive, or `None` when it is not one the
/// organizer can act on.
fn classify_archive(name: &str) -> Option<FileMetadata> {
    if !ArchiveKind::is_supported(name) {
        return None;
    }
    filename_parser::parse(name)
}

fn list_entries(dir: &Path) -> OrganizeResult<Vec<PathBuf>> {
    let read_error = |e| OrganizeError::ReadExtracted {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_error)?;
    entries.sort();
    Ok(entries)
}

/// Creates a directory and its parents if they do not exist yet.
pub fn ensure_dir(path: &Path) -> OrganizeResult<()> {
    fs::create_dir_all(path).map_err(|e| OrganizeError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Moves a file or directory tree to `destination`, replacing whatever is
/// there. Moving an entry onto itself does nothing.
///
/// A plain rename is tried first. When that fails, typically because the
/// working directory lives on another filesystem, the entry is copied and the
/// source removed.
pub fn move_entry(source: &Path, destination: &Path) -> OrganizeResult<()> {
    let move_error = |e| OrganizeError::FileMoveFailure {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    };

    if same_entry(source, destination) {
        log::debug!("{} is already in place", source.display());
        return Ok(());
    }

    remove_existing(destination).map_err(move_error)?;
    if let Err(e) = fs::rename(source, destination) {
        log::debug!(
            "rename {} failed ({}), falling back to copy",
            source.display(),
            e
        );
        copy_recursive(source, destination).map_err(move_error)?;
        remove_existing(source).map_err(move_error)?;
    }
    Ok(())
}

/// Copies a file or directory tree to `destination`, replacing whatever is
/// there.
pub fn copy_entry(source: &Path, destination: &Path) -> OrganizeResult<()> {
    if same_entry(source, destination) {
        log::debug!("{} is already in place", source.display());
        return Ok(());
    }

    remove_existing(destination)
        .and_then(|_| copy_recursive(source, destination))
        .map_err(|e| OrganizeError::FileCopyFailure {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        })
}

/// True when both paths name the same existing file or directory.
fn same_entry(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn copy_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    if source.is_dir() {
        fs::create_dir_all(destination)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &destination.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(source, destination).map(|_| ())
    }
}
