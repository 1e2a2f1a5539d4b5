//! Archive extraction through external tools.
//!
//! `.zip` archives are expanded with the platform's own utility
//! (`Expand-Archive` on Windows, `unzip` elsewhere). `.rar` and `.7z` archives
//! go through 7-Zip. Extraction sits behind the [`ArchiveExtractor`] trait so
//! the organizer never spawns processes itself and tests can substitute a fake.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Archive formats the organizer knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
    SevenZip,
}

impl ArchiveKind {
    /// Detects the archive kind from a path's extension, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use hemeroteca::extractor::ArchiveKind;
    /// use std::path::Path;
    ///
    /// assert_eq!(ArchiveKind::from_path(Path::new("a.ZIP")), Some(ArchiveKind::Zip));
    /// assert_eq!(ArchiveKind::from_path(Path::new("a.7z")), Some(ArchiveKind::SevenZip));
    /// assert_eq!(ArchiveKind::from_path(Path::new("a.pdf")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "zip" => Some(Self::Zip),
            "rar" => Some(Self::Rar),
            "7z" => Some(Self::SevenZip),
            _ => None,
        }
    }

    /// Returns true when the file name has a supported archive extension.
    pub fn is_supported(file_name: &str) -> bool {
        Self::from_path(Path::new(file_name)).is_some()
    }
}

/// Errors raised while extracting a single archive.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("formato de archivo no soportado: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("no se encontró la herramienta '{tool}'. {hint}")]
    ToolNotFound { tool: String, hint: &'static str },

    #[error("no se pudo ejecutar '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' terminó con código {code}: {stderr}")]
    Failed {
        tool: String,
        code: String,
        stderr: String,
    },

    #[error("la extracción no produjo archivos")]
    Empty,
}

/// Capability to unpack one archive into an output directory.
pub trait ArchiveExtractor {
    /// Extracts `archive` into `output_dir`, which already exists.
    ///
    /// Success only means the tool reported success; callers verify the
    /// output themselves.
    fn extract(&self, archive: &Path, output_dir: &Path) -> Result<(), ExtractionError>;
}

impl<F> ArchiveExtractor for F
where
    F: Fn(&Path, &Path) -> Result<(), ExtractionError>,
{
    fn extract(&self, archive: &Path, output_dir: &Path) -> Result<(), ExtractionError> {
        self(archive, output_dir)
    }
}

/// Program name, arguments, and an install hint for when the program is missing.
type ToolCommand = (String, Vec<OsString>, &'static str);

const SEVEN_ZIP_HINT: &str = "Instale 7-Zip desde https://www.7-zip.org/ y asegúrese de que esté en el PATH.";

#[cfg(windows)]
const ZIP_HINT: &str = "PowerShell es necesario para descomprimir archivos .zip.";

#[cfg(not(windows))]
const ZIP_HINT: &str = "Instale el paquete 'unzip' de su distribución.";

/// Extracts archives by invoking the tools installed on the system.
#[derive(Debug, Clone)]
pub struct SystemExtractor {
    seven_zip: String,
}

impl SystemExtractor {
    /// Creates an extractor that runs `seven_zip` for `.rar` and `.7z` files.
    pub fn new(seven_zip: impl Into<String>) -> Self {
        Self {
            seven_zip: seven_zip.into(),
        }
    }

    /// Builds the command line for an archive of the given kind.
    fn command_for(&self, kind: ArchiveKind, archive: &Path, output_dir: &Path) -> ToolCommand {
        match kind {
            ArchiveKind::Zip => zip_command(archive, output_dir),
            ArchiveKind::Rar | ArchiveKind::SevenZip => {
                let mut out_flag = OsString::from("-o");
                out_flag.push(output_dir.as_os_str());
                let args = vec![
                    OsString::from("x"),
                    OsString::from("-y"),
                    out_flag,
                    archive.as_os_str().to_os_string(),
                ];
                (self.seven_zip.clone(), args, SEVEN_ZIP_HINT)
            }
        }
    }
}

impl Default for SystemExtractor {
    fn default() -> Self {
        Self::new("7z")
    }
}

#[cfg(windows)]
fn zip_command(archive: &Path, output_dir: &Path) -> ToolCommand {
    let script = format!(
        "Expand-Archive -LiteralPath '{}' -DestinationPath '{}' -Force",
        archive.display().to_string().replace('\'', "''"),
        output_dir.display().to_string().replace('\'', "''"),
    );
    let args = ["-NoProfile", "-NonInteractive", "-Command", &script]
        .into_iter()
        .map(OsString::from)
        .collect();
    ("powershell".to_string(), args, ZIP_HINT)
}

#[cfg(not(windows))]
fn zip_command(archive: &Path, output_dir: &Path) -> ToolCommand {
    let args = vec![
        OsString::from("-o"),
        OsString::from("-q"),
        archive.as_os_str().to_os_string(),
        OsString::from("-d"),
        output_dir.as_os_str().to_os_string(),
    ];
    ("unzip".to_string(), args, ZIP_HINT)
}

impl ArchiveExtractor for SystemExtractor {
    fn extract(&self, archive: &Path, output_dir: &Path) -> Result<(), ExtractionError> {
        let kind = ArchiveKind::from_path(archive)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(archive.to_path_buf()))?;
        let (tool, args, hint) = self.command_for(kind, archive, output_dir);

        let program = which::which(&tool).map_err(|_| ExtractionError::ToolNotFound {
            tool: tool.clone(),
            hint,
        })?;

        log::debug!("Running {} {:?}", program.display(), args);
        let output = Command::new(&program)
            .args(&args)
            .output()
            .map_err(|e| ExtractionError::Spawn {
                tool: tool.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "desconocido".to_string());
            return Err(ExtractionError::Failed {
                tool,
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
