/// Destination path resolution for classified files.
///
/// Archives land in `root / year / "MM - Mes" / diary`, optionally followed by a
/// date folder. Files organized by date alone land in `root / year / "MM - Mes"`,
/// followed by a day folder when the day is known.
use crate::calendar;
use crate::filename_parser::{DateInfo, FileMetadata};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Separator used to join path segments in the display label.
const LABEL_SEPARATOR: &str = " / ";

/// Where a file goes and how to describe it to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetInfo {
    /// Absolute target directory under the destination root.
    pub full_path: PathBuf,
    /// Path segments below the root joined with `" / "`.
    pub label: String,
    /// Name of the date folder, when one was appended.
    pub date_folder_name: Option<String>,
}

impl TargetInfo {
    fn from_segments(root: &Path, segments: Vec<String>, date_folder_name: Option<String>) -> Self {
        let full_path = segments
            .iter()
            .fold(root.to_path_buf(), |path, segment| path.join(segment));
        Self {
            full_path,
            label: segments.join(LABEL_SEPARATOR),
            date_folder_name,
        }
    }
}

/// Resolves the target directory for an archive's contents.
///
/// # Examples
///
/// ```
/// use hemeroteca::destination::resolve;
/// use hemeroteca::filename_parser::FileMetadata;
/// use std::path::Path;
///
/// let meta = FileMetadata::new(1989, 12, "La Tercera", Some(11)).unwrap();
///
/// let plain = resolve(Path::new("/archivos"), &meta, false);
/// assert_eq!(plain.label, "1989 / 12 - Diciembre / La Tercera");
///
/// let dated = resolve(Path::new("/archivos"), &meta, true);
/// assert_eq!(dated.label, "1989 / 12 - Diciembre / La Tercera / 11 de diciembre de 1989");
/// ```
pub fn resolve(root: &Path, metadata: &FileMetadata, use_date_folder: bool) -> TargetInfo {
    let mut segments = month_segments(metadata.year(), metadata.month());
    segments.push(sanitize_segment(metadata.diary()));

    let date_folder_name = if use_date_folder {
        date_folder_name(&metadata.date())
    } else {
        None
    };
    if let Some(folder) = &date_folder_name {
        segments.push(folder.clone());
    }

    TargetInfo::from_segments(root, segments, date_folder_name)
}

/// Resolves the target directory for a file organized by date only.
///
/// The day folder is added whenever the day is known; month-only dates stop at
/// the month directory.
pub fn resolve_date(root: &Path, date: &DateInfo) -> TargetInfo {
    let mut segments = month_segments(date.year(), date.month());
    let day_folder = date.day().and_then(|_| date_folder_name(date));
    if let Some(folder) = &day_folder {
        segments.push(folder.clone());
    }
    TargetInfo::from_segments(root, segments, day_folder)
}

/// Name of the date folder: `"11 de diciembre de 1989"` with a day,
/// `"Diciembre de 1989"` without.
pub fn date_folder_name(date: &DateInfo) -> Option<String> {
    match date.day() {
        Some(day) => {
            let month = calendar::month_name_lower(date.month())?;
            Some(format!("{} de {} de {}", day, month, date.year()))
        }
        None => {
            let month = calendar::month_name(date.month())?;
            Some(format!("{} de {}", month, date.year()))
        }
    }
}

fn month_segments(year: i32, month: u32) -> Vec<String> {
    let month_folder = calendar::month_folder_name(month).unwrap_or_else(|| format!("{:02}", month));
    vec![year.to_string(), month_folder]
}

/// Makes a name safe to use as a single directory name.
///
/// Characters reserved on common filesystems and control characters become
/// `-`; trailing dots and spaces are dropped since Windows strips them.
pub fn sanitize_segment(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim().trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/data/Archivos")
    }

    #[test]
    fn test_resolve_without_date_folder() {
        let meta = FileMetadata::new(1989, 12, "La Tercera", Some(11)).unwrap();
        let target = resolve(&root(), &meta, false);

        assert_eq!(target.label, "1989 / 12 - Diciembre / La Tercera");
        assert_eq!(
            target.full_path,
            root().join("1989").join("12 - Diciembre").join("La Tercera")
        );
        assert_eq!(target.date_folder_name, None);
    }

    #[test]
    fn test_resolve_with_day_folder() {
        let meta = FileMetadata::new(1989, 12, "La Tercera", Some(11)).unwrap();
        let target = resolve(&root(), &meta, true);

        assert_eq!(
            target.label,
            "1989 / 12 - Diciembre / La Tercera / 11 de diciembre de 1989"
        );
        assert_eq!(
            target.date_folder_name.as_deref(),
            Some("11 de diciembre de 1989")
        );
        assert!(target.full_path.ends_with("La Tercera/11 de diciembre de 1989"));
    }

    #[test]
    fn test_resolve_with_month_folder() {
        let meta = FileMetadata::new(1989, 12, "TV Grama", None).unwrap();
        let target = resolve(&root(), &meta, true);

        assert_eq!(target.date_folder_name.as_deref(), Some("Diciembre de 1989"));
        assert_eq!(
            target.label,
            "1989 / 12 - Diciembre / TV Grama / Diciembre de 1989"
        );
    }

    #[test]
    fn test_no_date_segment_without_flag() {
        for day in [None, Some(1), Some(31)] {
            let meta = FileMetadata::new(1975, 3, "Ercilla", day).unwrap();
            let target = resolve(&root(), &meta, false);
            assert_eq!(target.label, "1975 / 03 - Marzo / Ercilla");
            assert!(target.date_folder_name.is_none());
        }
    }

    #[test]
    fn test_unsafe_diary_characters_are_replaced() {
        let meta = FileMetadata::new(1990, 1, "Que Pasa? / Especial:", None).unwrap();
        let target = resolve(&root(), &meta, false);

        assert_eq!(target.label, "1990 / 01 - Enero / Que Pasa- - Especial-");
        assert_eq!(
            target.full_path,
            root().join("1990").join("01 - Enero").join("Que Pasa- - Especial-")
        );
    }

    #[test]
    fn test_resolve_date() {
        let with_day = DateInfo::new(2001, 9, Some(4)).unwrap();
        let target = resolve_date(&root(), &with_day);
        assert_eq!(target.label, "2001 / 09 - Septiembre / 4 de septiembre de 2001");

        let month_only = DateInfo::new(2001, 9, None).unwrap();
        let target = resolve_date(&root(), &month_only);
        assert_eq!(target.label, "2001 / 09 - Septiembre");
        assert_eq!(target.date_folder_name, None);
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("Hoy."), "Hoy");
        assert_eq!(sanitize_segment("a\tb"), "a-b");
        assert_eq!(sanitize_segment("..."), "-");
    }
}
