//! Spanish month names used in periodical file names and folder names.
//!
//! Scanned back-issues are named the way the newspapers print their dates
//! ("11 de diciembre de 1989", "Dic 1989"), so lookups accept full names and
//! the usual three-letter abbreviations, case-insensitively.
//!
//! # Examples
//!
//! ```
//! use hemeroteca::calendar;
//!
//! assert_eq!(calendar::month_number("Diciembre"), Some(12));
//! assert_eq!(calendar::month_number("ENE"), Some(1));
//! assert_eq!(calendar::month_name(3), Some("Marzo"));
//! ```
use chrono::Datelike;

/// Capitalized month names, indexed by `month - 1`.
const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Every accepted spelling, lowercase, with its month number.
const MONTH_ALIASES: &[(&str, u32)] = &[
    ("enero", 1),
    ("ene", 1),
    ("febrero", 2),
    ("feb", 2),
    ("marzo", 3),
    ("mar", 3),
    ("abril", 4),
    ("abr", 4),
    ("mayo", 5),
    ("may", 5),
    ("junio", 6),
    ("jun", 6),
    ("julio", 7),
    ("jul", 7),
    ("agosto", 8),
    ("ago", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("sep", 9),
    ("sept", 9),
    ("set", 9),
    ("octubre", 10),
    ("oct", 10),
    ("noviembre", 11),
    ("nov", 11),
    ("diciembre", 12),
    ("dic", 12),
];

/// Earliest year accepted for an issue.
pub const MIN_YEAR: i32 = 1900;

/// Maps a Spanish month name or abbreviation to 1–12.
///
/// A trailing dot ("dic.") is ignored.
pub fn month_number(name: &str) -> Option<u32> {
    let normalized = name.trim().trim_end_matches('.').to_lowercase();
    MONTH_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|&(_, number)| number)
}

/// Returns the capitalized month name ("Diciembre") for 1–12.
pub fn month_name(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_NAMES[(month - 1) as usize])
    } else {
        None
    }
}

/// Returns the lowercase month name ("diciembre") for 1–12.
pub fn month_name_lower(month: u32) -> Option<String> {
    month_name(month).map(str::to_lowercase)
}

/// Folder name for a month inside a year directory, e.g. `"12 - Diciembre"`.
pub fn month_folder_name(month: u32) -> Option<String> {
    month_name(month).map(|name| format!("{:02} - {}", month, name))
}

/// The current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Checks the shared date invariants: year in [1900, current year],
/// month in [1, 12], and day (when present) in [1, 31].
pub fn is_valid_date(year: i32, month: u32, day: Option<u32>) -> bool {
    (MIN_YEAR..=current_year()).contains(&year)
        && (1..=12).contains(&month)
        && day.is_none_or(|d| (1..=31).contains(&d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_number_full_names() {
        assert_eq!(month_number("enero"), Some(1));
        assert_eq!(month_number("Junio"), Some(6));
        assert_eq!(month_number("DICIEMBRE"), Some(12));
    }

    #[test]
    fn test_month_number_abbreviations() {
        assert_eq!(month_number("abr"), Some(4));
        assert_eq!(month_number("Ago."), Some(8));
        assert_eq!(month_number("set"), Some(9));
        assert_eq!(month_number("setiembre"), Some(9));
    }

    #[test]
    fn test_month_number_unknown() {
        assert_eq!(month_number("december"), None);
        assert_eq!(month_number(""), None);
    }

    #[test]
    fn test_month_folder_name_is_zero_padded() {
        assert_eq!(month_folder_name(3).as_deref(), Some("03 - Marzo"));
        assert_eq!(month_folder_name(12).as_deref(), Some("12 - Diciembre"));
        assert_eq!(month_folder_name(13), None);
    }

    #[test]
    fn test_is_valid_date_bounds() {
        assert!(is_valid_date(1900, 1, Some(1)));
        assert!(is_valid_date(current_year(), 12, None));
        assert!(!is_valid_date(1899, 5, None));
        assert!(!is_valid_date(current_year() + 1, 5, None));
        assert!(!is_valid_date(1990, 0, None));
        assert!(!is_valid_date(1990, 5, Some(32)));
        assert!(!is_valid_date(1990, 5, Some(0)));
    }
}
