//! Filename classification for periodical archives.
//!
//! Archive names carry the publication ("diary") and the issue date, written in
//! a handful of conventions:
//!
//! - `La Tercera - 11 de diciembre de 1989.zip`
//! - `TV Grama - Diciembre 1989.rar`
//! - `1989-12-11-La Tercera.7z`, `1989_12_11_La Tercera.7z`, `19891211 La Tercera.zip`
//! - `La Tercera-1989-12-11.zip`
//!
//! Parsing tries an ordered list of strategies. A strategy only wins when its
//! captures also pass validation; otherwise the next one is tried. A name that
//! no strategy accepts is not an error, the file is simply not processable.
//!
//! # Examples
//!
//! ```
//! use hemeroteca::filename_parser;
//!
//! let meta = filename_parser::parse("La Tercera - 11 de diciembre de 1989.zip").unwrap();
//! assert_eq!(meta.diary(), "La Tercera");
//! assert_eq!((meta.year(), meta.month(), meta.day()), (1989, 12, Some(11)));
//!
//! assert!(filename_parser::parse("randomfile.txt").is_none());
//! ```

use crate::calendar;
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

/// Publication and issue date inferred from an archive's file name.
///
/// Values only come out of [`parse`] or [`FileMetadata::new`], both of which
/// enforce the date ranges and a non-empty diary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    year: i32,
    month: u32,
    diary: String,
    day: Option<u32>,
}

impl FileMetadata {
    /// Builds validated metadata. The diary is trimmed; `None` is returned when
    /// it ends up empty or when the date is out of range.
    pub fn new(year: i32, month: u32, diary: &str, day: Option<u32>) -> Option<Self> {
        let diary = clean_diary(diary);
        if diary.is_empty() || !calendar::is_valid_date(year, month, day) {
            return None;
        }
        Some(Self {
            year,
            month,
            diary,
            day,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn diary(&self) -> &str {
        &self.diary
    }

    /// The date part alone, for date-only resolution.
    pub fn date(&self) -> DateInfo {
        DateInfo {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// A calendar date detected in a file name, without any publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateInfo {
    year: i32,
    month: u32,
    day: Option<u32>,
}

impl DateInfo {
    /// Builds a validated date, or `None` when any component is out of range.
    pub fn new(year: i32, month: u32, day: Option<u32>) -> Option<Self> {
        calendar::is_valid_date(year, month, day).then_some(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }
}

/// A single naming convention: a pure function from a bare name to metadata.
type Strategy = fn(&str) -> Option<FileMetadata>;

/// Strategies in priority order. The first one that matches and validates wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("day-month-name", parse_day_month_name),
    ("month-name", parse_month_name),
    ("date-prefix", parse_date_prefix),
    ("date-suffix", parse_date_suffix),
];

static DAY_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<diary>.+?)\s*-\s*(?P<day>\d{1,2})\s+de\s+(?P<month>\p{L}+)\.?\s+(?:de|del)\s+(?P<year>\d{4})$",
    )
    .expect("valid regex")
});

static MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<diary>.+?)\s*-\s*(?P<month>\p{L}+)\.?\s+(?:de\s+)?(?P<year>\d{4})$")
        .expect("valid regex")
});

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<year>\d{4})[-_](?P<month>\d{1,2})[-_](?P<day>\d{1,2})[-_\s]+(?P<diary>.+)$")
        .expect("valid regex")
});

static COMPACT_DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})[-_\s]+(?P<diary>.+)$")
        .expect("valid regex")
});

static DATE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<diary>.+?)[-_\s]+(?P<year>\d{4})[-_](?P<month>\d{1,2})[-_](?P<day>\d{1,2})$")
        .expect("valid regex")
});

/// Parses an archive name (with or without extension) into [`FileMetadata`].
///
/// Returns `None` when no naming convention both matches and validates.
pub fn parse(file_name: &str) -> Option<FileMetadata> {
    let stem = strip_extension(file_name.trim()).trim();
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(stem);
        if found.is_some() {
            log::debug!("{:?} matched strategy {}", file_name, name);
        }
        found
    })
}

fn parse_day_month_name(stem: &str) -> Option<FileMetadata> {
    let caps = DAY_MONTH_NAME.captures(stem)?;
    let month = calendar::month_number(&caps["month"])?;
    FileMetadata::new(
        number(&caps, "year")?,
        month,
        &caps["diary"],
        Some(number(&caps, "day")?),
    )
}

fn parse_month_name(stem: &str) -> Option<FileMetadata> {
    let caps = MONTH_NAME.captures(stem)?;
    let month = calendar::month_number(&caps["month"])?;
    FileMetadata::new(number(&caps, "year")?, month, &caps["diary"], None)
}

fn parse_date_prefix(stem: &str) -> Option<FileMetadata> {
    [&*DATE_PREFIX, &*COMPACT_DATE_PREFIX]
        .into_iter()
        .find_map(|re| numeric_metadata(re.captures(stem)?))
}

fn parse_date_suffix(stem: &str) -> Option<FileMetadata> {
    numeric_metadata(DATE_SUFFIX.captures(stem)?)
}

fn numeric_metadata(caps: Captures<'_>) -> Option<FileMetadata> {
    FileMetadata::new(
        number(&caps, "year")?,
        number(&caps, "month")?,
        &caps["diary"],
        Some(number(&caps, "day")?),
    )
}

static DATE_DAY_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|\D)(?P<day>\d{1,2})\s+de\s+(?P<month>\p{L}+)\.?\s+(?:de|del)\s+(?P<year>\d{4})(?:\D|$)",
    )
    .expect("valid regex")
});

static DATE_ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(?P<year>\d{4})[-_.](?P<month>\d{1,2})[-_.](?P<day>\d{1,2})(?:\D|$)")
        .expect("valid regex")
});

static DATE_COMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})(?:\D|$)")
        .expect("valid regex")
});

static DATE_DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(?P<day>\d{1,2})[-_.](?P<month>\d{1,2})[-_.](?P<year>\d{4})(?:\D|$)")
        .expect("valid regex")
});

static DATE_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\p{L}])(?P<month>\p{L}+)\.?\s+(?:de\s+)?(?P<year>\d{4})(?:\D|$)")
        .expect("valid regex")
});

/// Detects a calendar date anywhere in a file name, ignoring any publication.
///
/// Used by the date-only workflow. Forms are tried in order: `11 de diciembre
/// de 1989`, `1989-12-11`, `19891211`, `11-12-1989`, `Diciembre 1989`. Every
/// occurrence of a form is checked before moving on to the next form.
pub fn parse_date(file_name: &str) -> Option<DateInfo> {
    let stem = strip_extension(file_name.trim());

    let day_month_name = || {
        occurrences(&DATE_DAY_MONTH_NAME, stem).find_map(|caps| {
            DateInfo::new(
                number(&caps, "year")?,
                calendar::month_number(&caps["month"])?,
                Some(number(&caps, "day")?),
            )
        })
    };
    let numeric = |re: &Regex| {
        occurrences(re, stem).find_map(|caps| {
            DateInfo::new(
                number(&caps, "year")?,
                number(&caps, "month")?,
                Some(number(&caps, "day")?),
            )
        })
    };
    let month_name = || {
        occurrences(&DATE_MONTH_NAME, stem).find_map(|caps| {
            DateInfo::new(
                number(&caps, "year")?,
                calendar::month_number(&caps["month"])?,
                None,
            )
        })
    };

    day_month_name()
        .or_else(|| numeric(&*DATE_ISO))
        .or_else(|| numeric(&*DATE_COMPACT))
        .or_else(|| numeric(&*DATE_DAY_FIRST))
        .or_else(month_name)
}

/// Every match of `re` in `haystack`, including matches that overlap the
/// delimiter consumed by the previous one.
fn occurrences<'h>(re: &Regex, haystack: &'h str) -> impl Iterator<Item = Captures<'h>> {
    let mut start = 0;
    std::iter::from_fn(move || {
        if start > haystack.len() {
            return None;
        }
        let caps = re.captures_at(haystack, start)?;
        let found = caps.get(0)?.start();
        start = found
            + haystack[found..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
        Some(caps)
    })
}

/// Removes a trailing extension such as `.zip` or `.7z`.
///
/// Only a final dot followed by one to four ASCII alphanumerics, at least one
/// of them a letter, counts as an extension, so `Dic. 1989` and
/// `2020.01.15` are left intact.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &file_name[idx + 1..];
            let looks_like_extension = (1..=4).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic());
            if looks_like_extension {
                &file_name[..idx]
            } else {
                file_name
            }
        }
        _ => file_name,
    }
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, group: &str) -> Option<T> {
    caps.name(group)?.as_str().parse().ok()
}

fn clean_diary(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(year: i32, month: u32, diary: &str, day: Option<u32>) -> FileMetadata {
        FileMetadata::new(year, month, diary, day).expect("valid metadata")
    }

    #[test]
    fn test_parse_day_month_name() {
        assert_eq!(
            parse("La Tercera - 11 de diciembre de 1989.zip"),
            Some(meta(1989, 12, "La Tercera", Some(11)))
        );
    }

    #[test]
    fn test_parse_day_month_name_with_del() {
        assert_eq!(
            parse("El Mercurio - 3 de Enero del 1975.rar"),
            Some(meta(1975, 1, "El Mercurio", Some(3)))
        );
    }

    #[test]
    fn test_parse_month_name_without_day() {
        assert_eq!(
            parse("TV Grama - Diciembre 1989.rar"),
            Some(meta(1989, 12, "TV Grama", None))
        );
        assert_eq!(
            parse("TV Grama - dic 1989"),
            Some(meta(1989, 12, "TV Grama", None))
        );
    }

    #[test]
    fn test_parse_month_name_with_de() {
        assert_eq!(
            parse("Paula - Marzo de 1982.7z"),
            Some(meta(1982, 3, "Paula", None))
        );
    }

    #[test]
    fn test_parse_date_prefix_variants() {
        let expected = Some(meta(1989, 12, "La Tercera", Some(11)));
        assert_eq!(parse("1989-12-11-La Tercera.zip"), expected);
        assert_eq!(parse("1989_12_11_La Tercera.zip"), expected);
        assert_eq!(parse("19891211 La Tercera.zip"), expected);
        assert_eq!(parse("19891211-La Tercera.zip"), expected);
    }

    #[test]
    fn test_parse_date_suffix() {
        assert_eq!(
            parse("La Tercera-1989-12-11.7z"),
            Some(meta(1989, 12, "La Tercera", Some(11)))
        );
        assert_eq!(
            parse("Hoy_1990_4_2.zip"),
            Some(meta(1990, 4, "Hoy", Some(2)))
        );
    }

    #[test]
    fn test_invalid_month_name_falls_through() {
        // "Diciembr" is not a month; no other convention matches either.
        assert_eq!(parse("La Tercera - 11 de diciembr de 1989.zip"), None);
    }

    #[test]
    fn test_validation_failure_falls_through_to_next_strategy() {
        // Day 40 fails the prefix strategy; the trailing date is valid.
        assert_eq!(
            parse("1990-05-40-Diario-1990-05-04"),
            Some(meta(1990, 5, "1990-05-40-Diario", Some(4)))
        );
        // A syntactic match with a bad day never yields a partial result.
        assert_eq!(parse("Diario - 45 de mayo de 1990.zip"), None);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert_eq!(parse("Diario - 32 de enero de 1990.zip"), None);
        assert_eq!(parse("Diario - Enero 1899.zip"), None);
        assert_eq!(parse("1990-13-01-Diario.zip"), None);
        let next_year = calendar::current_year() + 1;
        assert_eq!(parse(&format!("Diario - Enero {}.zip", next_year)), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse("randomfile.txt"), None);
        assert_eq!(parse("randomfile"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse(" - Enero 1990.zip"), None);
    }

    #[test]
    fn test_round_trip_every_month_and_day() {
        for month in 1..=12 {
            let name = calendar::month_name_lower(month).unwrap();
            for day in [1, 15, 28, 31] {
                let file = format!("El Siglo - {} de {} de 1968.zip", day, name);
                assert_eq!(
                    parse(&file),
                    Some(meta(1968, month, "El Siglo", Some(day))),
                    "{}",
                    file
                );
            }
        }
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("a.zip"), "a");
        assert_eq!(strip_extension("a.7z"), "a");
        assert_eq!(strip_extension("Dic. 1989"), "Dic. 1989");
        assert_eq!(strip_extension("scan 2020.01.15"), "scan 2020.01.15");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("noext"), "noext");
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(
            parse_date("Portada 11 de diciembre de 1989.pdf"),
            DateInfo::new(1989, 12, Some(11))
        );
        assert_eq!(parse_date("scan_1989-12-11.jpg"), DateInfo::new(1989, 12, Some(11)));
        assert_eq!(parse_date("IMG_19891211_0001.jpg"), DateInfo::new(1989, 12, Some(11)));
        assert_eq!(parse_date("pagina 11.12.1989.tif"), DateInfo::new(1989, 12, Some(11)));
        assert_eq!(parse_date("Suplemento Diciembre 1989.pdf"), DateInfo::new(1989, 12, None));
    }

    #[test]
    fn test_parse_date_skips_invalid_candidates() {
        // "Informe de 1990" is not a month, "Abril 1990" is.
        assert_eq!(
            parse_date("Informe de 1990 - Abril 1990.pdf"),
            DateInfo::new(1990, 4, None)
        );
        // The separator after an invalid date also starts the next one.
        assert_eq!(
            parse_date("1989-13-01_1989-12-11.pdf"),
            DateInfo::new(1989, 12, Some(11))
        );
        assert_eq!(parse_date("notes.txt"), None);
        assert_eq!(parse_date("1234567.txt"), None);
    }

    #[test]
    fn test_metadata_date_matches_parse_date() {
        let meta = parse("La Tercera - 11 de diciembre de 1989.zip").unwrap();
        assert_eq!(
            Some(meta.date()),
            parse_date("La Tercera - 11 de diciembre de 1989.zip")
        );
    }
}
