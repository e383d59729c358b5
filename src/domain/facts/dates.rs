//! Date-phrase parsing for trip dates.
//!
//! Turns phrases like "September 5-7", "first weekend of September", or
//! "Saturday September 6" into concrete dates. A single named weekday is
//! never expanded into a weekend span; only an explicit "weekend" phrase
//! triggers the Fri-Sun expansion.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use once_cell::sync::Lazy;

/// Parsed date information handed to the trip-structure detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInfo {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    /// True only when the utterance contained an explicit "weekend" phrase.
    pub explicit_weekend: bool,
}

static MONTHS: Lazy<Vec<(&'static str, u32)>> = Lazy::new(|| {
    vec![
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("april", 4),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("september", 9),
        ("october", 10),
        ("november", 11),
        ("december", 12),
    ]
});

static WEEKDAYS: Lazy<Vec<(&'static str, Weekday)>> = Lazy::new(|| {
    vec![
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ]
});

/// Parses a date phrase from a user utterance.
///
/// Returns `None` when no date-like content is recognized; the caller
/// treats that as a recoverable clarification case, never an error.
pub fn parse_date_phrase(text: &str, today: NaiveDate) -> Option<DateInfo> {
    let tokens = tokenize(text);
    let explicit_weekend = tokens.iter().any(|t| t == "weekend");

    if explicit_weekend {
        return parse_weekend_phrase(&tokens, today).map(|(start, end)| DateInfo {
            start,
            end: Some(end),
            explicit_weekend: true,
        });
    }

    if tokens.iter().any(|t| t == "tonight" || t == "today") {
        return Some(DateInfo {
            start: today,
            end: None,
            explicit_weekend: false,
        });
    }
    if tokens.iter().any(|t| t == "tomorrow") {
        return Some(DateInfo {
            start: today + Days::new(1),
            end: None,
            explicit_weekend: false,
        });
    }

    let dates = collect_dates(&tokens, today);
    match dates.as_slice() {
        [] => {
            // A bare weekday name resolves to its next occurrence, and
            // stays a single day.
            let weekday = tokens.iter().find_map(|t| match_weekday(t))?;
            Some(DateInfo {
                start: next_weekday(today, weekday),
                end: None,
                explicit_weekend: false,
            })
        }
        [single] => Some(DateInfo {
            start: *single,
            end: None,
            explicit_weekend: false,
        }),
        [first, second, ..] => {
            let (start, end) = if first <= second {
                (*first, *second)
            } else {
                (*second, *first)
            };
            Some(DateInfo {
                start,
                end: Some(end),
                explicit_weekend: false,
            })
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(|s| s.trim_matches('-').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn match_month(token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .find(|(name, _)| name.starts_with(token) && token.len() >= 3 || token == *name)
        .map(|(_, num)| *num)
}

fn match_weekday(token: &str) -> Option<Weekday> {
    if token.len() < 3 {
        return None;
    }
    WEEKDAYS
        .iter()
        .find(|(name, _)| name.starts_with(token))
        .map(|(_, wd)| *wd)
}

/// Strips ordinal suffixes ("5th" -> 5) and parses a day-of-month.
fn parse_day(token: &str) -> Option<u32> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() != token.len() && !token.ends_with("st") && !token.ends_with("nd") && !token.ends_with("rd") && !token.ends_with("th") {
        return None;
    }
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn parse_year(token: &str) -> Option<i32> {
    let year: i32 = token.parse().ok()?;
    (2000..=2100).contains(&year).then_some(year)
}

/// Resolves a month/day without a year to its next occurrence.
fn resolve_year(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut date = today;
    loop {
        date = date + Days::new(1);
        if date.weekday() == weekday {
            return date;
        }
    }
}

/// Collects explicit dates: ISO tokens, month-day(-year) groups, and
/// month day-range groups ("september 5-7").
fn collect_dates(tokens: &[String], today: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let explicit_year = tokens.iter().find_map(|t| parse_year(t));

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];

        // ISO format, e.g. 2025-09-05
        if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
            dates.push(date);
            i += 1;
            continue;
        }

        if let Some(month) = match_month(token) {
            if let Some(next) = tokens.get(i + 1) {
                // Day range: "september 5-7"
                if let Some((lo, hi)) = next.split_once('-') {
                    if let (Some(lo), Some(hi)) = (parse_day(lo), parse_day(hi)) {
                        if let (Some(start), Some(end)) = (
                            resolve_month_day(month, lo, explicit_year, today),
                            resolve_month_day(month, hi, explicit_year, today),
                        ) {
                            dates.push(start);
                            dates.push(end);
                            i += 2;
                            continue;
                        }
                    }
                }
                // Single day: "september 5" / "september 5th 2025"
                if let Some(day) = parse_day(next) {
                    if let Some(date) = resolve_month_day(month, day, explicit_year, today) {
                        dates.push(date);
                        i += 2;
                        continue;
                    }
                }
            }
        }

        i += 1;
    }

    dates
}

fn resolve_month_day(
    month: u32,
    day: u32,
    explicit_year: Option<i32>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match explicit_year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => resolve_year(month, day, today),
    }
}

/// Handles "weekend" phrases: ordinal weekends of a month, the weekend
/// containing a given date, or the upcoming weekend. Always Fri-Sun.
fn parse_weekend_phrase(tokens: &[String], today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    // "first|second|third|fourth|last weekend of september"
    if let Some(pos) = tokens.iter().position(|t| t == "weekend") {
        let ordinal = if pos > 0 { ordinal_index(&tokens[pos - 1]) } else { None };
        let month = tokens[pos..].iter().find_map(|t| match_month(t));

        if let (Some(nth), Some(month)) = (ordinal, month) {
            let friday = nth_weekday_of_month(month, Weekday::Fri, nth, today)?;
            return Some((friday, friday + Days::new(2)));
        }
    }

    // "the weekend of september 5" - snap to the Fri-Sun span around it.
    let dates = collect_dates(tokens, today);
    if let Some(date) = dates.first() {
        let friday = friday_of_weekend_containing(*date);
        return Some((friday, friday + Days::new(2)));
    }

    // Bare "this weekend" / "next weekend". On a Sat/Sun this still means
    // the weekend currently underway.
    let mut friday = friday_of_weekend_containing(today);
    if tokens.iter().any(|t| t == "next") {
        friday = friday + Days::new(7);
    }
    Some((friday, friday + Days::new(2)))
}

fn ordinal_index(token: &str) -> Option<u32> {
    match token {
        "first" | "1st" => Some(1),
        "second" | "2nd" => Some(2),
        "third" | "3rd" => Some(3),
        "fourth" | "4th" => Some(4),
        "last" => Some(u32::MAX),
        _ => None,
    }
}

/// Friday of the weekend containing the date. Fri/Sat/Sun map to their own
/// Friday; any other weekday maps to the upcoming Friday.
fn friday_of_weekend_containing(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Fri => date,
        Weekday::Sat => date - Days::new(1),
        Weekday::Sun => date - Days::new(2),
        wd => {
            let offset = (Weekday::Fri.num_days_from_monday() + 7 - wd.num_days_from_monday()) % 7;
            date + Days::new(offset as u64)
        }
    }
}

/// The nth given weekday of the month's next occurrence.
/// `u32::MAX` selects the last occurrence.
fn nth_weekday_of_month(
    month: u32,
    weekday: Weekday,
    nth: u32,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let year = if month < today.month() || (month == today.month() && today.day() > 21) {
        today.year() + 1
    } else {
        today.year()
    };

    let mut occurrences = Vec::new();
    for day in 1..=31 {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if date.weekday() == weekday {
                occurrences.push(date);
            }
        }
    }

    if nth == u32::MAX {
        occurrences.last().copied()
    } else {
        occurrences.get((nth as usize).checked_sub(1)?).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        // A Wednesday in late August.
        NaiveDate::from_ymd_opt(2025, 8, 27).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod single_dates {
        use super::*;

        #[test]
        fn parses_iso_date() {
            let info = parse_date_phrase("we arrive 2025-09-05", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
            assert_eq!(info.end, None);
        }

        #[test]
        fn parses_month_day() {
            let info = parse_date_phrase("september 5", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
        }

        #[test]
        fn parses_ordinal_day_suffix() {
            let info = parse_date_phrase("September 5th", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
        }

        #[test]
        fn rolls_past_dates_to_next_year() {
            let info = parse_date_phrase("march 14", today()).unwrap();
            assert_eq!(info.start, date(2026, 3, 14));
        }

        #[test]
        fn honors_explicit_year() {
            let info = parse_date_phrase("September 5 2026", today()).unwrap();
            assert_eq!(info.start, date(2026, 9, 5));
        }

        #[test]
        fn tonight_is_today() {
            let info = parse_date_phrase("just tonight", today()).unwrap();
            assert_eq!(info.start, today());
            assert_eq!(info.end, None);
        }
    }

    mod ranges {
        use super::*;

        #[test]
        fn parses_hyphenated_day_range() {
            let info = parse_date_phrase("september 5-7", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
            assert_eq!(info.end, Some(date(2025, 9, 7)));
            assert!(!info.explicit_weekend);
        }

        #[test]
        fn parses_two_full_dates() {
            let info = parse_date_phrase("from september 5 to september 7", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
            assert_eq!(info.end, Some(date(2025, 9, 7)));
        }

        #[test]
        fn orders_reversed_dates() {
            let info = parse_date_phrase("september 7 back from september 5", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
            assert_eq!(info.end, Some(date(2025, 9, 7)));
        }
    }

    mod weekday_vs_weekend {
        use super::*;

        #[test]
        fn single_named_weekday_with_date_stays_single_day() {
            // Load-bearing: a weekday mention must NOT expand to a weekend.
            let info = parse_date_phrase("Saturday September 6", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 6));
            assert_eq!(info.end, None);
            assert!(!info.explicit_weekend);
        }

        #[test]
        fn bare_weekday_resolves_to_next_occurrence() {
            let info = parse_date_phrase("saturday", today()).unwrap();
            assert_eq!(info.start, date(2025, 8, 30));
            assert_eq!(info.end, None);
        }

        #[test]
        fn first_weekend_of_september_is_fri_through_sun() {
            let info = parse_date_phrase("first weekend of september", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
            assert_eq!(info.end, Some(date(2025, 9, 7)));
            assert!(info.explicit_weekend);
        }

        #[test]
        fn weekend_of_a_date_snaps_to_its_friday() {
            let info = parse_date_phrase("the weekend of september 6", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
            assert_eq!(info.end, Some(date(2025, 9, 7)));
            assert!(info.explicit_weekend);
        }

        #[test]
        fn this_weekend_uses_upcoming_friday() {
            let info = parse_date_phrase("this weekend", today()).unwrap();
            assert_eq!(info.start, date(2025, 8, 29));
            assert_eq!(info.end, Some(date(2025, 8, 31)));
        }

        #[test]
        fn next_weekend_skips_a_week() {
            let info = parse_date_phrase("next weekend", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 5));
        }

        #[test]
        fn last_weekend_of_month() {
            let info = parse_date_phrase("last weekend of september", today()).unwrap();
            assert_eq!(info.start, date(2025, 9, 26));
            assert_eq!(info.end, Some(date(2025, 9, 28)));
        }
    }

    mod unparsable {
        use super::*;

        #[test]
        fn returns_none_without_date_content() {
            assert!(parse_date_phrase("we want steak and golf", today()).is_none());
        }

        #[test]
        fn returns_none_for_nonsense_numbers() {
            assert!(parse_date_phrase("september 45", today()).is_none());
        }
    }
}
