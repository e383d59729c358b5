//! Trip structure detection.
//!
//! Classifies the requested dates into one of four shapes and assigns
//! each day the time slots worth filling. Arrival days only get evening
//! slots, departure days only a morning slot.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A fillable block of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl TimeSlot {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
            Self::LateNight => "Late night",
        }
    }
}

const FULL_DAY: [TimeSlot; 5] = [
    TimeSlot::Morning,
    TimeSlot::Afternoon,
    TimeSlot::Evening,
    TimeSlot::Night,
    TimeSlot::LateNight,
];

const ARRIVAL: [TimeSlot; 2] = [TimeSlot::Evening, TimeSlot::Night];

const DEPARTURE: [TimeSlot; 1] = [TimeSlot::Morning];

const SINGLE_NIGHT: [TimeSlot; 4] = [
    TimeSlot::Afternoon,
    TimeSlot::Evening,
    TimeSlot::Night,
    TimeSlot::LateNight,
];

/// One day of the trip and the slots to fill for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDescriptor {
    pub date: NaiveDate,
    pub label: String,
    pub slots: Vec<TimeSlot>,
}

impl DayDescriptor {
    fn new(date: NaiveDate, label: impl Into<String>, slots: &[TimeSlot]) -> Self {
        Self {
            date,
            label: label.into(),
            slots: slots.to_vec(),
        }
    }
}

/// The overall shape of the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TripStructure {
    /// One themed party block, no overnight program.
    SingleEvent {
        date: NaiveDate,
        themes: Vec<String>,
    },
    /// One full night out.
    SingleNight { day: DayDescriptor },
    /// Classic 2-3 day weekend starting Thursday or Friday.
    Weekend { days: Vec<DayDescriptor> },
    /// Anything longer or off the weekend grid.
    Extended { days: Vec<DayDescriptor> },
}

impl TripStructure {
    /// Classifies the requested dates.
    ///
    /// `single_event` wins over everything: the user asked for one
    /// party block, not a trip. Without an end date (or with end ==
    /// start) the trip is a single night. A 2-3 day span starting
    /// Thursday or Friday and ending Saturday or Sunday is a weekend;
    /// any other multi-day span is extended.
    pub fn detect(
        start: NaiveDate,
        end: Option<NaiveDate>,
        single_event: bool,
        themes: Vec<String>,
    ) -> Self {
        if single_event {
            return Self::SingleEvent { date: start, themes };
        }

        let end = match end {
            Some(end) if end > start => end,
            _ => {
                return Self::SingleNight {
                    day: DayDescriptor::new(start, day_name(start), &SINGLE_NIGHT),
                }
            }
        };

        let span = (end - start).num_days() + 1;
        let days = build_days(start, end);

        let weekend_shaped = (2..=3).contains(&span)
            && matches!(start.weekday(), Weekday::Thu | Weekday::Fri)
            && matches!(end.weekday(), Weekday::Sat | Weekday::Sun);

        if weekend_shaped {
            Self::Weekend { days }
        } else {
            Self::Extended { days }
        }
    }

    /// The days to plan, in order. A single event has no per-day slot
    /// list; it is described by its theme options instead.
    pub fn days(&self) -> Vec<DayDescriptor> {
        match self {
            Self::SingleEvent { .. } => vec![],
            Self::SingleNight { day } => vec![day.clone()],
            Self::Weekend { days } | Self::Extended { days } => days.clone(),
        }
    }

    /// Days worth of slot-filling. Zero for a single event - that shape
    /// is a flat list of theme options, not a day program.
    pub fn total_days(&self) -> usize {
        match self {
            Self::SingleEvent { .. } => 0,
            Self::SingleNight { .. } => 1,
            Self::Weekend { days } | Self::Extended { days } => days.len(),
        }
    }

    /// Theme/package options for a single event; empty for trips.
    pub fn theme_options(&self) -> &[String] {
        match self {
            Self::SingleEvent { themes, .. } => themes,
            _ => &[],
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::SingleEvent { .. } => "single event",
            Self::SingleNight { .. } => "single night",
            Self::Weekend { .. } => "weekend",
            Self::Extended { .. } => "extended trip",
        }
    }
}

fn build_days(start: NaiveDate, end: NaiveDate) -> Vec<DayDescriptor> {
    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        let descriptor = if date == start {
            DayDescriptor::new(date, format!("{} arrival", day_name(date)), &ARRIVAL)
        } else if date == end {
            DayDescriptor::new(date, format!("{} departure", day_name(date)), &DEPARTURE)
        } else {
            DayDescriptor::new(date, day_name(date), &FULL_DAY)
        };
        days.push(descriptor);
        date = date + Days::new(1);
    }
    days
}

fn day_name(date: NaiveDate) -> String {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod classification {
        use super::*;

        #[test]
        fn friday_to_sunday_is_a_weekend() {
            // 2025-09-05 is a Friday.
            let s = TripStructure::detect(date(2025, 9, 5), Some(date(2025, 9, 7)), false, vec![]);
            assert!(matches!(s, TripStructure::Weekend { .. }));
            assert_eq!(s.total_days(), 3);
        }

        #[test]
        fn thursday_to_saturday_is_a_weekend() {
            let s = TripStructure::detect(date(2025, 9, 4), Some(date(2025, 9, 6)), false, vec![]);
            assert!(matches!(s, TripStructure::Weekend { .. }));
        }

        #[test]
        fn saturday_to_sunday_is_not_a_weekend() {
            // Right length, wrong start weekday.
            let s = TripStructure::detect(date(2025, 9, 6), Some(date(2025, 9, 7)), false, vec![]);
            assert!(matches!(s, TripStructure::Extended { .. }));
        }

        #[test]
        fn four_days_is_extended_even_from_thursday() {
            let s = TripStructure::detect(date(2025, 9, 4), Some(date(2025, 9, 7)), false, vec![]);
            assert!(matches!(s, TripStructure::Extended { .. }));
            assert_eq!(s.total_days(), 4);
        }

        #[test]
        fn no_end_date_is_a_single_night() {
            let s = TripStructure::detect(date(2025, 9, 6), None, false, vec![]);
            assert!(matches!(s, TripStructure::SingleNight { .. }));
        }

        #[test]
        fn same_start_and_end_is_a_single_night() {
            let s = TripStructure::detect(date(2025, 9, 6), Some(date(2025, 9, 6)), false, vec![]);
            assert!(matches!(s, TripStructure::SingleNight { .. }));
        }

        #[test]
        fn single_event_flag_wins_over_dates() {
            let s = TripStructure::detect(
                date(2025, 9, 5),
                Some(date(2025, 9, 7)),
                true,
                vec!["casino".to_string()],
            );
            match &s {
                TripStructure::SingleEvent { themes, .. } => {
                    assert_eq!(themes, &vec!["casino".to_string()])
                }
                other => panic!("expected single event, got {:?}", other),
            }
            assert_eq!(s.theme_options(), ["casino".to_string()]);
        }

        #[test]
        fn single_event_has_no_day_program() {
            let s = TripStructure::detect(date(2025, 9, 6), None, true, vec!["casino".to_string()]);
            assert_eq!(s.total_days(), 0);
            assert!(s.days().is_empty());
        }
    }

    mod slots {
        use super::*;

        #[test]
        fn arrival_day_gets_evening_slots_only() {
            let s = TripStructure::detect(date(2025, 9, 5), Some(date(2025, 9, 7)), false, vec![]);
            let days = s.days();
            assert_eq!(days[0].slots, vec![TimeSlot::Evening, TimeSlot::Night]);
            assert!(days[0].label.contains("arrival"));
        }

        #[test]
        fn departure_day_gets_morning_only() {
            let s = TripStructure::detect(date(2025, 9, 5), Some(date(2025, 9, 7)), false, vec![]);
            let days = s.days();
            assert_eq!(days[2].slots, vec![TimeSlot::Morning]);
            assert!(days[2].label.contains("departure"));
        }

        #[test]
        fn middle_day_gets_the_full_set() {
            let s = TripStructure::detect(date(2025, 9, 5), Some(date(2025, 9, 7)), false, vec![]);
            let days = s.days();
            assert_eq!(days[1].slots.len(), 5);
        }

        #[test]
        fn single_night_skips_the_morning() {
            let s = TripStructure::detect(date(2025, 9, 6), None, false, vec![]);
            let days = s.days();
            assert_eq!(
                days[0].slots,
                vec![
                    TimeSlot::Afternoon,
                    TimeSlot::Evening,
                    TimeSlot::Night,
                    TimeSlot::LateNight
                ]
            );
        }
    }
}
