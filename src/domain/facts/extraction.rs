//! Fact extraction - turns free text or structured selector input into
//! proposed fact updates.
//!
//! Extraction only proposes; the merge policy on [`super::TripFacts`]
//! decides what is applied. Unparsable input produces no update and a
//! clarification topic instead - recoverable, never fatal.

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use super::dates::{parse_date_phrase, DateInfo};
use super::trip_facts::{BudgetType, FactUpdate, FactValue, WildnessLevel};

/// Structured (non-free-text) input from host-side selectors.
#[derive(Debug, Clone)]
pub enum StructuredInput {
    /// A button choice that maps directly onto one fact.
    Fact(FactValue),
    /// A date-range picker result.
    DateRange {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    /// A budget selector result.
    Budget {
        amount: u32,
        budget_type: Option<BudgetType>,
    },
}

/// What one turn of extraction produced.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub updates: Vec<FactUpdate>,
    /// Parsed date info, carried separately so the trip-structure
    /// detector sees the weekend/single-day signals.
    pub date_info: Option<DateInfo>,
    /// User explicitly said they are ready to plan.
    pub readiness_signal: bool,
    /// User asked for a single event rather than a trip.
    pub single_event_signal: bool,
    /// User explicitly asked to repeat a venue.
    pub repeat_request: bool,
    /// The utterance verbatim, kept when it names a specific want so
    /// selection can honor it (repeat asks, strip club requests).
    pub explicit_request: Option<String>,
    /// Topic the engine should ask a clarifying question about.
    pub needs_clarification: Option<&'static str>,
}

static KNOWN_CITIES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "las vegas",
        "new orleans",
        "austin",
        "nashville",
        "miami",
        "scottsdale",
        "denver",
        "chicago",
        "montreal",
        "san diego",
        "atlantic city",
    ]
});

static ACTIVITY_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "golf",
        "steak",
        "bbq",
        "barbecue",
        "karaoke",
        "boat",
        "pool",
        "paintball",
        "casino",
        "poker",
        "axe throwing",
        "brewery",
        "whiskey",
        "strip club",
        "clubbing",
        "go karts",
        "fishing",
    ]
});

static READINESS_PHRASES: &[&str] = &[
    "ready to plan",
    "i'm ready",
    "im ready",
    "let's plan",
    "lets plan",
    "build the itinerary",
    "make the plan",
    "plan it",
];

static CORRECTION_PREFIXES: &[&str] = &["actually", "no,", "no ", "wait", "scratch that"];

static CORRECTION_PHRASES: &[&str] = &["i meant", "make that", "change that", "change it to"];

static SINGLE_EVENT_PHRASES: &[&str] = &[
    "single event",
    "just one event",
    "just the party",
    "one big night out",
    "no overnight",
];

static REPEAT_PHRASES: &[&str] = &["again", "same place", "go back to", "one more time"];

static GROUP_WORDS: &[&str] = &["people", "guys", "dudes", "friends", "groomsmen", "us"];

/// Extracts proposed fact updates from user input.
#[derive(Debug, Clone, Default)]
pub struct FactExtractor;

impl FactExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Converts a structured selector payload into confirmed updates.
    pub fn extract_structured(&self, input: StructuredInput) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();
        match input {
            StructuredInput::Fact(value) => {
                outcome
                    .updates
                    .push(FactUpdate::confirmed(value, "selector"));
            }
            StructuredInput::DateRange { start, end } => {
                outcome
                    .updates
                    .push(FactUpdate::confirmed(FactValue::StartDate(start), "selector"));
                if let Some(end) = end {
                    outcome
                        .updates
                        .push(FactUpdate::confirmed(FactValue::EndDate(end), "selector"));
                }
                outcome.date_info = Some(DateInfo {
                    start,
                    end,
                    explicit_weekend: false,
                });
            }
            StructuredInput::Budget { amount, budget_type } => {
                outcome
                    .updates
                    .push(FactUpdate::confirmed(FactValue::Budget(amount), "selector"));
                if let Some(bt) = budget_type {
                    outcome
                        .updates
                        .push(FactUpdate::confirmed(FactValue::BudgetType(bt), "selector"));
                }
            }
        }
        outcome
    }

    /// Extracts updates from a free-text utterance.
    ///
    /// When `expecting_first_wildness` is set, the whole utterance is
    /// interpreted as the wildness fact and nothing else - a deliberate
    /// one-time override on the first user turn.
    pub fn extract_text(
        &self,
        utterance: &str,
        expecting_first_wildness: bool,
        today: NaiveDate,
    ) -> ExtractionOutcome {
        let text = utterance.to_lowercase();
        let mut outcome = ExtractionOutcome::default();

        if expecting_first_wildness {
            outcome.updates.push(self.wildness_from_whole_utterance(&text));
            return outcome;
        }

        let correction = Self::is_correction(&text);

        outcome.readiness_signal = READINESS_PHRASES.iter().any(|p| text.contains(p));
        outcome.single_event_signal = SINGLE_EVENT_PHRASES.iter().any(|p| text.contains(p));
        outcome.repeat_request = REPEAT_PHRASES.iter().any(|p| text.contains(p));
        if outcome.repeat_request || text.contains("strip") {
            outcome.explicit_request = Some(utterance.to_string());
        }

        if let Some(update) = self.extract_destination(&text) {
            outcome.updates.push(update);
        }
        if let Some(update) = self.extract_group_size(&text) {
            outcome.updates.push(update);
        }
        if let Some((amount, budget_type)) = self.extract_budget(&text) {
            outcome
                .updates
                .push(FactUpdate::extracted(FactValue::Budget(amount), 0.95, "utterance"));
            if let Some(bt) = budget_type {
                outcome.updates.push(FactUpdate::extracted(
                    FactValue::BudgetType(bt),
                    0.95,
                    "utterance",
                ));
            }
        }
        if let Some(level) = Self::match_wildness(&text) {
            outcome.updates.push(FactUpdate::extracted(
                FactValue::Wildness(level),
                0.9,
                "utterance",
            ));
        }
        let activities = self.extract_activities(&text);
        if !activities.is_empty() {
            outcome.updates.push(FactUpdate::extracted(
                FactValue::Activities(activities),
                0.9,
                "utterance",
            ));
        }
        if let Some(update) = self.extract_relationship(&text) {
            outcome.updates.push(update);
        }
        if let Some(update) = self.extract_age_range(&text) {
            outcome.updates.push(update);
        }

        if let Some(info) = parse_date_phrase(&text, today) {
            outcome.updates.push(FactUpdate::extracted(
                FactValue::StartDate(info.start),
                0.95,
                "utterance",
            ));
            if let Some(end) = info.end {
                outcome.updates.push(FactUpdate::extracted(
                    FactValue::EndDate(end),
                    0.95,
                    "utterance",
                ));
            }
            outcome.date_info = Some(info);
        } else if Self::mentions_dates(&text) {
            outcome.needs_clarification = Some("dates");
        }

        if correction {
            for update in &mut outcome.updates {
                update.correction = true;
            }
        }

        if outcome.updates.is_empty()
            && outcome.needs_clarification.is_none()
            && text.chars().any(|c| c.is_ascii_digit())
            && !outcome.readiness_signal
        {
            // Numbers we could not place anywhere - ask rather than guess.
            outcome.needs_clarification = Some("numbers");
        }

        outcome
    }

    fn is_correction(text: &str) -> bool {
        CORRECTION_PREFIXES.iter().any(|p| text.starts_with(p))
            || CORRECTION_PHRASES.iter().any(|p| text.contains(p))
    }

    fn wildness_from_whole_utterance(&self, text: &str) -> FactUpdate {
        match Self::match_wildness(text) {
            Some(level) => FactUpdate::confirmed(FactValue::Wildness(level), "first_response"),
            // Nothing recognizable; suggest the middle and let a later
            // turn firm it up.
            None => FactUpdate::extracted(
                FactValue::Wildness(WildnessLevel::Medium),
                0.4,
                "first_response",
            ),
        }
    }

    fn match_wildness(text: &str) -> Option<WildnessLevel> {
        const WILD: &[&str] = &["wild", "crazy", "all out", "no limits", "rage"];
        const MILD: &[&str] = &["mild", "chill", "low key", "low-key", "relaxed", "tame", "classy"];
        const MEDIUM: &[&str] = &["medium", "balanced", "middle", "bit of both", "mix of both"];

        if WILD.iter().any(|k| text.contains(k)) {
            Some(WildnessLevel::Wild)
        } else if MILD.iter().any(|k| text.contains(k)) {
            Some(WildnessLevel::Mild)
        } else if MEDIUM.iter().any(|k| text.contains(k)) {
            Some(WildnessLevel::Medium)
        } else {
            None
        }
    }

    fn extract_destination(&self, text: &str) -> Option<FactUpdate> {
        for city in KNOWN_CITIES.iter() {
            if let Some(pos) = text.find(city) {
                // "in austin" / "to austin" reads as a deliberate choice;
                // a bare mention is only an assumption.
                let before = text[..pos].trim_end();
                let deliberate = before.ends_with("in")
                    || before.ends_with("to")
                    || before.ends_with("at")
                    || before.is_empty();
                let confidence = if deliberate { 0.95 } else { 0.75 };
                let titled = title_case(city);
                return Some(FactUpdate::extracted(
                    FactValue::Destination(titled),
                    confidence,
                    "utterance",
                ));
            }
        }
        None
    }

    fn extract_group_size(&self, text: &str) -> Option<FactUpdate> {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()))
            .collect();
        for (i, token) in tokens.iter().enumerate() {
            let Ok(n) = token.trim_matches(|c: char| !c.is_ascii_digit()).parse::<u32>() else {
                continue;
            };
            if !(1..=100).contains(&n) {
                continue;
            }
            // "8 of us", "8 people", "party of 8"
            let following = tokens.get(i + 1).copied().unwrap_or("");
            let second = tokens.get(i + 2).copied().unwrap_or("");
            let preceded_by_party_of = i >= 2 && tokens[i - 2] == "party" && tokens[i - 1] == "of";
            let followed_by_group_word = GROUP_WORDS.contains(&following)
                || (following == "of" && GROUP_WORDS.contains(&second));

            if preceded_by_party_of || followed_by_group_word {
                return Some(FactUpdate::extracted(
                    FactValue::GroupSize(n),
                    0.95,
                    "utterance",
                ));
            }
        }
        None
    }

    fn extract_budget(&self, text: &str) -> Option<(u32, Option<BudgetType>)> {
        let budget_type = if text.contains("per person")
            || text.contains("each")
            || text.contains("a head")
            || text.contains("per head")
        {
            Some(BudgetType::PerPerson)
        } else if text.contains("total") || text.contains("all in") || text.contains("altogether") {
            Some(BudgetType::Total)
        } else {
            None
        };

        for raw in text.split_whitespace() {
            let token = raw.trim_matches(|c: char| c == ',' || c == '.');
            // "$3000" / "$3,000"
            if let Some(stripped) = token.strip_prefix('$') {
                if let Ok(n) = stripped.replace(',', "").parse::<u32>() {
                    return Some((n, budget_type));
                }
            }
            // "3k" / "2k"
            if let Some(stripped) = token.strip_suffix('k') {
                if let Ok(n) = stripped.parse::<u32>() {
                    return Some((n * 1000, budget_type));
                }
            }
        }

        // "3000 dollars" / "3000 bucks"
        let tokens: Vec<&str> = text.split_whitespace().collect();
        for (i, token) in tokens.iter().enumerate() {
            if let Ok(n) = token.replace(',', "").parse::<u32>() {
                let next = tokens.get(i + 1).copied().unwrap_or("");
                if next.starts_with("dollar") || next == "bucks" || next == "usd" {
                    return Some((n, budget_type));
                }
            }
        }

        None
    }

    fn extract_activities(&self, text: &str) -> Vec<String> {
        ACTIVITY_KEYWORDS
            .iter()
            .filter(|k| text.contains(*k))
            .map(|k| k.to_string())
            .collect()
    }

    fn extract_relationship(&self, text: &str) -> Option<FactUpdate> {
        const RELATIONSHIPS: &[(&str, &str)] = &[
            ("my brother", "brother"),
            ("best friend", "best friend"),
            ("my cousin", "cousin"),
            ("college", "college friends"),
            ("coworker", "coworkers"),
        ];
        RELATIONSHIPS.iter().find(|(k, _)| text.contains(k)).map(|(_, v)| {
            FactUpdate::extracted(FactValue::Relationship(v.to_string()), 0.85, "utterance")
        })
    }

    fn extract_age_range(&self, text: &str) -> Option<FactUpdate> {
        // "in our 30s" style.
        for decade in ["20s", "30s", "40s", "50s"] {
            if text.contains(&format!("our {}", decade)) {
                let lo: u32 = decade[..1].parse().unwrap_or(2) * 10;
                return Some(FactUpdate::extracted(
                    FactValue::AgeRange(format!("{}-{}", lo, lo + 9)),
                    0.85,
                    "utterance",
                ));
            }
        }
        None
    }

    fn mentions_dates(text: &str) -> bool {
        const DATE_WORDS: &[&str] = &[
            "january", "february", "march", "april", "june", "july", "august", "september",
            "october", "november", "december", "monday", "tuesday", "wednesday", "thursday",
            "friday", "saturday", "sunday", "weekend", "date",
        ];
        DATE_WORDS.iter().any(|w| text.contains(w))
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
