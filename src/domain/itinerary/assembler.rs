//! Itinerary assembly - folds day selections into plans and renders
//! the final narrative.

use std::fmt::Write as _;

use crate::domain::facts::TripFacts;
use crate::domain::selection::DaySelection;

use super::day_plan::{DayByDayPlanning, DayPlan, ServiceSelection};
use super::trip_structure::{DayDescriptor, TripStructure};

/// Builds day plans out of selections and renders the finished plan.
#[derive(Debug, Clone, Default)]
pub struct ItineraryAssembler;

impl ItineraryAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Converts one day's selection into a plan for that day.
    pub fn assemble_day(&self, descriptor: DayDescriptor, selection: DaySelection) -> DayPlan {
        let selections = selection
            .selected_services
            .into_iter()
            .map(|s| ServiceSelection {
                service_id: s.service_id,
                name: s.name,
                category: s.category,
                slot: s.slot,
                reason: s.reason,
            })
            .collect();

        DayPlan {
            descriptor,
            theme: selection.day_theme,
            selections,
            alternatives: selection.alternative_options,
            logistics_notes: selection.logistics_notes,
        }
    }

    /// Renders the finished plan as a narrative.
    pub fn render_narrative(&self, planning: &DayByDayPlanning, facts: &TripFacts) -> String {
        let destination = facts
            .destination()
            .value()
            .cloned()
            .unwrap_or_else(|| "your destination".to_string());

        let mut out = String::new();
        match planning.structure() {
            // A single event is a flat menu of theme packages, not a
            // day-by-day program.
            TripStructure::SingleEvent { date, themes } => {
                let _ = writeln!(out, "The {} party plan ({}):", destination, date);
                if themes.is_empty() {
                    let _ = writeln!(
                        out,
                        "  Give me a theme (casino, boat, whiskey...) and I'll build the package."
                    );
                }
                for theme in themes {
                    let _ = writeln!(out, "  Option: {} package", theme);
                }
                return out;
            }
            TripStructure::SingleNight { .. } => {
                let _ = writeln!(out, "Your big night in {}:", destination);
            }
            TripStructure::Weekend { .. } => {
                let _ = writeln!(out, "Your {} weekend:", destination);
            }
            TripStructure::Extended { .. } => {
                let _ = writeln!(out, "Your {} trip:", destination);
            }
        }

        for day in planning.days() {
            let _ = writeln!(out);
            let _ = write!(out, "{} ({})", day.descriptor.label, day.descriptor.date);
            if let Some(theme) = &day.theme {
                let _ = write!(out, " - {}", theme);
            }
            let _ = writeln!(out);

            if day.selections.is_empty() {
                let _ = writeln!(out, "  Open - nothing booked yet.");
            }
            for selection in &day.selections {
                let _ = write!(
                    out,
                    "  {}: {} ({})",
                    selection.slot.label(),
                    selection.name,
                    selection.category.label()
                );
                if let Some(reason) = &selection.reason {
                    let _ = write!(out, " - {}", reason);
                }
                let _ = writeln!(out);
            }
            if !day.alternatives.is_empty() {
                let _ = writeln!(out, "  Backups: {}", day.alternatives.join(", "));
            }
            if let Some(notes) = &day.logistics_notes {
                let _ = writeln!(out, "  Logistics: {}", notes);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{ServiceCategory, ServiceRecord};
    use crate::domain::facts::{FactUpdate, FactValue};
    use crate::domain::foundation::ServiceId;
    use crate::domain::itinerary::TimeSlot;
    use crate::domain::selection::SelectedService;
    use chrono::NaiveDate;

    fn record(name: &str, category: ServiceCategory) -> ServiceRecord {
        ServiceRecord {
            id: ServiceId::new(format!("svc-{}", name.to_lowercase().replace(' ', "-"))).unwrap(),
            name: name.to_string(),
            alt_name: None,
            category,
            description: String::new(),
            price: 50.0,
            currency: "USD".to_string(),
            duration_minutes: None,
            city: "Austin".to_string(),
            min_group: None,
            max_group: None,
        }
    }

    fn weekend_planning_with_one_day() -> (DayByDayPlanning, Vec<ServiceRecord>) {
        let structure = TripStructure::detect(
            NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 9, 7).unwrap()),
            false,
            vec![],
        );
        let mut planning = DayByDayPlanning::new(structure);
        let catalog = vec![
            record("Smokehouse", ServiceCategory::Restaurant),
            record("Taqueria", ServiceCategory::Restaurant),
        ];

        let day = planning.next_day().unwrap();
        let selection = DaySelection {
            selected_services: vec![SelectedService {
                service_id: catalog[0].id.clone(),
                name: catalog[0].name.clone(),
                category: ServiceCategory::Restaurant,
                slot: TimeSlot::Evening,
                reason: Some("group favorite".to_string()),
            }],
            alternative_options: vec!["Taqueria".to_string()],
            day_theme: Some("Arrival night".to_string()),
            logistics_notes: None,
        };
        let plan = ItineraryAssembler::new().assemble_day(day, selection);
        planning.record_day(plan);
        (planning, catalog)
    }

    mod narrative {
        use super::*;

        #[test]
        fn weekend_narrative_names_destination_and_days() {
            let (planning, _) = weekend_planning_with_one_day();
            let mut facts = TripFacts::new();
            facts.apply(FactUpdate::confirmed(
                FactValue::Destination("Austin".to_string()),
                "test",
            ));

            let narrative = ItineraryAssembler::new().render_narrative(&planning, &facts);

            assert!(narrative.contains("Your Austin weekend:"));
            assert!(narrative.contains("Friday arrival"));
            assert!(narrative.contains("Evening: Smokehouse (restaurant) - group favorite"));
            assert!(narrative.contains("Backups: Taqueria"));
        }

        #[test]
        fn missing_destination_gets_a_placeholder() {
            let (planning, _) = weekend_planning_with_one_day();
            let narrative =
                ItineraryAssembler::new().render_narrative(&planning, &TripFacts::new());
            assert!(narrative.contains("your destination"));
        }

        #[test]
        fn single_event_renders_theme_options_not_days() {
            let structure = TripStructure::detect(
                NaiveDate::from_ymd_opt(2025, 9, 6).unwrap(),
                None,
                true,
                vec!["casino".to_string(), "whiskey".to_string()],
            );
            let planning = DayByDayPlanning::new(structure);
            let mut facts = TripFacts::new();
            facts.apply(FactUpdate::confirmed(
                FactValue::Destination("Austin".to_string()),
                "test",
            ));

            let narrative = ItineraryAssembler::new().render_narrative(&planning, &facts);

            assert!(narrative.contains("The Austin party plan"));
            assert!(narrative.contains("Option: casino package"));
            assert!(narrative.contains("Option: whiskey package"));
            assert!(!narrative.contains("arrival"));
        }
    }
}
