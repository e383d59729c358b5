//! Per-day plans and the running planning state.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::ServiceCategory;
use crate::domain::foundation::ServiceId;

use super::trip_structure::{DayDescriptor, TimeSlot, TripStructure};

/// One booked service in a day plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub service_id: ServiceId,
    pub name: String,
    pub category: ServiceCategory,
    pub slot: TimeSlot,
    pub reason: Option<String>,
}

/// A completed plan for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub descriptor: DayDescriptor,
    pub theme: Option<String>,
    pub selections: Vec<ServiceSelection>,
    pub alternatives: Vec<String>,
    pub logistics_notes: Option<String>,
}

/// Planning state while the itinerary is built one day at a time.
///
/// `used_services` only ever grows - a service stays on the
/// discouraged list even after the day that used it is replanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayByDayPlanning {
    structure: TripStructure,
    days: Vec<DayPlan>,
    used_services: Vec<ServiceId>,
}

impl DayByDayPlanning {
    pub fn new(structure: TripStructure) -> Self {
        Self {
            structure,
            days: Vec::new(),
            used_services: Vec::new(),
        }
    }

    pub fn structure(&self) -> &TripStructure {
        &self.structure
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn used_services(&self) -> &[ServiceId] {
        &self.used_services
    }

    /// The descriptor for the next day to plan, if any remain.
    pub fn next_day(&self) -> Option<DayDescriptor> {
        self.structure.days().into_iter().nth(self.days.len())
    }

    pub fn is_complete(&self) -> bool {
        self.days.len() >= self.structure.total_days()
    }

    /// Moves the plan onto a new structure with the same day count,
    /// relabeling each built day's date and slots in place. Returns
    /// false when the day counts differ - that needs a full replan.
    pub fn rebase(&mut self, structure: TripStructure) -> bool {
        if structure.total_days() != self.structure.total_days() {
            return false;
        }
        let descriptors = structure.days();
        for (day, descriptor) in self.days.iter_mut().zip(descriptors) {
            day.descriptor = descriptor;
        }
        self.structure = structure;
        true
    }

    /// Records a finished day and remembers its services.
    pub fn record_day(&mut self, plan: DayPlan) {
        for selection in &plan.selections {
            if !self.used_services.contains(&selection.service_id) {
                self.used_services.push(selection.service_id.clone());
            }
        }
        self.days.push(plan);
    }

    /// Replaces one day's plan in place, keeping every previously used
    /// service on the discouraged list.
    pub fn replace_day(&mut self, index: usize, plan: DayPlan) -> bool {
        if index >= self.days.len() {
            return false;
        }
        for selection in &plan.selections {
            if !self.used_services.contains(&selection.service_id) {
                self.used_services.push(selection.service_id.clone());
            }
        }
        self.days[index] = plan;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn structure() -> TripStructure {
        TripStructure::detect(
            NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 9, 7).unwrap()),
            false,
            vec![],
        )
    }

    fn plan_for(descriptor: DayDescriptor, service: &str) -> DayPlan {
        DayPlan {
            descriptor,
            theme: None,
            selections: vec![ServiceSelection {
                service_id: ServiceId::new(service).unwrap(),
                name: service.to_string(),
                category: ServiceCategory::Restaurant,
                slot: TimeSlot::Evening,
                reason: None,
            }],
            alternatives: vec![],
            logistics_notes: None,
        }
    }

    #[test]
    fn planning_walks_days_in_order() {
        let mut planning = DayByDayPlanning::new(structure());
        assert_eq!(planning.structure().total_days(), 3);

        let first = planning.next_day().unwrap();
        assert!(first.label.contains("arrival"));
        planning.record_day(plan_for(first, "svc-1"));

        let second = planning.next_day().unwrap();
        assert_eq!(second.slots.len(), 5);
        planning.record_day(plan_for(second, "svc-2"));

        let third = planning.next_day().unwrap();
        planning.record_day(plan_for(third, "svc-3"));

        assert!(planning.is_complete());
        assert!(planning.next_day().is_none());
    }

    #[test]
    fn used_services_accumulate() {
        let mut planning = DayByDayPlanning::new(structure());
        let day = planning.next_day().unwrap();
        planning.record_day(plan_for(day.clone(), "svc-1"));
        planning.record_day(plan_for(day, "svc-2"));

        assert_eq!(planning.used_services().len(), 2);
    }

    #[test]
    fn replacing_a_day_keeps_old_services_discouraged() {
        let mut planning = DayByDayPlanning::new(structure());
        let day = planning.next_day().unwrap();
        planning.record_day(plan_for(day.clone(), "svc-1"));

        assert!(planning.replace_day(0, plan_for(day, "svc-2")));

        // Both old and new stay on the list.
        assert_eq!(planning.used_services().len(), 2);
        assert_eq!(planning.days().len(), 1);
    }

    #[test]
    fn rebase_shifts_dates_and_keeps_selections() {
        let mut planning = DayByDayPlanning::new(structure());
        while let Some(day) = planning.next_day() {
            let n = planning.days().len() + 1;
            planning.record_day(plan_for(day, &format!("svc-{}", n)));
        }

        let shifted = TripStructure::detect(
            NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 9, 14).unwrap()),
            false,
            vec![],
        );
        assert!(planning.rebase(shifted));

        assert_eq!(
            planning.days()[0].descriptor.date,
            NaiveDate::from_ymd_opt(2025, 9, 12).unwrap()
        );
        assert_eq!(planning.days()[0].selections[0].name, "svc-1");
        assert!(planning.is_complete());
    }

    #[test]
    fn rebase_refuses_a_different_day_count() {
        let mut planning = DayByDayPlanning::new(structure());
        let longer = TripStructure::detect(
            NaiveDate::from_ymd_opt(2025, 9, 4).unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 9, 7).unwrap()),
            false,
            vec![],
        );
        assert!(!planning.rebase(longer));
        assert_eq!(planning.structure().total_days(), 3);
    }

    #[test]
    fn replace_out_of_range_is_rejected() {
        let mut planning = DayByDayPlanning::new(structure());
        let day = planning.next_day().unwrap();
        assert!(!planning.replace_day(3, plan_for(day, "svc-1")));
    }
}
