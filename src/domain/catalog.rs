//! Catalog model - bookable services and search filters.
//!
//! The catalog itself lives behind the [`crate::ports::CatalogStore`] port;
//! this module only defines the records the core consumes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ServiceId;

/// Category of a bookable service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Restaurant,
    Bar,
    Nightclub,
    StripClub,
    Activity,
    Transport,
    Package,
}

impl ServiceCategory {
    /// Returns a human-readable label for narrative output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Bar => "bar",
            Self::Nightclub => "nightclub",
            Self::StripClub => "strip club",
            Self::Activity => "activity",
            Self::Transport => "transport",
            Self::Package => "package",
        }
    }
}

/// A bookable service as provided by the catalog host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub name: String,
    /// Alternate display name the host sometimes uses (marketing name).
    /// Edit directives may reference a service by either name.
    #[serde(default)]
    pub alt_name: Option<String>,
    pub category: ServiceCategory,
    pub description: String,
    /// Price in the record's currency. Heuristic or looked up, never computed.
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub city: String,
    #[serde(default)]
    pub min_group: Option<u32>,
    #[serde(default)]
    pub max_group: Option<u32>,
}

impl ServiceRecord {
    /// Returns true if the record is known under the given name,
    /// matching the primary or alternate display name case-insensitively.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.eq_ignore_ascii_case(name)
            || self
                .alt_name
                .as_deref()
                .is_some_and(|alt| alt.eq_ignore_ascii_case(name))
    }

    /// Returns true if a group of the given size fits this service.
    pub fn fits_group(&self, group_size: u32) -> bool {
        let above_min = self.min_group.map_or(true, |min| group_size >= min);
        let below_max = self.max_group.map_or(true, |max| group_size <= max);
        above_min && below_max
    }
}

/// Filters for catalog searches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFilters {
    pub city: Option<String>,
    pub category: Option<ServiceCategory>,
    pub group_size: Option<u32>,
    pub keyword: Option<String>,
}

impl CatalogFilters {
    /// Creates filters scoped to a city.
    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }

    /// Narrows the filters to a category.
    pub fn with_category(mut self, category: ServiceCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Narrows the filters to services fitting a group size.
    pub fn with_group_size(mut self, group_size: u32) -> Self {
        self.group_size = Some(group_size);
        self
    }

    /// Adds a free-text keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Returns true if the record passes every set filter.
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        if let Some(ref city) = self.city {
            if !record.city.eq_ignore_ascii_case(city) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }
        if let Some(group_size) = self.group_size {
            if !record.fits_group(group_size) {
                return false;
            }
        }
        if let Some(ref keyword) = self.keyword {
            let kw = keyword.to_lowercase();
            let haystack = format!(
                "{} {}",
                record.name.to_lowercase(),
                record.description.to_lowercase()
            );
            if !haystack.contains(&kw) {
                return false;
            }
        }
        true
    }
}
