//! Housing listing model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coordinate;

pub type HousingId = Uuid;

/// A rental or sale listing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Housing {
    pub id: HousingId,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub location: Coordinate,
    /// Monthly rent or mortgage in whole dollars
    pub price: u32,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    /// apartment, house, condo, ...
    pub property_type: Option<String>,
    pub available_date: Option<NaiveDate>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub pet_friendly: bool,
    pub parking_available: bool,
    pub furnished: bool,
    /// Listing provider the record was imported from
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Housing {
    /// Create a listing with the required fields, everything else empty
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
        location: Coordinate,
        price: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            location,
            price,
            bedrooms: None,
            bathrooms: None,
            square_feet: None,
            property_type: None,
            available_date: None,
            images: Vec::new(),
            amenities: Vec::new(),
            pet_friendly: false,
            parking_available: false,
            furnished: false,
            source: None,
            source_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filters accepted by listing search. `None` means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HousingFilter {
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pet_friendly: Option<bool>,
    pub parking_available: Option<bool>,
}

impl HousingFilter {
    /// Whether a listing passes every set filter.
    ///
    /// Bedrooms and bathrooms are minimums; city and state match as
    /// case-insensitive substrings.
    #[must_use]
    pub fn matches(&self, housing: &Housing) -> bool {
        if self.min_price.is_some_and(|min| housing.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| housing.price > max) {
            return false;
        }
        if let Some(bedrooms) = self.bedrooms
            && housing.bedrooms.is_none_or(|b| b < bedrooms)
        {
            return false;
        }
        if let Some(bathrooms) = self.bathrooms
            && housing.bathrooms.is_none_or(|b| b < bathrooms)
        {
            return false;
        }
        if let Some(property_type) = &self.property_type
            && housing.property_type.as_deref() != Some(property_type.as_str())
        {
            return false;
        }
        if let Some(city) = &self.city
            && !contains_ignore_case(&housing.city, city)
        {
            return false;
        }
        if let Some(state) = &self.state
            && !contains_ignore_case(&housing.state, state)
        {
            return false;
        }
        if self.pet_friendly.is_some_and(|p| housing.pet_friendly != p) {
            return false;
        }
        if self
            .parking_available
            .is_some_and(|p| housing.parking_available != p)
        {
            return false;
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Housing {
        let mut housing = Housing::new(
            "Sunny 2BR",
            "12 Bedford Ave",
            "Brooklyn",
            "NY",
            "11211",
            Coordinate::new(40.7174, -73.9565),
            2400,
        );
        housing.bedrooms = Some(2);
        housing.bathrooms = Some(1.0);
        housing.property_type = Some("apartment".to_string());
        housing.pet_friendly = true;
        housing
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(HousingFilter::default().matches(&listing()));
    }

    #[test]
    fn test_price_bounds() {
        let filter = HousingFilter {
            min_price: Some(2500),
            ..Default::default()
        };
        assert!(!filter.matches(&listing()));

        let filter = HousingFilter {
            min_price: Some(2000),
            max_price: Some(2400),
            ..Default::default()
        };
        assert!(filter.matches(&listing()));
    }

    #[test]
    fn test_city_is_case_insensitive_substring() {
        let filter = HousingFilter {
            city: Some("brook".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&listing()));
    }

    #[test]
    fn test_bedrooms_minimum_rejects_unknown() {
        let mut housing = listing();
        housing.bedrooms = None;
        let filter = HousingFilter {
            bedrooms: Some(1),
            ..Default::default()
        };
        assert!(!filter.matches(&housing));
    }

    #[test]
    fn test_boolean_flags() {
        let filter = HousingFilter {
            pet_friendly: Some(false),
            ..Default::default()
        };
        assert!(!filter.matches(&listing()));

        let filter = HousingFilter {
            parking_available: Some(false),
            ..Default::default()
        };
        assert!(filter.matches(&listing()));
    }
}
