//! Bulk loading of listings from a JSON export

use std::io::Read;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use crate::models::{Coordinate, Housing};
use crate::repository::HousingRepository;
use crate::{Result, WorkToHomeError};

/// One listing as found in an export file
#[derive(Debug, Deserialize)]
pub struct ListingImport {
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: u32,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub property_type: Option<String>,
    pub available_date: Option<NaiveDate>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub pet_friendly: bool,
    #[serde(default)]
    pub parking_available: bool,
    #[serde(default)]
    pub furnished: bool,
    pub source: Option<String>,
    pub source_id: Option<String>,
}

impl From<ListingImport> for Housing {
    fn from(listing: ListingImport) -> Self {
        let mut housing = Housing::new(
            listing.title,
            listing.address,
            listing.city,
            listing.state,
            listing.zip_code,
            Coordinate::new(listing.latitude, listing.longitude),
            listing.price,
        );
        housing.description = listing.description;
        housing.bedrooms = listing.bedrooms;
        housing.bathrooms = listing.bathrooms;
        housing.square_feet = listing.square_feet;
        housing.property_type = listing.property_type;
        housing.available_date = listing.available_date;
        housing.images = listing.images;
        housing.amenities = listing.amenities;
        housing.pet_friendly = listing.pet_friendly;
        housing.parking_available = listing.parking_available;
        housing.furnished = listing.furnished;
        housing.source = listing.source;
        housing.source_id = listing.source_id;
        housing.updated_at = Utc::now();
        housing
    }
}

/// Parse a JSON array of listings and store them. Returns how many were
/// stored. Nothing is stored if the file doesn't parse.
pub async fn import_listings<R: Read>(
    repo: &dyn HousingRepository,
    reader: R,
) -> Result<usize> {
    let listings: Vec<ListingImport> = serde_json::from_reader(reader)
        .map_err(|e| WorkToHomeError::validation(format!("Invalid listing file: {e}")))?;

    let count = listings.len();
    for listing in listings {
        let housing = Housing::from(listing);
        repo.save_housing(&housing).await?;
    }
    info!("Imported {count} listings");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_import_listings() {
        let store = MemoryStore::new();
        let json = r#"[
            {
                "title": "Sunny studio",
                "address": "22 Orchard St",
                "city": "New York",
                "state": "NY",
                "zip_code": "10002",
                "latitude": 40.7155,
                "longitude": -73.9918,
                "price": 2300,
                "pet_friendly": true,
                "available_date": "2026-12-01"
            },
            {
                "title": "Garden duplex",
                "address": "9 Clinton St",
                "city": "Hoboken",
                "state": "NJ",
                "zip_code": "07030",
                "latitude": 40.7440,
                "longitude": -74.0324,
                "price": 3100,
                "bedrooms": 2,
                "source": "manual"
            }
        ]"#;

        let count = import_listings(&store, json.as_bytes()).await.unwrap();
        assert_eq!(count, 2);

        let stored = store.list_housing().await.unwrap();
        assert_eq!(stored.len(), 2);
        let studio = stored.iter().find(|h| h.title == "Sunny studio").unwrap();
        assert!(studio.pet_friendly);
        assert_eq!(studio.location, Coordinate::new(40.7155, -73.9918));
        assert_eq!(studio.available_date, NaiveDate::from_ymd_opt(2026, 12, 1));
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_file() {
        let store = MemoryStore::new();
        let err = import_listings(&store, &b"[{\"title\": 1}]"[..])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkToHomeError::Validation { .. }));
        assert!(store.list_housing().await.unwrap().is_empty());
    }
}
