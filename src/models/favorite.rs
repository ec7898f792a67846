//! Saved listings with user notes

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{HousingId, UserId};
use crate::WorkToHomeError;

pub type FavoriteId = Uuid;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub housing_id: HousingId,
    pub notes: Option<String>,
    /// 1 (low) to 5 (high)
    pub priority: u8,
    pub visit_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    #[must_use]
    pub fn new(user_id: UserId, housing_id: HousingId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            housing_id,
            notes: None,
            priority: MIN_PRIORITY,
            visit_date: None,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of a favorite. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteUpdate {
    pub notes: Option<String>,
    pub priority: Option<u8>,
    /// `YYYY-MM-DD`
    pub visit_date: Option<String>,
}

impl FavoriteUpdate {
    /// Apply the update, validating priority and date first so a rejected
    /// update leaves the favorite unchanged.
    pub fn apply(self, favorite: &mut Favorite) -> crate::Result<()> {
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        let visit_date = self
            .visit_date
            .as_deref()
            .map(parse_visit_date)
            .transpose()?;

        if let Some(notes) = self.notes {
            favorite.notes = Some(notes);
        }
        if let Some(priority) = self.priority {
            favorite.priority = priority;
        }
        if visit_date.is_some() {
            favorite.visit_date = visit_date;
        }
        Ok(())
    }
}

pub fn validate_priority(priority: u8) -> crate::Result<()> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        Ok(())
    } else {
        Err(WorkToHomeError::validation(format!(
            "Priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}"
        )))
    }
}

fn parse_visit_date(raw: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| WorkToHomeError::validation("Invalid date format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorite() -> Favorite {
        Favorite::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_new_favorite_has_lowest_priority() {
        assert_eq!(favorite().priority, 1);
    }

    #[test]
    fn test_update_applies_fields() {
        let mut fav = favorite();
        FavoriteUpdate {
            notes: Some("close to the park".to_string()),
            priority: Some(4),
            visit_date: Some("2026-11-02".to_string()),
        }
        .apply(&mut fav)
        .unwrap();

        assert_eq!(fav.notes.as_deref(), Some("close to the park"));
        assert_eq!(fav.priority, 4);
        assert_eq!(fav.visit_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }

    #[test]
    fn test_bad_date_leaves_favorite_untouched() {
        let mut fav = favorite();
        let before = fav.clone();
        let err = FavoriteUpdate {
            notes: Some("ignored".to_string()),
            priority: None,
            visit_date: Some("02/11/2026".to_string()),
        }
        .apply(&mut fav)
        .unwrap_err();

        assert!(err.to_string().contains("Invalid date format"));
        assert_eq!(fav, before);
    }

    #[test]
    fn test_priority_range() {
        assert!(validate_priority(1).is_ok());
        assert!(validate_priority(5).is_ok());
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(6).is_err());
    }
}
