//! User profile: work location and search preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coordinate;
use crate::WorkToHomeError;

pub type UserId = Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub work_address: Option<String>,
    /// Where commutes are estimated from. Unset until the user provides it.
    pub work_location: Option<Coordinate>,
    /// Longest acceptable commute in minutes
    pub max_commute_time: Option<u32>,
    pub budget_min: Option<u32>,
    pub budget_max: Option<u32>,
    pub preferred_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            username: username.into(),
            first_name: None,
            last_name: None,
            work_address: None,
            work_location: None,
            max_commute_time: None,
            budget_min: None,
            budget_max: None,
            preferred_areas: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a monthly price is inside the user's budget bounds
    #[must_use]
    pub fn within_budget(&self, price: u32) -> bool {
        self.budget_min.is_none_or(|min| price >= min)
            && self.budget_max.is_none_or(|max| price <= max)
    }
}

/// Profile fields a user can change.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub work_address: Option<Option<String>>,
    pub work_location: Option<Option<Coordinate>>,
    pub max_commute_time: Option<Option<u32>>,
    pub budget_min: Option<Option<u32>>,
    pub budget_max: Option<Option<u32>>,
    pub preferred_areas: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) -> crate::Result<()> {
        let budget_min = self.budget_min.unwrap_or(user.budget_min);
        let budget_max = self.budget_max.unwrap_or(user.budget_max);
        if let (Some(min), Some(max)) = (budget_min, budget_max)
            && min > max
        {
            return Err(WorkToHomeError::validation(format!(
                "budget_min ({min}) cannot exceed budget_max ({max})"
            )));
        }

        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(work_address) = self.work_address {
            user.work_address = work_address;
        }
        if let Some(work_location) = self.work_location {
            user.work_location = work_location;
        }
        if let Some(max_commute_time) = self.max_commute_time {
            user.max_commute_time = max_commute_time;
        }
        if let Some(preferred_areas) = self.preferred_areas {
            user.preferred_areas = preferred_areas;
        }
        user.budget_min = budget_min;
        user.budget_max = budget_max;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_budget() {
        let mut user = User::new("a@example.com", "alice");
        assert!(user.within_budget(10_000));

        user.budget_min = Some(1500);
        user.budget_max = Some(2500);
        assert!(user.within_budget(1500));
        assert!(user.within_budget(2500));
        assert!(!user.within_budget(1499));
        assert!(!user.within_budget(2501));
    }

    #[test]
    fn test_profile_update_sets_work_location() {
        let mut user = User::new("a@example.com", "alice");
        ProfileUpdate {
            work_address: Some(Some("1 Centre St".to_string())),
            work_location: Some(Some(Coordinate::new(40.7128, -74.006))),
            ..Default::default()
        }
        .apply(&mut user)
        .unwrap();

        assert_eq!(user.work_location, Some(Coordinate::new(40.7128, -74.006)));
        assert_eq!(user.work_address.as_deref(), Some("1 Centre St"));
    }

    #[test]
    fn test_profile_update_rejects_inverted_budget() {
        let mut user = User::new("a@example.com", "alice");
        user.budget_max = Some(2000);

        let result = ProfileUpdate {
            budget_min: Some(Some(3000)),
            ..Default::default()
        }
        .apply(&mut user);

        assert!(result.is_err());
        assert_eq!(user.budget_min, None);
    }

    #[test]
    fn test_profile_update_clears_fields() {
        let mut user = User::new("a@example.com", "alice");
        user.work_location = Some(Coordinate::new(40.7128, -74.006));
        user.budget_min = Some(1000);
        user.max_commute_time = Some(30);
        user.first_name = Some("Alice".to_string());

        ProfileUpdate {
            work_location: Some(None),
            budget_min: Some(None),
            first_name: Some(None),
            ..Default::default()
        }
        .apply(&mut user)
        .unwrap();

        assert_eq!(user.work_location, None);
        assert_eq!(user.budget_min, None);
        assert_eq!(user.first_name, None);
        assert_eq!(user.max_commute_time, Some(30));
    }

    #[test]
    fn test_clearing_budget_bound_lifts_inversion_check() {
        let mut user = User::new("a@example.com", "alice");
        user.budget_max = Some(2000);

        ProfileUpdate {
            budget_min: Some(Some(3000)),
            budget_max: Some(None),
            ..Default::default()
        }
        .apply(&mut user)
        .unwrap();

        assert_eq!(user.budget_min, Some(3000));
        assert_eq!(user.budget_max, None);
    }
}
