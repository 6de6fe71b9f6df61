//! Item record and write-side value types.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A stored item.
///
/// `id` is assigned by the store and never changes. `updated_at` is never
/// earlier than `created_at` and never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
}

/// Validated partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ItemPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// Returns the `(name, description)` pair after applying this patch to `current`.
    pub fn merge(&self, current: &Item) -> (String, String) {
        let name = self.name.clone().unwrap_or_else(|| current.name.clone());
        let description = self
            .description
            .clone()
            .unwrap_or_else(|| current.description.clone());
        (name, description)
    }
}

/// Current time at the precision the store and cache round-trip losslessly.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Item {
        let now = now_utc();
        Item {
            id: 7,
            name: "widget".to_string(),
            description: "a small widget".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patch_name_only_keeps_description() {
        let patch = ItemPatch {
            name: Some("gadget".to_string()),
            description: None,
        };
        let (name, description) = patch.merge(&sample());
        assert_eq!(name, "gadget");
        assert_eq!(description, "a small widget");
    }

    #[test]
    fn test_patch_description_only_keeps_name() {
        let patch = ItemPatch {
            name: None,
            description: Some("bigger now".to_string()),
        };
        let (name, description) = patch.merge(&sample());
        assert_eq!(name, "widget");
        assert_eq!(description, "bigger now");
    }

    #[test]
    fn test_empty_patch() {
        assert!(ItemPatch::default().is_empty());
    }

    #[test]
    fn test_item_json_round_trip_is_exact() {
        let item = sample();
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
