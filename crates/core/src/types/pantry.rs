//! Pantry item domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemName, PantryItemId, UserId};

/// A single named ingredient owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    /// Server-generated identifier.
    pub id: PantryItemId,
    /// Normalized (trimmed, lowercase) name.
    pub name: ItemName,
    /// When the user says the item was added to the pantry.
    pub date_added: DateTime<Utc>,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
    /// Owner of this item.
    pub user_id: UserId,
}

/// A validated pantry item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPantryItem {
    pub user_id: UserId,
    pub name: ItemName,
    pub date_added: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewPantryItem {
    /// Build a new item, defaulting `date_added` to `now` when absent.
    #[must_use]
    pub fn new(
        user_id: UserId,
        name: ItemName,
        date_added: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            name,
            date_added: date_added.unwrap_or(now),
            created_at: now,
        }
    }

    /// Attach an identifier, producing the stored form.
    #[must_use]
    pub fn into_item(self, id: PantryItemId) -> PantryItem {
        PantryItem {
            id,
            name: self.name,
            date_added: self.date_added,
            created_at: self.created_at,
            user_id: self.user_id,
        }
    }
}
