//! Pantry item gateway.
//!
//! Validates raw request input, normalizes it into core types, and forwards
//! to the configured [`PantryStore`]. Every mutation drops the owner's
//! cached recipes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use pantry_core::{ItemName, ItemNameError, NewPantryItem, PantryItem, PantryItemId, UserId};

use crate::db::{PantryStore, RepositoryError};
use crate::services::recipe_cache::RecipeCache;

/// Errors returned by pantry operations.
#[derive(Debug, Error)]
pub enum PantryError {
    /// Input was missing or invalid.
    #[error("{0}")]
    BadRequest(String),

    /// No item matched the given id.
    #[error("Item not found")]
    NotFound,

    /// Storage backend failed.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for PantryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Raw input for creating a pantry item.
#[derive(Debug, Clone, Default)]
pub struct CreateItemInput {
    pub user_id: Option<String>,
    pub name: Option<String>,
    /// RFC 3339 timestamp. Defaults to now.
    pub date_added: Option<String>,
}

/// Validating front door to the pantry store.
#[derive(Clone)]
pub struct PantryGateway {
    store: Arc<dyn PantryStore>,
    cache: RecipeCache,
}

impl PantryGateway {
    #[must_use]
    pub fn new(store: Arc<dyn PantryStore>, cache: RecipeCache) -> Self {
        Self { store, cache }
    }

    /// Items owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if `user_id` is missing or blank.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<PantryItem>, PantryError> {
        let user_id = require_user(user_id)?;
        Ok(self.store.list(&user_id).await?)
    }

    /// Validate and store a new item.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a missing user id, a blank or overlong name,
    /// or an unparseable `date_added`.
    #[instrument(skip(self, input), fields(user_id = ?input.user_id))]
    pub async fn create(&self, input: CreateItemInput) -> Result<PantryItem, PantryError> {
        let user_id = require_user(input.user_id.as_deref())?;
        let name = parse_name(input.name.as_deref())?;
        let date_added = input
            .date_added
            .as_deref()
            .map(parse_date_added)
            .transpose()?;

        let item = NewPantryItem::new(user_id, name, date_added, Utc::now());
        let stored = self.store.create(item).await?;
        self.cache.invalidate(&stored.user_id).await;

        info!(item_id = %stored.id, name = %stored.name, "Added pantry item");
        Ok(stored)
    }

    /// Delete one item by id.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if the id is missing or not a valid item id,
    /// and `NotFound` if no item has that id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Option<&str>) -> Result<PantryItem, PantryError> {
        let raw = id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PantryError::BadRequest("Item ID is required".into()))?;
        let id = PantryItemId::parse(raw)
            .map_err(|_| PantryError::BadRequest("Invalid item ID".into()))?;

        let removed = self.store.delete(id).await?;
        self.cache.invalidate(&removed.user_id).await;

        info!(item_id = %removed.id, "Deleted pantry item");
        Ok(removed)
    }

    /// Delete every item owned by one user.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if `user_id` is missing or blank.
    #[instrument(skip(self))]
    pub async fn clear_for_user(&self, user_id: Option<&str>) -> Result<u64, PantryError> {
        let user_id = require_user(user_id)?;
        let removed = self.store.clear_for_user(&user_id).await?;
        self.cache.invalidate(&user_id).await;

        info!(removed, "Cleared pantry for user");
        Ok(removed)
    }

    /// Delete every item of every user.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<u64, PantryError> {
        let removed = self.store.clear_all().await?;
        self.cache.invalidate_all();

        info!(removed, "Cleared all pantry items");
        Ok(removed)
    }
}

fn require_user(raw: Option<&str>) -> Result<UserId, PantryError> {
    let raw = raw.ok_or_else(|| PantryError::BadRequest("User ID required".into()))?;
    UserId::parse(raw).map_err(|e| match e {
        pantry_core::UserIdError::Empty => PantryError::BadRequest("User ID required".into()),
        other => PantryError::BadRequest(other.to_string()),
    })
}

fn parse_name(raw: Option<&str>) -> Result<ItemName, PantryError> {
    let raw = raw.ok_or_else(|| PantryError::BadRequest("Item name is required".into()))?;
    ItemName::parse(raw).map_err(|e| match e {
        ItemNameError::Empty => PantryError::BadRequest("Item name is required".into()),
        other => PantryError::BadRequest(other.to_string()),
    })
}

fn parse_date_added(raw: &str) -> Result<DateTime<Utc>, PantryError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PantryError::BadRequest("dateAdded must be an RFC 3339 timestamp".into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pantry_core::RecipeSuggestion;

    use super::*;
    use crate::db::InMemoryPantryStore;

    fn gateway() -> (PantryGateway, RecipeCache) {
        let cache = RecipeCache::new(Duration::from_secs(60));
        let store = Arc::new(InMemoryPantryStore::new());
        (PantryGateway::new(store, cache.clone()), cache)
    }

    fn input(user: &str, name: &str) -> CreateItemInput {
        CreateItemInput {
            user_id: Some(user.into()),
            name: Some(name.into()),
            date_added: None,
        }
    }

    async fn seed_cache(cache: &RecipeCache, user: &str) {
        let batch = vec![RecipeSuggestion::new(0, "Soup".into(), "# Soup".into(), None)];
        cache
            .insert(UserId::parse(user).unwrap(), cache.begin(), batch)
            .await;
    }

    #[tokio::test]
    async fn test_create_normalizes_name() {
        let (gateway, _) = gateway();
        let item = gateway.create(input("alice", "  Eggs ")).await.unwrap();
        assert_eq!(item.name.as_str(), "eggs");
        assert_eq!(item.user_id.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (gateway, _) = gateway();
        let err = gateway.create(input("alice", "   ")).await.unwrap_err();
        assert!(matches!(err, PantryError::BadRequest(ref m) if m == "Item name is required"));
        assert!(gateway.list(Some("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_user() {
        let (gateway, _) = gateway();
        let err = gateway
            .create(CreateItemInput {
                name: Some("rice".into()),
                ..CreateItemInput::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PantryError::BadRequest(ref m) if m == "User ID required"));
    }

    #[tokio::test]
    async fn test_create_uses_given_date() {
        let (gateway, _) = gateway();
        let item = gateway
            .create(CreateItemInput {
                date_added: Some("2026-03-01T08:30:00+02:00".into()),
                ..input("alice", "flour")
            })
            .await
            .unwrap();
        assert_eq!(item.date_added.to_rfc3339(), "2026-03-01T06:30:00+00:00");

        let err = gateway
            .create(CreateItemInput {
                date_added: Some("yesterday".into()),
                ..input("alice", "flour")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PantryError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_requires_user() {
        let (gateway, _) = gateway();
        assert!(matches!(
            gateway.list(None).await,
            Err(PantryError::BadRequest(_))
        ));
        assert!(matches!(
            gateway.list(Some("  ")).await,
            Err(PantryError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_validates_id() {
        let (gateway, _) = gateway();
        assert!(matches!(
            gateway.delete(None).await,
            Err(PantryError::BadRequest(ref m)) if m == "Item ID is required"
        ));
        assert!(matches!(
            gateway.delete(Some("not-a-uuid")).await,
            Err(PantryError::BadRequest(_))
        ));
        assert!(matches!(
            gateway.delete(Some(&PantryItemId::new().to_string())).await,
            Err(PantryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_mutations_invalidate_owner_cache() {
        let (gateway, cache) = gateway();
        let alice = UserId::parse("alice").unwrap();
        let bob = UserId::parse("bob").unwrap();

        seed_cache(&cache, "alice").await;
        seed_cache(&cache, "bob").await;
        let item = gateway.create(input("alice", "rice")).await.unwrap();
        assert!(cache.get(&alice).await.is_none());
        assert!(cache.get(&bob).await.is_some());

        seed_cache(&cache, "alice").await;
        gateway.delete(Some(&item.id.to_string())).await.unwrap();
        assert!(cache.get(&alice).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_scopes() {
        let (gateway, cache) = gateway();
        gateway.create(input("alice", "rice")).await.unwrap();
        gateway.create(input("bob", "milk")).await.unwrap();

        assert_eq!(gateway.clear_for_user(Some("alice")).await.unwrap(), 1);
        assert_eq!(gateway.list(Some("bob")).await.unwrap().len(), 1);

        seed_cache(&cache, "bob").await;
        assert_eq!(gateway.clear_all().await.unwrap(), 1);
        assert!(gateway.list(Some("bob")).await.unwrap().is_empty());
        assert!(cache.get(&UserId::parse("bob").unwrap()).await.is_none());
    }
}
