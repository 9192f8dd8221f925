//! In-process pantry store for tests and local runs without `PostgreSQL`.

use async_trait::async_trait;
use tokio::sync::RwLock;

use pantry_core::{NewPantryItem, PantryItem, PantryItemId, UserId};

use super::{PantryStore, RepositoryError};

/// A `PantryStore` that keeps every item in memory.
#[derive(Debug, Default)]
pub struct InMemoryPantryStore {
    items: RwLock<Vec<PantryItem>>,
}

impl InMemoryPantryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored items across all users.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl PantryStore for InMemoryPantryStore {
    async fn list(&self, user_id: &UserId) -> Result<Vec<PantryItem>, RepositoryError> {
        let mut items: Vec<PantryItem> = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| &item.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.date_added
                .cmp(&a.date_added)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn create(&self, item: NewPantryItem) -> Result<PantryItem, RepositoryError> {
        let stored = item.into_item(PantryItemId::new());
        self.items.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: PantryItemId) -> Result<PantryItem, RepositoryError> {
        let mut items = self.items.write().await;
        let position = items
            .iter()
            .position(|item| item.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(items.remove(position))
    }

    async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let mut items = self.items.write().await;
        let removed = items.len() as u64;
        items.clear();
        Ok(removed)
    }

    async fn clear_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| &item.user_id != user_id);
        Ok((before - items.len()) as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
