//! Todo list controller.
//!
//! The local list is a cache of the provider's rows, refreshed only by the
//! responses to our own calls. Every mutation waits for the provider and
//! applies the returned row; a failed call leaves the list as it was.

use std::sync::Arc;

use crate::provider::{Credential, Provider, ProviderError, TodoId, TodoItem};

pub struct TodoController {
    provider: Arc<dyn Provider>,
    items: Vec<TodoItem>,
}

impl TodoController {
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider, items: Vec::new() }
    }

    /// Items in display order (newest created first after local inserts).
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Replace the local list with the provider's full set.
    ///
    /// # Errors
    ///
    /// Returns the provider error; the list is left untouched.
    pub async fn fetch_all(&mut self, credential: &Credential) -> Result<usize, ProviderError> {
        let rows = self.provider.select_todo(credential).await.map_err(|e| {
            tracing::error!(error = %e, "select_todo failed");
            e
        })?;
        tracing::debug!(count = rows.len(), "todos fetched");
        self.items = rows;
        Ok(self.items.len())
    }

    /// Create a todo and prepend the provider's row.
    ///
    /// Blank titles are ignored without a remote call and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the provider error; the list is left untouched.
    pub async fn create(&mut self, credential: &Credential, title: &str) -> Result<Option<&TodoItem>, ProviderError> {
        if title.trim().is_empty() {
            return Ok(None);
        }
        let row = self
            .provider
            .insert_todo(credential, title)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "insert_todo failed");
                e
            })?;
        tracing::debug!(todo_id = %row.id, "todo created");
        self.items.insert(0, row);
        Ok(self.items.first())
    }

    /// Flip completion on the provider and apply the returned row in place.
    ///
    /// # Errors
    ///
    /// Returns the provider error; the list is left untouched.
    pub async fn toggle_complete(&mut self, credential: &Credential, id: &TodoId) -> Result<(), ProviderError> {
        let row = self
            .provider
            .toggle_todo(credential, id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, todo_id = %id, "toggle_todo failed");
                e
            })?;
        match self.items.iter_mut().find(|item| item.id == row.id) {
            Some(item) => *item = row,
            None => tracing::warn!(todo_id = %row.id, "toggled row not in local list"),
        }
        Ok(())
    }

    /// Delete on the provider, then drop the matching local item.
    ///
    /// # Errors
    ///
    /// Returns the provider error; the list is left untouched.
    pub async fn delete(&mut self, credential: &Credential, id: &TodoId) -> Result<(), ProviderError> {
        self.provider
            .delete_todo(credential, id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, todo_id = %id, "delete_todo failed");
                e
            })?;
        self.items.retain(|item| &item.id != id);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[path = "todos_test.rs"]
mod tests;
