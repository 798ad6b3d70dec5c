use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    confirm::Confirm,
    controller::{form::FormController, FormOwner},
    gateway::Gateway,
    resource::Resource,
    scope::RequestScope,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ListMode<E> {
    Viewing,
    /// `None` while creating; otherwise an independent copy of the entity
    /// being edited.
    Editing(Option<E>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Error(String),
}

/// Everything a list view renders. Views are derived from this value only.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<E> {
    pub entities: Vec<E>,
    pub mode: ListMode<E>,
    pub status: ListStatus,
}

impl<E> Default for ListState<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            mode: ListMode::Viewing,
            status: ListStatus::Idle,
        }
    }
}

impl<E> ListState<E> {
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ListStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListStatus::Loading
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Declined,
    Failed,
    Cancelled,
}

/// Owns the committed collection for one resource kind.
///
/// `load` and `remove` may overlap; whichever response lands last decides the
/// visible collection.
pub struct ListController<R: Resource> {
    gateway: Arc<dyn Gateway<R>>,
    confirm: Arc<dyn Confirm>,
    state: Mutex<ListState<R::Entity>>,
    scope: RequestScope,
}

impl<R: Resource> ListController<R> {
    pub fn new(gateway: Arc<dyn Gateway<R>>, confirm: Arc<dyn Confirm>) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            confirm,
            state: Mutex::new(ListState::default()),
            scope: RequestScope::new(),
        })
    }

    pub async fn snapshot(&self) -> ListState<R::Entity> {
        self.state.lock().await.clone()
    }

    /// Replaces the collection on success. The previous collection stays
    /// visible while loading and after a failure.
    pub async fn load(&self) {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut state.status, ListStatus::Loading)
        };

        let Some(result) = self.scope.run(self.gateway.list()).await else {
            let mut state = self.state.lock().await;
            if state.status == ListStatus::Loading {
                state.status = previous;
            }
            return;
        };

        let mut state = self.state.lock().await;
        match result {
            Ok(entities) => {
                info!(resource = R::KIND.path(), count = entities.len(), "collection loaded");
                state.entities = entities;
                state.status = ListStatus::Idle;
            }
            Err(err) => {
                warn!(resource = R::KIND.path(), error = %err, "collection load failed");
                state.status = ListStatus::Error(R::KIND.list_failed().to_string());
            }
        }
    }

    pub async fn start_create(self: &Arc<Self>) -> FormController<R> {
        self.state.lock().await.mode = ListMode::Editing(None);
        FormController::create(Arc::clone(&self.gateway), self.owner())
    }

    pub async fn start_edit(self: &Arc<Self>, entity: &R::Entity) -> FormController<R> {
        self.state.lock().await.mode = ListMode::Editing(Some(entity.clone()));
        FormController::edit(Arc::clone(&self.gateway), self.owner(), entity)
    }

    /// Asks for confirmation, then deletes. On success the entity is dropped
    /// from the local collection without a reload.
    pub async fn remove(&self, id: R::Id) -> RemoveOutcome {
        if !self.confirm.confirm(R::KIND.delete_prompt()).await {
            debug!(resource = R::KIND.path(), %id, "delete declined");
            return RemoveOutcome::Declined;
        }

        let Some(result) = self.scope.run(self.gateway.delete(id)).await else {
            return RemoveOutcome::Cancelled;
        };

        let mut state = self.state.lock().await;
        match result {
            Ok(()) => {
                info!(resource = R::KIND.path(), %id, "entity deleted");
                state.entities.retain(|entity| R::id_of(entity) != id);
                RemoveOutcome::Removed
            }
            Err(err) => {
                warn!(resource = R::KIND.path(), %id, error = %err, "delete failed");
                state.status = ListStatus::Error(R::KIND.delete_failed().to_string());
                RemoveOutcome::Failed
            }
        }
    }

    /// Aborts in-flight calls. Later calls return without contacting the
    /// gateway.
    pub fn close(&self) {
        self.scope.close();
    }

    fn owner(self: &Arc<Self>) -> Arc<dyn FormOwner> {
        Arc::clone(self) as Arc<dyn FormOwner>
    }
}

#[async_trait]
impl<R: Resource> FormOwner for ListController<R> {
    async fn on_form_committed(&self) {
        self.state.lock().await.mode = ListMode::Viewing;
        self.load().await;
    }

    async fn on_form_cancelled(&self) {
        self.state.lock().await.mode = ListMode::Viewing;
    }
}

#[cfg(test)]
#[path = "../tests/list_tests.rs"]
mod tests;
