//! Controller layer: the paired list/edit state machines for one resource kind.

pub mod form;
pub mod list;

use async_trait::async_trait;

pub use form::{FormController, FormError, FormMode, FormState, SubmitOutcome};
pub use list::{ListController, ListMode, ListState, ListStatus, RemoveOutcome};

/// Receives the end of a form session.
#[async_trait]
pub trait FormOwner: Send + Sync {
    async fn on_form_committed(&self);
    async fn on_form_cancelled(&self);
}
