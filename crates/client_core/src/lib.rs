//! Client-side resource controllers for the catalog/account admin console.
//!
//! A [`controller::ListController`] owns the committed collection for one
//! resource kind and hands create/edit sessions to a
//! [`controller::FormController`]. Forms turn raw field input into typed
//! payloads through [`transform`] and talk to the data service through a
//! [`gateway::Gateway`].

pub mod config;
pub mod confirm;
pub mod controller;
pub mod fields;
pub mod gateway;
pub mod resource;
pub mod scope;
pub mod transform;

pub use config::{load_settings, ClientSettings};
pub use confirm::{AlwaysConfirm, Confirm, NeverConfirm};
pub use controller::{
    FormController, FormError, FormMode, FormOwner, FormState, ListController, ListMode,
    ListState, ListStatus, RemoveOutcome, SubmitOutcome,
};
pub use gateway::{Gateway, HttpGateway};
pub use resource::{Products, Resource, ResourceKind, Users};
pub use scope::RequestScope;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
