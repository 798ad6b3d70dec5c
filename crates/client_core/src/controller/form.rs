use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    controller::FormOwner,
    fields::{validate, FieldError, FieldIssue, FieldValue, FormFields, SubmitKind},
    gateway::Gateway,
    resource::Resource,
    scope::RequestScope,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

impl<Id> FormMode<Id> {
    pub fn submit_kind(&self) -> SubmitKind {
        match self {
            Self::Create => SubmitKind::Create,
            Self::Edit(_) => SubmitKind::Update,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState<F> {
    pub fields: F,
    pub submitting: bool,
    pub error: Option<String>,
    /// Field-level indicators from the last blocked submission.
    pub issues: Vec<FieldIssue>,
}

impl<F> FormState<F> {
    fn new(fields: F) -> Self {
        Self {
            fields,
            submitting: false,
            error: None,
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<E> {
    Committed(E),
    Invalid(Vec<FieldIssue>),
    Failed,
    /// A submission was already in flight; nothing was sent.
    Busy,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("cannot cancel while a submission is in flight")]
    Submitting,
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// One create-or-edit session. Owns its draft exclusively.
pub struct FormController<R: Resource> {
    gateway: Arc<dyn Gateway<R>>,
    owner: Arc<dyn FormOwner>,
    mode: FormMode<R::Id>,
    state: Mutex<FormState<R::Fields>>,
    scope: RequestScope,
}

impl<R: Resource> FormController<R> {
    pub fn create(gateway: Arc<dyn Gateway<R>>, owner: Arc<dyn FormOwner>) -> Self {
        Self::with_fields(gateway, owner, FormMode::Create, R::fields_for_create())
    }

    pub fn edit(
        gateway: Arc<dyn Gateway<R>>,
        owner: Arc<dyn FormOwner>,
        entity: &R::Entity,
    ) -> Self {
        Self::with_fields(
            gateway,
            owner,
            FormMode::Edit(R::id_of(entity)),
            R::fields_for_edit(entity),
        )
    }

    fn with_fields(
        gateway: Arc<dyn Gateway<R>>,
        owner: Arc<dyn FormOwner>,
        mode: FormMode<R::Id>,
        fields: R::Fields,
    ) -> Self {
        Self {
            gateway,
            owner,
            mode,
            state: Mutex::new(FormState::new(fields)),
            scope: RequestScope::new(),
        }
    }

    pub fn mode(&self) -> FormMode<R::Id> {
        self.mode
    }

    pub async fn snapshot(&self) -> FormState<R::Fields> {
        self.state.lock().await.clone()
    }

    pub async fn set_field(
        &self,
        field: <R::Fields as FormFields>::Field,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        let mut state = self.state.lock().await;
        let next = state.fields.with(field, value.into())?;
        state.fields = next;
        Ok(())
    }

    pub async fn submit(&self) -> SubmitOutcome<R::Entity> {
        let fields = {
            let mut state = self.state.lock().await;
            if state.submitting {
                debug!(resource = R::KIND.path(), "submission already in flight");
                return SubmitOutcome::Busy;
            }
            state.submitting = true;
            state.error = None;
            state.issues.clear();

            if let Err(issues) = validate(&state.fields, self.mode.submit_kind()) {
                debug!(resource = R::KIND.path(), issues = issues.len(), "submission blocked");
                state.submitting = false;
                state.issues = issues.clone();
                return SubmitOutcome::Invalid(issues);
            }
            state.fields.clone()
        };

        let (result, failure_message) = match self.mode {
            FormMode::Create => {
                let payload = R::to_create(&fields);
                let result = self.scope.run(self.gateway.create(&payload)).await;
                (result, R::KIND.create_failed())
            }
            FormMode::Edit(id) => {
                let payload = R::to_update(&fields);
                let result = self.scope.run(self.gateway.update(id, &payload)).await;
                (result, R::KIND.update_failed())
            }
        };

        {
            let mut state = self.state.lock().await;
            state.submitting = false;
            match &result {
                Some(Err(err)) => {
                    warn!(resource = R::KIND.path(), error = %err, "submission failed");
                    state.error = Some(failure_message.to_string());
                }
                None => debug!(resource = R::KIND.path(), "submission cancelled"),
                Some(Ok(_)) => {}
            }
        }

        match result {
            Some(Ok(entity)) => {
                let id = R::id_of(&entity);
                info!(resource = R::KIND.path(), %id, "submission committed");
                self.owner.on_form_committed().await;
                SubmitOutcome::Committed(entity)
            }
            Some(Err(_)) => SubmitOutcome::Failed,
            None => SubmitOutcome::Cancelled,
        }
    }

    /// Discards the draft and hands control back to the owner. Never
    /// contacts the gateway.
    pub async fn cancel(&self) -> Result<(), FormError> {
        {
            let mut state = self.state.lock().await;
            if state.submitting {
                return Err(FormError::Submitting);
            }
            *state = FormState::new(R::fields_for_create());
        }
        self.owner.on_form_cancelled().await;
        Ok(())
    }

    pub fn close(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
#[path = "../tests/form_tests.rs"]
mod tests;
