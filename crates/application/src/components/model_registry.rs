//! Model registry
//!
//! Model profiles and the model the backend currently uses. API keys are
//! never read back; an edit form shows [`keydesk_domain::MASKED_SECRET`]
//! in their place.

use std::sync::Arc;

use keydesk_domain::{Confirmation, ModelDraft, ModelProfile, Outcome};

use crate::error::{ApplicationError, ApplicationResult, remote};
use crate::ports::{Confirmer, ModelApi};

/// Model profiles and the current selection.
pub struct ModelRegistry<A> {
    api: Arc<A>,
    profiles: Vec<ModelProfile>,
    current: Option<ModelProfile>,
}

impl<A: ModelApi> ModelRegistry<A> {
    /// Creates an empty registry.
    pub const fn new(api: Arc<A>) -> Self {
        Self {
            api,
            profiles: Vec::new(),
            current: None,
        }
    }

    /// Profiles sorted by name.
    #[must_use]
    pub fn profiles(&self) -> &[ModelProfile] {
        &self.profiles
    }

    /// The current model, if the backend reported one.
    #[must_use]
    pub const fn current(&self) -> Option<&ModelProfile> {
        self.current.as_ref()
    }

    /// Looks a profile up by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ModelProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Re-reads the profiles and the current model.
    ///
    /// # Errors
    /// Fails if the listing fails. A failure to read the current model is not
    /// an error.
    pub async fn load(&mut self) -> ApplicationResult<()> {
        let mut profiles = self
            .api
            .list_models()
            .await
            .map_err(remote("list models"))?;
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        self.profiles = profiles;
        self.load_current().await;
        Ok(())
    }

    /// Reads the current model. Any failure means "no current model".
    pub async fn load_current(&mut self) -> Option<&ModelProfile> {
        match self.api.current_model().await {
            Ok(model) => self.current = Some(model),
            Err(e) => {
                tracing::debug!(error = %e, "no current model");
                self.current = None;
            }
        }
        self.current.as_ref()
    }

    /// Opens a profile for editing with its API key masked.
    ///
    /// # Errors
    /// Returns [`ApplicationError::UnknownModel`] if the name is not listed.
    pub fn view_for_edit(&self, name: &str) -> ApplicationResult<ModelDraft> {
        self.find(name)
            .map(ModelDraft::edit)
            .ok_or_else(|| ApplicationError::UnknownModel(name.to_string()))
    }

    /// Creates or replaces a profile, then reloads.
    ///
    /// An edit that still shows the masked key keeps the stored one.
    ///
    /// # Errors
    /// Fails on a blank name (no call is made) or a backend error.
    pub async fn save_profile(&mut self, draft: ModelDraft) -> ApplicationResult<()> {
        let payload = draft.into_payload()?;
        self.api
            .save_model(&payload)
            .await
            .map_err(remote("save model"))?;
        tracing::info!(model = %payload.name, kind = %payload.model_type, "model saved");
        self.load().await
    }

    /// Makes a profile the backend's current model.
    ///
    /// # Errors
    /// Returns [`ApplicationError::UnknownModel`] for an unlisted name, or a
    /// remote error. Local state changes only on success.
    pub async fn select_current(&mut self, name: &str) -> ApplicationResult<&ModelProfile> {
        let profile = self
            .find(name)
            .cloned()
            .ok_or_else(|| ApplicationError::UnknownModel(name.to_string()))?;
        self.api
            .set_current_model(name)
            .await
            .map_err(remote("select model"))?;
        tracing::info!(model = %name, "current model selected");
        Ok(&*self.current.insert(profile))
    }

    /// Deletes a profile after confirmation.
    ///
    /// The local current model is cleared if it was the deleted one. What the
    /// backend does with its own pointer is up to the backend.
    ///
    /// # Errors
    /// Fails if the delete or the reload fails.
    pub async fn delete_profile(
        &mut self,
        name: &str,
        confirmer: &dyn Confirmer,
    ) -> ApplicationResult<Outcome> {
        if !confirmer
            .confirm(&Confirmation::DeleteModel(name.to_string()))
            .await
        {
            return Ok(Outcome::Cancelled);
        }

        self.api
            .delete_model(name)
            .await
            .map_err(remote("delete model"))?;
        tracing::info!(model = %name, "model deleted");

        if self.current.as_ref().is_some_and(|m| m.name == name) {
            self.current = None;
        }
        self.load().await?;
        Ok(Outcome::Done(()))
    }
}
