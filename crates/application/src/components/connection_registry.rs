//! Connection registry
//!
//! Holds the connection profiles known to the backend and the active one.
//! The profile list is always re-read from the backend after a change;
//! local copies are never merged.

use std::sync::Arc;

use futures::future::try_join_all;
use keydesk_domain::{Confirmation, ConnectionProfile, Outcome, startup_selection};

use crate::error::{ApplicationError, ApplicationResult, remote};
use crate::ports::{ClientStateStore, Confirmer, ConnectionApi};

/// Profiles, the active selection and the remembered name.
pub struct ConnectionRegistry<A, S> {
    api: Arc<A>,
    state_store: S,
    profiles: Vec<ConnectionProfile>,
    active: Option<String>,
}

impl<A: ConnectionApi, S: ClientStateStore> ConnectionRegistry<A, S> {
    /// Creates an empty registry. Call [`Self::restore`] to populate it.
    pub const fn new(api: Arc<A>, state_store: S) -> Self {
        Self {
            api,
            state_store,
            profiles: Vec::new(),
            active: None,
        }
    }

    /// Profiles sorted by name.
    #[must_use]
    pub fn profiles(&self) -> &[ConnectionProfile] {
        &self.profiles
    }

    /// Name of the active connection.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active profile.
    #[must_use]
    pub fn active_profile(&self) -> Option<&ConnectionProfile> {
        let name = self.active.as_deref()?;
        self.find(name)
    }

    /// Looks a profile up by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ConnectionProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Re-reads every profile from the backend.
    ///
    /// Names are listed first, then details are fetched concurrently. Any
    /// failure leaves the previous list in place. An active name that no
    /// longer exists is dropped.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Remote`] if any call fails.
    pub async fn load(&mut self) -> ApplicationResult<()> {
        let names = self
            .api
            .list_connection_names()
            .await
            .map_err(remote("list connections"))?;

        let api = &self.api;
        let mut profiles = try_join_all(names.iter().map(|name| api.get_connection(name)))
            .await
            .map_err(remote("load connection"))?;
        profiles.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(count = profiles.len(), "connection profiles loaded");
        self.profiles = profiles;

        if let Some(active) = &self.active
            && self.find(active).is_none()
        {
            tracing::info!(connection = %active, "active connection no longer exists");
            self.active = None;
        }
        Ok(())
    }

    /// Creates or replaces a profile, then reloads the list.
    ///
    /// # Errors
    /// Fails on a blank name (no call is made) or a backend error.
    pub async fn save_profile(&mut self, profile: &ConnectionProfile) -> ApplicationResult<()> {
        profile.validate()?;
        self.api
            .save_connection(profile)
            .await
            .map_err(remote("save connection"))?;
        tracing::info!(connection = %profile.name, "connection saved");
        self.load().await
    }

    /// Makes a profile active and remembers its name.
    ///
    /// # Errors
    /// Returns [`ApplicationError::UnknownConnection`] if the name is not in
    /// the registry, or [`ApplicationError::ClientState`] if it cannot be
    /// remembered. Nothing changes on error.
    pub async fn select_active(&mut self, name: &str) -> ApplicationResult<ConnectionProfile> {
        let profile = self
            .find(name)
            .cloned()
            .ok_or_else(|| ApplicationError::UnknownConnection(name.to_string()))?;
        self.state_store.remember_connection(&profile.name).await?;
        self.active = Some(profile.name.clone());
        tracing::info!(connection = %profile.name, "connection selected");
        Ok(profile)
    }

    /// Deletes a profile after confirmation.
    ///
    /// Returns `Done(true)` when the deleted profile was the active one, in
    /// which case both the selection and the remembered name are cleared.
    /// Another profile is not selected automatically.
    ///
    /// # Errors
    /// Fails if the backend rejects the delete, or if the remembered name
    /// cannot be cleared.
    pub async fn delete_profile(
        &mut self,
        name: &str,
        confirmer: &dyn Confirmer,
    ) -> ApplicationResult<Outcome<bool>> {
        if !confirmer
            .confirm(&Confirmation::DeleteConnection(name.to_string()))
            .await
        {
            return Ok(Outcome::Cancelled);
        }

        self.api
            .delete_connection(name)
            .await
            .map_err(remote("delete connection"))?;
        tracing::info!(connection = %name, "connection deleted");

        let was_active = self.active.as_deref() == Some(name);
        if was_active {
            self.active = None;
            self.state_store.forget_connection().await?;
        }

        self.load().await?;
        Ok(Outcome::Done(was_active))
    }

    /// Loads the profiles and, if nothing is active, picks one.
    ///
    /// The remembered name wins when still present, else the smallest name.
    /// An unreadable remembered name counts as absent.
    ///
    /// # Errors
    /// Fails if the profiles cannot be loaded or the selection cannot be
    /// remembered.
    pub async fn restore(&mut self) -> ApplicationResult<Option<ConnectionProfile>> {
        self.load().await?;
        if let Some(profile) = self.active_profile() {
            return Ok(Some(profile.clone()));
        }

        let remembered = self
            .state_store
            .remembered_connection()
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not read remembered connection");
                None
            });

        let Some(name) = startup_selection(&self.profiles, remembered.as_deref())
            .map(|profile| profile.name.clone())
        else {
            tracing::debug!("no connection profiles to select");
            return Ok(None);
        };
        self.select_active(&name).await.map(Some)
    }
}
