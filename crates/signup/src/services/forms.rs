//! Registry of live form sessions.
//!
//! Each visitor's browser session points at one form id. The form itself
//! lives here, in a `moka` cache with time-to-idle, so abandoned forms are
//! dropped without a sweeper task.

use std::sync::Arc;
use std::time::Duration;

use member_signup_core::{FormSession, Referrer};
use moka::future::Cache;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Upper bound on concurrently live forms.
const MAX_FORMS: u64 = 10_000;

/// One live form, bound to the representative it was opened for.
#[derive(Debug)]
pub struct FormHandle {
    id: Uuid,
    referrer: Referrer,
    session: Mutex<FormSession>,
}

impl FormHandle {
    /// Form id stored in the visitor's session cookie.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Representative credited with this form's submission.
    #[must_use]
    pub const fn referrer(&self) -> &Referrer {
        &self.referrer
    }

    /// Lock the form state.
    ///
    /// Never hold the guard across an upstream request.
    pub async fn lock(&self) -> MutexGuard<'_, FormSession> {
        self.session.lock().await
    }
}

/// Live form sessions keyed by form id.
#[derive(Clone)]
pub struct FormRegistry {
    forms: Cache<Uuid, Arc<FormHandle>>,
}

impl FormRegistry {
    /// Create a registry that drops forms idle for longer than `idle`.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        let forms = Cache::builder()
            .max_capacity(MAX_FORMS)
            .time_to_idle(idle)
            .build();

        Self { forms }
    }

    /// Open a fresh form for `referrer`.
    pub async fn open(&self, referrer: Referrer) -> Arc<FormHandle> {
        let handle = Arc::new(FormHandle {
            id: Uuid::new_v4(),
            referrer,
            session: Mutex::new(FormSession::new()),
        });
        self.forms.insert(handle.id, Arc::clone(&handle)).await;
        tracing::debug!(form_id = %handle.id, "Form opened");
        handle
    }

    /// Get a live form.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<FormHandle>> {
        self.forms.get(id).await
    }

    /// Remove a form and tear it down.
    ///
    /// Lookups or submissions still in flight for it become no-ops.
    pub async fn discard(&self, id: &Uuid) {
        if let Some(handle) = self.forms.remove(id).await {
            handle.lock().await.discard();
            tracing::debug!(form_id = %id, "Form discarded");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use member_signup_core::{Field, ReferrerDirectory};

    use super::*;

    fn referrer() -> Referrer {
        ReferrerDirectory::builtin().default_referrer().clone()
    }

    #[tokio::test]
    async fn test_open_and_get() {
        let registry = FormRegistry::new(Duration::from_secs(60));
        let handle = registry.open(referrer()).await;

        let found = registry.get(&handle.id()).await.unwrap();
        assert!(Arc::ptr_eq(&handle, &found));
        assert_eq!(found.referrer().id, "110956");
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let registry = FormRegistry::new(Duration::from_secs(60));
        assert!(registry.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_discard_tears_down_in_flight_handles() {
        let registry = FormRegistry::new(Duration::from_secs(60));
        let handle = registry.open(referrer()).await;
        handle.lock().await.change(Field::PostalCode, "01310100").unwrap();
        let ticket = handle.lock().await.address_ticket().unwrap();

        registry.discard(&handle.id()).await;

        assert!(registry.get(&handle.id()).await.is_none());
        let mut form = handle.lock().await;
        assert!(form.is_discarded());
        assert!(!form.apply_address(&ticket, member_signup_core::AddressFields::default()));
    }
}
