use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::identity::{Credentials, IdentityProvider, SignupDetails, User};
use crate::repository::SessionSlot;
use crate::{CoreError, CoreResult};

/// Holds the one signed-in user and mirrors it into a durable slot.
///
/// Passed explicitly to whoever needs it; there is no global session.
pub struct SessionStore {
    identity: Arc<dyn IdentityProvider>,
    slot: Arc<dyn SessionSlot>,
    current: RwLock<Option<User>>,
    hydrated: AtomicBool,
    pending: AtomicUsize,
}

impl SessionStore {
    pub fn new(identity: Arc<dyn IdentityProvider>, slot: Arc<dyn SessionSlot>) -> Self {
        Self {
            identity,
            slot,
            current: RwLock::new(None),
            hydrated: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        }
    }

    /// Build a store and hydrate it from the slot in one go.
    pub async fn open(identity: Arc<dyn IdentityProvider>, slot: Arc<dyn SessionSlot>) -> CoreResult<Self> {
        let store = Self::new(identity, slot);
        store.hydrate().await?;
        Ok(store)
    }

    /// Read the persisted record once. An absent or unreadable record leaves
    /// the session signed out.
    pub async fn hydrate(&self) -> CoreResult<Option<User>> {
        let raw = self
            .slot
            .load()
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        let user = match raw {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Ignoring corrupt session record in slot {}: {}", self.slot.key(), e);
                    None
                }
            },
            None => None,
        };

        *self.current.write().await = user.clone();
        self.hydrated.store(true, Ordering::SeqCst);

        if let Some(user) = &user {
            info!("Session restored for user {}", user.id);
        }
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> CoreResult<User> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string().into(),
        };
        let _loading = LoadingGuard::new(&self.pending);
        let user = self.identity.authenticate(&credentials).await?;
        self.persist(user).await
    }

    pub async fn signup(&self, details: &SignupDetails) -> CoreResult<User> {
        let _loading = LoadingGuard::new(&self.pending);
        let user = self.identity.register(details).await?;
        self.persist(user).await
    }

    pub async fn logout(&self) -> CoreResult<()> {
        self.slot
            .clear()
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        if let Some(user) = self.current.write().await.take() {
            info!("Session ended for user {}", user.id);
        }
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// True before hydration and while a login or signup is outstanding.
    pub fn is_loading(&self) -> bool {
        !self.hydrated.load(Ordering::SeqCst) || self.pending.load(Ordering::SeqCst) > 0
    }

    async fn persist(&self, user: User) -> CoreResult<User> {
        let record = serde_json::to_string(&user).map_err(|e| CoreError::Storage(e.to_string()))?;
        self.slot
            .store(&record)
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        *self.current.write().await = Some(user.clone());
        self.hydrated.store(true, Ordering::SeqCst);
        info!("Session started for user {}", user.id);
        Ok(user)
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MockIdentityProvider;
    use crate::repository::InMemorySessionSlot;
    use std::time::Duration;

    fn provider() -> Arc<dyn IdentityProvider> {
        Arc::new(MockIdentityProvider::new(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_login_persists_user_to_slot() {
        let slot = Arc::new(InMemorySessionSlot::new("flight_booking_user"));
        let store = SessionStore::open(provider(), slot.clone()).await.unwrap();
        assert!(!store.is_authenticated().await);
        assert!(!store.is_loading());

        let user = store.login("jane@example.com", "secret").await.unwrap();
        assert!(store.is_authenticated().await);

        let raw = slot.load().await.unwrap().unwrap();
        let persisted: User = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, user);
    }

    #[tokio::test]
    async fn test_reload_restores_previous_session() {
        let slot = Arc::new(InMemorySessionSlot::new("flight_booking_user"));
        let first = SessionStore::open(provider(), slot.clone()).await.unwrap();
        let details: SignupDetails = serde_json::from_str(
            r#"{"email":"ada@example.com","firstName":"Ada","lastName":"Lovelace","phone":"555","password":"pw"}"#,
        )
        .unwrap();
        let user = first.signup(&details).await.unwrap();

        let reloaded = SessionStore::open(provider(), slot).await.unwrap();
        assert_eq!(reloaded.current_user().await, Some(user));
    }

    #[tokio::test]
    async fn test_logout_then_reload_is_signed_out() {
        let slot = Arc::new(InMemorySessionSlot::new("flight_booking_user"));
        let store = SessionStore::open(provider(), slot.clone()).await.unwrap();
        store.login("jane@example.com", "secret").await.unwrap();
        store.logout().await.unwrap();

        assert!(!store.is_authenticated().await);
        assert_eq!(slot.load().await.unwrap(), None);

        let reloaded = SessionStore::open(provider(), slot).await.unwrap();
        assert!(!reloaded.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_second_login_overwrites_first() {
        let slot = Arc::new(InMemorySessionSlot::new("flight_booking_user"));
        let store = SessionStore::open(provider(), slot.clone()).await.unwrap();
        store.login("first@example.com", "a").await.unwrap();
        store.login("second@example.com", "b").await.unwrap();

        let reloaded = SessionStore::open(provider(), slot).await.unwrap();
        assert_eq!(reloaded.current_user().await.unwrap().email, "second@example.com");
    }

    #[tokio::test]
    async fn test_corrupt_record_is_treated_as_signed_out() {
        let slot = Arc::new(InMemorySessionSlot::new("flight_booking_user"));
        slot.store("{not json").await.unwrap();

        let store = SessionStore::open(provider(), slot).await.unwrap();
        assert!(!store.is_authenticated().await);
    }

    #[test]
    fn test_loading_before_hydration() {
        let store = SessionStore::new(provider(), Arc::new(InMemorySessionSlot::new("k")));
        assert!(store.is_loading());
    }
}
