use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use skybook_shared::Masked;
use std::time::Duration;

use crate::CoreResult;

/// The signed-in traveller. Persisted as JSON in the session slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupDetails {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: Masked<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and return the matching user.
    async fn authenticate(&self, credentials: &Credentials) -> CoreResult<User>;

    /// Create an account and return the new user.
    async fn register(&self, details: &SignupDetails) -> CoreResult<User>;
}

/// Stand-in identity provider: waits, then accepts anything.
pub struct MockIdentityProvider {
    login_delay: Duration,
    signup_delay: Duration,
}

impl MockIdentityProvider {
    pub fn new(delay: Duration) -> Self {
        Self::with_delays(delay, delay)
    }

    pub fn with_delays(login_delay: Duration, signup_delay: Duration) -> Self {
        Self {
            login_delay,
            signup_delay,
        }
    }

    fn next_user_id() -> String {
        format!("user_{}", Utc::now().timestamp_millis())
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn authenticate(&self, credentials: &Credentials) -> CoreResult<User> {
        tokio::time::sleep(self.login_delay).await;

        // No credential check: every email/password pair is accepted and
        // the profile is a placeholder.
        tracing::debug!("Mock login accepted for {}", Masked::new(&credentials.email));

        Ok(User {
            id: Self::next_user_id(),
            email: credentials.email.clone(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone: Some("+1 (555) 123-4567".to_string()),
        })
    }

    async fn register(&self, details: &SignupDetails) -> CoreResult<User> {
        tokio::time::sleep(self.signup_delay).await;

        Ok(User {
            id: Self::next_user_id(),
            email: details.email.clone(),
            first_name: details.first_name.clone(),
            last_name: details.last_name.clone(),
            phone: details.phone.clone(),
        })
    }
}
