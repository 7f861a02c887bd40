use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for credentials and contact data that must never reach the logs.
///
/// `Debug` and `Display` always print a fixed mask, so `tracing::info!("{:?}", req)`
/// is safe. Serialization still writes the real value because API responses
/// (and the persisted session slot) need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

const MASK: &str = "********";

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the raw value. Call sites should be easy to grep for.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_masked() {
        let password = Masked::new("hunter2".to_string());
        assert_eq!(format!("{:?}", password), "********");
        assert_eq!(format!("{}", password), "********");
        assert_eq!(password.expose(), "hunter2");
    }

    #[test]
    fn test_serde_is_transparent() {
        let email: Masked<String> = serde_json::from_str(r#""jane@example.com""#).unwrap();
        assert_eq!(email.expose(), "jane@example.com");
        assert_eq!(serde_json::to_string(&email).unwrap(), r#""jane@example.com""#);
    }
}
