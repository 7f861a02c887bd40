use async_trait::async_trait;
use skybook_core::repository::SessionSlot;
use skybook_core::BoxError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Session slot backed by one JSON file, `<dir>/<key>.json`.
pub struct FileSessionSlot {
    key: String,
    path: PathBuf,
}

impl FileSessionSlot {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            key: key.to_string(),
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionSlot for FileSessionSlot {
    fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> Result<Option<String>, BoxError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, value: &str) -> Result<(), BoxError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // write-then-rename so a crash never leaves half a record
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Session slot written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), BoxError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("skybook-slot-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_file_slot_round_trip() {
        let dir = temp_dir();
        let slot = FileSessionSlot::new(&dir, "flight_booking_user");
        assert_eq!(slot.load().await.unwrap(), None);

        slot.store(r#"{"id":"user_1"}"#).await.unwrap();
        assert!(slot.path().exists());

        // A second handle on the same file sees the record, as after a restart.
        let reopened = FileSessionSlot::new(&dir, "flight_booking_user");
        assert_eq!(reopened.load().await.unwrap().as_deref(), Some(r#"{"id":"user_1"}"#));

        reopened.clear().await.unwrap();
        assert_eq!(slot.load().await.unwrap(), None);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_without_record_is_ok() {
        let slot = FileSessionSlot::new(temp_dir(), "flight_booking_user");
        slot.clear().await.unwrap();
    }
}
