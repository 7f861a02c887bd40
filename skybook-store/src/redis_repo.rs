use async_trait::async_trait;
use redis::AsyncCommands;
use skybook_core::repository::SessionSlot;
use skybook_core::BoxError;
use tracing::info;

/// Session slot stored under a single Redis key.
#[derive(Clone)]
pub struct RedisSessionSlot {
    client: redis::Client,
    key: String,
    ttl_seconds: Option<u64>,
}

impl RedisSessionSlot {
    pub fn new(connection_string: &str, key: &str, ttl_seconds: Option<u64>) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            key: redis_key(key),
            ttl_seconds,
        })
    }
}

fn redis_key(key: &str) -> String {
    format!("session:{}", key)
}

#[async_trait]
impl SessionSlot for RedisSessionSlot {
    fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> Result<Option<String>, BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(&self.key).await?;
        Ok(value)
    }

    async fn store(&self, value: &str) -> Result<(), BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        match self.ttl_seconds {
            Some(ttl) => conn.set_ex::<_, _, ()>(&self.key, value, ttl).await?,
            None => conn.set::<_, _, ()>(&self.key, value).await?,
        }
        info!("Session slot {} updated", self.key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(&self.key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_namespaced() {
        // Client::open only parses the URL; no server needed.
        let slot = RedisSessionSlot::new("redis://127.0.0.1:6379", "flight_booking_user", None).unwrap();
        assert_eq!(slot.key(), "session:flight_booking_user");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(RedisSessionSlot::new("not a url", "k", None).is_err());
    }
}
