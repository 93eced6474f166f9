use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError};
use tracing::{info, warn};

use super::{KeyValueStore, StorageError};

/// Durable store backed by Redis string keys.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(client: &redis::Client) -> Result<Self, StorageError> {
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        info!("Redis connection established");
        Ok(Self { connection })
    }
}

/// Redis answers writes past `maxmemory` with an `OOM` error reply.
fn is_out_of_memory(e: &RedisError) -> bool {
    e.code() == Some("OOM") || e.to_string().starts_with("OOM")
}

fn map_write_error(key: &str, e: RedisError) -> StorageError {
    if is_out_of_memory(&e) {
        warn!("Redis rejected write to '{key}': out of memory");
        StorageError::QuotaExceeded {
            key: key.to_string(),
        }
    } else {
        StorageError::Backend(e.to_string())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| map_write_error(key, e))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oom_reply_maps_to_quota_exceeded() {
        let err = RedisError::from((
            redis::ErrorKind::ExtensionError,
            "OOM",
            "command not allowed when used memory > 'maxmemory'".to_string(),
        ));
        assert!(map_write_error("screener:history", err).is_quota_exceeded());
    }

    #[test]
    fn test_other_errors_map_to_backend() {
        let err = RedisError::from((redis::ErrorKind::IoError, "connection reset"));
        assert!(matches!(
            map_write_error("k", err),
            StorageError::Backend(_)
        ));
    }
}
