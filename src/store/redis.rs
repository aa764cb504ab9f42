//! Redis-backed key-value store

use std::collections::HashMap;

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};
use crate::store::KvStore;

#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Create a new Redis store and verify the connection
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Store(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Store(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    async fn conn(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Store(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait::async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| AppError::Store(format!("GET {} failed: {}", key, e)))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| AppError::Store(format!("SET {} failed: {}", key, e)))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| AppError::Store(format!("DEL {} failed: {}", key, e)))
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.conn().await?;
        conn.incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| AppError::Store(format!("INCR {} failed: {}", key, e)))
    }

    async fn hincr(&self, key: &str, field: &str) -> AppResult<i64> {
        let mut conn = self.conn().await?;
        conn.hincr::<_, _, _, i64>(key, field, 1)
            .await
            .map_err(|e| AppError::Store(format!("HINCRBY {} {} failed: {}", key, field, e)))
    }

    async fn hgetall(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let mut conn = self.conn().await?;
        conn.hgetall::<_, HashMap<String, String>>(key)
            .await
            .map_err(|e| AppError::Store(format!("HGETALL {} failed: {}", key, e)))
    }

    async fn lpush(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.conn().await?;
        conn.lpush::<_, _, ()>(key, value)
            .await
            .map_err(|e| AppError::Store(format!("LPUSH {} failed: {}", key, e)))
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> AppResult<()> {
        let mut conn = self.conn().await?;
        conn.ltrim::<_, ()>(key, start, stop)
            .await
            .map_err(|e| AppError::Store(format!("LTRIM {} failed: {}", key, e)))
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> AppResult<Vec<String>> {
        let mut conn = self.conn().await?;
        conn.lrange::<_, Vec<String>>(key, start, stop)
            .await
            .map_err(|e| AppError::Store(format!("LRANGE {} failed: {}", key, e)))
    }
}
