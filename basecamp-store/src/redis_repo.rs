use async_trait::async_trait;
use redis::RedisResult;
use tracing::debug;

/// Counts hits per key in fixed windows.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Returns false once `key` has been hit more than `limit` times in the
    /// current window.
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool>;
}

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RateLimiter for RedisClient {
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Runs atomically on the server. A counter left without a TTL gets
        // one on its next hit.
        let script = redis::Script::new(
            r#"
            local count = redis.call("INCR", KEYS[1])
            if redis.call("TTL", KEYS[1]) < 0 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return count
        "#,
        );
        let count: i64 = script.key(key).arg(window_seconds).invoke_async(&mut conn).await?;

        if count > limit {
            debug!("Rate limit exceeded for {}: {} > {}", key, count, limit);
        }
        Ok(count <= limit)
    }
}
