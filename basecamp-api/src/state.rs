use basecamp_store::{RateLimiter, Repositories};
use std::path::PathBuf;
use std::sync::Arc;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub bootstrap_admin_email: Option<String>,
}

#[derive(Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_image_bytes: usize,
}

#[derive(Clone)]
pub struct RateLimit {
    pub limiter: Arc<dyn RateLimiter>,
    pub requests_per_minute: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub metrics: Arc<Metrics>,
    /// Absent when no Redis is configured; requests are then not limited.
    pub rate_limit: Option<RateLimit>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        auth: AuthConfig,
        uploads: UploadConfig,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            repos,
            auth,
            uploads,
            metrics: Arc::new(Metrics::new()?),
            rate_limit: None,
        })
    }

    pub fn with_rate_limit(mut self, limiter: Arc<dyn RateLimiter>, requests_per_minute: i64) -> Self {
        self.rate_limit = Some(RateLimit {
            limiter,
            requests_per_minute,
        });
        self
    }
}
