use crate::cache::{MokaCacheWrapper, ObjectCache};
use crate::config::AppConfig;
use crate::email::EmailService;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub email: Arc<EmailService>,
}

/// 创建缓存实例
fn create_cache(config: &AppConfig) -> Arc<dyn ObjectCache> {
    debug!(
        "Creating moka cache backend (ttl: {}s, capacity: {})",
        config.cache.default_ttl, config.cache.max_capacity
    );
    Arc::new(MokaCacheWrapper::new(&config.cache))
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和邮件服务
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::get();

    if config.jwt.secret.is_empty() {
        warn!("JWT secret is empty, set JWT_SECRET before deploying");
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    let cache = create_cache(config);
    warn!("Cache backend initialized");

    let email = EmailService::new(&config.email).expect("Failed to create email service");
    warn!("Email service initialized ({:?} transport)", config.email.transport);

    StartupContext {
        storage,
        cache,
        email: Arc::new(email),
    }
}
