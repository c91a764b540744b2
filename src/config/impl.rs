use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults(Config::builder())?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                // NOTADEZ_SERVER__PORT=8080
                Environment::with_prefix("NOTADEZ")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // 支持从常用环境变量加载
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("email.smtp.host", std::env::var("SMTP_HOST").ok())?
            .set_override_option("email.smtp.username", std::env::var("SMTP_USERNAME").ok())?
            .set_override_option("email.smtp.password", std::env::var("SMTP_PASSWORD").ok())?
            .set_override_option("email.reset_base_url", std::env::var("RESET_BASE_URL").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        Ok(app_config)
    }

    /// 内置默认值，保证没有配置文件时也能启动
    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("app.system_name", "NotaDez")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.unix_socket_path", "")?
            .set_default("server.workers", 0)?
            .set_default("server.max_workers", 8)?
            .set_default("server.timeouts.client_request", 5000)?
            .set_default("server.timeouts.client_disconnect", 1000)?
            .set_default("server.timeouts.keep_alive", 30)?
            .set_default("server.limits.max_payload_size", 2 * 1024 * 1024)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.access_token_expiry", 30)?
            .set_default("jwt.refresh_token_expiry", 7)?
            .set_default("jwt.refresh_token_remember_me_expiry", 30)?
            .set_default("argon2.memory_cost", 19456)?
            .set_default("argon2.time_cost", 2)?
            .set_default("argon2.parallelism", 1)?
            .set_default("database.url", "notadez.db")?
            .set_default("database.pool_size", 5)?
            .set_default("database.timeout", 30)?
            .set_default("cache.default_ttl", 300)?
            .set_default("cache.max_capacity", 10_000)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("cors.max_age", 3600)?
            .set_default("email.transport", "file")?
            .set_default("email.smtp.host", "localhost")?
            .set_default("email.smtp.port", 587)?
            .set_default("email.smtp.username", "")?
            .set_default("email.smtp.password", "")?
            .set_default("email.smtp.use_tls", true)?
            .set_default("email.file_path", "./emails")?
            .set_default("email.from_name", "NotaDez")?
            .set_default("email.from_email", "no-reply@notadez.local")?
            .set_default(
                "email.reset_base_url",
                "http://127.0.0.1:3000/pages/recuperar-senha.html",
            )?
            .set_default("email.reset_token_ttl_minutes", 60)?
            .set_default("import.max_rows", 1000)?
            .set_default("import.max_file_size", 1024 * 1024)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        if config.jwt.secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must be set (JWT_SECRET)".to_string(),
            ));
        }
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailTransportKind;

    #[test]
    fn test_defaults_deserialize() {
        let config: AppConfig = AppConfig::defaults(Config::builder())
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("defaults should form a complete config");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.email.transport, EmailTransportKind::File);
        assert_eq!(config.email.reset_token_ttl_minutes, 60);
        assert_eq!(config.import.max_rows, 1000);
        assert!(config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    fn test_server_bind_address() {
        let mut config: AppConfig = AppConfig::defaults(Config::builder())
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("defaults should form a complete config");
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.server_bind_address(), "0.0.0.0:8080");
    }
}
