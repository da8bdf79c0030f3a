use config::{Config, ConfigError, File};
use std::sync::OnceLock;

use super::{AppConfig, Environment};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 常用环境变量到配置键的映射，优先级高于 `UNIADMIN_*`
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.log_level"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("UNIX_SOCKET", "server.unix_socket_path"),
    ("CPU_COUNT", "server.workers"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
    ("REDIS_URL", "cache.redis.url"),
    ("REDIS_KEY_PREFIX", "cache.redis.key_prefix"),
    ("REDIS_TTL", "cache.default_ttl"),
    ("MAIL_BACKEND", "mail.backend"),
    ("MAIL_FROM", "mail.from"),
    ("FRONTEND_URL", "mail.frontend_url"),
    ("UPLOAD_DIR", "upload.dir"),
];

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

impl AppConfig {
    /// 加载配置：`config.toml`，`config.{APP_ENV}.toml`，`UNIADMIN_*`，最后是 `ENV_OVERRIDES`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("UNIADMIN")
                    .separator("_")
                    .try_parsing(true),
            );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;

        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        app_config.validate()?;
        Ok(app_config)
    }

    /// 检查相互依赖的配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Message(msg.to_string()));

        if self.jwt.secret.is_empty() {
            return fail("jwt.secret must be set (config file or JWT_SECRET)");
        }
        if self.is_production() && self.jwt.secret == DEFAULT_JWT_SECRET {
            return fail("jwt.secret still has the default value in production");
        }
        if self.jwt.access_token_expiry <= 0 || self.jwt.reset_token_expiry <= 0 {
            return fail("jwt expiries must be positive");
        }
        if self.upload.avatar_max_size > self.upload.max_size {
            return fail("upload.avatar_max_size cannot exceed upload.max_size");
        }
        if self.mail.frontend_url.trim().is_empty() {
            return fail("mail.frontend_url must be set");
        }
        Ok(())
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
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == Environment::Development
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

    fn sample() -> AppConfig {
        Config::builder()
            .add_source(File::from_str(
                include_str!("../../config.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap()
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = sample();
        assert!(config.validate().is_ok());
        assert_eq!(config.mail.backend, "log");
        assert_eq!(config.cache.cache_type, "moka");
    }

    #[test]
    fn test_default_secret_rejected_in_production() {
        let mut config = sample();
        config.app.environment = Environment::Production;
        assert!(config.validate().is_err());

        config.jwt.secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_avatar_limit_bounded_by_upload_limit() {
        let mut config = sample();
        config.upload.avatar_max_size = config.upload.max_size + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_parsed_from_override() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(
                include_str!("../../config.toml"),
                config::FileFormat::Toml,
            ))
            .set_override("app.environment", "production")
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .unwrap();
        assert!(config.is_production());
        assert!(!config.is_development());
    }
}
