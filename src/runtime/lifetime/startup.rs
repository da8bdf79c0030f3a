use crate::cache::object_cache::register_builtin_object_caches;
use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{Result, UniAdminError};
use crate::mail::{Mailer, backends::register_builtin_mailers, create_mailer};
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_random_password;
use crate::utils::validate::validate_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ADMIN_EMAIL: &str = "admin@localhost";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub mailer: Arc<dyn Mailer>,
}

async fn try_cache_backend(name: &str) -> Option<Arc<dyn ObjectCache>> {
    let Some(constructor) = get_object_cache_plugin(name) else {
        warn!("Cache backend '{}' not found in registry", name);
        return None;
    };

    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", name);
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create {} cache: {}", name, e);
            None
        }
    }
}

/// 创建缓存实例，配置的后端不可用时回退到 moka
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    if let Some(cache) = try_cache_backend(cache_type).await {
        return Ok(cache);
    }

    if cache_type != "moka" {
        warn!("Falling back to memory cache");
        if let Some(cache) = try_cache_backend("moka").await {
            return Ok(cache);
        }
    }

    Err(UniAdminError::cache_plugin_not_found(format!(
        "No cache backend available (tried: {cache_type})"
    )))
}

/// 空库时创建初始管理员，返回新账号；已有用户时返回 `None`
///
/// 密码取自 `ADMIN_PASSWORD`，未设置时随机生成并打印到日志。
pub async fn seed_admin(storage: &Arc<dyn Storage>) -> Result<Option<User>> {
    let existing = storage.count_users().await?;
    if existing > 0 {
        debug!("Database already has {} user(s), skipping admin seed", existing);
        return Ok(None);
    }

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(password) => {
            if let Err(problems) = validate_password(&password) {
                warn!("ADMIN_PASSWORD does not meet the password policy: {}", problems);
            }
            password
        }
        Err(_) => {
            let generated = generate_random_password(16);
            warn!("ADMIN_PASSWORD not set, generated admin password: {}", generated);
            warn!("Change it after the first login");
            generated
        }
    };

    let admin = storage
        .create_user(CreateUserRequest {
            email: ADMIN_EMAIL.to_string(),
            password: hash_password(&password)?,
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            phone: None,
            role: UserRole::Admin,
            avatar_url: None,
        })
        .await?;

    Ok(Some(admin))
}

/// 注册插件并依次初始化存储、缓存和邮件后端
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，可忽略
    let _ = rustls::crypto::ring::default_provider().install_default();

    register_builtin_object_caches();
    register_builtin_mailers();

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    match seed_admin(&storage).await {
        Ok(Some(admin)) => info!("Created initial admin {} (ID: {})", admin.email, admin.id),
        Ok(None) => {}
        // 建号失败不影响启动，管理员可稍后手动创建
        Err(e) => warn!("Failed to seed admin account: {}", e),
    }

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    let mailer = create_mailer()?;
    warn!("Mailer backend '{}' initialized", AppConfig::get().mail.backend);

    Ok(StartupContext {
        storage,
        cache,
        mailer,
    })
}
