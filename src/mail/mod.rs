//! 邮件发送
//!
//! 与缓存后端相同，邮件后端按名称注册为插件（`log`、`memory`），启动时根据
//! `mail.backend` 选择。业务代码只依赖 `Mailer` trait；发送失败只记录日志。

pub mod backends;
pub mod register;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::{Result, UniAdminError};

pub use templates::MailTemplate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub template: &'static str,
    pub body: String,
}

impl MailMessage {
    /// 渲染模板，链接指向 `frontend_url`
    pub fn render(
        from: &str,
        to: impl Into<String>,
        template: &MailTemplate,
        frontend_url: &str,
    ) -> Self {
        Self {
            from: from.to_string(),
            to: to.into(),
            subject: template.subject(),
            template: template.name(),
            body: template.body(frontend_url),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<()>;
}

/// 使用全局配置渲染并发送；失败只记日志
pub async fn deliver(mailer: &dyn Mailer, to: &str, template: MailTemplate) {
    let config = &AppConfig::get().mail;
    let message = MailMessage::render(&config.from, to, &template, &config.frontend_url);
    if let Err(e) = mailer.send(message).await {
        warn!("Failed to send '{}' mail to {}: {}", template.name(), to, e);
    }
}

/// 为邮件后端生成 `register()`
#[macro_export]
macro_rules! declare_mailer_plugin {
    ($name:expr, $ty:ty) => {
        pub fn register() {
            $crate::mail::register::register_mailer_plugin(
                $name,
                std::sync::Arc::new(|| {
                    <$ty>::new()
                        .map(|mailer| std::sync::Arc::new(mailer) as std::sync::Arc<dyn $crate::mail::Mailer>)
                        .map_err($crate::errors::UniAdminError::mail_delivery)
                }),
            );
        }
    };
}

/// 创建配置指定的邮件后端，找不到时回退到 `log`
pub fn create_mailer() -> Result<Arc<dyn Mailer>> {
    let backend = &AppConfig::get().mail.backend;

    if let Some(constructor) = register::get_mailer_plugin(backend) {
        return constructor();
    }

    warn!("Mailer backend '{}' not registered, falling back to log", backend);
    register::get_mailer_plugin("log")
        .ok_or_else(|| UniAdminError::mailer_plugin_not_found(backend.clone()))
        .and_then(|constructor| constructor())
}
