//! 业务通知
//!
//! 文档流转提交后调用；写通知或发邮件失败只记日志，不影响已提交的业务结果。

use std::sync::Arc;
use tracing::warn;

use crate::mail::{self, MailTemplate, Mailer};
use crate::models::notifications::requests::CreateNotificationRequest;
use crate::storage::Storage;

/// 站内通知内容
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub content: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

pub async fn notify(storage: &Arc<dyn Storage>, user_id: i64, notice: Notice) {
    let req = CreateNotificationRequest {
        user_id,
        title: notice.title,
        content: notice.content,
    };
    if let Err(e) = storage.create_notification(req).await {
        warn!("Failed to create notification for user {}: {}", user_id, e);
    }
}

/// 写站内通知并按模板发邮件
pub async fn notify_and_mail(
    storage: &Arc<dyn Storage>,
    mailer: Option<&Arc<dyn Mailer>>,
    user_id: i64,
    email: &str,
    notice: Notice,
    template: MailTemplate,
) {
    notify(storage, user_id, notice).await;
    match mailer {
        Some(mailer) => mail::deliver(mailer.as_ref(), email, template).await,
        None => warn!("No mailer configured, skipping '{}' mail", template.name()),
    }
}
