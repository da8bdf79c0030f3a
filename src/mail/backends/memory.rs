use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::declare_mailer_plugin;
use crate::errors::Result;
use crate::mail::{MailMessage, Mailer};

declare_mailer_plugin!("memory", MemoryMailer);

/// 把邮件保存在内存中，按发送顺序编号
#[derive(Default)]
pub struct MemoryMailer {
    next_id: AtomicU64,
    outbox: DashMap<u64, MailMessage>,
}

impl MemoryMailer {
    pub fn new() -> std::result::Result<Self, String> {
        Ok(Self::default())
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        let mut entries: Vec<(u64, MailMessage)> = self
            .outbox
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, message)| message).collect()
    }

    pub fn sent_to(&self, address: &str) -> Vec<MailMessage> {
        self.sent()
            .into_iter()
            .filter(|message| message.to == address)
            .collect()
    }

    pub fn clear(&self) {
        self.outbox.clear();
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.outbox.insert(id, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MailTemplate;

    #[tokio::test]
    async fn test_memory_mailer_records_in_order() {
        let mailer = MemoryMailer::default();
        for title in ["Transcript", "Clearance"] {
            let template = MailTemplate::ChangesRequested {
                doc_title: title.to_string(),
            };
            let message =
                MailMessage::render("no-reply@uni.test", "ada@uni.test", &template, "http://app");
            mailer.send(message).await.unwrap();
        }

        let sent = mailer.sent_to("ada@uni.test");
        assert_eq!(sent.len(), 2);
        assert!(sent[0].body.contains("Transcript"));
        assert!(sent[1].body.contains("Clearance"));
        assert!(mailer.sent_to("bob@uni.test").is_empty());

        mailer.clear();
        assert!(mailer.sent().is_empty());
    }
}
