//! 邮件模板

#[derive(Debug, Clone, PartialEq)]
pub enum MailTemplate {
    /// 重置密码链接，`expires` 为有效分钟数
    ForgotPassword { hash: String, expires: i64 },
    DocumentApproved { name: String, doc_title: String },
    /// `name` 为转交人姓名
    ForwardedDocument { name: String, doc_title: String },
    DocumentRejected { doc_title: String, reason: String },
    ChangesRequested { doc_title: String },
    /// `name` 为提交学生姓名
    DocumentSubmitted { name: String, doc_title: String },
}

impl MailTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MailTemplate::ForgotPassword { .. } => "forgot_password",
            MailTemplate::DocumentApproved { .. } => "document_approved",
            MailTemplate::ForwardedDocument { .. } => "forwarded_document",
            MailTemplate::DocumentRejected { .. } => "document_rejected",
            MailTemplate::ChangesRequested { .. } => "changes_requested",
            MailTemplate::DocumentSubmitted { .. } => "document_submitted",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            MailTemplate::ForgotPassword { .. } => "Reset your password".to_string(),
            MailTemplate::DocumentApproved { doc_title, .. } => {
                format!("Document approved: {doc_title}")
            }
            MailTemplate::ForwardedDocument { doc_title, .. } => {
                format!("Document awaiting your review: {doc_title}")
            }
            MailTemplate::DocumentRejected { doc_title, .. } => {
                format!("Document rejected: {doc_title}")
            }
            MailTemplate::ChangesRequested { doc_title } => {
                format!("Changes requested: {doc_title}")
            }
            MailTemplate::DocumentSubmitted { doc_title, .. } => {
                format!("New document submitted: {doc_title}")
            }
        }
    }

    pub fn body(&self, frontend_url: &str) -> String {
        let base = frontend_url.trim_end_matches('/');
        match self {
            MailTemplate::ForgotPassword { hash, expires } => format!(
                "We received a request to reset your password.\n\n\
                 Open {base}/password-change?hash={hash} to choose a new one.\n\
                 The link expires in {expires} minutes. If you did not ask for this, ignore this email."
            ),
            MailTemplate::DocumentApproved { name, doc_title } => format!(
                "Hello {name},\n\nYour document \"{doc_title}\" has been approved.\n\n\
                 View it at {base}/documents"
            ),
            MailTemplate::ForwardedDocument { name, doc_title } => format!(
                "{name} forwarded the document \"{doc_title}\" to you for review.\n\n\
                 Review it at {base}/staff/documents"
            ),
            MailTemplate::DocumentRejected { doc_title, reason } => format!(
                "The document \"{doc_title}\" has been rejected.\n\nReason: {reason}\n\n\
                 View it at {base}/documents"
            ),
            MailTemplate::ChangesRequested { doc_title } => format!(
                "Changes were requested on your document \"{doc_title}\".\n\n\
                 Update it at {base}/documents"
            ),
            MailTemplate::DocumentSubmitted { name, doc_title } => format!(
                "{name} submitted the document \"{doc_title}\" for your review.\n\n\
                 Review it at {base}/staff/documents"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forgot_password_renders_link_and_expiry() {
        let template = MailTemplate::ForgotPassword {
            hash: "abc.def.ghi".to_string(),
            expires: 60,
        };
        let body = template.body("http://localhost:3000/");
        assert_eq!(template.name(), "forgot_password");
        assert!(body.contains("http://localhost:3000/password-change?hash=abc.def.ghi"));
        assert!(body.contains("60 minutes"));
    }

    #[test]
    fn test_document_templates_render_fields() {
        let rejected = MailTemplate::DocumentRejected {
            doc_title: "Transcript".to_string(),
            reason: "Missing signature".to_string(),
        };
        assert!(rejected.subject().contains("Transcript"));
        assert!(rejected.body("http://app").contains("Reason: Missing signature"));

        let forwarded = MailTemplate::ForwardedDocument {
            name: "Grace Hopper".to_string(),
            doc_title: "Leave request".to_string(),
        };
        let body = forwarded.body("http://app");
        assert_eq!(forwarded.name(), "forwarded_document");
        assert!(body.starts_with("Grace Hopper forwarded"));
        assert!(body.contains("\"Leave request\""));

        let approved = MailTemplate::DocumentApproved {
            name: "Ada".to_string(),
            doc_title: "Clearance".to_string(),
        };
        assert!(approved.body("http://app").starts_with("Hello Ada,"));
    }
}
