//! 统一错误处理模块
//!
//! 错误类型由宏生成，每个变体携带错误代码、类型名称和对应的 HTTP 状态。

use actix_web::http::StatusCode;
use std::fmt;

/// 生成错误枚举及其访问方法
///
/// 每个变体生成一个 snake_case 构造函数，例如 `InvalidState` 对应 `invalid_state(msg)`。
macro_rules! define_uniadmin_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $status:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum UniAdminError {
            $($variant(String),)*
        }

        impl UniAdminError {
            pub fn code(&self) -> &'static str {
                match self {
                    $(UniAdminError::$variant(_) => $code,)*
                }
            }

            pub fn error_type(&self) -> &'static str {
                match self {
                    $(UniAdminError::$variant(_) => $type_name,)*
                }
            }

            /// 作为请求结果返回时使用的状态码
            pub fn status_code(&self) -> StatusCode {
                match self {
                    $(UniAdminError::$variant(_) => StatusCode::$status,)*
                }
            }

            pub fn message(&self) -> &str {
                match self {
                    $(UniAdminError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl UniAdminError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        UniAdminError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_uniadmin_errors! {
    // 启动阶段
    DatabaseConfig("E001", "Database Configuration Error", INTERNAL_SERVER_ERROR),
    DatabaseConnection("E002", "Database Connection Error", SERVICE_UNAVAILABLE),
    CacheConnection("E003", "Cache Connection Error", SERVICE_UNAVAILABLE),
    CachePluginNotFound("E004", "Cache Plugin Not Found", INTERNAL_SERVER_ERROR),
    MailerPluginNotFound("E005", "Mailer Plugin Not Found", INTERNAL_SERVER_ERROR),
    // 运行期
    DatabaseOperation("E101", "Database Operation Error", INTERNAL_SERVER_ERROR),
    FileOperation("E102", "File Operation Error", INTERNAL_SERVER_ERROR),
    Serialization("E103", "Serialization Error", INTERNAL_SERVER_ERROR),
    MailDelivery("E104", "Mail Delivery Error", BAD_GATEWAY),
    // 业务规则
    Validation("E201", "Validation Error", BAD_REQUEST),
    NotFound("E202", "Resource Not Found", NOT_FOUND),
    Conflict("E203", "Resource Conflict", CONFLICT),
    InvalidState("E204", "Invalid State Transition", CONFLICT),
}

impl UniAdminError {
    /// 调用方的请求有误，而不是服务端故障
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for UniAdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.format_simple())
    }
}

impl std::error::Error for UniAdminError {}

impl From<sea_orm::DbErr> for UniAdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        UniAdminError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for UniAdminError {
    fn from(err: std::io::Error) -> Self {
        UniAdminError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for UniAdminError {
    fn from(err: serde_json::Error) -> Self {
        UniAdminError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UniAdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let all = [
            UniAdminError::database_config(""),
            UniAdminError::database_connection(""),
            UniAdminError::cache_connection(""),
            UniAdminError::cache_plugin_not_found(""),
            UniAdminError::mailer_plugin_not_found(""),
            UniAdminError::database_operation(""),
            UniAdminError::file_operation(""),
            UniAdminError::serialization(""),
            UniAdminError::mail_delivery(""),
            UniAdminError::validation(""),
            UniAdminError::not_found(""),
            UniAdminError::conflict(""),
            UniAdminError::invalid_state(""),
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_business_errors_are_client_errors() {
        assert_eq!(UniAdminError::invalid_state("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(UniAdminError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert!(UniAdminError::validation("x").is_client_error());
        assert!(!UniAdminError::database_operation("x").is_client_error());
        assert!(!UniAdminError::mail_delivery("smtp down").is_client_error());
    }

    #[test]
    fn test_db_error_conversion() {
        let err: UniAdminError = sea_orm::DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), "E101");
        assert_eq!(err.message(), "Custom Error: boom");
    }

    #[test]
    fn test_io_and_json_conversions() {
        let io: UniAdminError = std::io::Error::other("disk full").into();
        assert_eq!(io.code(), "E102");
        assert!(!io.is_client_error());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: UniAdminError = json_err.into();
        assert_eq!(err.code(), "E103");
    }

    #[test]
    fn test_display() {
        let err = UniAdminError::invalid_state("document 3 is not pending");
        assert_eq!(
            err.to_string(),
            "[E204] Invalid State Transition: document 3 is not pending"
        );
        assert_eq!(
            err.format_simple(),
            "Invalid State Transition: document 3 is not pending"
        );
    }
}
