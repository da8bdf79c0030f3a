use serde::Serialize;

/// 业务错误码
///
/// 按资源分段，`0` 表示成功。序列化为整数写入 `ApiResponse.code`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1999
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证 2000-2099
    AuthFailed = 2000,
    RegisterFailed = 2001,
    ResetTokenInvalid = 2002,
    AccountInactive = 2003,

    // 用户 2100-2199
    UserNotFound = 2100,
    UserAlreadyExists = 2101,
    UserEmailInvalid = 2102,
    UserEmailAlreadyExists = 2103,
    UserPasswordInvalid = 2104,
    UserNameInvalid = 2105,
    UserCreationFailed = 2106,
    UserUpdateFailed = 2107,
    UserDeleteFailed = 2108,
    CanNotDeleteCurrentUser = 2109,

    // 学院/院系 3000-3099
    GroupNotFound = 3000,
    GroupAlreadyExists = 3001,
    DepartmentNotFound = 3010,
    DepartmentAlreadyExists = 3011,

    // 教职工/学生 3100-3199
    StaffNotFound = 3100,
    StudentNotFound = 3110,
    MatricNumberAlreadyExists = 3111,

    // 审批流程 3200-3299
    WorkflowNotFound = 3200,
    WorkflowInvalid = 3201,

    // 文档 4000-4099
    DocumentNotFound = 4000,
    InvalidDocumentState = 4001,
    DocumentNotAssigned = 4002,
    DocumentCreationFailed = 4003,

    // 通知 4100-4199
    NotificationNotFound = 4100,

    // 文件 5000-5099
    FileNotFound = 5000,
    FileUploadFailed = 5001,
    FileTypeNotAllowed = 5002,
    FileSizeExceeded = 5003,
    FileNotImage = 5004,
    MultifileUploadNotAllowed = 5005,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::UserNotFound as i32, 2100);
        assert_eq!(ErrorCode::InvalidDocumentState as i32, 4001);
        assert_eq!(ErrorCode::FileNotImage as i32, 5004);
    }
}
