use serde::Serialize;

use super::entities::File;

/// 上传结果
#[derive(Debug, Serialize)]
pub struct FileUploadResponse {
    /// 下载令牌
    pub download_token: String,
    /// 原始文件名
    pub file_name: String,
    /// 文件大小(字节)
    pub size: i64,
    /// 文件类型
    pub content_type: String,
    /// 上传时间
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl From<File> for FileUploadResponse {
    fn from(file: File) -> Self {
        Self {
            download_token: file.download_token,
            file_name: file.original_name,
            size: file.file_size,
            content_type: file.file_type,
            uploaded_at: file.created_at,
        }
    }
}
