use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    // 下载令牌，对外唯一标识
    pub download_token: String,
    // 原始文件名
    pub original_name: String,
    // 磁盘上的文件名
    #[serde(skip_serializing, default)]
    pub stored_name: String,
    // 文件大小（以字节为单位）
    pub file_size: i64,
    // 文件类型（MIME）
    pub file_type: String,
    // 上传者
    pub user_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
