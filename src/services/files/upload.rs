//! multipart 解析与文件落盘
//!
//! 附件、头像和独立上传共用这里的读取与校验逻辑：整个文件读入内存（受大小上限约束），
//! 校验通过后一次性写入上传目录，失败时不会留下残缺文件。

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::FileService;
use crate::config::AppConfig;
use crate::errors::UniAdminError;
use crate::middlewares::RequireJWT;
use crate::models::files::{entities::File, responses::FileUploadResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::file_magic::{detect_image_extension, is_image};
use crate::utils::validate_magic_bytes;

const MAX_TEXT_FIELD: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPolicy {
    /// 扩展名白名单 + 魔术字节
    Attachment,
    /// 仅图片，MIME 与内容都需为图片
    Image,
}

#[derive(Debug)]
pub struct PendingUpload {
    pub original_name: String,
    pub content_type: String,
    pub extension: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<PendingUpload>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug)]
pub enum UploadError {
    MultipleFiles,
    TypeNotAllowed,
    NotImage,
    TooLarge,
    Malformed(String),
    Io(String),
}

impl UploadError {
    pub fn to_response(&self) -> HttpResponse {
        match self {
            UploadError::MultipleFiles => HttpResponse::BadRequest().json(
                ApiResponse::error_empty(
                    ErrorCode::MultifileUploadNotAllowed,
                    "Only one file can be uploaded at a time",
                ),
            ),
            UploadError::TypeNotAllowed => HttpResponse::BadRequest().json(
                ApiResponse::error_empty(ErrorCode::FileTypeNotAllowed, "File type not allowed"),
            ),
            UploadError::NotImage => HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileNotImage,
                "Uploaded file must be an image",
            )),
            UploadError::TooLarge => HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileSizeExceeded,
                "File size exceeds the limit",
            )),
            UploadError::Malformed(msg) => HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)),
            UploadError::Io(msg) => HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(ErrorCode::FileUploadFailed, msg)),
        }
    }
}

fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// 按策略校验文件内容，返回落盘使用的扩展名
pub fn check_upload(
    policy: UploadPolicy,
    original_name: &str,
    content_type: Option<&str>,
    data: &[u8],
    allowed_types: &[String],
) -> Result<String, UploadError> {
    match policy {
        UploadPolicy::Image => {
            if !is_image(data, content_type) {
                return Err(UploadError::NotImage);
            }
            detect_image_extension(data)
                .map(str::to_string)
                .ok_or(UploadError::NotImage)
        }
        UploadPolicy::Attachment => {
            let extension = file_extension(original_name);
            if !allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&extension)) {
                return Err(UploadError::TypeNotAllowed);
            }
            if !validate_magic_bytes(data, &extension) {
                return Err(UploadError::TypeNotAllowed);
            }
            Ok(extension)
        }
    }
}

/// 读取 multipart：文本字段放入 `fields`，名为 `file_field` 的文件字段按策略校验
pub async fn read_multipart(
    mut payload: Multipart,
    file_field: &str,
    policy: UploadPolicy,
) -> Result<MultipartForm, UploadError> {
    let config = &AppConfig::get().upload;
    let max_size = match policy {
        UploadPolicy::Attachment => config.max_size,
        UploadPolicy::Image => config.avatar_max_size,
    };

    let mut form = MultipartForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Malformed(format!("Invalid multipart payload: {e}")))?
    {
        let content_disposition = field.content_disposition().cloned();
        let name = content_disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let filename = content_disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string());

        if name == file_field && filename.is_some() {
            if form.file.is_some() {
                return Err(UploadError::MultipleFiles);
            }
            let content_type = field.content_type().map(|ct| ct.to_string());

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk =
                    chunk.map_err(|e| UploadError::Malformed(format!("Upload interrupted: {e}")))?;
                if data.len() + chunk.len() > max_size {
                    return Err(UploadError::TooLarge);
                }
                data.extend_from_slice(&chunk);
            }

            // 空的文件字段视为未上传
            if data.is_empty() {
                continue;
            }

            let original_name = filename.unwrap_or_default();
            let extension = check_upload(
                policy,
                &original_name,
                content_type.as_deref(),
                &data,
                &config.allowed_types,
            )?;

            form.file = Some(PendingUpload {
                original_name,
                content_type: content_type.unwrap_or_else(|| "application/octet-stream".into()),
                extension,
                data,
            });
        } else {
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk =
                    chunk.map_err(|e| UploadError::Malformed(format!("Invalid field {name}: {e}")))?;
                if value.len() + chunk.len() > MAX_TEXT_FIELD {
                    return Err(UploadError::Malformed(format!("Field {name} is too long")));
                }
                value.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(value)
                .map_err(|_| UploadError::Malformed(format!("Field {name} is not valid UTF-8")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// 写入上传目录并登记，返回文件记录
pub async fn store_upload(
    storage: &Arc<dyn Storage>,
    upload: PendingUpload,
    user_id: Option<i64>,
) -> Result<File, UploadError> {
    let upload_dir = &AppConfig::get().upload.dir;

    std::fs::create_dir_all(upload_dir).map_err(|e| {
        tracing::error!("{}", UniAdminError::file_operation(format!("{e}")));
        UploadError::Io("Failed to prepare upload directory".to_string())
    })?;

    let stored_name = format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp(),
        Uuid::new_v4(),
        upload.extension
    );
    let file_path = Path::new(upload_dir).join(&stored_name);

    std::fs::write(&file_path, &upload.data).map_err(|e| {
        tracing::error!("{}", UniAdminError::file_operation(format!("{e}")));
        UploadError::Io("Failed to write uploaded file".to_string())
    })?;

    let download_token = Uuid::new_v4().simple().to_string();
    match storage
        .create_file(
            &download_token,
            &upload.original_name,
            &stored_name,
            upload.data.len() as i64,
            &upload.content_type,
            user_id,
        )
        .await
    {
        Ok(file) => Ok(file),
        Err(e) => {
            let _ = std::fs::remove_file(&file_path);
            tracing::error!("Failed to record upload: {}", e);
            Err(UploadError::Io("Failed to record uploaded file".to_string()))
        }
    }
}

/// 撤销一次已登记的上传，用于后续写库失败的情况
pub async fn discard_upload(storage: &Arc<dyn Storage>, download_token: &str) {
    let file = match storage.get_file_by_token(download_token).await {
        Ok(Some(file)) => file,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("Failed to look up upload {}: {}", download_token, e);
            return;
        }
    };

    if let Err(e) = storage.delete_file(download_token).await {
        tracing::warn!("Failed to delete upload record {}: {}", download_token, e);
    }
    let file_path = Path::new(&AppConfig::get().upload.dir).join(&file.stored_name);
    if let Err(e) = std::fs::remove_file(&file_path) {
        tracing::warn!("Failed to remove {}: {}", file_path.display(), e);
    }
}

/// 下载地址，用于头像等需要直接引用的场景
pub fn download_url(file: &File) -> String {
    format!("/api/v1/files/{}", file.download_token)
}

pub async fn handle_upload(
    service: &FileService,
    request: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(crate::services::unauthorized());
    };

    let form = match read_multipart(payload, "file", UploadPolicy::Attachment).await {
        Ok(form) => form,
        Err(e) => return Ok(e.to_response()),
    };

    let Some(upload) = form.file else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        )));
    };

    let storage = service.get_storage(request);
    match store_upload(&storage, upload, Some(user_id)).await {
        Ok(file) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FileUploadResponse::from(file),
            "File uploaded successfully",
        ))),
        Err(e) => Ok(e.to_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 12] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];

    fn allowed() -> Vec<String> {
        vec![".pdf".to_string(), ".png".to_string()]
    }

    #[test]
    fn test_attachment_policy() {
        assert_eq!(
            check_upload(UploadPolicy::Attachment, "letter.PDF", None, b"%PDF-1.5", &allowed())
                .unwrap(),
            ".pdf"
        );
        assert!(matches!(
            check_upload(UploadPolicy::Attachment, "run.exe", None, b"MZ", &allowed()),
            Err(UploadError::TypeNotAllowed)
        ));
        // 扩展名与内容不符
        assert!(matches!(
            check_upload(UploadPolicy::Attachment, "fake.pdf", None, &PNG, &allowed()),
            Err(UploadError::TypeNotAllowed)
        ));
    }

    #[test]
    fn test_image_policy() {
        assert_eq!(
            check_upload(UploadPolicy::Image, "me.bin", Some("image/png"), &PNG, &[]).unwrap(),
            ".png"
        );
        assert!(matches!(
            check_upload(UploadPolicy::Image, "cv.pdf", Some("application/pdf"), b"%PDF", &[]),
            Err(UploadError::NotImage)
        ));
        assert!(matches!(
            check_upload(UploadPolicy::Image, "me.png", Some("image/png"), b"%PDF", &[]),
            Err(UploadError::NotImage)
        ));
    }

    #[test]
    fn test_form_text_trims_and_drops_empty() {
        let mut form = MultipartForm::default();
        form.fields.insert("title".into(), "  Transcript ".into());
        form.fields.insert("description".into(), "   ".into());
        assert_eq!(form.text("title").as_deref(), Some("Transcript"));
        assert_eq!(form.text("description"), None);
        assert_eq!(form.text("missing"), None);
    }
}
