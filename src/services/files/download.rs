use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header, web};
use std::path::{Path, PathBuf};

use super::FileService;
use crate::config::AppConfig;
use crate::errors::UniAdminError;
use crate::models::files::entities::File;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

fn file_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::FileNotFound,
        "File not found",
    ))
}

/// 存储名只允许单个文件名，不能越出上传目录
fn resolve_path(upload_dir: &str, stored_name: &str) -> Option<PathBuf> {
    let name = Path::new(stored_name);
    let is_plain = name.components().count() == 1 && name.file_name().is_some();
    is_plain.then(|| Path::new(upload_dir).join(name))
}

/// 图片（头像）内联展示，其余作为附件下载
fn content_disposition(file: &File) -> String {
    let file_name = file.original_name.replace(['"', '\\', '\r', '\n'], "_");
    let kind = if file.file_type.starts_with("image/") {
        "inline"
    } else {
        "attachment"
    };
    format!("{kind}; filename=\"{file_name}\"")
}

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    file_token: String,
) -> ActixResult<HttpResponse> {
    let file = match service.get_storage(request).get_file_by_token(&file_token).await {
        Ok(Some(file)) => file,
        Ok(None) => return Ok(file_not_found()),
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    let Some(path) = resolve_path(&AppConfig::get().upload.dir, &file.stored_name) else {
        tracing::error!("Refusing to serve file {} with stored name {:?}", file.id, file.stored_name);
        return Ok(file_not_found());
    };

    let read_path = path.clone();
    let bytes = match web::block(move || std::fs::read(read_path)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("File {} missing on disk", path.display());
            return Ok(file_not_found());
        }
        Ok(Err(e)) => {
            tracing::error!("{}", UniAdminError::from(e));
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "File read failed",
            )));
        }
        Err(e) => {
            tracing::error!("File read task failed: {}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "File read failed",
            )));
        }
    };

    let content_type = if file.file_type.is_empty() {
        "application/octet-stream".to_string()
    } else {
        file.file_type.clone()
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CONTENT_DISPOSITION, content_disposition(&file)))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_rejects_traversal() {
        assert_eq!(
            resolve_path("uploads", "abc.pdf"),
            Some(PathBuf::from("uploads/abc.pdf"))
        );
        assert!(resolve_path("uploads", "../secret").is_none());
        assert!(resolve_path("uploads", "nested/abc.pdf").is_none());
        assert!(resolve_path("uploads", "/etc/passwd").is_none());
        assert!(resolve_path("uploads", "").is_none());
    }
}
