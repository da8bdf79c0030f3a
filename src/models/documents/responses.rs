use super::entities::{Document, DocumentAction};
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub items: Vec<Document>,
    pub pagination: PaginationInfo,
}

/// 文档流转历史
#[derive(Debug, Serialize)]
pub struct DocumentHistoryResponse {
    pub items: Vec<DocumentAction>,
}
