//! 上传处理器
//!
//! 接收 multipart 请求中 `file` 字段携带的单个文件，清洗文件名、
//! 解决重名冲突后流式写入上传目录。
//!
//! # 响应
//!
//! - 成功: `200 {"success": true, "filename": <最终文件名>}`
//! - 缺少文件字段或文件名为空: `400 {"error": <消息>}`
//! - 磁盘写入失败: `500`，不做部分写入清理

use axum::{
    Json,
    extract::{
        State,
        multipart::{Multipart, MultipartError},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use super::AppState;
use crate::store;

/// multipart 请求中的文件字段名
const FILE_FIELD: &str = "file";

pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    // 找到 file 字段；遍历完仍未找到则视为客户端错误
    let mut field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return client_error("No file part"),
            Err(e) => return multipart_error(e),
        }
    };

    let raw_name = field.file_name().unwrap_or("").to_string();
    if raw_name.is_empty() {
        return client_error("No selected file");
    }

    let safe_name = match store::sanitize_file_name(&raw_name) {
        Ok(name) => name,
        Err(_) => {
            warn!("Rejected upload with unusable filename: {:?}", raw_name);
            return client_error("Invalid filename");
        }
    };

    let (mut file, stored_name) = match store::create_unique(&state.uploads_dir, &safe_name).await {
        Ok(pair) => pair,
        Err(e) => {
            error!("Failed to create upload file {:?}: {}", safe_name, e);
            return server_error();
        }
    };

    // 逐块写盘，中途失败直接报 5xx，不清理半成品
    let mut written: u64 = 0;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if let Err(e) = file.write_all(&chunk).await {
                    error!("Write failed for {}: {}", stored_name, e);
                    return server_error();
                }
                written += chunk.len() as u64;
            }
            Ok(None) => break,
            Err(e) => return multipart_error(e),
        }
    }

    if let Err(e) = file.flush().await {
        error!("Flush failed for {}: {}", stored_name, e);
        return server_error();
    }

    info!("Received upload: {} ({} bytes)", stored_name, written);

    Json(json!({ "success": true, "filename": stored_name })).into_response()
}

fn client_error(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Upload failed" })),
    )
        .into_response()
}

/// multipart 解析错误（包括请求体超过大小上限）
fn multipart_error(e: MultipartError) -> Response {
    warn!("Multipart error: {}", e);
    (e.status(), Json(json!({ "error": e.body_text() }))).into_response()
}
