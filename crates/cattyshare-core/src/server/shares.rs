//! 共享文件的列表与下载处理器
//!
//! 共享目录由运维方在进程外维护，这里只在每次请求时重新枚举，
//! 不做任何缓存。

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, info};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use super::AppState;
use crate::store;

/// `GET /shares` — 列出可下载的文件
pub async fn list_handler(State(state): State<Arc<AppState>>) -> Response {
    match store::list_shares(&state.shares_dir).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            error!("Failed to list shares: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /shares/*path` — 以附件形式下载一个共享文件
///
/// 路径可含子目录段，但必须解析在共享目录内部；越界和不存在的
/// 文件统一返回 404。
pub async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    let Some(full_path) = store::resolve_share_path(&state.shares_dir, &path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let file = match File::open(&full_path).await {
        Ok(file) => file,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    let metadata = match file.metadata().await {
        Ok(m) if m.is_file() => m,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let file_name = full_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    let mime = mime_guess::from_path(&full_path).first_or_octet_stream();

    info!("Serving share: {} ({} bytes)", file_name, metadata.len());

    let headers = [
        ("Content-Type", mime.to_string()),
        ("Content-Length", metadata.len().to_string()),
        (
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    let stream = ReaderStream::new(file);

    (headers, Body::from_stream(stream)).into_response()
}
