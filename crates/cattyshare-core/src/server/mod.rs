//! HTTP 服务模块
//!
//! 包含:
//! - 路由构建与共享状态
//! - 上传处理器 (`POST /upload`)
//! - 共享列表与下载处理器 (`GET /shares`, `GET /shares/*path`)
//! - 内嵌的前端页面 (`GET /`)

pub mod shares;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppSettings;

/// 内嵌前端页面（构建时打进二进制）
const INDEX_HTML: &str = include_str!("index.html");

/// 各处理器共享的状态
///
/// 目录和大小上限在构造时显式传入，处理器不读取任何进程级全局量。
pub struct AppState {
    pub uploads_dir: PathBuf,
    pub shares_dir: PathBuf,
    pub max_upload_size: usize,
}

impl AppState {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            uploads_dir: settings.uploads_dir.clone(),
            shares_dir: settings.shares_dir.clone(),
            max_upload_size: settings.max_upload_size,
        }
    }
}

/// 构建 HTTP 路由
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_size);

    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload::upload_handler))
        .route("/shares", get(shares::list_handler))
        .route("/shares/*path", get(shares::download_handler))
        .layer(body_limit)
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
