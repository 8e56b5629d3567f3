//! Cattyshare Core Library
//!
//! 局域网文件交换服务器的核心实现库：浏览器上传、共享文件下载、
//! mDNS 服务发现。
//!
//! # 模块
//!
//! - **config**: 应用设置（端口、目录、上传上限）的加载与持久化
//! - **net**: 本机对外 IPv4 地址解析
//! - **discovery**: mDNS 服务广播（`_http._tcp`）
//! - **store**: 文件名清洗、冲突解决、共享目录枚举
//! - **server**: axum 路由与 HTTP 处理器
//!
//! # 使用示例
//!
//! ```ignore
//! use cattyshare_core::{AppSettings, AppState, Advertiser, build_router, net};
//! use std::sync::Arc;
//!
//! let settings = AppSettings::load();
//! let state = Arc::new(AppState::new(&settings));
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.listen_port)).await?;
//! let advertiser = Advertiser::register(&settings.device_name, net::local_ip(), settings.listen_port)?;
//!
//! axum::serve(listener, app).await?;
//! advertiser.shutdown();
//! ```

pub mod config;
pub mod discovery;
pub mod net;
pub mod server;
pub mod store;

pub use config::AppSettings;
pub use discovery::Advertiser;
pub use server::{AppState, build_router};
pub use store::{ShareEntry, StoreError};
