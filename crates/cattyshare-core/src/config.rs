//! 应用配置和持久化
//!
//! 提供监听端口、存储目录、上传大小上限等设置的存储和读取。

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 8080;

/// 默认上传大小上限 (500 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 500 * 1024 * 1024;

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// 设备名称（用于 mDNS 实例名）
    pub device_name: String,
    /// 监听端口
    pub listen_port: u16,
    /// 上传保存目录
    pub uploads_dir: PathBuf,
    /// 共享文件目录（只读）
    pub shares_dir: PathBuf,
    /// 单次请求体大小上限（字节）
    pub max_upload_size: usize,
    /// 详细日志模式
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        let root = install_root();
        Self {
            device_name: get_default_device_name(),
            listen_port: DEFAULT_PORT,
            uploads_dir: root.join("uploads"),
            shares_dir: root.join("shares"),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// 获取配置文件路径
    fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cattyshare");
        config_dir.join("settings.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(settings) => {
                        debug!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 保存设置
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// 获取默认设备名称（主机名）
fn get_default_device_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "Cattyshare".to_string())
}

/// 安装目录（uploads/ 和 shares/ 的默认父目录）
///
/// 取可执行文件所在目录，取不到时回退到当前目录。
fn install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
