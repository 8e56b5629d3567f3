//! 文件存储模块
//!
//! 上传文件的落盘与共享目录的枚举。
//!
//! # 功能
//!
//! - 文件名清洗（去除路径分隔符和遍历序列）
//! - 重名冲突解决（`stem_N.ext` 命名方案，独占创建保证原子性）
//! - 共享目录枚举（仅普通文件，按名称不区分大小写排序）
//! - 下载路径解析（限制在共享目录内部）

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 文件名清洗后为空（纯分隔符、纯点号等）
    #[error("invalid file name")]
    InvalidFileName,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 共享目录中的一个文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub name: String,
    pub size: u64,
}

/// 清洗客户端提交的文件名
///
/// 路径分隔符折叠为下划线，仅保留字母数字和 `.` `_` `-`，
/// 再剥掉首尾的点号和下划线（`..` 前缀随之消失）。
/// 清洗结果为空时返回 [`StoreError::InvalidFileName`]。
pub fn sanitize_file_name(raw: &str) -> Result<String, StoreError> {
    let spaced: String = raw
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let name = kept.trim_matches(|c| c == '.' || c == '_');
    if name.is_empty() {
        return Err(StoreError::InvalidFileName);
    }
    Ok(name.to_string())
}

/// 拆分文件名为主干和扩展名
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// 在目录中以未占用的名字独占创建文件
///
/// 依次尝试 `name`、`stem_1.ext`、`stem_2.ext`…，每个候选名都用
/// `create_new` 独占打开。并发上传同名文件时各自拿到不同的 N，
/// 不会相互覆盖。返回打开的文件和最终采用的文件名。
pub async fn create_unique(dir: &Path, name: &str) -> Result<(File, String), StoreError> {
    let (stem, ext) = split_name(name);
    let mut candidate = name.to_string();
    let mut counter: u32 = 0;

    loop {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&candidate))
            .await
        {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter += 1;
                candidate = match ext {
                    Some(ext) => format!("{}_{}.{}", stem, counter, ext),
                    None => format!("{}_{}", stem, counter),
                };
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// 枚举共享目录（非递归）
///
/// 只包含普通文件，目录与特殊条目被过滤。目录不存在时返回空列表。
pub async fn list_shares(dir: &Path) -> std::io::Result<Vec<ShareEntry>> {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        entries.push(ShareEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            size: metadata.len(),
        });
    }

    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// 解析下载请求路径
///
/// 请求路径可以包含子目录段，但解析结果必须停留在共享目录内部。
/// 任何非普通路径段（`..`、绝对路径前缀等）都返回 `None`。
pub fn resolve_share_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let rel = Path::new(requested);
    if rel.as_os_str().is_empty() {
        return None;
    }
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(rel))
}
