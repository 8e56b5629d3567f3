//! 集成测试 - HTTP 接口
//!
//! 在临时目录上启动真实的 axum 服务器，通过 reqwest 验证
//! 上传、列表、下载接口的端到端行为。

use cattyshare_core::{AppState, ShareEntry, build_router};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const TEST_MAX_UPLOAD: usize = 500 * 1024 * 1024;

/// 在 127.0.0.1 的随机端口上启动服务器，返回 base URL
async fn spawn_server(uploads_dir: &Path, shares_dir: &Path, max_upload_size: usize) -> String {
    let state = Arc::new(AppState {
        uploads_dir: uploads_dir.to_path_buf(),
        shares_dir: shares_dir.to_path_buf(),
        max_upload_size,
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn file_form(name: &'static str, bytes: &[u8]) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(name);
    reqwest::multipart::Form::new().part("file", part)
}

/// 上传成功后文件落盘，响应携带最终文件名
#[tokio::test]
async fn test_upload_stores_file() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base))
        .multipart(file_form("hello.txt", b"hello world"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "hello.txt");

    let stored = std::fs::read(uploads.path().join("hello.txt")).unwrap();
    assert_eq!(stored, b"hello world");
}

/// 重名上传依次得到 report_1.pdf、report_2.pdf
#[tokio::test]
async fn test_upload_duplicate_names_get_suffixed() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    std::fs::write(uploads.path().join("report.pdf"), b"original").unwrap();

    let client = reqwest::Client::new();
    for expected in ["report_1.pdf", "report_2.pdf"] {
        let resp = client
            .post(format!("{}/upload", base))
            .multipart(file_form("report.pdf", b"duplicate"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["filename"], expected);
        assert!(uploads.path().join(expected).exists());
    }

    // 原文件未被覆盖
    let original = std::fs::read(uploads.path().join("report.pdf")).unwrap();
    assert_eq!(original, b"original");
}

/// 带路径遍历的文件名被清洗为安全的基础名，不会逃出上传目录
#[tokio::test]
async fn test_upload_traversal_name_is_sanitized() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base))
        .multipart(file_form("../../etc/passwd", b"oops"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["filename"], "etc_passwd");
    assert!(uploads.path().join("etc_passwd").exists());
}

/// 缺少 file 字段时返回 400 和错误消息
#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let form = reqwest::multipart::Form::new().text("comment", "no file here");
    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No file part");
}

/// 文件名为空时返回 400
#[tokio::test]
async fn test_upload_empty_filename_is_rejected() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let part = reqwest::multipart::Part::bytes(b"data".to_vec());
    let form = reqwest::multipart::Form::new().part("file", part);
    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No selected file");
}

/// 超过大小上限的上传被拒绝，不会留下超限的文件
#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), 1024).await;

    let payload = vec![0u8; 4096];
    let part = reqwest::multipart::Part::bytes(payload).file_name("big.bin");
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_client_error());

    // 可能留下小于上限的半成品，但绝不会有完整的超限文件
    for entry in std::fs::read_dir(uploads.path()).unwrap() {
        let len = entry.unwrap().metadata().unwrap().len();
        assert!(len <= 1024, "partial file larger than limit: {} bytes", len);
    }
}

/// 列表只含普通文件，按名称不区分大小写排序
#[tokio::test]
async fn test_shares_listing_sorted_case_insensitive() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    std::fs::write(shares.path().join("b.TXT"), b"0123456789").unwrap();
    std::fs::write(shares.path().join("A.txt"), b"01234").unwrap();
    std::fs::create_dir(shares.path().join("nested")).unwrap();

    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let entries: Vec<ShareEntry> = reqwest::get(format!("{}/shares", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        entries,
        vec![
            ShareEntry {
                name: "A.txt".to_string(),
                size: 5
            },
            ShareEntry {
                name: "b.TXT".to_string(),
                size: 10
            },
        ]
    );
}

/// 共享目录为空时返回空数组
#[tokio::test]
async fn test_shares_listing_empty() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let entries: Vec<ShareEntry> = reqwest::get(format!("{}/shares", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(entries.is_empty());
}

/// 下载响应以附件形式返回文件内容
#[tokio::test]
async fn test_download_share_as_attachment() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    std::fs::write(shares.path().join("notes.txt"), b"important notes").unwrap();

    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let resp = reqwest::get(format!("{}/shares/notes.txt", base)).await.unwrap();

    assert_eq!(resp.status(), 200);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("notes.txt"));
    assert_eq!(resp.headers().get("content-length").unwrap(), "15");

    let body = resp.bytes().await.unwrap();
    assert_eq!(&body[..], b"important notes");
}

/// 不存在的文件与目录条目都返回 404
#[tokio::test]
async fn test_download_missing_share_returns_404() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    std::fs::create_dir(shares.path().join("folder")).unwrap();

    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let resp = reqwest::get(format!("{}/shares/nope.bin", base)).await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("{}/shares/folder", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
}

/// 首页返回内嵌的 HTML 页面
#[tokio::test]
async fn test_index_serves_html() {
    let uploads = TempDir::new().unwrap();
    let shares = TempDir::new().unwrap();
    let base = spawn_server(uploads.path(), shares.path(), TEST_MAX_UPLOAD).await;

    let resp = reqwest::get(&base).await.unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    assert!(resp.text().await.unwrap().contains("File Share"));
}
