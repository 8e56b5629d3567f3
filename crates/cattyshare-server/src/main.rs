//! Cattyshare Server
//!
//! 局域网文件共享服务器，负责：
//! - 接收浏览器上传并保存到上传目录
//! - 列出并提供共享目录中的文件下载
//! - 通过 mDNS 广播自身，局域网内免地址发现

use anyhow::{Context, Result};
use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use cattyshare_core::{Advertiser, AppSettings, AppState, build_router, net};

#[derive(Parser)]
#[command(name = "cattyshare", version, about = "局域网文件共享服务器")]
struct Cli {
    /// 监听端口 (默认 8080，或配置文件中的值)
    #[arg(short, long)]
    port: Option<u16>,
    /// 上传保存目录
    #[arg(long)]
    uploads_dir: Option<PathBuf>,
    /// 共享文件目录
    #[arg(long)]
    shares_dir: Option<PathBuf>,
    /// 不注册 mDNS 广播
    #[arg(long)]
    no_advertise: bool,
    /// 详细日志模式
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 桥接 log crate（cattyshare-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let mut settings = AppSettings::load();
    if let Some(port) = cli.port {
        settings.listen_port = port;
    }
    if let Some(dir) = cli.uploads_dir {
        settings.uploads_dir = dir;
    }
    if let Some(dir) = cli.shares_dir {
        settings.shares_dir = dir;
    }
    if cli.verbose {
        settings.verbose = true;
    }

    // 初始化日志
    let default_filter = if settings.verbose {
        "debug"
    } else {
        "info,cattyshare_core=debug"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();

    tracing::info!("Cattyshare Server starting...");

    // 目录无法创建视为启动失败，不做静默降级
    std::fs::create_dir_all(&settings.uploads_dir).with_context(|| {
        format!(
            "Failed to create uploads directory {:?}",
            settings.uploads_dir
        )
    })?;
    std::fs::create_dir_all(&settings.shares_dir)
        .with_context(|| format!("Failed to create shares directory {:?}", settings.shares_dir))?;

    let local_ip = net::local_ip();
    let port = settings.listen_port;

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("Failed to bind 0.0.0.0:{}", port))?;

    print_banner(local_ip, port, &settings);

    // 绑定成功后再注册广播；注册失败没有恢复路径，终止启动
    let advertiser = if cli.no_advertise {
        None
    } else {
        let advertiser = Advertiser::register(&settings.device_name, local_ip, port)
            .context("Failed to register mDNS service")?;
        tracing::info!(
            "Discoverable on the local network as 'FileShare ({})'",
            settings.device_name
        );
        Some(advertiser)
    };

    let state = Arc::new(AppState::new(&settings));
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 正常退出路径显式注销；其余路径由 Drop 兜底
    if let Some(advertiser) = advertiser {
        advertiser.shutdown();
    }

    tracing::info!("Cattyshare Server stopped");
    Ok(())
}

fn print_banner(local_ip: Ipv4Addr, port: u16, settings: &AppSettings) {
    println!();
    println!("==================================================");
    println!("  📁 文件共享服务器");
    println!("==================================================");
    println!();
    println!("  本机地址:   http://localhost:{}", port);
    println!("  局域网地址: http://{}:{}", local_ip, port);
    println!();
    println!("  上传保存到: {}", settings.uploads_dir.display());
    println!("  共享目录:   {}", settings.shares_dir.display());
    println!();
    println!("  在同一网络的任意设备上打开上面的地址即可");
    println!("==================================================");
    println!();
}

/// 等待 SIGINT 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
