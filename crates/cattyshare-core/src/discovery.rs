//! 局域网服务广播
//!
//! 通过 mDNS 注册 `_http._tcp` 服务记录，让同一网络内的设备
//! 无需预先知道地址即可发现本服务器。
//!
//! # 生命周期
//!
//! [`Advertiser::register`] 在启动时注册一次；[`Advertiser::shutdown`]
//! 在退出前显式注销。`Drop` 实现兜底，保证异常退出路径上记录同样被注销。

use anyhow::Result;
use log::{info, warn};
use mdns_sd::{ServiceDaemon, ServiceInfo};
use std::net::Ipv4Addr;
use std::time::Duration;

/// 服务类型（局域网发现域内的 FQDN）
pub const SERVICE_TYPE: &str = "_http._tcp.local.";

/// 服务实例名
///
/// 固定格式 `FileShare (<主机名>)`，与既有客户端约定保持一致。
pub fn instance_name(device_name: &str) -> String {
    format!("FileShare ({})", device_name)
}

/// mDNS 广播句柄
///
/// 存活期间服务记录保持注册状态。
pub struct Advertiser {
    daemon: ServiceDaemon,
    fullname: String,
    registered: bool,
}

impl Advertiser {
    /// 注册服务记录
    ///
    /// 应当在监听 socket 绑定成功之后调用。注册失败视为启动失败，
    /// 由调用方决定是否终止进程。
    pub fn register(device_name: &str, ip: Ipv4Addr, port: u16) -> Result<Self> {
        let daemon = ServiceDaemon::new()?;

        let instance = instance_name(device_name);
        let host_name = format!("{}.local.", device_name);
        let txt = vec![("path".to_string(), "/".to_string())];

        let info = ServiceInfo::new(
            SERVICE_TYPE,
            &instance,
            &host_name,
            &ip.to_string(),
            port,
            &txt[..],
        )?;

        let fullname = info.get_fullname().to_string();
        daemon.register(info)?;

        info!("Registered mDNS service '{}' at {}:{}", instance, ip, port);

        Ok(Self {
            daemon,
            fullname,
            registered: true,
        })
    }

    /// 注册的完整服务名
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// 注销服务记录并关闭 mDNS 守护线程
    pub fn shutdown(mut self) {
        self.unregister();
    }

    fn unregister(&mut self) {
        if !self.registered {
            return;
        }
        self.registered = false;

        match self.daemon.unregister(&self.fullname) {
            Ok(rx) => {
                // 等待 goodbye 包发出，超时则放弃
                let _ = rx.recv_timeout(Duration::from_secs(3));
                info!("Unregistered mDNS service '{}'", self.fullname);
            }
            Err(e) => {
                warn!("Failed to unregister mDNS service: {}", e);
            }
        }
        let _ = self.daemon.shutdown();
    }
}

impl Drop for Advertiser {
    fn drop(&mut self) {
        self.unregister();
    }
}
