//! 本地地址解析
//!
//! 获取局域网内其他设备可达的本机 IPv4 地址。

use log::debug;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// 获取本机对外的 IPv4 地址
///
/// 通过向公网地址"连接"一个 UDP socket（不发送任何数据包），
/// 再读取内核为其绑定的本地地址。任何失败都回退到 `127.0.0.1`，
/// 不向调用方返回错误。
pub fn local_ip() -> Ipv4Addr {
    match outward_ip() {
        Some(ip) => ip,
        None => {
            debug!("Could not determine outward IP, falling back to loopback");
            Ipv4Addr::LOCALHOST
        }
    }
}

fn outward_ip() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    // connect 只设置默认目标，不产生网络流量
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}
