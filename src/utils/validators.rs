// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::RegexSet;
use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use url::{Host, Url};

/// 环回及元地址主机名黑名单（小写比较）
const BLOCKED_HOSTNAMES: [&str; 5] = ["localhost", "127.0.0.1", "0.0.0.0", "::1", "[::1]"];

/// 以私有地址段开头的主机名（如 `10.0.0.1.nip.io`，通配 DNS 会解析到内嵌的地址）
static PRIVATE_HOSTNAME_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"^10\.",
        r"^172\.(1[6-9]|2[0-9]|3[01])\.",
        r"^192\.168\.",
        r"^169\.254\.",
    ])
    .expect("private hostname patterns are valid")
});

/// URL 拒绝原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRejection {
    /// URL 无法解析
    #[error("invalid URL")]
    InvalidUrl,
    /// 非 HTTP/HTTPS 协议
    #[error("only HTTP and HTTPS protocols are allowed")]
    UnsupportedScheme,
    /// 本地或环回地址
    #[error("local and loopback addresses are not allowed")]
    LoopbackHost,
    /// 私有或链路本地地址
    #[error("private and internal IP addresses are not allowed")]
    PrivateAddress,
}

/// URL 安全判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSafetyVerdict {
    Allowed,
    Rejected(UrlRejection),
}

impl UrlSafetyVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, UrlSafetyVerdict::Allowed)
    }

    /// 拒绝原因（允许时为 None）
    pub fn reason(&self) -> Option<String> {
        match self {
            UrlSafetyVerdict::Allowed => None,
            UrlSafetyVerdict::Rejected(rejection) => Some(rejection.to_string()),
        }
    }
}

/// 判定 URL 是否可以从服务端网络位置安全抓取 (防止 SSRF)
///
/// 依次检查：语法、协议、环回主机名、私有/链路本地地址段。
/// 任一检查失败即返回，不再继续。纯函数，无 I/O。
pub fn check_url(url: &str) -> UrlSafetyVerdict {
    match validate_url(url) {
        Ok(_) => UrlSafetyVerdict::Allowed,
        Err(rejection) => UrlSafetyVerdict::Rejected(rejection),
    }
}

/// 验证 URL 并返回解析结果
///
/// # 参数
///
/// * `url` - URL字符串
///
/// # 返回值
///
/// * `Ok(Url)` - URL 安全
/// * `Err(UrlRejection)` - 第一个未通过的检查
pub fn validate_url(url: &str) -> Result<Url, UrlRejection> {
    let parsed = Url::parse(url).map_err(|_| UrlRejection::InvalidUrl)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlRejection::UnsupportedScheme);
    }

    // The parsed host is what the HTTP client will connect to; userinfo and
    // numeric encodings are already normalized away here.
    let host = parsed.host().ok_or(UrlRejection::InvalidUrl)?;
    let hostname = parsed
        .host_str()
        .ok_or(UrlRejection::InvalidUrl)?
        .to_lowercase();

    if is_blocked_hostname(&hostname) || is_mapped_loopback(&host) {
        return Err(UrlRejection::LoopbackHost);
    }

    if is_private_host(&host) {
        return Err(UrlRejection::PrivateAddress);
    }

    Ok(parsed)
}

fn is_blocked_hostname(hostname: &str) -> bool {
    BLOCKED_HOSTNAMES.contains(&hostname)
}

fn is_mapped_loopback(host: &Host<&str>) -> bool {
    match host {
        Host::Ipv6(ipv6) => ipv6
            .to_ipv4_mapped()
            .is_some_and(|ipv4| ipv4 == Ipv4Addr::LOCALHOST || ipv4.is_unspecified()),
        _ => false,
    }
}

fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Ipv4(ipv4) => is_private_ipv4(*ipv4),
        Host::Ipv6(ipv6) => match ipv6.to_ipv4_mapped() {
            Some(ipv4) => is_private_ipv4(ipv4),
            None => is_private_ipv6(*ipv6),
        },
        Host::Domain(domain) => PRIVATE_HOSTNAME_PATTERNS.is_match(domain),
    }
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    match octets[0] {
        // 10.0.0.0/8
        10 => true,
        // 172.16.0.0/12
        172 => (16..=31).contains(&octets[1]),
        // 192.168.0.0/16
        192 => octets[1] == 168,
        // 169.254.0.0/16 (Link-local, cloud metadata)
        169 => octets[1] == 254,
        _ => false,
    }
}

fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    // Unique Local Address (fc00::/7)
    if (first & 0xfe00) == 0xfc00 {
        return true;
    }
    // Link-local (fe80::/10)
    (first & 0xffc0) == 0xfe80
}
