use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;
use trust_dns_resolver::config::{
    LookupIpStrategy, NameServerConfig, NameServerConfigGroup, ResolverConfig, ResolverOpts,
};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::TokioAsyncResolver;

/// A记录查询失败的分类
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// NXDOMAIN
    #[error("name does not exist")]
    NxDomain,
    /// 名称存在但没有A记录
    #[error("no A records")]
    NoAnswer,
    /// 解析器超时
    #[error("timeout")]
    Timeout,
    /// 其它错误（SERVFAIL、REFUSED、网络错误等），附带描述
    #[error("{0}")]
    Other(String),
}

/// A记录查询接口，探测逻辑只依赖这一层
#[allow(async_fn_in_trait)]
pub trait AddressLookup {
    /// 查询 `host` 的A记录，按解析器返回顺序给出地址字符串
    async fn lookup_a(&self, host: &str) -> Result<Vec<String>, LookupFailure>;
}

/// 基于 trust-dns 的DNS解析器
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    config: ResolverConfig,
}

impl DnsResolver {
    /// `nameservers` 为空时使用系统配置的DNS服务器，否则查询这些地址的53端口
    pub fn new(nameservers: &[IpAddr], timeout: Duration) -> Self {
        if nameservers.is_empty() {
            let (config, opts) = match trust_dns_resolver::system_conf::read_system_conf() {
                Ok(conf) => conf,
                Err(e) => {
                    warn!("failed to read system resolver configuration, using defaults: {}", e);
                    (ResolverConfig::default(), ResolverOpts::default())
                }
            };
            return Self::from_parts(config, opts, timeout);
        }

        let servers: Vec<SocketAddr> = nameservers.iter().map(|ip| SocketAddr::new(*ip, 53)).collect();
        Self::with_name_servers(&servers, timeout)
    }

    /// 使用指定地址（含端口）的DNS服务器
    pub fn with_name_servers(servers: &[SocketAddr], timeout: Duration) -> Self {
        let mut group = NameServerConfigGroup::new();
        for addr in servers {
            group.merge(NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true));
        }
        let config = ResolverConfig::from_parts(None, vec![], group);
        Self::from_parts(config, ResolverOpts::default(), timeout)
    }

    fn from_parts(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> Self {
        // 每次探测只查询一次，整体超时由调用方控制
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;

        debug!(
            "resolver configured with {} nameserver(s), timeout {:?}",
            config.name_servers().len(),
            timeout
        );

        DnsResolver {
            resolver: TokioAsyncResolver::tokio(config.clone(), opts),
            config,
        }
    }

    /// 实际使用的DNS服务器
    pub fn name_servers(&self) -> &[NameServerConfig] {
        self.config.name_servers()
    }
}

impl AddressLookup for DnsResolver {
    async fn lookup_a(&self, host: &str) -> Result<Vec<String>, LookupFailure> {
        // 以FQDN查询，避免search域改变结果
        let fqdn = format!("{}.", host.trim_end_matches('.'));
        let response = self.resolver.lookup_ip(fqdn.as_str()).await.map_err(classify_error)?;

        let ips: Vec<String> = response
            .iter()
            .filter_map(|ip| match ip {
                IpAddr::V4(ipv4) => Some(ipv4.to_string()),
                IpAddr::V6(_) => None,
            })
            .collect();

        if ips.is_empty() {
            return Err(LookupFailure::NoAnswer);
        }
        Ok(ips)
    }
}

/// 将 trust-dns 错误映射为 [`LookupFailure`]
pub fn classify_error(err: ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => LookupFailure::NxDomain,
            ResponseCode::NoError => LookupFailure::NoAnswer,
            other => LookupFailure::Other(format!("server responded with {}", other)),
        },
        ResolveErrorKind::Timeout => LookupFailure::Timeout,
        _ => LookupFailure::Other(err.to_string()),
    }
}
