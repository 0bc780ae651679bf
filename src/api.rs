use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use trust_dns_resolver::config::NameServerConfig;

use crate::dns_resolver::{AddressLookup, DnsResolver};
use crate::error::AuditError;
use crate::input::{build_targets, load_subdomain_file};
use crate::output::export_json;
use crate::report::Reporter;
use crate::runner;
use crate::summary::RunSummary;
use crate::wildcard::{WildcardProbe, DEFAULT_PROBE_TIMEOUT};

/// 泛解析检测配置
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// 基础域名
    pub domain: String,
    /// 子域名列表文件
    pub subdomain_file: Option<PathBuf>,
    /// 日志文件，所有输出同时写入
    pub output: Option<PathBuf>,
    /// JSON汇总文件
    pub json_output: Option<PathBuf>,
    /// DNS服务器列表，为空时使用系统配置
    pub nameservers: Vec<IpAddr>,
    /// 单次探测的整体超时
    pub timeout: Duration,
    /// 控制台是否带颜色
    pub color: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            domain: String::new(),
            subdomain_file: None,
            output: None,
            json_output: None,
            nameservers: Vec::new(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            color: true,
        }
    }
}

/// 泛解析检测引擎
///
/// 构造时完成输入文件的读取，配置错误在任何探测发生之前返回。
pub struct WildcardAuditor<R> {
    config: AuditConfig,
    targets: Vec<String>,
    probe: WildcardProbe<R>,
}

impl WildcardAuditor<DnsResolver> {
    /// 使用真实DNS解析器，读取子域名文件
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let resolver = DnsResolver::new(&config.nameservers, config.timeout);
        Self::with_resolver(config, resolver)
    }

    /// 实际查询的DNS服务器
    pub fn name_servers(&self) -> &[NameServerConfig] {
        self.probe.resolver().name_servers()
    }
}

impl<R: AddressLookup> WildcardAuditor<R> {
    /// 使用自定义的解析器
    pub fn with_resolver(config: AuditConfig, resolver: R) -> Result<Self, AuditError> {
        let subdomains = match &config.subdomain_file {
            Some(path) => load_subdomain_file(path)?,
            None => Vec::new(),
        };
        let targets = build_targets(&config.domain, subdomains);
        let probe = WildcardProbe::new(resolver).with_timeout(config.timeout);

        Ok(WildcardAuditor {
            config,
            targets,
            probe,
        })
    }

    /// 当前配置
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// 目标列表，基础域名在第一位
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// 输出到标准输出（以及配置的日志文件），完成后按需导出JSON
    pub async fn run(&self) -> Result<RunSummary, AuditError> {
        let mut reporter = Reporter::stdout().with_color(self.config.color);
        if let Some(path) = &self.config.output {
            reporter = reporter.with_log_file(path)?;
        }

        let summary = self.run_with_reporter(&mut reporter).await;
        if let Err(e) = reporter.finish() {
            warn!("failed to close output: {}", e);
        }

        if let Some(path) = &self.config.json_output {
            export_json(&self.config.domain, &summary, path)?;
            info!("JSON report written to {}", path.display());
        }
        Ok(summary)
    }

    /// 输出到调用方提供的报告，不打开日志文件也不导出JSON
    pub async fn run_with_reporter(&self, reporter: &mut Reporter) -> RunSummary {
        runner::run(&self.targets, &self.probe, reporter).await
    }
}

/// 便捷的检测函数，使用系统DNS和默认超时
pub async fn audit_domain(
    domain: &str,
    subdomain_file: Option<PathBuf>,
) -> Result<RunSummary, AuditError> {
    let config = AuditConfig {
        domain: domain.to_string(),
        subdomain_file,
        ..Default::default()
    };
    WildcardAuditor::new(config)?.run().await
}
