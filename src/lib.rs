//! # wildcard-probe
//!
//! 检测DNS泛解析记录的工具库。
//!
//! 对每个域名查询一个随机生成、几乎不可能真实存在的子域名
//! （`wildcard-test-<8位随机串>.<域名>`）。如果它能解析出地址，说明该域存在泛解析，
//! 基于子域名枚举的结果就不可信。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use wildcard_probe::audit_domain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = audit_domain("example.com", None).await?;
//!     println!("检测到 {} 个泛解析域名", summary.wildcard_count());
//!     Ok(())
//! }
//! ```
//!
//! ## 高级配置
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use wildcard_probe::{AuditConfig, WildcardAuditor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuditConfig {
//!         domain: "example.com".to_string(),
//!         subdomain_file: Some("subdomains.txt".into()),
//!         output: Some("wildcards.log".into()),
//!         nameservers: vec!["1.1.1.1".parse()?],
//!         timeout: Duration::from_secs(2),
//!         ..Default::default()
//!     };
//!
//!     let auditor = WildcardAuditor::new(config)?;
//!     let summary = auditor.run().await?;
//!     for result in &summary.wildcards {
//!         println!("*.{} -> {:?}", result.target, result.wildcard_ips());
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

/// 检测引擎与配置
pub mod api;
/// DNS查询
pub mod dns_resolver;
/// 错误类型
pub mod error;
/// 命令行参数与输入文件
pub mod input;
/// 诊断日志
pub mod logger;
/// JSON导出
pub mod output;
/// 报告输出
pub mod report;
/// 逐个目标的检测循环
pub mod runner;
/// 汇总统计
pub mod summary;
/// 泛解析探测
pub mod wildcard;

// 重新导出主要的公共API
pub use api::{audit_domain, AuditConfig, WildcardAuditor};

pub use dns_resolver::{AddressLookup, DnsResolver, LookupFailure};
pub use error::AuditError;
pub use input::{build_targets, load_subdomain_file, read_subdomains, Opts};
pub use output::export_json;
pub use report::Reporter;
pub use summary::RunSummary;
pub use wildcard::{generate_nonce, probe_hostname, ProbeOutcome, ProbeResult, WildcardProbe};
