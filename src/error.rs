use std::path::PathBuf;

use thiserror::Error;

/// 运行前（读取输入、打开输出）以及导出阶段的错误。
///
/// 单个域名的解析失败不会出现在这里，它们被归入
/// [`ProbeOutcome::Indeterminate`](crate::wildcard::ProbeOutcome)。
#[derive(Debug, Error)]
pub enum AuditError {
    /// 子域名列表文件不存在
    #[error("Could not find file {}", .0.display())]
    SubdomainFileNotFound(PathBuf),

    /// 子域名列表文件存在但无法读取（权限、非UTF-8等）
    #[error("Could not read file {}: {source}", path.display())]
    SubdomainFileRead {
        /// 文件路径
        path: PathBuf,
        /// 底层IO错误
        #[source]
        source: std::io::Error,
    },

    /// 日志文件无法创建
    #[error("Could not open output file {}: {source}", path.display())]
    OutputOpen {
        /// 文件路径
        path: PathBuf,
        /// 底层IO错误
        #[source]
        source: std::io::Error,
    },

    /// DNS服务器不是合法的IP地址
    #[error("Invalid nameserver address: {0}")]
    InvalidNameserver(String),

    /// 超时不是正数
    #[error("Invalid timeout: {0} (expected a positive number of seconds)")]
    InvalidTimeout(f64),

    /// JSON汇总写入失败
    #[error("Could not write JSON report {}: {source}", path.display())]
    ExportWrite {
        /// 文件路径
        path: PathBuf,
        /// 底层IO错误
        #[source]
        source: std::io::Error,
    },

    /// JSON序列化失败
    #[error("Could not serialize JSON report: {0}")]
    ExportSerialize(#[from] serde_json::Error),
}
