use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::AuditError;
use crate::summary::RunSummary;

/// 泛解析条目
#[derive(Debug, Clone, Serialize)]
pub struct ExportedWildcard<'a> {
    /// 存在泛解析的域名
    pub domain: &'a str,
    /// 命中的随机主机名
    pub probe_host: &'a str,
    /// 解析到的地址
    pub ips: &'a [String],
}

/// 完整的导出数据结构
#[derive(Debug, Clone, Serialize)]
pub struct ExportData<'a> {
    /// 基础域名
    pub domain: &'a str,
    /// 目标总数
    pub total_domains: usize,
    /// 实际完成探测的数量
    pub checked: usize,
    /// 泛解析数量
    pub wildcards_detected: usize,
    /// 无法判定的数量
    pub inconclusive: usize,
    /// 泛解析列表
    pub wildcards: Vec<ExportedWildcard<'a>>,
    /// 导出时间（UTC）
    pub export_time: String,
}

impl<'a> ExportData<'a> {
    /// 从运行汇总构建导出数据
    pub fn new(domain: &'a str, summary: &'a RunSummary) -> Self {
        let wildcards = summary
            .wildcards
            .iter()
            .map(|result| ExportedWildcard {
                domain: &result.target,
                probe_host: &result.probe_host,
                ips: result.wildcard_ips().unwrap_or_default(),
            })
            .collect();

        ExportData {
            domain,
            total_domains: summary.total,
            checked: summary.checked,
            wildcards_detected: summary.wildcard_count(),
            inconclusive: summary.indeterminate,
            wildcards,
            export_time: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// 导出汇总到JSON文件
pub fn export_json(domain: &str, summary: &RunSummary, output_path: &Path) -> Result<(), AuditError> {
    let export_data = ExportData::new(domain, summary);
    let json_data = serde_json::to_string_pretty(&export_data)?;

    let write = |source| AuditError::ExportWrite {
        path: output_path.to_path_buf(),
        source,
    };
    let mut file = File::create(output_path).map_err(write)?;
    file.write_all(json_data.as_bytes()).map_err(write)?;
    file.write_all(b"\n").map_err(write)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wildcard::{ProbeOutcome, ProbeResult};

    #[test]
    fn json_report_carries_counts_and_wildcards() {
        let mut summary = RunSummary::new(3);
        summary.record(&ProbeResult {
            target: "example.com".to_string(),
            probe_host: "wildcard-test-a1b2c3d4.example.com".to_string(),
            outcome: ProbeOutcome::WildcardDetected {
                ips: vec!["203.0.113.5".to_string()],
            },
        });
        summary.record(&ProbeResult {
            target: "a.example.com".to_string(),
            probe_host: "wildcard-test-e5f6g7h8.a.example.com".to_string(),
            outcome: ProbeOutcome::Indeterminate {
                reason: "timeout".to_string(),
            },
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_json("example.com", &summary, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["domain"], "example.com");
        assert_eq!(value["total_domains"], 3);
        assert_eq!(value["checked"], 2);
        assert_eq!(value["wildcards_detected"], 1);
        assert_eq!(value["inconclusive"], 1);
        assert_eq!(value["wildcards"][0]["domain"], "example.com");
        assert_eq!(value["wildcards"][0]["ips"][0], "203.0.113.5");
        assert!(value["export_time"].as_str().unwrap().ends_with("UTC"));
    }

    #[test]
    fn unwritable_path_is_an_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let result = export_json("example.com", &RunSummary::new(0), &path);
        assert!(matches!(result, Err(AuditError::ExportWrite { .. })));
    }
}
