use serde::Serialize;

use crate::report::Reporter;
use crate::wildcard::{ProbeOutcome, ProbeResult};

const RULE_WIDTH: usize = 40;

/// 一次运行的汇总统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 目标列表长度
    pub total: usize,
    /// 已完成探测的数量，运行被中断时小于 `total`
    pub checked: usize,
    /// 超时或出错的数量，汇总中按“无泛解析”计
    pub indeterminate: usize,
    /// 按输入顺序排列的泛解析结果
    pub wildcards: Vec<ProbeResult>,
}

impl RunSummary {
    /// 目标数为 `total` 的空汇总
    pub fn new(total: usize) -> Self {
        RunSummary {
            total,
            ..Default::default()
        }
    }

    /// 累计一个探测结果
    pub fn record(&mut self, result: &ProbeResult) {
        self.checked += 1;
        match result.outcome {
            ProbeOutcome::WildcardDetected { .. } => self.wildcards.push(result.clone()),
            ProbeOutcome::Indeterminate { .. } => self.indeterminate += 1,
            ProbeOutcome::NoWildcard => {}
        }
    }

    /// 检测到泛解析的数量
    pub fn wildcard_count(&self) -> usize {
        self.wildcards.len()
    }

    /// 所有目标都已探测完成
    pub fn is_complete(&self) -> bool {
        self.checked == self.total
    }

    /// 汇总报告的文本行
    pub fn render(&self) -> Vec<String> {
        let rule = "-".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            "SUMMARY REPORT".to_string(),
            rule,
            format!("Total domains checked: {}", self.total),
            format!("Wildcards detected:    {}", self.wildcard_count()),
        ];

        if self.wildcards.is_empty() {
            lines.push("\nNo wildcards detected.".to_string());
        } else {
            lines.push("\nList of domains with wildcards:".to_string());
            for result in &self.wildcards {
                let ips = result.wildcard_ips().unwrap_or_default().join(", ");
                lines.push(format!(" - Wildcard: *.{} ({})", result.target, ips));
            }
        }
        lines
    }

    /// 把汇总逐行写入报告输出
    pub fn emit(&self, reporter: &mut Reporter) {
        for line in self.render() {
            reporter.line(&line);
        }
    }
}
