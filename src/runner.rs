use log::{info, warn};

use crate::dns_resolver::AddressLookup;
use crate::report::Reporter;
use crate::summary::RunSummary;
use crate::wildcard::{ProbeOutcome, ProbeResult, WildcardProbe};

/// 持有报告输出直到汇总写出。
///
/// 无论循环正常结束、panic 展开还是运行的 future 被丢弃，
/// drop 时都会写出已累计的汇总。
struct AuditSession<'a> {
    reporter: &'a mut Reporter,
    summary: RunSummary,
    closed: bool,
}

impl<'a> AuditSession<'a> {
    fn open(reporter: &'a mut Reporter, total: usize) -> Self {
        AuditSession {
            reporter,
            summary: RunSummary::new(total),
            closed: false,
        }
    }

    fn close(mut self) -> RunSummary {
        self.summary.emit(&mut *self.reporter);
        self.closed = true;
        std::mem::take(&mut self.summary)
    }
}

impl Drop for AuditSession<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!(
            "run interrupted after {} of {} target(s), writing partial summary",
            self.summary.checked, self.summary.total
        );
        self.summary.emit(&mut *self.reporter);
    }
}

/// 依次探测每个目标，最后输出汇总
pub async fn run<R: AddressLookup>(
    targets: &[String],
    probe: &WildcardProbe<R>,
    reporter: &mut Reporter,
) -> RunSummary {
    reporter.line(&format!(
        "--- Checking {} domains/subdomains for Wildcards ---\n",
        targets.len()
    ));
    info!("probing {} target(s), timeout {:?}", targets.len(), probe.timeout());

    let mut session = AuditSession::open(reporter, targets.len());
    for target in targets {
        let result = probe.probe(target, &mut *session.reporter).await;
        report_result(&result, &mut *session.reporter);
        session.summary.record(&result);
    }
    session.close()
}

fn report_result(result: &ProbeResult, reporter: &mut Reporter) {
    match &result.outcome {
        ProbeOutcome::WildcardDetected { ips } => {
            reporter.alert(&format!(
                "    [!] WILDCARD DETECTED: *.{}\n        --> Resolves to: {}\n",
                result.target,
                ips.join(", ")
            ));
        }
        ProbeOutcome::NoWildcard => reporter.success("    [OK] No wildcard.\n"),
        ProbeOutcome::Indeterminate { reason } => {
            reporter.warn(&format!(
                "    [?] Inconclusive ({}), counted as no wildcard.\n",
                reason
            ));
        }
    }
}
