use std::time::{Duration, Instant};

use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::dns_resolver::{AddressLookup, LookupFailure};
use crate::report::Reporter;

/// 随机标签长度
pub const NONCE_LEN: usize = 8;
const NONCE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
/// 探测主机名前缀
pub const PROBE_PREFIX: &str = "wildcard-test-";
/// 单次探测的整体超时
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// 单个域名的探测结论
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 随机主机名解析出了地址
    WildcardDetected {
        /// 返回的IPv4地址，保持解析器给出的顺序
        ips: Vec<String>,
    },
    /// NXDOMAIN 或没有A记录
    NoWildcard,
    /// 超时或其它错误，无法判定
    Indeterminate {
        /// 失败原因
        reason: String,
    },
}

/// 探测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// 被检测的域名
    pub target: String,
    /// 实际查询的随机主机名
    pub probe_host: String,
    /// 结论
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    /// 是否检测到泛解析
    pub fn is_wildcard(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::WildcardDetected { .. })
    }

    /// 泛解析指向的地址，没有泛解析时为 `None`
    pub fn wildcard_ips(&self) -> Option<&[String]> {
        match &self.outcome {
            ProbeOutcome::WildcardDetected { ips } => Some(ips),
            _ => None,
        }
    }
}

/// 生成随机标签，每次调用都重新取随机数
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LEN)
        .map(|_| NONCE_ALPHABET[rng.gen_range(0..NONCE_ALPHABET.len())] as char)
        .collect()
}

/// 拼接探测主机名 `wildcard-test-<nonce>.<domain>`
pub fn probe_hostname(domain: &str, nonce: &str) -> String {
    format!("{}{}.{}", PROBE_PREFIX, nonce, domain)
}

/// 泛解析探测器
///
/// 对 `wildcard-test-<随机串>.<domain>` 查询一次A记录：能解析出地址说明
/// 该域存在泛解析，NXDOMAIN 或无记录说明不存在，超时和其它错误则无法判定。
pub struct WildcardProbe<R> {
    resolver: R,
    timeout: Duration,
}

impl<R: AddressLookup> WildcardProbe<R> {
    /// 使用默认的3秒超时
    pub fn new(resolver: R) -> Self {
        WildcardProbe {
            resolver,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// 设置单次探测的整体超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 单次探测的整体超时
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 底层解析器
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// 探测 `domain` 是否存在泛解析，错误不会向外传播
    pub async fn probe(&self, domain: &str, reporter: &mut Reporter) -> ProbeResult {
        let probe_host = probe_hostname(domain, &generate_nonce());
        reporter.line(&format!("[-] Probing target: {}", probe_host));

        let started = Instant::now();
        let lookup = tokio::time::timeout(self.timeout, self.resolver.lookup_a(&probe_host)).await;
        debug!("{} answered in {:?}", probe_host, started.elapsed());

        let outcome = match lookup {
            Ok(Ok(ips)) if !ips.is_empty() => ProbeOutcome::WildcardDetected { ips },
            Ok(Ok(_)) | Ok(Err(LookupFailure::NxDomain)) | Ok(Err(LookupFailure::NoAnswer)) => {
                ProbeOutcome::NoWildcard
            }
            Ok(Err(LookupFailure::Timeout)) | Err(_) => {
                reporter.warn(&format!("    [!] Timeout resolving {}", probe_host));
                ProbeOutcome::Indeterminate {
                    reason: "timeout".to_string(),
                }
            }
            Ok(Err(LookupFailure::Other(reason))) => {
                reporter.warn(&format!("    [!] Error: {}", reason));
                ProbeOutcome::Indeterminate { reason }
            }
        };

        ProbeResult {
            target: domain.to_string(),
            probe_host,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// 固定返回同一结果，并记录查询过的主机名
    struct Fixed {
        answer: Result<Vec<String>, LookupFailure>,
        asked: Mutex<Vec<String>>,
    }

    impl Fixed {
        fn new(answer: Result<Vec<String>, LookupFailure>) -> Self {
            Fixed {
                answer,
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    impl AddressLookup for Fixed {
        async fn lookup_a(&self, host: &str) -> Result<Vec<String>, LookupFailure> {
            self.asked.lock().unwrap().push(host.to_string());
            self.answer.clone()
        }
    }

    struct Hang;

    impl AddressLookup for Hang {
        async fn lookup_a(&self, _host: &str) -> Result<Vec<String>, LookupFailure> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec!["198.51.100.1".to_string()])
        }
    }

    fn reporter() -> (Reporter, Buffer) {
        let buf = Buffer::default();
        (Reporter::new(Box::new(buf.clone())), buf)
    }

    #[test]
    fn nonce_has_fixed_length_and_alphabet() {
        for _ in 0..200 {
            let nonce = generate_nonce();
            assert_eq!(nonce.len(), NONCE_LEN);
            assert!(nonce.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn nonces_are_not_reused() {
        let nonces: HashSet<String> = (0..100).map(|_| generate_nonce()).collect();
        assert!(nonces.len() > 95);
        assert_ne!(generate_nonce(), generate_nonce());
    }

    #[test]
    fn hostname_is_prefixed_under_the_zone() {
        assert_eq!(probe_hostname("example.com", "ab12cd34"), "wildcard-test-ab12cd34.example.com");
    }

    #[tokio::test]
    async fn nxdomain_means_no_wildcard() {
        let probe = WildcardProbe::new(Fixed::new(Err(LookupFailure::NxDomain)));
        let (mut reporter, buf) = reporter();

        let result = probe.probe("example.com", &mut reporter).await;

        assert_eq!(result.outcome, ProbeOutcome::NoWildcard);
        assert!(!result.is_wildcard());
        assert!(!buf.text().contains("[!]"));
    }

    #[tokio::test]
    async fn no_answer_and_empty_answer_mean_no_wildcard() {
        let (mut reporter, _buf) = reporter();
        let no_answer = WildcardProbe::new(Fixed::new(Err(LookupFailure::NoAnswer)));
        let empty = WildcardProbe::new(Fixed::new(Ok(Vec::new())));

        assert_eq!(no_answer.probe("example.com", &mut reporter).await.outcome, ProbeOutcome::NoWildcard);
        assert_eq!(empty.probe("example.com", &mut reporter).await.outcome, ProbeOutcome::NoWildcard);
    }

    #[tokio::test]
    async fn resolved_probe_is_a_wildcard_with_ordered_ips() {
        let ips = vec!["203.0.113.5".to_string(), "203.0.113.6".to_string()];
        let probe = WildcardProbe::new(Fixed::new(Ok(ips.clone())));
        let (mut reporter, _buf) = reporter();

        let result = probe.probe("example.com", &mut reporter).await;

        assert_eq!(result.outcome, ProbeOutcome::WildcardDetected { ips: ips.clone() });
        assert_eq!(result.wildcard_ips(), Some(ips.as_slice()));
        assert_eq!(result.target, "example.com");
    }

    #[tokio::test]
    async fn probing_line_names_the_queried_host() {
        let lookup = Fixed::new(Err(LookupFailure::NxDomain));
        let probe = WildcardProbe::new(lookup);
        let (mut reporter, buf) = reporter();

        let result = probe.probe("example.com", &mut reporter).await;

        let asked = probe.resolver.asked.lock().unwrap().clone();
        assert_eq!(asked, vec![result.probe_host.clone()]);
        assert!(result.probe_host.starts_with(PROBE_PREFIX));
        assert!(result.probe_host.ends_with(".example.com"));
        assert_eq!(buf.text(), format!("[-] Probing target: {}\n", result.probe_host));
    }

    #[tokio::test]
    async fn resolver_timeout_is_indeterminate_with_warning() {
        let probe = WildcardProbe::new(Fixed::new(Err(LookupFailure::Timeout)));
        let (mut reporter, buf) = reporter();

        let result = probe.probe("example.com", &mut reporter).await;

        assert_eq!(
            result.outcome,
            ProbeOutcome::Indeterminate {
                reason: "timeout".to_string()
            }
        );
        assert!(buf.text().contains(&format!("    [!] Timeout resolving {}", result.probe_host)));
    }

    #[tokio::test]
    async fn deadline_bounds_a_hanging_resolver() {
        let probe = WildcardProbe::new(Hang).with_timeout(Duration::from_millis(50));
        let (mut reporter, _buf) = reporter();

        let started = Instant::now();
        let result = probe.probe("example.com", &mut reporter).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(
            result.outcome,
            ProbeOutcome::Indeterminate {
                reason: "timeout".to_string()
            }
        );
    }

    #[tokio::test]
    async fn other_errors_are_indeterminate_with_reason() {
        let probe = WildcardProbe::new(Fixed::new(Err(LookupFailure::Other(
            "server responded with Server Failure".to_string(),
        ))));
        let (mut reporter, buf) = reporter();

        let result = probe.probe("example.com", &mut reporter).await;

        assert_eq!(
            result.outcome,
            ProbeOutcome::Indeterminate {
                reason: "server responded with Server Failure".to_string()
            }
        );
        assert!(buf.text().contains("    [!] Error: server responded with Server Failure"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let result = ProbeResult {
            target: "example.com".to_string(),
            probe_host: "wildcard-test-00000000.example.com".to_string(),
            outcome: ProbeOutcome::WildcardDetected {
                ips: vec!["203.0.113.5".to_string()],
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"]["status"], "wildcard_detected");
        assert_eq!(json["outcome"]["ips"][0], "203.0.113.5");
    }
}
