use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::api::AuditConfig;
use crate::error::AuditError;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "probe")]
#[command(version)]
#[command(about = "Check a domain and a list of subdomains for DNS wildcard records", long_about = None, arg_required_else_help = true)]
pub struct Opts {
    /// base domain to probe (e.g. example.com)
    pub domain: String,

    /// file with one domain/subdomain per line
    pub subdomain_file: Option<PathBuf>,

    /// also write all output to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// write a JSON summary to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// nameserver IPs to query, use system dns on default
    #[arg(short, long)]
    pub resolvers: Vec<String>,

    /// overall resolution timeout per probe, in seconds
    #[arg(short, long, default_value = "3.0")]
    pub timeout: f64,

    /// disable colored console output
    #[arg(long)]
    pub no_color: bool,

    /// diagnostic log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Opts {
    /// 校验参数并转换为检测配置
    pub fn into_config(self) -> Result<AuditConfig, AuditError> {
        Ok(AuditConfig {
            nameservers: parse_nameservers(&self.resolvers)?,
            timeout: parse_timeout(self.timeout)?,
            domain: self.domain,
            subdomain_file: self.subdomain_file,
            output: self.output,
            json_output: self.json,
            color: !self.no_color,
        })
    }
}

/// 解析DNS服务器列表，每一项都必须是IP地址
pub fn parse_nameservers(raw: &[String]) -> Result<Vec<IpAddr>, AuditError> {
    raw.iter()
        .map(|s| {
            s.trim()
                .parse::<IpAddr>()
                .map_err(|_| AuditError::InvalidNameserver(s.clone()))
        })
        .collect()
}

/// 超时必须是有限的正秒数
pub fn parse_timeout(secs: f64) -> Result<Duration, AuditError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(AuditError::InvalidTimeout(secs));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// 逐行读取域名，去掉首尾空白并跳过空行，不去重
pub fn read_subdomains<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut subdomains = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let clean = line.trim();
        if !clean.is_empty() {
            subdomains.push(clean.to_string());
        }
    }
    Ok(subdomains)
}

/// 读取子域名列表文件，文件不存在和读取失败分别报错
pub fn load_subdomain_file(path: &Path) -> Result<Vec<String>, AuditError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => AuditError::SubdomainFileNotFound(path.to_path_buf()),
        _ => AuditError::SubdomainFileRead {
            path: path.to_path_buf(),
            source,
        },
    })?;
    read_subdomains(BufReader::new(file)).map_err(|source| AuditError::SubdomainFileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// 基础域名总是排在第一位，其后按文件顺序
pub fn build_targets<I>(base_domain: &str, subdomains: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    std::iter::once(base_domain.to_string()).chain(subdomains).collect()
}
