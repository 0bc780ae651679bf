use std::process;

use clap::Parser;
use log::{debug, warn};

use wildcard_probe::input::Opts;
use wildcard_probe::logger;
use wildcard_probe::WildcardAuditor;

#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    logger::init_logger(opts.verbose, !opts.no_color);

    let config = match opts.into_config() {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    // 读取子域名文件，出错时不做任何探测
    let auditor = match WildcardAuditor::new(config) {
        Ok(auditor) => auditor,
        Err(e) => fail(e),
    };
    for ns in auditor.name_servers() {
        debug!("using nameserver {}", ns.socket_addr);
    }

    // 中断时运行的 future 在 select 结束时被丢弃，已有结果的汇总照常输出
    let finished = tokio::select! {
        result = auditor.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match finished {
        Some(Ok(_)) => {}
        Some(Err(e)) => fail(e),
        None => {
            warn!("interrupted");
            process::exit(130);
        }
    }
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    process::exit(1);
}
