use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use colored::*;
use log::{Level, LevelFilter, Metadata, Record};

/// 诊断日志，写到标准错误，与报告输出分开
pub struct Logger {
    use_colors: bool,
    max_level: LevelFilter,
    labels: HashMap<Level, &'static str>,
    mutex: Mutex<()>,
}

impl Logger {
    /// `max_level` 以上的记录被丢弃
    pub fn new(max_level: LevelFilter, use_colors: bool) -> Self {
        let mut labels = HashMap::new();
        labels.insert(Level::Error, "Error");
        labels.insert(Level::Warn, "Warning");
        labels.insert(Level::Info, "INFO");
        labels.insert(Level::Debug, "DEBUG");
        labels.insert(Level::Trace, "TRACE");

        Logger {
            use_colors,
            max_level,
            labels,
            mutex: Mutex::new(()),
        }
    }

    fn wrap(&self, label: &str, level: Level) -> String {
        if !self.use_colors {
            return label.to_string();
        }

        match level {
            Level::Error => label.red().to_string(),
            Level::Warn => label.yellow().to_string(),
            Level::Info => label.blue().to_string(),
            Level::Debug => label.magenta().to_string(),
            Level::Trace => label.normal().to_string(),
        }
    }

    /// 格式化一条日志，不输出时返回 `None`
    pub fn format(&self, level: Level, args: &std::fmt::Arguments) -> Option<String> {
        if level > self.max_level {
            return None;
        }
        let label = self.labels.get(&level).copied().unwrap_or("LOG");
        Some(format!("[{}] {}", self.wrap(label, level), args))
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        let Some(line) = self.format(record.level(), record.args()) else {
            return;
        };
        // 锁只用于避免多条日志交错
        let _guard = self.mutex.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(std::io::stderr(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// 按 `-v` 次数选择日志级别
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// 安装全局日志，重复调用时保留已安装的实例
pub fn init_logger(verbose: u8, use_colors: bool) {
    let level = level_for_verbosity(verbose);
    if log::set_boxed_logger(Box::new(Logger::new(level, use_colors))).is_ok() {
        log::set_max_level(level);
    }
}
