use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;
use log::{debug, warn};

use crate::error::AuditError;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Plain,
    Warning,
    Alert,
    Success,
}

/// 报告输出：每一行同时写入控制台和可选的日志文件。
///
/// 控制台一侧可以带颜色，文件一侧始终是纯文本，两边内容一致。
/// 文件在 [`Reporter::finish`] 或 drop 时刷新并关闭。
pub struct Reporter {
    console: Box<dyn Write>,
    sink: Option<Box<dyn Write>>,
    sink_path: Option<PathBuf>,
    color: bool,
}

impl Reporter {
    /// 以给定的控制台输出创建，不带颜色、没有附加输出
    pub fn new(console: Box<dyn Write>) -> Self {
        Reporter {
            console,
            sink: None,
            sink_path: None,
            color: false,
        }
    }

    /// 输出到标准输出，默认带颜色
    pub fn stdout() -> Self {
        Reporter::new(Box::new(io::stdout())).with_color(true)
    }

    /// 是否给控制台输出上色
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// 附加任意的行输出目标
    pub fn with_sink(mut self, sink: Box<dyn Write>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 创建（截断）日志文件作为附加输出
    pub fn with_log_file(mut self, path: &Path) -> Result<Self, AuditError> {
        let file = File::create(path).map_err(|source| AuditError::OutputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        self.sink = Some(Box::new(BufWriter::new(file)));
        self.sink_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// 附加输出是否仍然打开
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// 普通行
    pub fn line(&mut self, message: &str) {
        self.emit(message, Tone::Plain);
    }

    /// 警告行（控制台黄色）
    pub fn warn(&mut self, message: &str) {
        self.emit(message, Tone::Warning);
    }

    /// 检测到泛解析时的告警行（控制台红色加粗）
    pub fn alert(&mut self, message: &str) {
        self.emit(message, Tone::Alert);
    }

    /// 成功行（控制台绿色）
    pub fn success(&mut self, message: &str) {
        self.emit(message, Tone::Success);
    }

    fn emit(&mut self, message: &str, tone: Tone) {
        let painted = if self.color {
            match tone {
                Tone::Plain => message.normal().to_string(),
                Tone::Warning => message.yellow().to_string(),
                Tone::Alert => message.red().bold().to_string(),
                Tone::Success => message.green().to_string(),
            }
        } else {
            message.to_string()
        };

        if let Err(e) = writeln!(self.console, "{}", painted) {
            debug!("console write failed: {}", e);
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = writeln!(sink, "{}", message) {
                warn!("log file write failed: {}", e);
            }
        }
    }

    /// 刷新并关闭日志文件，之后只剩控制台输出
    pub fn finish(&mut self) -> io::Result<()> {
        let closed = match self.sink.take() {
            Some(mut sink) => sink.flush(),
            None => Ok(()),
        };
        let saved_to = self.sink_path.take();
        if let (Ok(()), Some(path)) = (&closed, saved_to) {
            writeln!(self.console, "\n[+] Results saved to {}", path.display())?;
        }
        self.console.flush()?;
        closed
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!("failed to close output: {}", e);
        }
    }
}
