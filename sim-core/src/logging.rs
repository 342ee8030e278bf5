//! Logging setup. Plain stdout logging matches the teacher's
//! `tracing_subscriber::fmt().with_env_filter(...).init()` pattern; the
//! supervisor additionally tees every line into a per-match log file with a
//! simulated-time prefix, grounded on
//! `original_source/.../modules/robot_logging.py`'s
//! `Tee`/`InsertPrefix`/`prefix_and_tee_streams`.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// The core's board/device log level comes from `WEBOTS_DEVICE_LOGGING`
/// rather than `RUST_LOG`, matching the original simulator's env var.
const LOG_LEVEL_ENV_VAR: &str = "WEBOTS_DEVICE_LOGGING";

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_env(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| "sim_core=info".into())
}

/// Initialise plain stdout logging, filtered by `WEBOTS_DEVICE_LOGGING`
/// (default `sim_core=info`). Used by `usercode-runner` and dev-mode runs
/// that have no per-match log file to tee into.
pub fn init_stdout() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// Initialise logging that tees every line to both stdout and `log_path`,
/// prefixing each line with `prefix()` (called once per write, matching
/// `robot_logging.py`'s lazy callable prefix — the supervisor passes in
/// something like `|| format!("[{:0.3}] ", simulated_time())`).
pub fn init_teed(log_path: &Path, prefix: impl Fn() -> String + Send + Sync + 'static) -> io::Result<()> {
    let writer = SupervisorLogWriter::open(log_path, prefix)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Clone)]
pub struct SupervisorLogWriter {
    file: Arc<Mutex<File>>,
    line_start: Arc<Mutex<bool>>,
    prefix: Arc<dyn Fn() -> String + Send + Sync>,
}

impl SupervisorLogWriter {
    pub fn open(log_path: &Path, prefix: impl Fn() -> String + Send + Sync + 'static) -> io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: Arc::new(Mutex::new(File::create(log_path)?)),
            line_start: Arc::new(Mutex::new(true)),
            prefix: Arc::new(prefix),
        })
    }

    /// Inserts `prefix` at the start of `buf` if we're at a line start, and
    /// after every newline inside `buf` except a trailing one (so the next
    /// write picks it up via `line_start` instead, matching the original's
    /// "don't append to a trailing newline, we don't know who writes next").
    fn frame(&self, buf: &[u8]) -> Vec<u8> {
        let prefix = (self.prefix)();
        if prefix.is_empty() {
            return buf.to_vec();
        }
        let mut line_start = self.line_start.lock().unwrap();
        let mut out = Vec::with_capacity(buf.len() + prefix.len());
        if *line_start {
            out.extend_from_slice(prefix.as_bytes());
        }
        for (i, &byte) in buf.iter().enumerate() {
            out.push(byte);
            if byte == b'\n' && i + 1 != buf.len() {
                out.extend_from_slice(prefix.as_bytes());
            }
        }
        *line_start = buf.last() == Some(&b'\n');
        out
    }
}

impl Write for SupervisorLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let framed = self.frame(buf);
        io::stdout().write_all(&framed)?;
        self.file.lock().unwrap().write_all(&framed)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.lock().unwrap().flush()
    }
}

impl<'a> MakeWriter<'a> for SupervisorLogWriter {
    type Writer = SupervisorLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_every_line_but_a_trailing_newline() {
        let path = std::env::temp_dir().join(format!("sim-core-log-test-{}.txt", std::process::id()));
        let writer = SupervisorLogWriter::open(&path, || "[P] ".to_string()).unwrap();
        let framed = writer.frame(b"one\ntwo\n");
        assert_eq!(String::from_utf8(framed).unwrap(), "[P] one\n[P] two\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn continues_prefix_across_writes_without_trailing_newline() {
        let path = std::env::temp_dir().join(format!("sim-core-log-test2-{}.txt", std::process::id()));
        let writer = SupervisorLogWriter::open(&path, || "[P] ".to_string()).unwrap();
        let first = writer.frame(b"partial");
        assert_eq!(String::from_utf8(first).unwrap(), "[P] partial");
        let second = writer.frame(b" line\n");
        assert_eq!(String::from_utf8(second).unwrap(), " line\n");
        let _ = std::fs::remove_file(&path);
    }
}
