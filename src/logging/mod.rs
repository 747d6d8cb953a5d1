//! `tracing` output routed to the browser console.

use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Safe to call more than once; later calls are no-ops.
pub(crate) fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .try_init();

    if installed.is_ok() {
        tracing::debug!(level, "console logging ready");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConsoleLevel {
    Error,
    Warn,
    Log,
}

impl From<&Level> for ConsoleLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            _ => Self::Log,
        }
    }
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: ConsoleLevel::Log,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: meta.level().into(),
            buf: Vec::new(),
        }
    }
}

/// Buffers one formatted event and hands it to `console.*` when dropped.
struct ConsoleWriter {
    level: ConsoleLevel,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let msg = wasm_bindgen::JsValue::from_str(line.trim_end());
        match self.level {
            ConsoleLevel::Error => web_sys::console::error_1(&msg),
            ConsoleLevel::Warn => web_sys::console::warn_1(&msg),
            ConsoleLevel::Log => web_sys::console::log_1(&msg),
        }
    }
}
