//! Channel-backed logging for the demo binary.
//!
//! Guard diagnostics are emitted through [`log`] while the awake pass runs.
//! Routing them into a channel lets the binary finish building the scene
//! first and render the captured lines afterwards, in order.

use core::fmt;

use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// One captured log line.
#[derive(Debug)]
pub struct LogMessage {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:<5}] {}: {}", self.level, self.target, self.message)
    }
}

/// A [`log::Log`] implementation that forwards records into a channel.
pub struct ChannelLogger {
    sender: Sender<LogMessage>,
}

impl ChannelLogger {
    /// Install a channel logger as the global logger and hand back the
    /// receiving end.
    pub fn install() -> Result<Receiver<LogMessage>, SetLoggerError> {
        let (sender, receiver) = unbounded();
        log::set_boxed_logger(Box::new(Self { sender }))?;
        log::set_max_level(LevelFilter::Info);
        Ok(receiver)
    }
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // The demo never blocks on logging; a full channel drops the line
            let _ = self.sender.try_send(LogMessage {
                level: record.metadata().level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}
