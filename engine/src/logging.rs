//! A `log` backend that forwards records over a channel.
//!
//! Embedding applications that draw their own console (or ship logs somewhere) install a
//! [`ChannelLogger`] and drain the receiving end at their own pace.

use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// One forwarded log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// A [`log::Log`] implementation sending every enabled record to a channel.
pub struct ChannelLogger {
    sender: Sender<LogMessage>,
    level: LevelFilter,
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A dropped receiver just means nobody is listening anymore.
            let _ = self.sender.try_send(LogMessage {
                level: record.metadata().level(),
                target: record.target().to_owned(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}

impl ChannelLogger {
    /// Construct a logger sending records at or above `level` to `sender`.
    pub fn new(sender: Sender<LogMessage>, level: LevelFilter) -> Self {
        Self { sender, level }
    }

    /// Construct a logger together with the receiving end of its channel.
    pub fn with_receiver(level: LevelFilter) -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender, level), receiver)
    }

    /// The most verbose level this logger forwards.
    #[inline]
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Install this logger as the process-wide `log` backend.
    ///
    /// Fails if a logger is already installed.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use log::Log;

    use super::*;

    fn record(level: Level, target: &str, log: &ChannelLogger, message: &str) {
        log.log(
            &Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn forwards_enabled_records() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Info);

        // When
        record(Level::Info, "rusty_ecs::world", &logger, "created");
        record(Level::Debug, "rusty_ecs::world", &logger, "chatty");
        record(Level::Error, "rusty_ecs::schedule", &logger, "failed");

        // Then - Debug is filtered out
        let messages: Vec<_> = receiver.try_iter().collect();
        assert_eq!(
            messages,
            vec![
                LogMessage {
                    level: Level::Info,
                    target: "rusty_ecs::world".to_owned(),
                    message: "created".to_owned(),
                },
                LogMessage {
                    level: Level::Error,
                    target: "rusty_ecs::schedule".to_owned(),
                    message: "failed".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Trace);
        drop(receiver);

        // When / Then - Does not panic
        record(Level::Warn, "test", &logger, "nobody listening");
        assert_eq!(logger.level(), LevelFilter::Trace);
    }
}
