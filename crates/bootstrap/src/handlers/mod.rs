//! Log handlers attached by init steps.
//!
//! A handler pairs a sink with a minimum severity. Handlers are plain values
//! while the application is being configured and become `tracing` layers
//! when the subscriber is installed.

mod mail;
mod system_log;

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

pub use mail::{MailHandler, Mailer};
pub use system_log::SyslogHandler;

/// Where a handler writes its records.
#[derive(Debug, Clone)]
pub enum LogSink {
    Mail(MailHandler),
    Stderr,
    Syslog(SyslogHandler),
}

/// A sink with a minimum-severity threshold.
#[derive(Debug, Clone)]
pub struct LogHandler {
    level: LevelFilter,
    sink: LogSink,
}

impl LogHandler {
    pub fn new(level: LevelFilter, sink: LogSink) -> Self {
        Self { level, sink }
    }

    /// Error alert mails: ERROR only.
    pub fn mail(handler: MailHandler) -> Self {
        Self::new(LevelFilter::ERROR, LogSink::Mail(handler))
    }

    /// Stderr stream: WARN and above.
    pub fn stderr() -> Self {
        Self::new(LevelFilter::WARN, LogSink::Stderr)
    }

    /// System log: WARN and above.
    pub fn syslog(handler: SyslogHandler) -> Self {
        Self::new(LevelFilter::WARN, LogSink::Syslog(handler))
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    pub fn kind(&self) -> &'static str {
        match self.sink {
            LogSink::Mail(_) => "mail",
            LogSink::Stderr => "stderr",
            LogSink::Syslog(_) => "syslog",
        }
    }

    /// Build the `tracing` layer for this handler, filtered at its level.
    pub fn layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match &self.sink {
            LogSink::Mail(handler) => handler.clone().with_filter(self.level).boxed(),
            LogSink::Stderr => tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_filter(self.level)
                .boxed(),
            LogSink::Syslog(handler) => handler.clone().with_filter(self.level).boxed(),
        }
    }
}

impl fmt::Display for LogHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (>= {})", self.kind(), self.level)
    }
}

/// Collects an event's message and fields into one line.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Render an event as `LEVEL target: message key=value ...`.
pub(crate) fn format_event(event: &Event<'_>) -> String {
    let mut visitor = LineVisitor::default();
    event.record(&mut visitor);

    let meta = event.metadata();
    format!(
        "{} {}: {}{}",
        meta.level(),
        meta.target(),
        visitor.message,
        visitor.fields
    )
}
