//! System log sink (RFC 3164 over UDP).

use std::fmt;
use std::sync::{Arc, Mutex};

use ::syslog::{Facility, Formatter3164, Logger, LoggerBackend};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use common::{AppError, AppResult, SYSLOG_LOCAL_ADDR, SYSLOG_PROCESS, SYSLOG_SERVER_ADDR};

use super::format_event;

type SyslogLogger = Logger<LoggerBackend, Formatter3164>;

/// Forwards log records to the local syslog daemon.
#[derive(Clone)]
pub struct SyslogHandler {
    logger: Arc<Mutex<SyslogLogger>>,
    server: String,
}

impl SyslogHandler {
    /// Bind a UDP socket targeting the default syslog address.
    pub fn connect() -> AppResult<Self> {
        Self::connect_udp(SYSLOG_LOCAL_ADDR, SYSLOG_SERVER_ADDR)
    }

    pub fn connect_udp(local: &str, server: &str) -> AppResult<Self> {
        let formatter = Formatter3164 {
            facility: Facility::LOG_USER,
            hostname: None,
            process: SYSLOG_PROCESS.to_string(),
            pid: std::process::id(),
        };

        let logger = ::syslog::udp(formatter, local, server)
            .map_err(|e| AppError::syslog(format!("cannot reach {}: {}", server, e)))?;

        Ok(Self {
            logger: Arc::new(Mutex::new(logger)),
            server: server.to_string(),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn send(&self, level: Level, text: &str) -> Result<(), String> {
        let mut logger = self.logger.lock().map_err(|_| "syslog logger poisoned".to_string())?;

        let result = match level {
            Level::ERROR => logger.err(text),
            Level::WARN => logger.warning(text),
            Level::INFO => logger.info(text),
            _ => logger.debug(text),
        };
        result.map_err(|e| e.to_string())
    }
}

impl fmt::Debug for SyslogHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyslogHandler")
            .field("server", &self.server)
            .finish()
    }
}

impl<S: Subscriber> Layer<S> for SyslogHandler {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if let Err(e) = self.send(level, &format_event(event)) {
            eprintln!("syslog handler: failed to forward record: {}", e);
        }
    }
}
