//! Context-enriching log handler

use crate::constants::{LOG_FIELD_CMD, LOG_FIELD_HOSTNAME};
use crate::context::Context;
use crate::logging::{LogFormat, LogRecord};
use std::fmt;
use std::io::{self, Write};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use webmods_domain::value_objects::Attr;

/// Fields attached to every record of the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessFields {
    /// Command name (`cmd`)
    pub cmd: Option<String>,
    /// Host name (`hostname`)
    pub hostname: Option<String>,
}

impl ProcessFields {
    /// Use `cmd` and look up the host name
    pub fn detect(cmd: &str) -> Self {
        Self {
            cmd: (!cmd.is_empty()).then(|| cmd.to_string()),
            hostname: hostname::get().ok().and_then(|h| h.into_string().ok()),
        }
    }
}

/// Formats records, enriched with process and context attributes
///
/// Attributes are appended in a fixed order: the record's own, `cmd`,
/// `hostname`, the context attributes, then middleware fields. Nothing is
/// deduplicated here.
pub struct LogHandler<W = fn() -> io::Stdout> {
    format: LogFormat,
    level: Level,
    process: ProcessFields,
    make_writer: W,
}

impl LogHandler {
    /// Handler writing to stdout
    pub fn new(format: LogFormat, level: Level, process: ProcessFields) -> Self {
        Self {
            format,
            level,
            process,
            make_writer: io::stdout,
        }
    }
}

impl<W> LogHandler<W>
where
    W: for<'w> MakeWriter<'w>,
{
    /// Replace the output sink
    pub fn with_writer<W2>(self, make_writer: W2) -> LogHandler<W2>
    where
        W2: for<'w> MakeWriter<'w>,
    {
        LogHandler {
            format: self.format,
            level: self.level,
            process: self.process,
            make_writer,
        }
    }

    /// Output format
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Most verbose level emitted
    pub fn level(&self) -> Level {
        self.level
    }

    /// Process-wide fields
    pub fn process(&self) -> &ProcessFields {
        &self.process
    }

    /// Whether records at `level` pass the threshold
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    /// Enrich and write one record
    ///
    /// Write failures are dropped: logging never fails the caller.
    pub fn handle(&self, ctx: &Context, mut record: LogRecord) {
        if !self.enabled(record.level) {
            return;
        }

        record
            .attrs
            .reserve(2 + ctx.attrs().len() + ctx.fields().len());
        if let Some(cmd) = &self.process.cmd {
            record.attrs.push(Attr::string(LOG_FIELD_CMD, cmd.as_str()));
        }
        if let Some(hostname) = &self.process.hostname {
            record
                .attrs
                .push(Attr::string(LOG_FIELD_HOSTNAME, hostname.as_str()));
        }
        record.attrs.extend_from_slice(ctx.attrs());
        record.attrs.extend_from_slice(ctx.fields());

        let line = self.format.render(&record);
        let mut writer = self.make_writer.make_writer();
        let _ = writer.write_all(line.as_bytes());
    }
}

impl<W> fmt::Debug for LogHandler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandler")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("process", &self.process)
            .finish_non_exhaustive()
    }
}
