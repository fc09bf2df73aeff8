use chrono::{Local, SecondsFormat};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{Builder, Rotation},
};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, time},
    prelude::*,
};
use yansi::Paint;

use crate::config::Log;

const LOG_FILE_PREFIX: &str = "ipgeo";

/// Installs the global subscriber. The returned guard flushes the file
/// writer on drop and must live as long as the process logs.
pub fn init(log: &Log) -> Option<WorkerGuard> {
    let is_color = log.style.is_color();
    if !is_color {
        yansi::disable();
    }
    let format = fmt::layer().with_timer(LocalTime).with_ansi(is_color);
    let level = log.level.as_str();
    let filter: Targets = match level.parse() {
        Ok(f) => f,
        Err(e) => {
            let err = format!("string {} did not parse successfully: {}", level, e);
            panic!("{}", err.red().bold());
        }
    };

    let (file_layer, guard) = match &log.dir {
        Some(dir) => {
            let appender = match Builder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .build(dir)
            {
                Ok(appender) => appender,
                Err(e) => {
                    let err = format!("log dir {} is not usable: {}", dir.display(), e);
                    panic!("{}", err.red().bold());
                }
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(format)
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

struct LocalTime;

impl time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
        )
    }
}
