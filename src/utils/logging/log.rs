use log::{LevelFilter, SetLoggerError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::file_writer::{init_file_writer, write_to_file};

static LOG_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Info as usize);

/// Console + rotating-file logger whose level can change at runtime.
pub struct DynamicLogger;

static LOGGER: DynamicLogger = DynamicLogger;

impl log::Log for DynamicLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= current_log_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let line = format_line(
                &chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            eprintln!("{line}");
            write_to_file(&line);
        }
    }

    fn flush(&self) {}
}

fn format_line(timestamp: &str, level: log::Level, target: &str, message: &str) -> String {
    format!("[{timestamp} [{level}] {target}]: {message}")
}

fn level_for(enable_debug: bool) -> LevelFilter {
    if enable_debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn current_log_level() -> LevelFilter {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        x if x == LevelFilter::Off as usize => LevelFilter::Off,
        x if x == LevelFilter::Error as usize => LevelFilter::Error,
        x if x == LevelFilter::Warn as usize => LevelFilter::Warn,
        x if x == LevelFilter::Info as usize => LevelFilter::Info,
        x if x == LevelFilter::Debug as usize => LevelFilter::Debug,
        x if x == LevelFilter::Trace as usize => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Install the global logger. With `logs_dir` set, lines are mirrored to a
/// rotating file there.
pub fn init_logging(enable_debug: bool, logs_dir: Option<&Path>) -> Result<(), SetLoggerError> {
    if let Some(dir) = logs_dir {
        if let Err(e) = init_file_writer(dir) {
            eprintln!("File logging disabled: {e}");
        }
    }

    let level = level_for(enable_debug);
    LOG_LEVEL.store(level as usize, Ordering::Relaxed);
    log::set_max_level(level);
    log::set_logger(&LOGGER)?;
    Ok(())
}

pub fn update_log_level(enable_debug: bool) {
    let level = level_for(enable_debug);
    LOG_LEVEL.store(level as usize, Ordering::Relaxed);
    log::set_max_level(level);
}
