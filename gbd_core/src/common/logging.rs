//! Utilities for configuring logging
use std::sync::Once;

use colored::*;
use env_logger::Logger;
use log::Log;
use log::Record;

static ONCE_INIT: Once = Once::new();

/// Logger that uses env_logger for configuring filters but implements a
/// compact custom format with colored level prefixes.
struct GbdLogger {
    logger: Logger,
}

impl GbdLogger {
    pub fn new(logger: Logger) -> Self {
        log::set_max_level(logger.filter());
        Self { logger }
    }

    fn format_record(&self, record: &Record) -> String {
        match record.level() {
            log::Level::Error => {
                format!("{} {}", "E".red().bold(), record.args().to_string().red())
            }
            log::Level::Warn => format!(
                "{} {}",
                "W".yellow().bold(),
                record.args().to_string().yellow()
            ),
            log::Level::Info => format!(
                "{} {}",
                "I".blue().bold(),
                record.args().to_string().normal()
            ),
            log::Level::Debug => format!("{} {}", "D".blue(), record.args().to_string().normal()),
            log::Level::Trace => format!("{}", record.args().to_string().dimmed()),
        }
    }
}

impl Log for GbdLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.logger.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.logger.matches(record) {
            return;
        }
        println!("{}", self.format_record(record));
    }

    fn flush(&self) {}
}

pub fn init() {
    ONCE_INIT.call_once(|| {
        let filter_config = std::env::var("GBD_LOG").unwrap_or("error".to_string());
        let filter = env_logger::builder().parse_filters(&filter_config).build();
        log::set_boxed_logger(Box::new(GbdLogger::new(filter))).unwrap();
    });
}

pub fn test_init(verbose: bool) {
    ONCE_INIT.call_once(|| {
        let filter_config =
            std::env::var("GBD_LOG").unwrap_or(if verbose { "debug" } else { "warn" }.to_string());
        let filter = env_logger::builder().parse_filters(&filter_config).build();
        log::set_boxed_logger(Box::new(GbdLogger::new(filter))).unwrap();
    });
}
