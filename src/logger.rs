//! `log` backend printing through a console device.

use core::fmt;

use crate::driver::ConsoleDevice;

pub struct ConsoleLogger<C> {
    console: C,
    level: log::LevelFilter,
}

struct Writer<'a, C>(&'a C);

impl<C: ConsoleDevice> fmt::Write for Writer<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.puts(s);
        Ok(())
    }
}

impl<C> ConsoleLogger<C> {
    const RESET: &str = "\x1b[0m";
    const RED: &str = "\x1b[31m";
    const YELLOW: &str = "\x1b[33m";
    const BLUE: &str = "\x1b[34m";
    const MAGENTA: &str = "\x1b[35m";

    pub const fn new(console: C, level: log::LevelFilter) -> Self {
        Self { console, level }
    }
}

impl<C: ConsoleDevice + Sync + Send> log::Log for ConsoleLogger<C> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let colour = match record.level() {
            log::Level::Error => Self::RED,
            log::Level::Warn => Self::YELLOW,
            log::Level::Info => "",
            log::Level::Debug => Self::BLUE,
            log::Level::Trace => Self::MAGENTA,
        };
        let _ = fmt::write(
            &mut Writer(&self.console),
            format_args!("{}{}: {}{}\n", colour, record.level(), record.args(), Self::RESET),
        );
    }

    fn flush(&self) {}
}

/// Installs `logger` as the global logger. Only the first call wins.
pub fn init<C: ConsoleDevice + Sync + Send>(logger: &'static ConsoleLogger<C>) -> Result<(), log::SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use log::Log;

    use super::*;
    use crate::board::VEX_RESOURCES;
    use crate::sim::SimSoc;
    use crate::uart::LitexUart;

    #[test]
    fn records_reach_the_console() {
        let soc = SimSoc::new();
        let logger = ConsoleLogger::new(LitexUart::new(&soc, VEX_RESOURCES.uart), log::LevelFilter::Info);
        logger.log(
            &log::Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("hart 1 late"))
                .build(),
        );
        assert_eq!(soc.uart.take_output(), b"\x1b[33mWARN: hart 1 late\x1b[0m\n");
    }

    #[test]
    fn filtered_levels_are_dropped() {
        let soc = SimSoc::new();
        let logger = ConsoleLogger::new(LitexUart::new(&soc, VEX_RESOURCES.uart), log::LevelFilter::Info);
        logger.log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .args(format_args!("noise"))
                .build(),
        );
        assert!(soc.uart.take_output().is_empty());
    }
}
