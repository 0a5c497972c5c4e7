//! Minimal stderr logger behind the `log` facade. Verbosity comes from the
//! repeated `-v` flag: warnings and errors by default, per-shape progress at
//! `-v`, per-climb detail at `-vv`.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
  fn enabled(&self, p_metadata: &Metadata) -> bool {
    p_metadata.level() <= log::max_level()
  }

  fn log(&self, p_record: &Record) {
    if !self.enabled(p_record.metadata()) {
      return;
    }
    match p_record.level() {
      Level::Info => eprintln!("{}", p_record.args()),
      Level::Trace | Level::Debug => eprintln!("  {}", p_record.args()),
      level => eprintln!("[{}] {}", level, p_record.args()),
    }
  }

  fn flush(&self) {}
}

/// Installs the logger. Safe to call once at startup.
pub fn init(p_verbosity: u8) {
  let level = match p_verbosity {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    _ => LevelFilter::Trace,
  };
  if log::set_logger(&LOGGER).is_ok() {
    log::set_max_level(level);
  }
}
