use std::sync::Once;

use crate::util::config::tess_config;

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Per-path build chatter stays behind the feature.
        if record.level() == log::Level::Trace && !cfg!(feature = "verbose_logs") {
            return;
        }
        // stdout belongs to the host; keep it terse on stderr.
        eprintln!("[vgmesh {}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;
static INIT: Once = Once::new();

/// Install the console logger once. Embedders that already set a logger keep theirs.
pub fn init_logger() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(tess_config().log_level);
        }
    });
}
