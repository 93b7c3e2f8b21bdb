use log::LevelFilter;

/// Installs the global logger. `RUST_LOG` overrides `level` on native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LevelFilter) {
    use env_logger::{Builder, Env};

    let env = Env::default().default_filter_or(level.to_string());
    // Fails only when a logger is already installed, e.g. across tests.
    let _ = Builder::from_env(env).try_init();
}

/// Installs the global logger, forwarding records to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LevelFilter) {
    static LOGGER: ConsoleLogger = ConsoleLogger;
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            log::Level::Error | log::Level::Warn => {
                macroquad::miniquad::error!("{}: {}", record.target(), record.args())
            }
            _ => macroquad::miniquad::info!("{}: {}", record.target(), record.args()),
        }
    }

    fn flush(&self) {}
}
