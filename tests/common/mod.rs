use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Route the crate's diagnostics through the test harness. `RUST_LOG`
/// overrides the default level.
pub fn init_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("backshift", LevelFilter::Debug)
            .is_test(true)
            .parse_default_env();
        // Another test binary module may have installed a logger already.
        let _ = builder.try_init();
    });
}
