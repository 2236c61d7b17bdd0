#![allow(dead_code)]

pub mod fixtures;
pub mod naive_radon;

/// Route library logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
