// Library surface for headless/integration tests and reuse.
// The binary in main.rs only owns the terminal.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod export;
pub mod format;
pub mod logging;
pub mod runtime;
pub mod scramble;
pub mod session;
pub mod solve;
pub mod stats;
pub mod store;
pub mod timer;
pub mod ui;
pub mod util;
