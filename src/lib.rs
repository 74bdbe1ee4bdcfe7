pub mod prediction;
pub mod server;
pub mod web;

/// Build-time `APP_VERSION` when set, otherwise the crate version.
pub const VERSION: &str = match option_env!("APP_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
