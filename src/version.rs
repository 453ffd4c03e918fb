// Build-time identity from Cargo.toml

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `gpugauge v0.1.0`, shown in the info panel and the startup log.
pub fn banner() -> String {
    format!("{NAME} v{VERSION}")
}
