use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Salonbook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "salonbook=info,tower_http=info";

/// Get the application data directory
/// ~/Salonbook/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Salonbook")
}

/// Get the database file path
pub fn db_path() -> PathBuf {
    app_data_dir().join("salonbook.db")
}

/// Socket address the HTTP server binds to. Override with `SALONBOOK_ADDR`.
pub fn bind_addr() -> SocketAddr {
    std::env::var("SALONBOOK_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8000)))
}
