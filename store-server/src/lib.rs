//! Petal Store Server - order lifecycle backend for the storefront
//!
//! # Architecture overview
//!
//! Main entry for the store server, providing:
//!
//! - **HTTP API** (`api`): storefront checkout + admin back-office routes
//! - **Database** (`db`): embedded SQLite (WAL) with sqlx repositories
//! - **Payments** (`payment`): Razorpay / PhonePe gateway sessions
//! - **Shipping** (`shipping`): Delhivery / RapidShyp tracking sync
//! - **Notifications** (`notify`): best-effort email / WhatsApp dispatch
//!
//! # Module structure
//!
//! ```text
//! store-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── orders/        # order lifecycle service
//! ├── payment/       # gateway clients
//! ├── shipping/      # carrier clients + status mapping
//! ├── notify/        # email / WhatsApp senders
//! ├── geo/           # best-effort IP geolocation
//! ├── db/            # database layer
//! └── utils/         # errors, logging, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod geo;
pub mod notify;
pub mod orders;
pub mod payment;
pub mod shipping;
pub mod utils;

// Re-export public types
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env and initialize logging. Call once at process start.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.as_deref(),
    );
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____       __        __
   / __ \___  / /_____ _/ /
  / /_/ / _ \/ __/ __ `/ /
 / ____/  __/ /_/ /_/ / /
/_/    \___/\__/\__,_/_/
    _____ __
   / ___// /_____  ________
   \__ \/ __/ __ \/ ___/ _ \
  ___/ / /_/ /_/ / /  /  __/
 /____/\__/\____/_/   \___/
    "#
    );
}
