//! lanwatch Core Library
//!
//! Polls a router's connected-client list, normalizes the response
//! into device records, and turns successive snapshots into join and
//! leave transitions:
//!
//! - Response parsing (structured JSON, falling back to HTML tables)
//! - OUI-based manufacturer inference
//! - The poll/diff monitor loop and its notification policy
//! - Router session and webhook notifier collaborators
//!
//! # Example
//!
//! ```no_run
//! use lanwatch_core::{LogNotifier, Monitor, RouterClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let router = RouterClient::new("192.168.1.1", "admin", "secret")?;
//!     let mut monitor = Monitor::new(Box::new(router), Box::new(LogNotifier), &[]);
//!
//!     // Single-run mode: bootstrap snapshot plus one diff cycle.
//!     let report = monitor.run_single().await?;
//!     println!("{} clients, {} new", report.devices.len(), report.joined.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod parser;
pub mod router;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::Error;
pub use monitor::{CycleReport, Monitor, should_notify};
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use parser::DeviceRecord;
pub use router::{DeviceSource, RouterClient};
