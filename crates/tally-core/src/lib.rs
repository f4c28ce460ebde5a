//! tally-core
//!
//! Business rules, lifecycle jobs and the batch runner for the billing core.
//! Depends on tally-domain. No CLI, no terminal I/O, no direct filesystem access.

pub mod client_service;
pub mod dispatch;
pub mod document_service;
pub mod error;
pub mod followup_service;
pub mod jobs;
pub mod notify;
pub mod payment_service;
pub mod product_service;
pub mod report_service;
pub mod runner;
pub mod statutory_service;
pub mod storage;
pub mod tenant_service;
pub mod time;

pub use client_service::*;
pub use dispatch::*;
pub use document_service::*;
pub use error::CoreError;
pub use followup_service::*;
pub use notify::*;
pub use payment_service::*;
pub use product_service::*;
pub use report_service::*;
pub use runner::*;
pub use statutory_service::*;
pub use tenant_service::*;
pub use time::*;
