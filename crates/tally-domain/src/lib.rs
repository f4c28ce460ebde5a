//! tally-domain
//!
//! Pure billing models (Tenant, Client, Document, Bill, Followup, ...).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod audit;
pub mod bill;
pub mod book;
pub mod client;
pub mod common;
pub mod document;
pub mod followup;
pub mod gateway;
pub mod notification;
pub mod product;
pub mod tenant;

pub use audit::*;
pub use bill::*;
pub use book::*;
pub use client::*;
pub use common::*;
pub use document::*;
pub use followup::*;
pub use gateway::*;
pub use notification::*;
pub use product::*;
pub use tenant::*;
