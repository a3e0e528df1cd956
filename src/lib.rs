//! Resico - RESICO tax engine for Mexican freelancers
//!
//! This library estimates the monthly provisional ISR owed under the
//! simplified trust regime (RESICO), rolls months up into annual summaries,
//! and builds the trailing cash-flow and exchange-rate series shown on the
//! dashboard. Records are read through the `db::RecordStore` trait, backed by
//! SQLite or by an in-memory snapshot.

pub mod config;
pub mod db;
pub mod error;
pub mod reports;
pub mod tax;
pub mod utils;
