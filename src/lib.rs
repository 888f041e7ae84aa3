//! quickdao library - lightweight data access over PostgreSQL
//!
//! Provides a JSON-file connection config, a connector that creates its
//! target database on first use, record-level CRUD with bound parameters, and
//! a `Client` facade tying them together. Every operation opens and closes
//! its own connection.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod output;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;

pub use client::Client;
pub use config::{ConfigStore, ConnectionConfig, Settings};
pub use dao::RecordDao;
pub use db::{Condition, Operator, QueryOutcome, Record, Row, SqlValue};
pub use error::{DaoError, Result};
