//! Database access layer.
//!
//! This module provides:
//! - Connection traits (`Connection`, `ConnectionProvider`) and scoped release
//! - Values, records and statement assembly with bound parameters
//! - The PostgreSQL connector and its fresh-connection-per-call provider
//!
//! # Type Decisions
//!
//! **Why an ordered `Record` instead of a `HashMap`?**
//! Column order determines both the generated column list and the order
//! parameters are bound. A `Vec` of pairs keeps insertion order without an
//! extra dependency, and records are small.
//!
//! **Why does the connection pick the placeholder style?**
//! The builders emit `?` or `$n` depending on the driver. The DAO asks the
//! connection it acquired, so the same DAO code runs against any provider.

mod backend;
mod connection;
mod escape;
mod query;
mod record;
mod value;

pub mod postgres;

pub use backend::{Connection, ConnectionProvider, QueryOutcome};
pub use connection::ScopedConnection;
pub use escape::{quote_identifier, validate_identifier};
pub use query::{
    build_delete, build_insert, build_select, build_update, Condition, Operator, Placeholder,
    Statement,
};
pub use record::{Record, Row};
pub use value::{BindKind, SqlValue};

pub use self::postgres::{PostgresConnector, PostgresProvider};
