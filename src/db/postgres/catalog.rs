//! Catalog introspection for the PostgreSQL backend.
//!
//! Handles:
//! - Listing databases on the server
//! - Creating the target database when it is missing
//! - Table existence checks in the selected database
//!
//! Existence checks compare names with exact equality, never with `LIKE`
//! patterns, so `users2` can never satisfy a check for `users`. Table names
//! are folded to lower case first, the same way the server folds the
//! unquoted identifiers the statement builders emit.

use postgres::Client;
use postgres::error::SqlState;

use crate::db::escape::quote_identifier;
use crate::error::{DaoError, Result};

/// Catalog operations needed to make sure a database exists.
pub trait Catalog {
    /// Names of all databases on the server.
    fn database_names(&mut self) -> Result<Vec<String>>;

    /// Issue the create-database statement. Returns `false` when another
    /// session created the database between the listing and this call.
    fn create_database(&mut self, name: &str) -> Result<bool>;
}

/// Make sure database `name` exists, creating it if absent.
///
/// This function:
/// 1. Lists the databases on the server
/// 2. Compares each name to `name` (case-sensitive, exact)
/// 3. Creates the database only when no name matched
///
/// Losing a creation race to a concurrent session counts as "already existed".
///
/// # Returns
/// `true` if the database was created, `false` if it already existed
pub fn ensure_database<C: Catalog + ?Sized>(catalog: &mut C, name: &str) -> Result<bool> {
    let existing = catalog.database_names()?;
    if existing.iter().any(|db| db == name) {
        tracing::debug!(database = name, "database exists");
        return Ok(false);
    }

    let created = catalog.create_database(name)?;
    if created {
        tracing::info!(database = name, "created database");
    } else {
        tracing::debug!(database = name, "database created concurrently");
    }
    Ok(created)
}

/// Whether a failed `CREATE DATABASE` means the database already exists.
///
/// Two sessions racing past the listing both issue the create; the loser gets
/// `duplicate_database`, or a unique violation on the `pg_database` name index
/// when both inserts land at once.
fn is_duplicate_database(code: Option<&SqlState>, constraint: Option<&str>) -> bool {
    match code {
        Some(code) if *code == SqlState::DUPLICATE_DATABASE => true,
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => constraint == Some("pg_database_datname_index"),
        _ => false,
    }
}

/// `Catalog` over a live client connection.
pub struct PgCatalog<'a> {
    client: &'a mut Client,
}

impl<'a> PgCatalog<'a> {
    pub fn new(client: &'a mut Client) -> Self {
        Self { client }
    }
}

impl Catalog for PgCatalog<'_> {
    fn database_names(&mut self) -> Result<Vec<String>> {
        let rows = self
            .client
            .query("SELECT datname::text FROM pg_catalog.pg_database", &[])
            .map_err(|e| DaoError::DatabaseCreation {
                database: String::new(),
                message: format!("failed to list databases: {}", super::driver_message(&e)),
            })?;

        rows.iter()
            .map(|row| {
                row.try_get::<_, String>(0).map_err(|e| DaoError::DatabaseCreation {
                    database: String::new(),
                    message: format!("failed to list databases: {}", e),
                })
            })
            .collect()
    }

    fn create_database(&mut self, name: &str) -> Result<bool> {
        // CREATE DATABASE takes no parameters and cannot run inside a transaction
        let sql = format!("CREATE DATABASE {}", quote_identifier(name));
        match self.client.batch_execute(&sql) {
            Ok(()) => Ok(true),
            Err(e) if is_duplicate_database(e.code(), e.as_db_error().and_then(|db| db.constraint())) => Ok(false),
            Err(e) => Err(DaoError::DatabaseCreation {
                database: name.to_string(),
                message: super::driver_message(&e),
            }),
        }
    }
}

/// Split `schema.table` into its parts. Unqualified names use the current
/// schema.
fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once('.') {
        Some((schema, table)) => (Some(schema), table),
        None => (None, name),
    }
}

/// Case-fold an unquoted identifier the way the server does.
fn fold_identifier(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Whether `name` is a table or view in the connected database.
///
/// `name` is looked up as the server resolves it unquoted, so `Users` finds
/// `users` but never a table created as `"Users"`.
pub fn table_exists(client: &mut Client, name: &str) -> std::result::Result<bool, postgres::Error> {
    let folded = fold_identifier(name);
    let rows = match split_qualified(&folded) {
        (Some(schema), table) => client.query(
            "SELECT 1 FROM information_schema.tables \
             WHERE table_schema::text = $1 AND table_name::text = $2",
            &[&schema, &table],
        )?,
        (None, table) => client.query(
            "SELECT 1 FROM information_schema.tables \
             WHERE table_schema::text = current_schema()::text AND table_name::text = $1",
            &[&table],
        )?,
    };
    Ok(!rows.is_empty())
}
