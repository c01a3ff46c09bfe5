//! Opening database sessions and creating the application schema.
//!
//! The server never shares a connection between requests. A [Database] only
//! remembers where the SQLite file lives, and each unit of work gets its own
//! freshly configured [Connection] on a blocking thread.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, transaction::create_transaction_table, user::create_user_table,
    wallet::create_wallet_table,
};

/// How long a session waits for another writer to release the database lock
/// before giving up with [Error::DatabaseBusy].
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle to the application's SQLite database file.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Database {
    /// Open the database at `path`, creating the file and the application
    /// tables if they do not exist yet.
    ///
    /// The database is switched to write-ahead logging so that readers are not
    /// blocked by a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema cannot be created.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, Error> {
        let database = Self {
            path: path.as_ref().to_owned(),
            busy_timeout,
        };

        let connection = database.connect()?;
        connection.execute_batch("PRAGMA journal_mode = WAL;")?;
        initialize(&connection)?;

        tracing::debug!("opened database at {:?}", database.path);

        Ok(database)
    }

    /// The path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new session on the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or configured.
    pub fn connect(&self) -> Result<Connection, Error> {
        let connection = Connection::open(&self.path)?;
        configure_connection(&connection, self.busy_timeout)?;

        Ok(connection)
    }

    /// Run `operation` with its own session on a blocking thread.
    ///
    /// Database I/O blocks, so it is kept off the async runtime's worker
    /// threads. The session is closed once `operation` returns.
    ///
    /// # Errors
    ///
    /// Returns the error from `operation`, an error if the session could not
    /// be opened, or [Error::TaskFailed] if the blocking task panicked.
    pub async fn run<F, T>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let database = self.clone();

        tokio::task::spawn_blocking(move || {
            let mut connection = database.connect()?;
            operation(&mut connection)
        })
        .await
        .map_err(|error| {
            tracing::error!("database task failed: {error}");
            Error::TaskFailed(error.to_string())
        })?
    }
}

/// Apply the per-connection settings every session needs.
///
/// Foreign keys are off by default in SQLite and have to be enabled for each
/// connection.
///
/// # Errors
///
/// Returns an error if a pragma could not be set.
pub fn configure_connection(connection: &Connection, busy_timeout: Duration) -> Result<(), Error> {
    connection.busy_timeout(busy_timeout)?;
    connection.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}

/// Create the application tables in `connection` if they do not exist.
///
/// # Errors
///
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_wallet_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
