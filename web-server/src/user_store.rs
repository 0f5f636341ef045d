// web-server/src/user_store.rs
use actix::{Actor, Addr, Handler, Message, SyncArbiter, SyncContext};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        email       TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );
";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already exists")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("user database is unavailable")]
    Unavailable,
}

/// A row of the users table
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

/// Actor message: insert a user, returning the new id
#[derive(Message)]
#[rtype(result = "Result<i64, StoreError>")]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
}

/// Actor message: look a user up by email
#[derive(Message)]
#[rtype(result = "Result<Option<User>, StoreError>")]
pub struct FindUserByEmail {
    pub email: String,
}

/// Synchronous actor owning one SQLite connection. Run several on a
/// `SyncArbiter` so blocking queries stay off the HTTP workers.
pub struct UserStore {
    conn: Option<Connection>,
}

impl UserStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Some(conn) })
    }

    /// A worker whose connection could not be opened. Every query fails with
    /// `StoreError::Unavailable`.
    fn unavailable() -> Self {
        Self { conn: None }
    }

    fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Start `workers` store actors on their own threads.
    ///
    /// Every worker's connection is opened here, so a bad path fails at
    /// startup rather than inside a worker thread. In-memory databases are per
    /// connection, so they always get a single worker.
    pub fn start(path: &str, workers: usize) -> Result<Addr<UserStore>, StoreError> {
        let workers = if path == ":memory:" { 1 } else { workers.max(1) };
        let stores = (0..workers)
            .map(|_| Self::open(path))
            .collect::<Result<Vec<_>, _>>()?;

        let path = path.to_string();
        let stores = Mutex::new(stores);
        Ok(SyncArbiter::start(workers, move || {
            let opened = stores.lock().ok().and_then(|mut pool| pool.pop());
            match opened {
                Some(store) => store,
                // Only reached when a worker is restarted
                None => Self::open(&path).unwrap_or_else(|e| {
                    tracing::error!("Could not reopen user database {}: {}", path, e);
                    Self::unavailable()
                }),
            }
        }))
    }
}

impl Actor for UserStore {
    type Context = SyncContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("UserStore worker started");
    }
}

// Handle user creation
impl Handler<CreateUser> for UserStore {
    type Result = Result<i64, StoreError>;

    fn handle(&mut self, msg: CreateUser, _ctx: &mut Self::Context) -> Self::Result {
        let inserted = self.conn()?.execute(
            "INSERT INTO users (email, password, created_at) VALUES (?1, ?2, ?3)",
            params![msg.email, msg.password_hash, Utc::now().to_rfc3339()],
        );

        match inserted {
            Ok(_) => {
                let id = self.conn()?.last_insert_rowid();
                tracing::info!("Registered user {}", id);
                Ok(id)
            },
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::DuplicateEmail)
            },
            Err(e) => Err(e.into()),
        }
    }
}

// Handle lookup by email
impl Handler<FindUserByEmail> for UserStore {
    type Result = Result<Option<User>, StoreError>;

    fn handle(&mut self, msg: FindUserByEmail, _ctx: &mut Self::Context) -> Self::Result {
        let user = self.conn()?
            .query_row(
                "SELECT id, email, password FROM users WHERE email = ?1",
                params![msg.email],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }
}
