use super::{InsertOutcome, Ledger, LedgerError};
use crate::order::OrderId;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Connection settings for the MySQL-backed ledger.
#[derive(Clone)]
pub struct MySqlLedgerConfig {
    /// `host` or `host:port`
    pub address: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
    /// Recycle connections well before the server's idle timeout; cycles are minutes apart.
    pub max_lifetime: Duration,
    /// Bound on acquiring a connection and on each statement.
    pub query_timeout: Duration,
}

impl MySqlLedgerConfig {
    pub fn new(address: String, database: String, username: String, password: String) -> Self {
        Self {
            address,
            database,
            username,
            password,
            max_connections: 10,
            max_lifetime: Duration::from_secs(3 * 60),
            query_timeout: Duration::from_secs(10),
        }
    }

    /// `user@host/database`, safe to log.
    pub fn display_target(&self) -> String {
        format!("{}@{}/{}", self.username, self.address, self.database)
    }

    fn connect_options(&self) -> Result<MySqlConnectOptions, LedgerError> {
        let (host, port) = split_host_port(&self.address)?;
        Ok(MySqlConnectOptions::new()
            .host(host)
            .port(port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database))
    }
}

impl std::fmt::Debug for MySqlLedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlLedgerConfig")
            .field("address", &self.address)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("max_lifetime", &self.max_lifetime)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

/// Ledger stored in a single-column `orders` table keyed on `orderId`.
#[derive(Debug, Clone)]
pub struct MySqlLedger {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl MySqlLedger {
    /// Open the pool and make sure the table exists.
    pub async fn connect(config: &MySqlLedgerConfig) -> Result<Self, LedgerError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .max_lifetime(config.max_lifetime)
            .acquire_timeout(config.query_timeout)
            .connect_with(config.connect_options()?)
            .await
            .map_err(store_error)?;

        let ledger = Self {
            pool,
            query_timeout: config.query_timeout,
        };
        ledger.ensure_schema().await?;

        info!(
            address = %config.address,
            database = %config.database,
            "Connected to order ledger"
        );

        Ok(ledger)
    }

    pub async fn ensure_schema(&self) -> Result<(), LedgerError> {
        self.bounded("create table", async {
            sqlx::query("CREATE TABLE IF NOT EXISTS orders (orderId BIGINT NOT NULL PRIMARY KEY)")
                .execute(&self.pool)
                .await
        })
        .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(store_error),
            Err(_) => Err(LedgerError::Timeout {
                operation,
                elapsed: self.query_timeout,
            }),
        }
    }
}

#[async_trait]
impl Ledger for MySqlLedger {
    async fn has(&self, id: OrderId) -> Result<bool, LedgerError> {
        let row = self
            .bounded("lookup", async {
                sqlx::query("SELECT orderId FROM orders WHERE orderId = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            })
            .await?;

        Ok(row.is_some())
    }

    async fn insert(&self, id: OrderId) -> Result<InsertOutcome, LedgerError> {
        let result = self
            .bounded("insert", async {
                sqlx::query("INSERT INTO orders (orderId) VALUES (?)")
                    .bind(id)
                    .execute(&self.pool)
                    .await
            })
            .await;

        match result {
            Ok(_) => {
                debug!(order_id = id, "Ledger row inserted");
                Ok(InsertOutcome::Inserted)
            }
            Err(LedgerError::Store(sqlx::Error::Database(db))) if db.is_unique_violation() => {
                Ok(InsertOutcome::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }
}

/// Pool exhaustion and shutdown mean the store is out of reach, not that the
/// statement failed.
fn store_error(e: sqlx::Error) -> LedgerError {
    match e {
        sqlx::Error::PoolTimedOut => {
            LedgerError::Unavailable("no connection available from the pool".into())
        }
        sqlx::Error::PoolClosed => LedgerError::Unavailable("connection pool is closed".into()),
        other => LedgerError::Store(other),
    }
}

fn split_host_port(address: &str) -> Result<(&str, u16), LedgerError> {
    match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| LedgerError::InvalidAddress(address.to_string()))?;
            Ok((host, port))
        }
        None => Ok((address, DEFAULT_MYSQL_PORT)),
    }
}
