//! MySQL sessions backed by a single `sqlx` connection.

use std::time::Duration;

use async_trait::async_trait;
use lendhero_kernel::settings::DatabaseSettings;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection as _};

use crate::error::DbError;
use crate::session::{Connection, Connector, Session};

/// Opens one unpooled MySQL connection per call.
#[derive(Debug, Clone, Default)]
pub struct MySqlConnector {
    connect_timeout: Option<Duration>,
}

impl MySqlConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up on a connect attempt after `limit`. Unbounded by default.
    pub fn with_connect_timeout(mut self, limit: Duration) -> Self {
        self.connect_timeout = Some(limit);
        self
    }
}

/// Build driver options from host, user, password and optional port.
///
/// No default schema is selected since the target database may not exist yet.
pub fn connect_options(settings: &DatabaseSettings) -> Result<MySqlConnectOptions, DbError> {
    let host = settings
        .host
        .as_deref()
        .filter(|host| !host.is_empty())
        .ok_or(DbError::MissingSetting("DB_HOST"))?;
    let user = settings
        .user
        .as_deref()
        .filter(|user| !user.is_empty())
        .ok_or(DbError::MissingSetting("DB_USER"))?;

    let mut options = MySqlConnectOptions::new().host(host).username(user);
    if let Some(password) = settings.password.as_deref() {
        options = options.password(password);
    }
    if let Some(port) = settings.port {
        options = options.port(port);
    }

    Ok(options)
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, settings: &DatabaseSettings) -> Result<Connection, DbError> {
        let options = connect_options(settings)?;

        tracing::debug!(
            host = settings.host.as_deref().unwrap_or_default(),
            port = ?settings.port,
            user = settings.user.as_deref().unwrap_or_default(),
            "opening MySQL connection"
        );

        let connecting = options.connect();
        let conn = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connecting)
                .await
                .map_err(|_| DbError::Timeout(limit))??,
            None => connecting.await?,
        };

        Ok(Connection::new(Box::new(MySqlSession { conn: Some(conn) })))
    }
}

struct MySqlSession {
    conn: Option<MySqlConnection>,
}

impl MySqlSession {
    fn conn(&mut self) -> Result<&mut MySqlConnection, DbError> {
        self.conn.as_mut().ok_or(DbError::NotLive)
    }
}

#[async_trait]
impl Session for MySqlSession {
    async fn ping(&mut self) -> Result<(), DbError> {
        self.conn()?.ping().await?;
        Ok(())
    }

    async fn execute(&mut self, statement: &str) -> Result<u64, DbError> {
        let conn = self.conn()?;
        let result = sqlx::Executor::execute(&mut *conn, statement).await?;
        Ok(result.rows_affected())
    }

    async fn close(&mut self) -> Result<(), DbError> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }
}
