//! Connection and cursor handles over a driver session.

use async_trait::async_trait;
use lendhero_kernel::settings::DatabaseSettings;

use crate::error::DbError;

/// One live session with the database server.
#[async_trait]
pub trait Session: Send {
    /// Round-trip check that the session is usable.
    async fn ping(&mut self) -> Result<(), DbError>;

    /// Execute a single statement, returning the affected row count.
    async fn execute(&mut self, statement: &str) -> Result<u64, DbError>;

    /// Called once when a cursor opened on this session is released.
    fn release_cursor(&mut self) {}

    /// Terminate the session.
    async fn close(&mut self) -> Result<(), DbError>;
}

/// Opens sessions from connection settings.
#[async_trait]
pub trait Connector: Sync {
    async fn connect(&self, settings: &DatabaseSettings) -> Result<Connection, DbError>;
}

/// Exclusive owner of a session. Released by [`Connection::close`].
pub struct Connection {
    session: Box<dyn Session>,
}

impl Connection {
    pub fn new(session: Box<dyn Session>) -> Self {
        Self { session }
    }

    /// Whether the server still answers a ping.
    pub async fn is_live(&mut self) -> bool {
        match self.session.ping().await {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(error = %error, "liveness check failed");
                false
            }
        }
    }

    /// Open a cursor. The connection stays borrowed until the cursor is released.
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor {
            session: self.session.as_mut(),
            released: false,
        }
    }

    pub async fn close(mut self) -> Result<(), DbError> {
        self.session.close().await
    }
}

/// Statement handle scoped to a borrowed connection.
///
/// Released either by [`Cursor::close`] or on drop, never twice.
pub struct Cursor<'c> {
    session: &'c mut dyn Session,
    released: bool,
}

impl Cursor<'_> {
    pub async fn execute(&mut self, statement: &str) -> Result<u64, DbError> {
        tracing::debug!(statement, "executing statement");
        self.session.execute(statement).await
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.session.release_cursor();
        }
    }
}

impl Drop for Cursor<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct CountingSession {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Session for CountingSession {
        async fn ping(&mut self) -> Result<(), DbError> {
            self.calls.lock().unwrap().push("ping");
            Ok(())
        }

        async fn execute(&mut self, _statement: &str) -> Result<u64, DbError> {
            self.calls.lock().unwrap().push("execute");
            Ok(1)
        }

        fn release_cursor(&mut self) {
            self.calls.lock().unwrap().push("release_cursor");
        }

        async fn close(&mut self) -> Result<(), DbError> {
            self.calls.lock().unwrap().push("close");
            Ok(())
        }
    }

    #[tokio::test]
    async fn cursor_released_once_when_closed_explicitly() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut connection = Connection::new(Box::new(CountingSession {
            calls: calls.clone(),
        }));

        let mut cursor = connection.cursor();
        cursor.execute("SELECT 1").await.unwrap();
        cursor.close();
        connection.close().await.unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["execute", "release_cursor", "close"]
        );
    }

    #[tokio::test]
    async fn dropped_cursor_is_released() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut connection = Connection::new(Box::new(CountingSession {
            calls: calls.clone(),
        }));

        {
            let _cursor = connection.cursor();
        }
        assert!(connection.is_live().await);

        assert_eq!(*calls.lock().unwrap(), vec!["release_cursor", "ping"]);
    }
}
