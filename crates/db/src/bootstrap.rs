//! Ensures the configured database exists on the target server.
//!
//! The run is linear: connect, check liveness, create the database, clean up.
//! Errors are reported and folded into the returned [`Outcome`]; cleanup runs
//! on every path once a connection has been opened.

use lendhero_kernel::settings::Settings;

use crate::error::DbError;
use crate::name::DatabaseName;
use crate::session::{Connection, Connector};

/// Progress notifications emitted while bootstrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapEvent {
    Connected { environment: String },
    DatabaseReady { database: String },
    Failed { error: String },
    ConnectionClosed,
}

/// Receives bootstrap progress, typically to print it.
pub trait Reporter {
    fn report(&mut self, event: &BootstrapEvent);
}

impl Reporter for Vec<BootstrapEvent> {
    fn report(&mut self, event: &BootstrapEvent) {
        self.push(event.clone());
    }
}

#[derive(Debug)]
pub enum Outcome {
    Ready { database: DatabaseName },
    Failed { error: DbError },
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready { .. })
    }
}

/// Connect with `settings.database` and create the named database if absent.
pub async fn bootstrap<C, R>(settings: &Settings, connector: &C, reporter: &mut R) -> Outcome
where
    C: Connector + ?Sized,
    R: Reporter + ?Sized,
{
    tracing::info!(
        environment = %settings.environment,
        host = settings.database.host.as_deref().unwrap_or_default(),
        "connecting to MySQL"
    );

    let mut connection = match connector.connect(&settings.database).await {
        Ok(connection) => connection,
        Err(error) => return failed(reporter, error),
    };

    let result = ensure_database(&mut connection, settings, reporter).await;
    if let Err(error) = &result {
        report_failure(reporter, error);
    }

    release(connection, reporter).await;

    match result {
        Ok(database) => Outcome::Ready { database },
        Err(error) => Outcome::Failed { error },
    }
}

async fn ensure_database<R>(
    connection: &mut Connection,
    settings: &Settings,
    reporter: &mut R,
) -> Result<DatabaseName, DbError>
where
    R: Reporter + ?Sized,
{
    if !connection.is_live().await {
        return Err(DbError::NotLive);
    }
    reporter.report(&BootstrapEvent::Connected {
        environment: settings.environment.to_string(),
    });

    let name = DatabaseName::from_setting(settings.database.name.as_deref())?;
    let statement = name.create_statement();

    let mut cursor = connection.cursor();
    let executed = cursor.execute(&statement).await;
    cursor.close();
    let rows_affected = executed?;

    tracing::info!(database = %name, rows_affected, "database ensured");
    reporter.report(&BootstrapEvent::DatabaseReady {
        database: name.to_string(),
    });

    Ok(name)
}

/// Close the connection if it is still live. A dead connection is dropped
/// without a close handshake and without a closure notice.
async fn release<R>(mut connection: Connection, reporter: &mut R)
where
    R: Reporter + ?Sized,
{
    if !connection.is_live().await {
        tracing::warn!("connection no longer live; dropping it");
        return;
    }

    if let Err(error) = connection.close().await {
        tracing::warn!(error = %error, "MySQL connection did not close cleanly");
    }
    tracing::debug!("MySQL connection closed");
    reporter.report(&BootstrapEvent::ConnectionClosed);
}

fn failed<R>(reporter: &mut R, error: DbError) -> Outcome
where
    R: Reporter + ?Sized,
{
    report_failure(reporter, &error);
    Outcome::Failed { error }
}

fn report_failure<R>(reporter: &mut R, error: &DbError)
where
    R: Reporter + ?Sized,
{
    tracing::error!(error = %error, "database bootstrap failed");
    reporter.report(&BootstrapEvent::Failed {
        error: error.to_string(),
    });
}
