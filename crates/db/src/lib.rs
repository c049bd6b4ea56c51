//! MySQL connector and database bootstrap for LendHero.

pub mod bootstrap;
pub mod error;
pub mod mysql;
pub mod name;
pub mod session;

pub use bootstrap::{bootstrap, BootstrapEvent, Outcome, Reporter};
pub use error::DbError;
pub use mysql::MySqlConnector;
pub use name::DatabaseName;
pub use session::{Connection, Connector, Cursor, Session};
