//! LendHero database bootstrap.
//!
//! Wires loaded [`Settings`] to a [`Connector`] and prints progress on the
//! console.

pub mod console;

pub use console::ConsoleReporter;

use lendhero_db::{bootstrap, Connector, Outcome};
use lendhero_kernel::settings::Settings;

/// Ensure the configured database exists, printing status lines to stdout.
pub async fn run<C>(settings: &Settings, connector: &C) -> Outcome
where
    C: Connector + ?Sized,
{
    if settings.env_file.found {
        tracing::info!(path = %settings.env_file.path.display(), "settings file loaded");
        for line in &settings.env_file.skipped_lines {
            tracing::warn!(
                path = %settings.env_file.path.display(),
                line,
                "could not parse settings line; skipped"
            );
        }
    } else {
        tracing::warn!(
            path = %settings.env_file.path.display(),
            "settings file not found; using process environment only"
        );
    }

    let mut reporter = ConsoleReporter::stdout();
    let outcome = bootstrap(settings, connector, &mut reporter).await;

    tracing::info!(ready = outcome.is_ready(), "bootstrap finished");
    outcome
}

#[cfg(test)]
mod tests {
    use lendhero_db::{DbError, MySqlConnector};

    use super::*;

    #[tokio::test]
    async fn missing_host_fails_without_touching_the_network() {
        let settings = Settings::default();

        let outcome = run(&settings, &MySqlConnector::new()).await;

        assert!(matches!(
            outcome,
            Outcome::Failed {
                error: DbError::MissingSetting("DB_HOST")
            }
        ));
    }
}
