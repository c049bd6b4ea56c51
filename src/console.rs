//! Spanish status lines printed to stdout while bootstrapping.

use std::io::{self, Write};

use lendhero_db::{BootstrapEvent, Reporter};

/// Text shown to operators for each bootstrap event.
pub fn render(event: &BootstrapEvent) -> String {
    match event {
        BootstrapEvent::Connected { environment } => {
            format!("Conectado a MySQL ({environment} environment)")
        }
        BootstrapEvent::DatabaseReady { database } => {
            format!("Base de datos '{database}' creada o ya existe.")
        }
        BootstrapEvent::Failed { error } => format!("Error al conectar con MySQL: {error}"),
        BootstrapEvent::ConnectionClosed => "Conexión a MySQL cerrada.".to_string(),
    }
}

/// Writes one status line per event.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, event: &BootstrapEvent) {
        let line = render(event);
        if let Err(error) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %error, line = %line, "failed to write status line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_status_lines() {
        assert_eq!(
            render(&BootstrapEvent::Connected {
                environment: "production".to_string()
            }),
            "Conectado a MySQL (production environment)"
        );
        assert_eq!(
            render(&BootstrapEvent::DatabaseReady {
                database: "lendhero".to_string()
            }),
            "Base de datos 'lendhero' creada o ya existe."
        );
        assert_eq!(
            render(&BootstrapEvent::Failed {
                error: "connection is not live".to_string()
            }),
            "Error al conectar con MySQL: connection is not live"
        );
        assert_eq!(
            render(&BootstrapEvent::ConnectionClosed),
            "Conexión a MySQL cerrada."
        );
    }

    #[test]
    fn writes_one_line_per_event() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.report(&BootstrapEvent::Connected {
            environment: "development".to_string(),
        });
        reporter.report(&BootstrapEvent::ConnectionClosed);

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            output,
            "Conectado a MySQL (development environment)\nConexión a MySQL cerrada.\n"
        );
    }
}
