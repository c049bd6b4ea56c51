use std::path::Path;

use assert_cmd::Command;

fn dbinit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lendhero-dbinit").unwrap();
    cmd.env_clear()
        .current_dir(dir)
        .args(["--connect-timeout-secs", "5"]);
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn stdout_of(cmd: &mut Command, success: bool) -> String {
    let assert = cmd.assert();
    let assert = if success {
        assert.success()
    } else {
        assert.failure()
    };
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

const UNREACHABLE: &str = "DB_HOST=127.0.0.1\nDB_PORT=1\nDB_USER=root\nDB_NAME=lendhero\n";

#[test]
fn unreachable_server_reports_error_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".env.development", UNREACHABLE);

    let stdout = stdout_of(&mut dbinit(dir.path()), true);

    assert!(stdout.starts_with("Error al conectar con MySQL: "), "{stdout}");
    assert!(!stdout.contains("Conexión a MySQL cerrada."));
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn strict_mode_surfaces_failure_in_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".env.development", UNREACHABLE);

    let stdout = stdout_of(dbinit(dir.path()).arg("--strict"), false);
    assert!(stdout.starts_with("Error al conectar con MySQL: "), "{stdout}");

    let mut cmd = dbinit(dir.path());
    cmd.env("DB_BOOTSTRAP_STRICT", "true");
    cmd.assert().code(1);
}

#[test]
fn env_selects_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".env.development", "DB_USER=root\n");
    write(dir.path(), ".env.production", "DB_HOST=127.0.0.1\n");

    let development = stdout_of(&mut dbinit(dir.path()), true);
    assert_eq!(
        development.trim_end(),
        "Error al conectar con MySQL: missing required setting DB_HOST"
    );

    let production = stdout_of(dbinit(dir.path()).env("ENV", "production"), true);
    assert_eq!(
        production.trim_end(),
        "Error al conectar con MySQL: missing required setting DB_USER"
    );

    let flag = stdout_of(dbinit(dir.path()).args(["--env", "production"]), true);
    assert_eq!(production, flag);
}

#[test]
fn env_dir_flag_points_at_settings_directory() {
    let dir = tempfile::tempdir().unwrap();
    let settings_dir = dir.path().join("config");
    std::fs::create_dir(&settings_dir).unwrap();
    write(&settings_dir, ".env.development", "DB_HOST=127.0.0.1\n");

    let stdout = stdout_of(
        dbinit(dir.path()).arg("--env-dir").arg(&settings_dir),
        true,
    );
    assert!(stdout.contains("missing required setting DB_USER"), "{stdout}");
}

#[test]
fn unparseable_settings_line_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        ".env.development",
        "DB_USER=root\nnot an assignment\nDB_NAME=lendhero\n",
    );

    let stdout = stdout_of(&mut dbinit(dir.path()), true);
    assert_eq!(
        stdout.trim_end(),
        "Error al conectar con MySQL: missing required setting DB_HOST"
    );
}

#[test]
fn malformed_port_is_a_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".env.development", "DB_HOST=127.0.0.1\nDB_PORT=abc\n");

    let stdout = stdout_of(&mut dbinit(dir.path()), false);
    assert!(stdout.is_empty());
}
