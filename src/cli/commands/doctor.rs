//! Doctor command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;

use super::print_json;
use crate::cli::CommandContext;
use crate::storage::check_schema;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct DoctorReport {
    ok: bool,
    database: String,
    checks: Vec<CheckResult>,
}

fn push_check(
    checks: &mut Vec<CheckResult>,
    name: &str,
    status: CheckStatus,
    message: Option<String>,
) {
    checks.push(CheckResult {
        name: name.to_string(),
        status,
        message,
    });
}

fn has_error(checks: &[CheckResult]) -> bool {
    checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Error))
}

fn print_report(report: &DoctorReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    println!("istore doctor: {}", report.database);
    for check in &report.checks {
        let label = match check.status {
            CheckStatus::Ok => "OK",
            CheckStatus::Warn => "WARN",
            CheckStatus::Error => "ERROR",
        };
        if let Some(message) = &check.message {
            println!("{label} {}: {}", check.name, message);
        } else {
            println!("{label} {}", check.name);
        }
    }
    Ok(())
}

fn check_integrity(conn: &Connection, checks: &mut Vec<CheckResult>) -> Result<()> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    if result.trim().eq_ignore_ascii_case("ok") {
        push_check(checks, "sqlite.integrity_check", CheckStatus::Ok, None);
    } else {
        push_check(
            checks,
            "sqlite.integrity_check",
            CheckStatus::Error,
            Some(result),
        );
    }
    Ok(())
}

fn check_journal_mode(conn: &Connection, checks: &mut Vec<CheckResult>) -> Result<()> {
    let mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    if mode.eq_ignore_ascii_case("wal") {
        push_check(checks, "sqlite.journal_mode", CheckStatus::Ok, None);
    } else {
        push_check(
            checks,
            "sqlite.journal_mode",
            CheckStatus::Warn,
            Some(format!("{mode} (WAL is enabled when the store opens it)")),
        );
    }
    Ok(())
}

fn required_schema_checks(conn: &Connection, checks: &mut Vec<CheckResult>) -> Result<()> {
    let report = check_schema(conn)?;

    for table in &report.tables {
        let name = format!("schema.{}", table.table);
        if !table.present {
            push_check(
                checks,
                &name,
                CheckStatus::Error,
                Some("table missing (run `istore init` on a fresh database)".to_string()),
            );
        } else if table.missing_columns.is_empty() {
            push_check(checks, &name, CheckStatus::Ok, None);
        } else {
            push_check(
                checks,
                &name,
                CheckStatus::Error,
                Some(format!(
                    "missing columns: {}",
                    table.missing_columns.join(", ")
                )),
            );
        }
    }

    if report.dedup_constraint {
        push_check(checks, "schema.dedup_constraint", CheckStatus::Ok, None);
    } else {
        push_check(
            checks,
            "schema.dedup_constraint",
            CheckStatus::Error,
            Some("no UNIQUE (source, content_hash) on raw_documents".to_string()),
        );
    }

    if report.json_support {
        push_check(checks, "sqlite.json", CheckStatus::Ok, None);
    } else {
        push_check(
            checks,
            "sqlite.json",
            CheckStatus::Error,
            Some("JSON functions unavailable; payload_meta cannot be stored".to_string()),
        );
    }
    Ok(())
}

fn collect_checks(db_path: &Path) -> Result<Vec<CheckResult>> {
    let mut checks = Vec::new();

    if !db_path.exists() {
        push_check(
            &mut checks,
            "db.exists",
            CheckStatus::Error,
            Some(format!("{} not found", db_path.display())),
        );
        return Ok(checks);
    }

    // Read-write without CREATE: a WAL database may need its -shm file.
    match Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_WRITE) {
        Ok(conn) => {
            required_schema_checks(&conn, &mut checks)?;
            check_integrity(&conn, &mut checks)?;
            check_journal_mode(&conn, &mut checks)?;
        }
        Err(err) => {
            push_check(
                &mut checks,
                "db.open",
                CheckStatus::Error,
                Some(format!("Failed to open DB: {err}")),
            );
        }
    }
    Ok(checks)
}

/// Execute the doctor command.
///
/// Opens an existing database and only reads from it; nothing is created
/// or repaired.
///
/// # Errors
///
/// Returns an error if any check fails or the report cannot be printed.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let db_path = ctx.config.database_path();
    let checks = collect_checks(&db_path)?;

    let report = DoctorReport {
        ok: !has_error(&checks),
        database: db_path.display().to_string(),
        checks,
    };
    print_report(&report, ctx.json)?;

    if !report.ok {
        bail!("doctor found problems with {}", report.database);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::apply_schema;
    use tempfile::TempDir;

    fn find_check<'a>(checks: &'a [CheckResult], name: &str) -> Option<&'a CheckResult> {
        checks.iter().find(|check| check.name == name)
    }

    #[test]
    fn test_missing_database() {
        let dir = TempDir::new().unwrap();
        let checks = collect_checks(&dir.path().join("absent.db")).unwrap();
        let check = find_check(&checks, "db.exists").expect("exists check");
        assert!(matches!(check.status, CheckStatus::Error));
    }

    #[test]
    fn test_required_schema_checks_missing_tables() {
        let conn = Connection::open_in_memory().unwrap();
        let mut checks = Vec::new();
        required_schema_checks(&conn, &mut checks).unwrap();

        let events = find_check(&checks, "schema.ingestion_events").expect("events check");
        assert!(matches!(events.status, CheckStatus::Error));
        let dedup = find_check(&checks, "schema.dedup_constraint").expect("dedup check");
        assert!(matches!(dedup.status, CheckStatus::Error));
        assert!(has_error(&checks));
    }

    #[test]
    fn test_initialized_database_is_healthy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok.db");
        {
            let conn = Connection::open(&path).unwrap();
            apply_schema(&conn).unwrap();
        }
        let checks = collect_checks(&path).unwrap();
        assert!(!has_error(&checks), "{checks:?}");
        let journal = find_check(&checks, "sqlite.journal_mode").expect("journal check");
        assert!(matches!(journal.status, CheckStatus::Warn));
    }
}
