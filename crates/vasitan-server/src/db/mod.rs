mod migrations;

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};

use crate::error::{AppError, AppResult};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Opens the SQLite pool at `sqlite_path` and brings the schema up to date.
///
/// The pool is the only handle to the store; callers own it and drop it on
/// shutdown.
pub fn create_pool(sqlite_path: &str) -> AppResult<DbPool> {
    if let Some(parent) = Path::new(sqlite_path).parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::Internal(format!("Failed to create database directory: {e}"))
        })?;
    }

    let manager = SqliteConnectionManager::file(sqlite_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            register_functions(conn)
        });

    let pool = Pool::builder()
        .max_size(10)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)?;

    let conn = pool.get()?;
    migrations::run(&conn)?;

    Ok(pool)
}

/// Case folding for search: Unicode lowercase with every Turkish I variant
/// collapsed to `i`, so `İSTANBUL`, `Istanbul` and `ıstanbul` compare equal.
pub fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'I' | 'İ' | 'ı' => folded.push('i'),
            c => folded.extend(c.to_lowercase()),
        }
    }
    folded
}

/// `fold_case(text)` as an SQL function; NULL stays NULL.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold_case(&t)))
        },
    )
}

/// Applies connection pragmas and the schema to a standalone connection.
#[cfg(test)]
pub(crate) fn prepare_test_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    register_functions(conn)?;
    migrations::run(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_case_handles_turkish_letters() {
        assert_eq!(fold_case("ŞAHİN"), "şahin");
        assert_eq!(fold_case("Çanakkale"), "çanakkale");
        assert_eq!(fold_case("ISPARTA"), fold_case("ısparta"));
        assert_eq!(fold_case("Ğ Ü Ö"), "ğ ü ö");
    }

    #[test]
    fn fold_case_is_callable_from_sql() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();
        let folded: String = conn
            .query_row("SELECT fold_case('ÖZDEMİR')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "özdemir");
        let null: Option<String> = conn
            .query_row("SELECT fold_case(NULL)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null, None);
    }
}
