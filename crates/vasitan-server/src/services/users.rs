use rusqlite::{Connection, OptionalExtension};

use crate::auth::password;
use crate::error::{AppError, ActionError, ActionResult, AppResult, ErrorCode};
use crate::models::{timestamp, User};

/// Verified against when the email is unknown, so both login failures cost
/// one key derivation.
const DUMMY_CREDENTIAL: &str = concat!(
    "00000000000000000000000000000000:",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
);

#[derive(Debug, Clone, Default)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A registration that passed validation, with its credential already derived.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl NewUser {
    /// Validates the command and hashes the password. Needs no connection,
    /// so callers run it before checking one out of the pool.
    pub fn prepare(cmd: RegisterCommand) -> ActionResult<Self> {
        let email = normalize_email(&cmd.email);
        if email.is_empty() || !email.contains('@') || cmd.password.is_empty() {
            return Err(ErrorCode::Missing.into());
        }
        if cmd.password != cmd.password_confirm {
            return Err(ErrorCode::Password.into());
        }

        Ok(Self {
            email,
            password_hash: password::hash_password(&cmd.password)?,
            name: cmd.name,
            phone: cmd.phone,
        })
    }
}

pub fn register(conn: &Connection, new_user: NewUser) -> ActionResult<User> {
    let NewUser {
        email,
        password_hash,
        name,
        phone,
    } = new_user;
    if find_by_email(conn, &email)?.is_some() {
        tracing::info!("Registration rejected, email already in use");
        return Err(ErrorCode::Exists.into());
    }

    let now = timestamp();

    let result = conn.execute(
        "INSERT INTO users (email, password_hash, name, phone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![email, password_hash, name, phone, now, now],
    );

    match result {
        Ok(_) => {}
        // Lost a race with a concurrent registration for the same address.
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(ErrorCode::Exists.into());
        }
        Err(e) => return Err(AppError::Database(e).into()),
    }

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, "User registered");

    Ok(User {
        id,
        email,
        password_hash,
        name,
        phone,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Unknown email and wrong password are both reported as `invalid`.
pub fn authenticate(conn: &Connection, cmd: LoginCommand) -> ActionResult<User> {
    let email = normalize_email(&cmd.email);
    if email.is_empty() || cmd.password.is_empty() {
        return Err(ErrorCode::Missing.into());
    }

    let Some(user) = find_by_email(conn, &email)? else {
        let _ = password::verify_password(&cmd.password, DUMMY_CREDENTIAL);
        return Err(ActionError::Rejected(ErrorCode::Invalid));
    };

    if !password::verify_password(&cmd.password, &user.password_hash) {
        tracing::info!(user_id = user.id, "Login rejected, bad password");
        return Err(ErrorCode::Invalid.into());
    }

    Ok(user)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS);
    Ok(conn
        .query_row(&sql, rusqlite::params![id], User::from_row)
        .optional()?)
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS);
    Ok(conn
        .query_row(&sql, rusqlite::params![email], User::from_row)
        .optional()?)
}
