//! Repository contracts and SQLite implementations for the catalog.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths run model validation before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories only accept fully migrated connections.

pub mod attribute_repo;
pub mod family_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::attribute::AttributeType;
use crate::model::error::ModelError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed structural validation before write or after read.
    Validation(ModelError),
    Db(DbError),
    /// Code already taken, or owned by another family.
    Conflict {
        entity: &'static str,
        code: String,
    },
    /// Family references an attribute that was never created.
    UnknownAttribute(String),
    /// Family carries an attribute whose type differs from the stored one.
    AttributeTypeMismatch {
        code: String,
        stored: AttributeType,
        given: AttributeType,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted into a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict { entity, code } => write!(f, "{entity} conflict: {code}"),
            Self::UnknownAttribute(code) => write!(f, "unknown attribute: {code}"),
            Self::AttributeTypeMismatch {
                code,
                stored,
                given,
            } => write!(
                f,
                "attribute `{code}` is stored as `{}`, got `{}`",
                stored.as_str(),
                given.as_str()
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Checks migration version and required tables before a repository is used.
fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
