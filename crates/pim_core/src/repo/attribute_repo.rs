//! Attribute repository contract and SQLite implementation.

use crate::model::attribute::{Attribute, AttributeType};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for attribute definitions.
pub trait AttributeRepository {
    /// Creates one attribute. Fails with `Conflict` when the code is taken.
    fn create_attribute(&self, attribute: &Attribute) -> RepoResult<()>;
    fn get_attribute(&self, code: &str) -> RepoResult<Option<Attribute>>;
    /// Lists every attribute ordered by code.
    fn list_attributes(&self) -> RepoResult<Vec<Attribute>>;
}

/// SQLite-backed attribute repository.
pub struct SqliteAttributeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttributeRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["attributes"])?;
        Ok(Self { conn })
    }
}

impl AttributeRepository for SqliteAttributeRepository<'_> {
    fn create_attribute(&self, attribute: &Attribute) -> RepoResult<()> {
        attribute.validate()?;

        let changed = self.conn.execute(
            "INSERT INTO attributes (code, type)
             VALUES (?1, ?2)
             ON CONFLICT(code) DO NOTHING;",
            params![attribute.code.as_str(), attribute.attribute_type.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::Conflict {
                entity: "attribute",
                code: attribute.code.clone(),
            });
        }

        Ok(())
    }

    fn get_attribute(&self, code: &str) -> RepoResult<Option<Attribute>> {
        let raw = self
            .conn
            .query_row(
                "SELECT code, type FROM attributes WHERE code = ?1;",
                [code],
                raw_attribute,
            )
            .optional()?;
        raw.map(|(code, kind)| build_attribute(code, &kind))
            .transpose()
    }

    fn list_attributes(&self) -> RepoResult<Vec<Attribute>> {
        let mut stmt = self
            .conn
            .prepare("SELECT code, type FROM attributes ORDER BY code ASC;")?;
        let mut rows = stmt.query([])?;
        let mut attributes = Vec::new();
        while let Some(row) = rows.next()? {
            attributes.push(parse_attribute_row(row)?);
        }
        Ok(attributes)
    }
}

/// Decodes a row exposing `code` and `type` columns.
pub(crate) fn parse_attribute_row(row: &Row<'_>) -> RepoResult<Attribute> {
    let (code, kind) = raw_attribute(row)?;
    build_attribute(code, &kind)
}

fn raw_attribute(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get("code")?, row.get("type")?))
}

fn build_attribute(code: String, kind: &str) -> RepoResult<Attribute> {
    let attribute_type = AttributeType::parse(kind).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid attribute type `{kind}` for attribute `{code}`"
        ))
    })?;
    Ok(Attribute::new(code, attribute_type))
}
