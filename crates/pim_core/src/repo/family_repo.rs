//! Family repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist a family together with its attributes, variants and variant
//!   attribute sets as one unit.
//! - Hydrate the same graph back in stored order.
//!
//! # Invariants
//! - `save_family` is atomic: either the whole graph is written or nothing.
//! - Family attributes load by `sort_order`; variants by `sort_order`; sets by
//!   `level`; set members by `sort_order`.
//! - A family variant code never moves from one family to another.

use crate::model::attribute::Attribute;
use crate::model::family::Family;
use crate::model::family_variant::{FamilyVariant, VariantAttributeSet};
use crate::repo::attribute_repo::parse_attribute_row;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::{BTreeMap, HashSet};

const ROLE_AXIS: &str = "axis";
const ROLE_ATTRIBUTE: &str = "attribute";

/// Repository interface for the family aggregate.
pub trait FamilyRepository {
    /// Inserts or replaces the whole family graph.
    fn save_family(&self, family: &Family) -> RepoResult<()>;
    /// Loads one family with attributes and variants.
    fn get_family(&self, code: &str) -> RepoResult<Option<Family>>;
    fn list_family_codes(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed family repository.
pub struct SqliteFamilyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                "families",
                "family_attributes",
                "family_variants",
                "variant_attribute_sets",
                "variant_attribute_set_members",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl FamilyRepository for SqliteFamilyRepository<'_> {
    fn save_family(&self, family: &Family) -> RepoResult<()> {
        family.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_attributes_exist(&tx, family)?;

        tx.execute(
            "INSERT INTO families (code) VALUES (?1)
             ON CONFLICT(code) DO UPDATE
             SET updated_at = (strftime('%s', 'now') * 1000);",
            [family.code.as_str()],
        )?;

        tx.execute(
            "DELETE FROM family_attributes WHERE family_code = ?1;",
            [family.code.as_str()],
        )?;
        for (sort_order, attribute) in family.attributes().iter().enumerate() {
            tx.execute(
                "INSERT INTO family_attributes (family_code, attribute_code, sort_order)
                 VALUES (?1, ?2, ?3);",
                params![family.code.as_str(), attribute.code.as_str(), sort_order as i64],
            )?;
        }

        delete_stale_variants(&tx, family)?;
        for (sort_order, variant) in family.family_variants().iter().enumerate() {
            save_variant(&tx, variant, sort_order as i64)?;
        }

        tx.commit()?;
        info!(
            "event=family_save module=repo status=ok family={} attributes={} family_variants={}",
            family.code,
            family.attributes().len(),
            family.family_variants().len()
        );
        Ok(())
    }

    fn get_family(&self, code: &str) -> RepoResult<Option<Family>> {
        let stored_code: Option<String> = self
            .conn
            .query_row("SELECT code FROM families WHERE code = ?1;", [code], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(stored_code) = stored_code else {
            return Ok(None);
        };

        let mut family = Family::new(stored_code);
        for attribute in load_family_attributes(self.conn, code)? {
            family.add_attribute(attribute);
        }
        for variant_code in load_variant_codes(self.conn, code)? {
            family.add_family_variant(load_variant(self.conn, &variant_code, code)?);
        }

        family.validate()?;
        debug!(
            "event=family_load module=repo status=ok family={} family_variants={}",
            family.code,
            family.family_variants().len()
        );
        Ok(Some(family))
    }

    fn list_family_codes(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT code FROM families ORDER BY code ASC;")?;
        let mut rows = stmt.query([])?;
        let mut codes = Vec::new();
        while let Some(row) = rows.next()? {
            codes.push(row.get(0)?);
        }
        Ok(codes)
    }
}

/// Every referenced attribute must exist with the same type it was stored with.
fn ensure_attributes_exist(conn: &Connection, family: &Family) -> RepoResult<()> {
    let referenced = family.attributes().iter().chain(
        family
            .family_variants()
            .iter()
            .flat_map(|variant| variant.variant_attribute_sets())
            .flat_map(|set| set.axes().iter().chain(set.attributes())),
    );

    let mut checked = HashSet::new();
    for attribute in referenced {
        if !checked.insert((attribute.code.as_str(), attribute.attribute_type)) {
            continue;
        }
        let stored = conn
            .query_row(
                "SELECT code, type FROM attributes WHERE code = ?1;",
                [attribute.code.as_str()],
                |row| Ok(parse_attribute_row(row)),
            )
            .optional()?
            .transpose()?
            .ok_or_else(|| RepoError::UnknownAttribute(attribute.code.clone()))?;
        if stored.attribute_type != attribute.attribute_type {
            return Err(RepoError::AttributeTypeMismatch {
                code: attribute.code.clone(),
                stored: stored.attribute_type,
                given: attribute.attribute_type,
            });
        }
    }
    Ok(())
}

fn delete_stale_variants(conn: &Connection, family: &Family) -> RepoResult<()> {
    let kept: HashSet<&str> = family
        .family_variants()
        .iter()
        .map(|variant| variant.code.as_str())
        .collect();

    for stored in load_variant_codes(conn, &family.code)? {
        if kept.contains(stored.as_str()) {
            continue;
        }
        delete_variant_sets(conn, &stored)?;
        conn.execute("DELETE FROM family_variants WHERE code = ?1;", [&stored])?;
    }
    Ok(())
}

fn save_variant(conn: &Connection, variant: &FamilyVariant, sort_order: i64) -> RepoResult<()> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT family_code FROM family_variants WHERE code = ?1;",
            [variant.code.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    if matches!(owner, Some(ref owner) if *owner != variant.family_code) {
        return Err(RepoError::Conflict {
            entity: "family variant",
            code: variant.code.clone(),
        });
    }

    conn.execute(
        "INSERT INTO family_variants (code, family_code, sort_order)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(code) DO UPDATE
         SET sort_order = excluded.sort_order,
             updated_at = (strftime('%s', 'now') * 1000);",
        params![variant.code.as_str(), variant.family_code.as_str(), sort_order],
    )?;

    delete_variant_sets(conn, &variant.code)?;
    for set in variant.variant_attribute_sets() {
        conn.execute(
            "INSERT INTO variant_attribute_sets (family_variant_code, level) VALUES (?1, ?2);",
            params![variant.code.as_str(), set.level],
        )?;
        insert_members(conn, &variant.code, set.level, ROLE_AXIS, set.axes())?;
        insert_members(conn, &variant.code, set.level, ROLE_ATTRIBUTE, set.attributes())?;
    }
    Ok(())
}

fn insert_members(
    conn: &Connection,
    variant_code: &str,
    level: u32,
    role: &str,
    attributes: &[Attribute],
) -> RepoResult<()> {
    for (sort_order, attribute) in attributes.iter().enumerate() {
        conn.execute(
            "INSERT INTO variant_attribute_set_members (
                family_variant_code,
                level,
                attribute_code,
                role,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                variant_code,
                level,
                attribute.code.as_str(),
                role,
                sort_order as i64
            ],
        )?;
    }
    Ok(())
}

fn delete_variant_sets(conn: &Connection, variant_code: &str) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM variant_attribute_set_members WHERE family_variant_code = ?1;",
        [variant_code],
    )?;
    conn.execute(
        "DELETE FROM variant_attribute_sets WHERE family_variant_code = ?1;",
        [variant_code],
    )?;
    Ok(())
}

fn load_family_attributes(conn: &Connection, family_code: &str) -> RepoResult<Vec<Attribute>> {
    let mut stmt = conn.prepare(
        "SELECT a.code AS code, a.type AS type
         FROM family_attributes fa
         INNER JOIN attributes a ON a.code = fa.attribute_code
         WHERE fa.family_code = ?1
         ORDER BY fa.sort_order ASC, a.code ASC;",
    )?;
    let mut rows = stmt.query([family_code])?;
    let mut attributes = Vec::new();
    while let Some(row) = rows.next()? {
        attributes.push(parse_attribute_row(row)?);
    }
    Ok(attributes)
}

fn load_variant_codes(conn: &Connection, family_code: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT code
         FROM family_variants
         WHERE family_code = ?1
         ORDER BY sort_order ASC, code ASC;",
    )?;
    let mut rows = stmt.query([family_code])?;
    let mut codes = Vec::new();
    while let Some(row) = rows.next()? {
        codes.push(row.get(0)?);
    }
    Ok(codes)
}

fn load_variant(
    conn: &Connection,
    variant_code: &str,
    family_code: &str,
) -> RepoResult<FamilyVariant> {
    let mut sets: BTreeMap<u32, VariantAttributeSet> = BTreeMap::new();

    let mut stmt = conn.prepare(
        "SELECT level
         FROM variant_attribute_sets
         WHERE family_variant_code = ?1
         ORDER BY level ASC;",
    )?;
    let mut rows = stmt.query([variant_code])?;
    while let Some(row) = rows.next()? {
        let level: u32 = row.get(0)?;
        sets.insert(level, VariantAttributeSet::new(level));
    }

    let mut stmt = conn.prepare(
        "SELECT m.level AS level, m.role AS role, a.code AS code, a.type AS type
         FROM variant_attribute_set_members m
         INNER JOIN attributes a ON a.code = m.attribute_code
         WHERE m.family_variant_code = ?1
         ORDER BY m.level ASC, m.sort_order ASC, a.code ASC;",
    )?;
    let mut rows = stmt.query([variant_code])?;
    while let Some(row) = rows.next()? {
        let level: u32 = row.get("level")?;
        let role: String = row.get("role")?;
        let attribute = parse_attribute_row(row)?;
        let set = sets.get_mut(&level).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "member of missing level {level} in family variant `{variant_code}`"
            ))
        })?;
        match role.as_str() {
            ROLE_AXIS => set.add_axis(attribute),
            ROLE_ATTRIBUTE => set.add_attribute(attribute),
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid member role `{other}` in variant_attribute_set_members.role"
                )));
            }
        };
    }

    let mut variant = FamilyVariant::new(variant_code, family_code);
    for set in sets.into_values() {
        variant.add_variant_attribute_set(set);
    }
    Ok(variant)
}
