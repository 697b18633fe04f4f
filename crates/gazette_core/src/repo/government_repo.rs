//! Government repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist government records and answer date-range lookups.
//! - Translate storage uniqueness violations into field errors.
//!
//! # Invariants
//! - `update_government` never writes the `slug` column.
//! - Dates are stored as `YYYY-MM-DD` text, so lexical order is date order.
//! - More than one ongoing row is reported as `InvalidData`, never hidden.

use crate::model::government::{
    is_storable_date, Government, GovernmentId, MIN_STORABLE_YEAR,
};
use crate::model::validation::{ValidationErrors, ValidationReason};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult, RequiredTable};
use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, ErrorCode, Row};

const GOVERNMENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    slug,
    start_date,
    end_date
FROM governments";

const REQUIRED_TABLES: &[RequiredTable] = &[(
    "governments",
    &["uuid", "name", "slug", "start_date", "end_date"],
)];

/// Repository interface for government records.
pub trait GovernmentRepository {
    fn insert_government(&self, government: &Government) -> RepoResult<GovernmentId>;
    /// Writes name and dates. The stored slug is left untouched.
    fn update_government(&self, government: &Government) -> RepoResult<()>;
    fn get_government(&self, id: GovernmentId) -> RepoResult<Option<Government>>;
    fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Government>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Government>>;
    fn slug_exists(&self, slug: &str) -> RepoResult<bool>;
    /// All governments ordered by `start_date ASC`.
    fn list_governments(&self) -> RepoResult<Vec<Government>>;
    /// The government whose `end_date` is null.
    fn current_government(&self) -> RepoResult<Option<Government>>;
    /// The government whose inclusive range contains `date`.
    fn government_on_date(&self, date: NaiveDate) -> RepoResult<Option<Government>>;
    /// Governments whose range intersects `[start, end]`, optionally
    /// ignoring one record (the one being updated).
    fn overlapping_governments(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        excluding: Option<GovernmentId>,
    ) -> RepoResult<Vec<Government>>;
}

/// SQLite-backed government repository.
pub struct SqliteGovernmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGovernmentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn query_governments(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Government>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut governments = Vec::new();
        while let Some(row) = rows.next()? {
            governments.push(parse_government_row(row)?);
        }
        Ok(governments)
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Option<Government>> {
        Ok(self.query_governments(sql, params)?.into_iter().next())
    }
}

impl GovernmentRepository for SqliteGovernmentRepository<'_> {
    fn insert_government(&self, government: &Government) -> RepoResult<GovernmentId> {
        government.validate()?;

        self.conn
            .execute(
                "INSERT INTO governments (
                    uuid,
                    name,
                    slug,
                    start_date,
                    end_date
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    government.id.to_string(),
                    government.name.as_str(),
                    government.slug.as_str(),
                    government.start_date,
                    government.end_date,
                ],
            )
            .map_err(map_constraint_error)?;

        Ok(government.id)
    }

    fn update_government(&self, government: &Government) -> RepoResult<()> {
        government.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE governments
                 SET
                    name = ?1,
                    start_date = ?2,
                    end_date = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?4;",
                params![
                    government.name.as_str(),
                    government.start_date,
                    government.end_date,
                    government.id.to_string(),
                ],
            )
            .map_err(map_constraint_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound(government.id));
        }

        Ok(())
    }

    fn get_government(&self, id: GovernmentId) -> RepoResult<Option<Government>> {
        self.query_one(
            &format!("{GOVERNMENT_SELECT_SQL} WHERE uuid = ?1;"),
            [id.to_string()],
        )
    }

    fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Government>> {
        self.query_one(&format!("{GOVERNMENT_SELECT_SQL} WHERE slug = ?1;"), [slug])
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Government>> {
        self.query_one(&format!("{GOVERNMENT_SELECT_SQL} WHERE name = ?1;"), [name])
    }

    fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM governments WHERE slug = ?1);",
            [slug],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_governments(&self) -> RepoResult<Vec<Government>> {
        self.query_governments(
            &format!("{GOVERNMENT_SELECT_SQL} ORDER BY start_date ASC, uuid ASC;"),
            [],
        )
    }

    fn current_government(&self) -> RepoResult<Option<Government>> {
        let mut ongoing = self.query_governments(
            &format!("{GOVERNMENT_SELECT_SQL} WHERE end_date IS NULL ORDER BY start_date DESC LIMIT 2;"),
            [],
        )?;

        if ongoing.len() > 1 {
            return Err(RepoError::InvalidData(format!(
                "more than one ongoing government: `{}` and `{}`",
                ongoing[0].slug, ongoing[1].slug
            )));
        }

        Ok(ongoing.pop())
    }

    fn government_on_date(&self, date: NaiveDate) -> RepoResult<Option<Government>> {
        if !is_storable_date(date) {
            // Text order breaks outside the storable years: nothing starts
            // before them, and only an ongoing government reaches past them.
            if date.year() < MIN_STORABLE_YEAR {
                return Ok(None);
            }
            return self.current_government();
        }

        self.query_one(
            &format!(
                "{GOVERNMENT_SELECT_SQL}
                 WHERE start_date <= ?1
                   AND (end_date IS NULL OR end_date >= ?1)
                 ORDER BY start_date DESC, uuid ASC
                 LIMIT 1;"
            ),
            [date],
        )
    }

    fn overlapping_governments(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        excluding: Option<GovernmentId>,
    ) -> RepoResult<Vec<Government>> {
        self.query_governments(
            &format!(
                "{GOVERNMENT_SELECT_SQL}
                 WHERE (?3 IS NULL OR uuid <> ?3)
                   AND (?2 IS NULL OR start_date <= ?2)
                   AND (end_date IS NULL OR end_date >= ?1)
                 ORDER BY start_date ASC, uuid ASC;"
            ),
            params![start, end, excluding.map(|id| id.to_string())],
        )
    }
}

fn parse_government_row(row: &Row<'_>) -> RepoResult<Government> {
    let uuid_text: String = row.get("uuid")?;
    let government = Government {
        id: parse_uuid(&uuid_text, "governments.uuid")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
    };
    government.validate().map_err(|err| {
        RepoError::InvalidData(format!("government `{uuid_text}` failed validation: {err}"))
    })?;
    Ok(government)
}

/// Maps unique-index violations raised by concurrent writers onto the same
/// field errors the service reports for sequential ones.
fn map_constraint_error(err: rusqlite::Error) -> RepoError {
    let field = match &err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            if message.contains("governments.name") {
                Some(("name", ValidationReason::Taken))
            } else if message.contains("governments.slug") {
                Some(("slug", ValidationReason::Taken))
            } else if message.contains("governments_single_current") {
                Some(("start_date", ValidationReason::Overlaps))
            } else if message.contains("CHECK") {
                Some(("end_date", ValidationReason::Invalid))
            } else {
                None
            }
        }
        _ => None,
    };

    match field {
        Some((field, reason)) => RepoError::Validation(ValidationErrors::single(field, reason)),
        None => err.into(),
    }
}
