//! Edition repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist news articles and speeches on the shared `editions` table.
//! - Serve the published, newest-first listings aggregation is built on.
//!
//! # Invariants
//! - Listing APIs only ever return `state = 'published'` rows.
//! - Listings are ordered by `published_at DESC, uuid ASC`.
//! - Every returned document carries its identity and relations: news
//!   articles their policy areas, speeches their role appointment.

use crate::model::edition::{
    DocumentIdentity, DocumentKind, Edition, EditionId, NewsArticle, PublicationState, Speech,
};
use crate::model::metadata::Policy;
use crate::repo::metadata_repo::{
    load_policy_areas, load_related_policy_ids, load_related_published_policies,
    load_role_appointment,
};
use crate::repo::{
    bool_to_int, ensure_connection_ready, from_epoch_ms, parse_flag, parse_uuid, to_epoch_ms,
    RepoError, RepoResult, RequiredTable,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};

const EDITION_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    document_uuid,
    slug,
    title,
    state,
    featured,
    political,
    published_at,
    first_published_at,
    role_appointment_uuid
FROM editions";

const REQUIRED_TABLES: &[RequiredTable] = &[
    (
        "editions",
        &[
            "uuid",
            "kind",
            "document_uuid",
            "slug",
            "title",
            "state",
            "featured",
            "political",
            "published_at",
            "first_published_at",
            "role_appointment_uuid",
        ],
    ),
    ("edition_policy_areas", &["edition_uuid", "policy_area_uuid"]),
    ("edition_relations", &["edition_uuid", "policy_uuid"]),
];

/// Filter options for published document listings.
///
/// Bounds combine with `AND`. `published_after` and `published_before` are
/// exclusive, `published_since` is inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    pub featured: Option<bool>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_since: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl DocumentQuery {
    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    pub fn published_after(mut self, at: DateTime<Utc>) -> Self {
        self.published_after = Some(at);
        self
    }

    pub fn published_since(mut self, at: DateTime<Utc>) -> Self {
        self.published_since = Some(at);
        self
    }

    pub fn published_before(mut self, at: DateTime<Utc>) -> Self {
        self.published_before = Some(at);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Repository interface for news articles and speeches.
pub trait DocumentRepository {
    fn insert_news_article(&self, article: &NewsArticle) -> RepoResult<EditionId>;
    fn insert_speech(&self, speech: &Speech) -> RepoResult<EditionId>;
    /// Published news articles matching `query`, newest first.
    fn published_news_articles(&self, query: &DocumentQuery) -> RepoResult<Vec<NewsArticle>>;
    /// Published speeches matching `query`, newest first.
    fn published_speeches(&self, query: &DocumentQuery) -> RepoResult<Vec<Speech>>;
    fn find_published_speech(&self, slug: &str) -> RepoResult<Option<Speech>>;
    /// Published policies the edition is related to, ordered by title.
    fn related_published_policies(&self, edition_id: EditionId) -> RepoResult<Vec<Policy>>;
}

/// SQLite-backed edition repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn list_published(
        &self,
        kind: DocumentKind,
        query: &DocumentQuery,
    ) -> RepoResult<Vec<(Edition, Option<String>)>> {
        let mut sql = format!("{EDITION_SELECT_SQL} WHERE kind = ? AND state = 'published'");
        let mut bind_values: Vec<Value> = vec![Value::Text(kind.as_str().to_string())];

        if let Some(featured) = query.featured {
            sql.push_str(" AND featured = ?");
            bind_values.push(Value::Integer(bool_to_int(featured)));
        }
        if let Some(after) = query.published_after {
            sql.push_str(" AND published_at > ?");
            bind_values.push(Value::Integer(to_epoch_ms(after)));
        }
        if let Some(since) = query.published_since {
            sql.push_str(" AND published_at >= ?");
            bind_values.push(Value::Integer(to_epoch_ms(since)));
        }
        if let Some(before) = query.published_before {
            sql.push_str(" AND published_at < ?");
            bind_values.push(Value::Integer(to_epoch_ms(before)));
        }

        sql.push_str(" ORDER BY published_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut editions = Vec::new();
        while let Some(row) = rows.next()? {
            editions.push(parse_edition_row(self.conn, row, kind)?);
        }
        Ok(editions)
    }

    fn insert_edition(
        &self,
        kind: DocumentKind,
        edition: &Edition,
        role_appointment_uuid: Option<String>,
    ) -> RepoResult<Transaction<'conn>> {
        edition.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO editions (
                uuid,
                kind,
                document_uuid,
                slug,
                title,
                state,
                featured,
                political,
                published_at,
                first_published_at,
                role_appointment_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                edition.id.to_string(),
                kind.as_str(),
                edition.identity.document_id.to_string(),
                edition.identity.slug.as_str(),
                edition.title.as_str(),
                edition.state.as_str(),
                bool_to_int(edition.featured),
                bool_to_int(edition.political),
                edition.published_at.map(to_epoch_ms),
                edition.first_published_at.map(to_epoch_ms),
                role_appointment_uuid,
            ],
        )?;

        for policy_id in &edition.related_policy_ids {
            tx.execute(
                "INSERT OR IGNORE INTO edition_relations (edition_uuid, policy_uuid) VALUES (?1, ?2);",
                params![edition.id.to_string(), policy_id.to_string()],
            )?;
        }

        Ok(tx)
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn insert_news_article(&self, article: &NewsArticle) -> RepoResult<EditionId> {
        let tx = self.insert_edition(DocumentKind::NewsArticle, &article.edition, None)?;
        for area in &article.policy_areas {
            tx.execute(
                "INSERT OR IGNORE INTO edition_policy_areas (edition_uuid, policy_area_uuid)
                 VALUES (?1, ?2);",
                params![article.edition.id.to_string(), area.id.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(article.edition.id)
    }

    fn insert_speech(&self, speech: &Speech) -> RepoResult<EditionId> {
        let appointment_uuid = speech
            .role_appointment
            .as_ref()
            .map(|appointment| appointment.id.to_string());
        let tx = self.insert_edition(DocumentKind::Speech, &speech.edition, appointment_uuid)?;
        tx.commit()?;
        Ok(speech.edition.id)
    }

    fn published_news_articles(&self, query: &DocumentQuery) -> RepoResult<Vec<NewsArticle>> {
        self.list_published(DocumentKind::NewsArticle, query)?
            .into_iter()
            .map(|(edition, _)| {
                let policy_areas = load_policy_areas(self.conn, &edition.id.to_string())?;
                Ok(NewsArticle {
                    edition,
                    policy_areas,
                })
            })
            .collect()
    }

    fn published_speeches(&self, query: &DocumentQuery) -> RepoResult<Vec<Speech>> {
        self.list_published(DocumentKind::Speech, query)?
            .into_iter()
            .map(|(edition, appointment_uuid)| {
                speech_from_parts(self.conn, edition, appointment_uuid)
            })
            .collect()
    }

    fn find_published_speech(&self, slug: &str) -> RepoResult<Option<Speech>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EDITION_SELECT_SQL}
             WHERE kind = 'speech'
               AND state = 'published'
               AND slug = ?1
             ORDER BY published_at DESC, uuid ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([slug])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let (edition, appointment_uuid) = parse_edition_row(self.conn, row, DocumentKind::Speech)?;
        speech_from_parts(self.conn, edition, appointment_uuid).map(Some)
    }

    fn related_published_policies(&self, edition_id: EditionId) -> RepoResult<Vec<Policy>> {
        load_related_published_policies(self.conn, &edition_id.to_string())
    }
}

fn speech_from_parts(
    conn: &Connection,
    edition: Edition,
    appointment_uuid: Option<String>,
) -> RepoResult<Speech> {
    let role_appointment = match appointment_uuid {
        Some(uuid) => Some(load_role_appointment(conn, &uuid)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "speech `{}` references missing role appointment `{uuid}`",
                edition.id
            ))
        })?),
        None => None,
    };
    Ok(Speech {
        edition,
        role_appointment,
    })
}

fn parse_edition_row(
    conn: &Connection,
    row: &Row<'_>,
    expected_kind: DocumentKind,
) -> RepoResult<(Edition, Option<String>)> {
    let uuid_text: String = row.get("uuid")?;

    let kind_text: String = row.get("kind")?;
    if DocumentKind::parse(&kind_text) != Some(expected_kind) {
        return Err(RepoError::InvalidData(format!(
            "edition `{uuid_text}` has kind `{kind_text}`, expected `{}`",
            expected_kind.as_str()
        )));
    }

    let state_text: String = row.get("state")?;
    let state = PublicationState::parse(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid state `{state_text}` in editions.state"))
    })?;

    let document_text: String = row.get("document_uuid")?;
    let published_at = row
        .get::<_, Option<i64>>("published_at")?
        .map(|value| from_epoch_ms(value, "editions.published_at"))
        .transpose()?;
    let first_published_at = row
        .get::<_, Option<i64>>("first_published_at")?
        .map(|value| from_epoch_ms(value, "editions.first_published_at"))
        .transpose()?;

    let edition = Edition {
        id: parse_uuid(&uuid_text, "editions.uuid")?,
        identity: DocumentIdentity {
            document_id: parse_uuid(&document_text, "editions.document_uuid")?,
            slug: row.get("slug")?,
        },
        title: row.get("title")?,
        state,
        featured: parse_flag(row.get("featured")?, "editions.featured")?,
        political: parse_flag(row.get("political")?, "editions.political")?,
        published_at,
        first_published_at,
        related_policy_ids: load_related_policy_ids(conn, &uuid_text)?,
    };
    edition.validate().map_err(|err| {
        RepoError::InvalidData(format!("edition `{uuid_text}` failed validation: {err}"))
    })?;

    Ok((edition, row.get("role_appointment_uuid")?))
}
