//! Policy, policy-area and role-appointment persistence.
//!
//! These records are owned by editorial tooling; the core only needs to
//! seed them and read them back alongside editions.

use crate::model::edition::PublicationState;
use crate::model::metadata::{
    Person, Policy, PolicyArea, PolicyAreaId, PolicyId, Role, RoleAppointment, RoleAppointmentId,
};
use crate::model::slug::is_url_safe;
use crate::model::validation::{ValidationErrors, ValidationReason};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult, RequiredTable};
use rusqlite::{params, Connection, Row};

const REQUIRED_TABLES: &[RequiredTable] = &[
    ("policies", &["uuid", "title", "slug", "state"]),
    ("policy_areas", &["uuid", "name", "slug"]),
    ("people", &["uuid", "name"]),
    ("roles", &["uuid", "name"]),
    ("role_appointments", &["uuid", "person_uuid", "role_uuid"]),
];

/// Repository interface for edition metadata.
pub trait MetadataRepository {
    fn insert_policy(&self, policy: &Policy) -> RepoResult<PolicyId>;
    fn insert_policy_area(&self, area: &PolicyArea) -> RepoResult<PolicyAreaId>;
    /// Inserts the person, the role and the appointment linking them.
    fn insert_role_appointment(
        &self,
        appointment: &RoleAppointment,
    ) -> RepoResult<RoleAppointmentId>;
}

/// SQLite-backed metadata repository.
pub struct SqliteMetadataRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMetadataRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl MetadataRepository for SqliteMetadataRepository<'_> {
    fn insert_policy(&self, policy: &Policy) -> RepoResult<PolicyId> {
        validate_named("title", &policy.title, &policy.slug)?;
        self.conn.execute(
            "INSERT INTO policies (uuid, title, slug, state) VALUES (?1, ?2, ?3, ?4);",
            params![
                policy.id.to_string(),
                policy.title.as_str(),
                policy.slug.as_str(),
                policy.state.as_str(),
            ],
        )?;
        Ok(policy.id)
    }

    fn insert_policy_area(&self, area: &PolicyArea) -> RepoResult<PolicyAreaId> {
        validate_named("name", &area.name, &area.slug)?;
        self.conn.execute(
            "INSERT INTO policy_areas (uuid, name, slug) VALUES (?1, ?2, ?3);",
            params![area.id.to_string(), area.name.as_str(), area.slug.as_str()],
        )?;
        Ok(area.id)
    }

    fn insert_role_appointment(
        &self,
        appointment: &RoleAppointment,
    ) -> RepoResult<RoleAppointmentId> {
        let mut errors = ValidationErrors::new();
        if appointment.person.name.trim().is_empty() {
            errors.add("person", ValidationReason::Blank);
        }
        if appointment.role.name.trim().is_empty() {
            errors.add("role", ValidationReason::Blank);
        }
        errors.into_result()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO people (uuid, name) VALUES (?1, ?2);",
            params![
                appointment.person.id.to_string(),
                appointment.person.name.as_str()
            ],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO roles (uuid, name) VALUES (?1, ?2);",
            params![
                appointment.role.id.to_string(),
                appointment.role.name.as_str()
            ],
        )?;
        tx.execute(
            "INSERT INTO role_appointments (uuid, person_uuid, role_uuid) VALUES (?1, ?2, ?3);",
            params![
                appointment.id.to_string(),
                appointment.person.id.to_string(),
                appointment.role.id.to_string(),
            ],
        )?;
        tx.commit()?;
        Ok(appointment.id)
    }
}

fn validate_named(label_field: &'static str, label: &str, slug: &str) -> RepoResult<()> {
    let mut errors = ValidationErrors::new();
    if label.trim().is_empty() {
        errors.add(label_field, ValidationReason::Blank);
    }
    if !is_url_safe(slug) {
        errors.add("slug", ValidationReason::Invalid);
    }
    errors.into_result().map_err(RepoError::from)
}

/// Loads published policies related to one edition, ordered by title.
pub(crate) fn load_related_published_policies(
    conn: &Connection,
    edition_uuid: &str,
) -> RepoResult<Vec<Policy>> {
    let mut stmt = conn.prepare(
        "SELECT p.uuid, p.title, p.slug, p.state
         FROM edition_relations er
         INNER JOIN policies p ON p.uuid = er.policy_uuid
         WHERE er.edition_uuid = ?1
           AND p.state = 'published'
         ORDER BY p.title COLLATE NOCASE ASC, p.uuid ASC;",
    )?;
    let mut rows = stmt.query([edition_uuid])?;
    let mut policies = Vec::new();
    while let Some(row) = rows.next()? {
        policies.push(parse_policy_row(row)?);
    }
    Ok(policies)
}

/// Loads the ids of every policy an edition is related to.
pub(crate) fn load_related_policy_ids(
    conn: &Connection,
    edition_uuid: &str,
) -> RepoResult<Vec<PolicyId>> {
    let mut stmt = conn.prepare(
        "SELECT policy_uuid
         FROM edition_relations
         WHERE edition_uuid = ?1
         ORDER BY policy_uuid ASC;",
    )?;
    let mut rows = stmt.query([edition_uuid])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "edition_relations.policy_uuid")?);
    }
    Ok(ids)
}

pub(crate) fn load_policy_areas(conn: &Connection, edition_uuid: &str) -> RepoResult<Vec<PolicyArea>> {
    let mut stmt = conn.prepare(
        "SELECT pa.uuid, pa.name, pa.slug
         FROM edition_policy_areas epa
         INNER JOIN policy_areas pa ON pa.uuid = epa.policy_area_uuid
         WHERE epa.edition_uuid = ?1
         ORDER BY pa.name COLLATE NOCASE ASC, pa.uuid ASC;",
    )?;
    let mut rows = stmt.query([edition_uuid])?;
    let mut areas = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        areas.push(PolicyArea {
            id: parse_uuid(&uuid_text, "policy_areas.uuid")?,
            name: row.get("name")?,
            slug: row.get("slug")?,
        });
    }
    Ok(areas)
}

pub(crate) fn load_role_appointment(
    conn: &Connection,
    appointment_uuid: &str,
) -> RepoResult<Option<RoleAppointment>> {
    let mut stmt = conn.prepare(
        "SELECT
            ra.uuid AS appointment_uuid,
            p.uuid AS person_uuid,
            p.name AS person_name,
            r.uuid AS role_uuid,
            r.name AS role_name
         FROM role_appointments ra
         INNER JOIN people p ON p.uuid = ra.person_uuid
         INNER JOIN roles r ON r.uuid = ra.role_uuid
         WHERE ra.uuid = ?1;",
    )?;
    let mut rows = stmt.query([appointment_uuid])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let appointment_text: String = row.get("appointment_uuid")?;
    let person_text: String = row.get("person_uuid")?;
    let role_text: String = row.get("role_uuid")?;
    Ok(Some(RoleAppointment {
        id: parse_uuid(&appointment_text, "role_appointments.uuid")?,
        person: Person {
            id: parse_uuid(&person_text, "people.uuid")?,
            name: row.get("person_name")?,
        },
        role: Role {
            id: parse_uuid(&role_text, "roles.uuid")?,
            name: row.get("role_name")?,
        },
    }))
}

fn parse_policy_row(row: &Row<'_>) -> RepoResult<Policy> {
    let uuid_text: String = row.get("uuid")?;
    let state_text: String = row.get("state")?;
    let state = PublicationState::parse(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid state `{state_text}` in policies.state"))
    })?;
    Ok(Policy {
        id: parse_uuid(&uuid_text, "policies.uuid")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        state,
    })
}
