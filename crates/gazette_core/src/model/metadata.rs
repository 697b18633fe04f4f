//! Supporting metadata attached to editions when they are rendered.

use crate::model::edition::PublicationState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PolicyId = Uuid;
pub type PolicyAreaId = Uuid;
pub type PersonId = Uuid;
pub type RoleId = Uuid;
pub type RoleAppointmentId = Uuid;

/// Policy page an edition can be related to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub title: String,
    pub slug: String,
    pub state: PublicationState,
}

impl Policy {
    pub fn new(title: impl Into<String>, slug: impl Into<String>, state: PublicationState) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: slug.into(),
            state,
        }
    }
}

/// Topic grouping for news articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyArea {
    pub id: PolicyAreaId,
    pub name: String,
    pub slug: String,
}

impl PolicyArea {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// A person holding a role; speeches are delivered under an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAppointment {
    pub id: RoleAppointmentId,
    pub person: Person,
    pub role: Role,
}

impl RoleAppointment {
    pub fn new(person_name: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            person: Person {
                id: Uuid::new_v4(),
                name: person_name.into(),
            },
            role: Role {
                id: Uuid::new_v4(),
                name: role_name.into(),
            },
        }
    }
}
