//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::{Email, Role, UserId};

/// A registered user account.
///
/// The password hash is deliberately not part of this struct; it is only
/// handled inside the auth service and user repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
