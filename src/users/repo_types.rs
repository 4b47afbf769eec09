use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Public view of a user row. The password column is never selected into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Login lookup row. Deliberately not `Serialize`.
#[derive(Clone, FromRow)]
pub struct Credentials {
    pub id: i64,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String, // Argon2 PHC string
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Driver metadata for an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    pub insert_id: i64,
    pub affected_rows: u64,
}
