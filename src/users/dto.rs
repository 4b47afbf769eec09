use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::users::repo_types::InsertResult;

/// Request body for user registration.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login. `id` may arrive as a number or, from forms and
/// clients echoing `insertId`, as a numeric string.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(deserialize_with = "user_id")]
    pub id: i64,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid user id: {s:?}"))),
    }
}

/// Insert metadata returned by register. 64-bit integers travel as strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(serialize_with = "as_string")]
    pub insert_id: i64,
    #[serde(serialize_with = "as_string")]
    pub affected_rows: u64,
}

impl From<InsertResult> for RegisterResponse {
    fn from(r: InsertResult) -> Self {
        Self {
            insert_id: r.insert_id,
            affected_rows: r.affected_rows,
        }
    }
}

fn as_string<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Returned after a successful login. Identity only.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_response_serializes_ids_as_strings() {
        let body = serde_json::to_value(RegisterResponse::from(InsertResult {
            insert_id: 9_007_199_254_740_993,
            affected_rows: 1,
        }))
        .unwrap();
        assert_eq!(body["insertId"], "9007199254740993");
        assert_eq!(body["affectedRows"], "1");
    }

    #[test]
    fn login_id_accepts_number_or_string() {
        let a: LoginRequest = serde_json::from_str(r#"{"id": 3, "password": "x"}"#).unwrap();
        let b: LoginRequest = serde_json::from_str(r#"{"id": " 3 ", "password": "x"}"#).unwrap();
        assert_eq!(a.id, 3);
        assert_eq!(b.id, 3);
        assert!(serde_json::from_str::<LoginRequest>(r#"{"id": "abc", "password": "x"}"#).is_err());
    }

    #[test]
    fn debug_output_redacts_password() {
        let req = RegisterRequest {
            email: "a@b.com".into(),
            password: "secret".into(),
        };
        let out = format!("{req:?}");
        assert!(out.contains("a@b.com"));
        assert!(!out.contains("secret"));
    }
}
