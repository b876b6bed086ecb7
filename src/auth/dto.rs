use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::User;

/// Request body for account creation.
///
/// Fields default to empty strings so a missing field is reported as a
/// validation failure instead of a body-rejection.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Request body for token issuance.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public part of the user returned to the client. The password hash and
/// the active/staff flags never leave the server.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_out_never_contains_password_fields() {
        let out = UserOut {
            id: Uuid::new_v4(),
            email: "cook@example.com".to_string(),
            name: "Cook".to_string(),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("cook@example.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
    }

    #[test]
    fn token_response_has_token_field() {
        let json = serde_json::to_string(&TokenResponse {
            token: "abc123".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"token":"abc123"}"#);
    }

    #[test]
    fn missing_fields_deserialize_to_empty_strings() {
        let req: TokenRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_empty());
        assert!(req.password.is_empty());
    }
}
