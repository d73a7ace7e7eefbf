use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_serializes_public_fields() {
        let response = AuthResponse {
            access_token: "tok".into(),
            token_type: "bearer".into(),
            user: PublicUser {
                id: Uuid::new_v4(),
                email: "test@example.com".into(),
                username: "tester".into(),
                created_at: OffsetDateTime::now_utc(),
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("access_token"));
        assert!(json.contains("bearer"));
        assert!(json.contains("test@example.com"));
        assert!(json.contains("tester"));
    }

    #[test]
    fn register_request_deserializes() {
        let payload: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.c","username":"abc","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(payload.email, "a@b.c");
        assert_eq!(payload.username, "abc");
        assert_eq!(payload.password, "secret1");
    }
}
