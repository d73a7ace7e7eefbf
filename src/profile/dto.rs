use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profile::repo::Profile;

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub favorite_style: Option<String>,
}

/// Profile fields plus the denormalized account identity.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub favorite_style: Option<String>,
    pub profile_picture: Option<String>,
    pub email: String,
    pub username: String,
    pub total_designs: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_path: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_leaves_absent_fields_none() {
        let update: ProfileUpdate = serde_json::from_str(r#"{"bio":"hello"}"#).unwrap();
        assert_eq!(update.bio.as_deref(), Some("hello"));
        assert!(update.phone.is_none());
        assert!(update.favorite_style.is_none());
    }

    #[test]
    fn empty_update_deserializes() {
        let update: ProfileUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.bio.is_none());
        assert!(update.phone.is_none());
        assert!(update.favorite_style.is_none());
    }

    #[test]
    fn profile_response_serializes_identity_fields() {
        let response = ProfileResponse {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            bio: Some("interiors person".into()),
            phone: None,
            favorite_style: Some("scandinavian".into()),
            profile_picture: None,
            email: "test@example.com".into(),
            username: "tester".into(),
            total_designs: 0,
            updated_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("scandinavian"));
        assert!(json.contains("total_designs"));
    }
}
