use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        extractors::AuthUser,
        handlers::validate_password,
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::ApiError,
    profile::{
        dto::{
            ChangePasswordRequest, MessageResponse, ProfileResponse, ProfileUpdate,
            UpdateResponse, UploadResponse,
        },
        repo::Profile,
    },
    state::AppState,
};

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024; // 5MB

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_my_profile))
        .route("/update", put(update_profile))
        .route("/change-password", put(change_password))
        .merge(
            Router::new()
                .route("/upload-picture", post(upload_picture))
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

/// Resolve the token subject to a user row; gone accounts get 404.
async fn current_user(state: &AppState, email: &str) -> Result<User, ApiError> {
    User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

#[instrument(skip(state))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = current_user(&state, &email).await?;
    let profile = Profile::get_or_create(&state.db, user.id).await?;

    // TODO: count saved designs once design storage lands; fixed at zero
    // until then.
    Ok(Json(ProfileResponse {
        id: profile.id,
        user_id: user.id,
        bio: profile.bio,
        phone: profile.phone,
        favorite_style: profile.favorite_style,
        profile_picture: profile.profile_picture,
        email: user.email,
        username: user.username,
        total_designs: 0,
        updated_at: profile.updated_at,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let user = current_user(&state, &email).await?;

    let stored = Profile::get_or_create(&state.db, user.id).await?;
    let merged = stored.merged_with(&payload);
    let profile = Profile::save_fields(
        &state.db,
        user.id,
        merged.bio.as_deref(),
        merged.phone.as_deref(),
        merged.favorite_style.as_deref(),
    )
    .await?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(UpdateResponse {
        message: "Profile updated successfully".into(),
        profile,
    }))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

/// Pull the `file` part out of a multipart body. A decode failure is its
/// own validation error, distinct from the part simply being absent.
async fn read_file_field(mp: &mut Multipart) -> Result<(String, bytes::Bytes), ApiError> {
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::Validation("file field is required".into())),
            Err(e) => {
                return Err(ApiError::Validation(format!("invalid multipart body: {e}")))
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("invalid multipart body: {e}")))?;
        return Ok((content_type, data));
    }
}

#[instrument(skip(state, mp))]
pub async fn upload_picture(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    mut mp: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let user = current_user(&state, &email).await?;

    let (content_type, data) = read_file_field(&mut mp).await?;
    let ext = ext_from_mime(&content_type).ok_or_else(|| {
        warn!(user_id = %user.id, content_type = %content_type, "rejected upload");
        ApiError::UnsupportedMedia(content_type.clone())
    })?;

    let key = format!(
        "profile_pictures/user_{}_{}.{}",
        user.id,
        OffsetDateTime::now_utc().unix_timestamp(),
        ext
    );
    let file_path = state.storage.put_object(&key, data, &content_type).await?;

    let profile = Profile::get_or_create(&state.db, user.id).await?;
    // Best effort; a missing old file is not worth surfacing.
    if let Some(old) = profile.profile_picture.as_deref() {
        if let Err(e) = state.storage.delete_object(old).await {
            debug!(error = %e, old, "could not remove previous picture");
        }
    }

    Profile::set_picture(&state.db, user.id, &key).await?;

    info!(user_id = %user.id, key = %key, "profile picture uploaded");
    Ok(Json(UploadResponse {
        message: "Profile picture uploaded successfully".into(),
        file_path,
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = current_user(&state, &email).await?;

    if !verify_password(&payload.old_password, &user.password_hash) {
        warn!(user_id = %user.id, "change-password with wrong old password");
        return Err(ApiError::Validation("Incorrect old password".into()));
    }
    validate_password(&payload.new_password)?;

    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".into(),
    }))
}
