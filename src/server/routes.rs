//! HTTP handlers for the JSON API.
//!
//! Audio arrives already rendered by the client; the server validates the
//! container, clamps the recorded transform settings into their UI ranges,
//! and files the bytes under the uploads directory.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use tracing::info;

use crate::presets::TransformParams;
use crate::server::AppState;
use crate::server::auth::{AuthUser, bearer_token};
use crate::server::dto::{
    AuthResponse, FavoriteResponse, LoginRequest, PublicProfile, RecordingListResponse,
    RecordingView, SignupRequest, StatsResponse, UploadRequest, UploadResponse,
};
use crate::server::error::ApiError;
use crate::server::store::{Mailbox, NewRecording};
use crate::wav;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = req.email.trim().to_ascii_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".into()));
    }
    if req.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    let full_name = req.full_name.trim();
    if full_name.is_empty() {
        return Err(ApiError::Validation("Full name is required".into()));
    }

    let user = state
        .store
        .create_user(&email, &req.password, full_name)
        .await?
        .ok_or(ApiError::EmailTaken)?;
    let token = state.store.create_session(user.id).await?;
    info!(user_id = user.id, "account created");

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = req.email.trim().to_ascii_lowercase();
    let user = state
        .store
        .authenticate(&email, &req.password)
        .await?
        .ok_or(ApiError::BadCredentials)?;
    let token = state.store.create_session(user.id).await?;
    Ok(Json(AuthResponse { user, token }))
}

pub async fn logout(
    State(state): State<AppState>,
    parts: axum::http::request::Parts,
) -> Result<StatusCode, ApiError> {
    if let Some(token) = bearer_token(&parts) {
        state.store.delete_session(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<crate::server::entity::user::Model>, ApiError> {
    let user = state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(user))
}

/// Public lookup by profile link; anyone with the link may see it.
pub async fn profile(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<PublicProfile>, ApiError> {
    let user = state
        .store
        .user_by_profile_link(&link)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;
    Ok(Json(PublicProfile::from(user)))
}

/// Accepts a message for a recipient's public profile link. No login is
/// required to send, only to listen.
pub async fn upload(
    State(state): State<AppState>,
    parts: axum::http::request::Parts,
    Json(req): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let recipient = state
        .store
        .user_by_profile_link(&req.recipient_profile)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipient not found".into()))?;

    // A logged-in sender gets attributed; anonymous uploads are fine.
    let sender_id = match bearer_token(&parts) {
        Some(token) => state.store.validate_session(token).await?,
        None => None,
    };

    let bytes = STANDARD
        .decode(req.audio_data.as_bytes())
        .map_err(|_| ApiError::Validation("audio_data is not valid base64".into()))?;
    if bytes.len() > state.config.policy.max_upload_bytes {
        return Err(ApiError::Validation("Audio upload is too large".into()));
    }
    let header = wav::parse_header(&bytes)?;

    let params = TransformParams::new(req.pitch_shift, req.speed_rate).clamped();

    let filename = format!(
        "recording_{}_{}.wav",
        recipient.id,
        Utc::now().timestamp_millis()
    );
    let path = state.config.storage.uploads_dir.join(&filename);
    tokio::fs::create_dir_all(&state.config.storage.uploads_dir).await?;
    tokio::fs::write(&path, &bytes).await?;

    let duration = if req.duration > 0.0 {
        req.duration
    } else {
        let bytes_per_frame =
            usize::from(header.channels) * usize::from(header.bits_per_sample / 8);
        (header.data_size / bytes_per_frame.max(1)) as f64 / f64::from(header.sample_rate)
    };

    let saved = state
        .store
        .save_recording(NewRecording {
            sender_id,
            recipient_id: recipient.id,
            audio_file_path: path.to_string_lossy().into_owned(),
            audio_file_size: bytes.len() as i64,
            duration_seconds: duration,
            transformation_type: params.label().to_string(),
            pitch_shift: params.pitch_semitones,
            speed_rate: params.speed_factor,
        })
        .await?;
    info!(recording_id = saved.id, recipient_id = recipient.id, "message stored");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: saved.id,
            recipient_profile: recipient.profile_link,
        }),
    ))
}

pub async fn inbox(
    state: State<AppState>,
    auth: AuthUser,
) -> Result<Json<RecordingListResponse>, ApiError> {
    list(state, auth, Mailbox::Inbox).await
}

pub async fn sent(
    state: State<AppState>,
    auth: AuthUser,
) -> Result<Json<RecordingListResponse>, ApiError> {
    list(state, auth, Mailbox::Sent).await
}

pub async fn favorites(
    state: State<AppState>,
    auth: AuthUser,
) -> Result<Json<RecordingListResponse>, ApiError> {
    list(state, auth, Mailbox::Favorites).await
}

async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mailbox: Mailbox,
) -> Result<Json<RecordingListResponse>, ApiError> {
    let entries = state.store.list_recordings(user_id, mailbox).await?;
    Ok(Json(RecordingListResponse {
        recordings: entries.into_iter().map(RecordingView::from).collect(),
    }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store.mark_read(id, user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Recording not found".into()))
    }
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let is_favorite = state
        .store
        .toggle_favorite(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recording not found".into()))?;
    Ok(Json(FavoriteResponse { is_favorite }))
}

pub async fn delete_recording(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let path = state
        .store
        .delete_recording(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recording not found".into()))?;
    // The row is already gone; a missing file is not worth failing over.
    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!(%path, %err, "could not remove audio file");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Streams the stored WAV bytes back to the sender or recipient.
pub async fn audio(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let recording = state
        .store
        .recording_for_playback(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recording not found".into()))?;
    let bytes = tokio::fs::read(&recording.audio_file_path).await?;
    Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response())
}

pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store.stats(user_id).await?;
    Ok(Json(StatsResponse { stats }))
}
