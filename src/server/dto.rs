//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

use crate::server::entity::user;
use crate::server::store::{RecordingEntry, UserStats};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A new message: base64-encoded audio plus the transform settings the
/// sender picked. Defaults match the untransformed voice.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub recipient_profile: String,
    /// Base64-encoded WAV bytes.
    pub audio_data: String,
    #[serde(default = "default_transformation")]
    pub transformation_type: String,
    #[serde(default)]
    pub pitch_shift: f64,
    #[serde(default = "default_speed")]
    pub speed_rate: f64,
    /// Playback length in seconds, as measured client-side.
    #[serde(default)]
    pub duration: f64,
}

fn default_transformation() -> String {
    "original".to_string()
}

fn default_speed() -> f64 {
    1.0
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: user::Model,
    pub token: String,
}

/// The public face of a profile link: no email, no id.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub full_name: String,
    pub bio: String,
    pub profile_link: String,
}

impl From<user::Model> for PublicProfile {
    fn from(user: user::Model) -> Self {
        Self {
            full_name: user.full_name,
            bio: user.bio,
            profile_link: user.profile_link,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordingView {
    pub id: i32,
    pub duration_seconds: f64,
    pub transformation_type: String,
    pub pitch_shift: f64,
    pub speed_rate: f64,
    pub is_read: bool,
    pub is_favorite: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Display name of the other party; `None` for anonymous senders.
    pub peer_name: Option<String>,
    pub peer_email: Option<String>,
}

impl From<RecordingEntry> for RecordingView {
    fn from(entry: RecordingEntry) -> Self {
        let r = entry.recording;
        Self {
            id: r.id,
            duration_seconds: r.duration_seconds,
            transformation_type: r.transformation_type,
            pitch_shift: r.pitch_shift,
            speed_rate: r.speed_rate,
            is_read: r.is_read,
            is_favorite: r.is_favorite,
            created_at: r.created_at,
            peer_name: entry.peer_name,
            peer_email: entry.peer_email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordingListResponse {
    pub recordings: Vec<RecordingView>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: i32,
    pub recipient_profile: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub is_favorite: bool,
}
