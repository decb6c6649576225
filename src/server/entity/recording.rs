//! One voice message: stored audio plus the transform metadata the sender
//! chose and the recipient's read/favorite state.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "recordings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// None for anonymous senders, which is the normal case.
    pub sender_id: Option<i32>,
    pub recipient_id: i32,
    pub audio_file_path: String,
    pub audio_file_size: i64,
    pub duration_seconds: f64,
    /// Preset label, or `"custom"`.
    pub transformation_type: String,
    pub pitch_shift: f64,
    pub speed_rate: f64,
    pub is_read: bool,
    pub is_favorite: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
