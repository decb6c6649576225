//! A registered account that can receive voice messages.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    /// SHA-256 hex digest; never serialized to API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    /// The shareable public link slug, e.g. `jane-1a2b3c4d`.
    #[sea_orm(unique)]
    pub profile_link: String,
    pub bio: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
