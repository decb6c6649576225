//! SQLite-backed persistence for users, sessions, and recordings.
//!
//! All access goes through [`Store`]; handlers never touch the connection
//! directly. Schema creation is idempotent and runs at startup.

use chrono::{Duration, Utc};
use sea_orm::sea_query::Index;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Schema, Set,
};
use tracing::info;

use crate::server::auth::{generate_profile_link, generate_token, hash_password};
use crate::server::entity::{recording, session, user};

/// Where a listing request is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mailbox {
    /// Messages received.
    Inbox,
    /// Messages this user sent while logged in.
    Sent,
    /// Received messages flagged as favorites.
    Favorites,
}

/// A recording joined with the display name/email of the peer: the sender
/// for inbox views, the recipient for sent views. Anonymous senders have no
/// peer.
#[derive(Debug, Clone)]
pub struct RecordingEntry {
    pub recording: recording::Model,
    pub peer_name: Option<String>,
    pub peer_email: Option<String>,
}

/// Per-user counters for the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct UserStats {
    pub messages: u64,
    pub sent: u64,
    pub favorites: u64,
    pub unread: u64,
}

/// Fields for one new message.
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub sender_id: Option<i32>,
    pub recipient_id: i32,
    pub audio_file_path: String,
    pub audio_file_size: i64,
    pub duration_seconds: f64,
    pub transformation_type: String,
    pub pitch_shift: f64,
    pub speed_rate: f64,
}

/// Handle over the relational store.
#[derive(Debug, Clone)]
pub struct Store {
    db: DatabaseConnection,
    session_ttl_days: i64,
}

impl Store {
    /// Connects and creates tables/indexes if missing.
    pub async fn connect(database_url: &str, session_ttl_days: i64) -> Result<Self, DbErr> {
        let db = Database::connect(database_url).await?;
        let store = Self {
            db,
            session_ttl_days,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), DbErr> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let mut users = schema.create_table_from_entity(user::Entity);
        let mut sessions = schema.create_table_from_entity(session::Entity);
        let mut recordings = schema.create_table_from_entity(recording::Entity);
        for table in [&mut users, &mut sessions, &mut recordings] {
            table.if_not_exists();
        }
        self.db.execute(backend.build(&users)).await?;
        self.db.execute(backend.build(&sessions)).await?;
        self.db.execute(backend.build(&recordings)).await?;

        let recipient_idx = Index::create()
            .name("idx_recordings_recipient")
            .table(recording::Entity)
            .col(recording::Column::RecipientId)
            .if_not_exists()
            .to_owned();
        let sender_idx = Index::create()
            .name("idx_recordings_sender")
            .table(recording::Entity)
            .col(recording::Column::SenderId)
            .if_not_exists()
            .to_owned();
        self.db.execute(backend.build(&recipient_idx)).await?;
        self.db.execute(backend.build(&sender_idx)).await?;

        info!("database schema ready");
        Ok(())
    }

    // ----- users -----

    /// Registers a new account. `Ok(None)` means the email is taken.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Option<user::Model>, DbErr> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        // Regenerate on slug collision; the random suffix makes more than
        // a couple of attempts vanishingly unlikely.
        let profile_link = loop {
            let candidate = generate_profile_link(email);
            let taken = user::Entity::find()
                .filter(user::Column::ProfileLink.eq(candidate.clone()))
                .one(&self.db)
                .await?
                .is_some();
            if !taken {
                break candidate;
            }
        };

        let now = Utc::now();
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(hash_password(password)),
            full_name: Set(full_name.to_string()),
            profile_link: Set(profile_link),
            bio: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(Some(model.insert(&self.db).await?))
    }

    /// Checks credentials; `None` on unknown email or wrong password.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::PasswordHash.eq(hash_password(password)))
            .one(&self.db)
            .await
    }

    pub async fn user_by_id(&self, id: i32) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(id).one(&self.db).await
    }

    pub async fn user_by_profile_link(
        &self,
        profile_link: &str,
    ) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::ProfileLink.eq(profile_link))
            .one(&self.db)
            .await
    }

    // ----- sessions -----

    /// Creates a session for a user and returns its bearer token.
    pub async fn create_session(&self, user_id: i32) -> Result<String, DbErr> {
        let token = generate_token();
        let now = Utc::now();
        let model = session::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.clone()),
            expires_at: Set(now + Duration::days(self.session_ttl_days)),
            created_at: Set(now),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(token)
    }

    /// Resolves a token to a user id; expired or unknown tokens are `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<i32>, DbErr> {
        let found = session::Entity::find()
            .filter(session::Column::Token.eq(token))
            .filter(session::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await?;
        Ok(found.map(|s| s.user_id))
    }

    /// Drops a session (logout). Unknown tokens are a no-op.
    pub async fn delete_session(&self, token: &str) -> Result<(), DbErr> {
        session::Entity::delete_many()
            .filter(session::Column::Token.eq(token))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    // ----- recordings -----

    pub async fn save_recording(
        &self,
        new: NewRecording,
    ) -> Result<recording::Model, DbErr> {
        let model = recording::ActiveModel {
            sender_id: Set(new.sender_id),
            recipient_id: Set(new.recipient_id),
            audio_file_path: Set(new.audio_file_path),
            audio_file_size: Set(new.audio_file_size),
            duration_seconds: Set(new.duration_seconds),
            transformation_type: Set(new.transformation_type),
            pitch_shift: Set(new.pitch_shift),
            speed_rate: Set(new.speed_rate),
            is_read: Set(false),
            is_favorite: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(&self.db).await
    }

    /// Lists one mailbox, newest first, with peer names resolved.
    pub async fn list_recordings(
        &self,
        user_id: i32,
        mailbox: Mailbox,
    ) -> Result<Vec<RecordingEntry>, DbErr> {
        let query = match mailbox {
            Mailbox::Inbox => recording::Entity::find()
                .filter(recording::Column::RecipientId.eq(user_id)),
            Mailbox::Sent => recording::Entity::find()
                .filter(recording::Column::SenderId.eq(user_id)),
            Mailbox::Favorites => recording::Entity::find()
                .filter(recording::Column::RecipientId.eq(user_id))
                .filter(recording::Column::IsFavorite.eq(true)),
        };
        let rows = query
            .order_by_desc(recording::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let peer_id = match mailbox {
                Mailbox::Inbox | Mailbox::Favorites => row.sender_id,
                Mailbox::Sent => Some(row.recipient_id),
            };
            let peer = match peer_id {
                Some(id) => self.user_by_id(id).await?,
                None => None,
            };
            entries.push(RecordingEntry {
                recording: row,
                peer_name: peer.as_ref().map(|u| u.full_name.clone()),
                peer_email: peer.map(|u| u.email),
            });
        }
        Ok(entries)
    }

    /// Fetches a recording if `user_id` is its sender or recipient.
    pub async fn recording_for_playback(
        &self,
        recording_id: i32,
        user_id: i32,
    ) -> Result<Option<recording::Model>, DbErr> {
        let found = recording::Entity::find_by_id(recording_id)
            .one(&self.db)
            .await?;
        Ok(found.filter(|r| {
            r.recipient_id == user_id || r.sender_id == Some(user_id)
        }))
    }

    /// Marks a received recording read. Returns false when the recording
    /// does not exist or belongs to someone else.
    pub async fn mark_read(&self, recording_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let Some(found) = self.owned_by_recipient(recording_id, user_id).await? else {
            return Ok(false);
        };
        let mut active: recording::ActiveModel = found.into();
        active.is_read = Set(true);
        active.update(&self.db).await?;
        Ok(true)
    }

    /// Flips the favorite flag; returns the new value, or `None` when the
    /// recording is not the user's.
    pub async fn toggle_favorite(
        &self,
        recording_id: i32,
        user_id: i32,
    ) -> Result<Option<bool>, DbErr> {
        let Some(found) = self.owned_by_recipient(recording_id, user_id).await? else {
            return Ok(None);
        };
        let next = !found.is_favorite;
        let mut active: recording::ActiveModel = found.into();
        active.is_favorite = Set(next);
        active.update(&self.db).await?;
        Ok(Some(next))
    }

    /// Deletes a received recording and returns its audio path so the
    /// caller can remove the file too.
    pub async fn delete_recording(
        &self,
        recording_id: i32,
        user_id: i32,
    ) -> Result<Option<String>, DbErr> {
        let Some(found) = self.owned_by_recipient(recording_id, user_id).await? else {
            return Ok(None);
        };
        let path = found.audio_file_path.clone();
        recording::Entity::delete_by_id(found.id).exec(&self.db).await?;
        Ok(Some(path))
    }

    /// Message counters for the profile dashboard.
    pub async fn stats(&self, user_id: i32) -> Result<UserStats, DbErr> {
        let received = recording::Entity::find()
            .filter(recording::Column::RecipientId.eq(user_id));

        let messages = received.clone().count(&self.db).await?;
        let sent = recording::Entity::find()
            .filter(recording::Column::SenderId.eq(user_id))
            .count(&self.db)
            .await?;
        let favorites = received
            .clone()
            .filter(recording::Column::IsFavorite.eq(true))
            .count(&self.db)
            .await?;
        let unread = received
            .filter(recording::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;

        Ok(UserStats {
            messages,
            sent,
            favorites,
            unread,
        })
    }

    async fn owned_by_recipient(
        &self,
        recording_id: i32,
        user_id: i32,
    ) -> Result<Option<recording::Model>, DbErr> {
        let found = recording::Entity::find_by_id(recording_id)
            .one(&self.db)
            .await?;
        Ok(found.filter(|r| r.recipient_id == user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::connect("sqlite::memory:", 30).await.unwrap()
    }

    fn message_to(recipient_id: i32) -> NewRecording {
        NewRecording {
            sender_id: None,
            recipient_id,
            audio_file_path: "uploads/test.wav".to_string(),
            audio_file_size: 1_024,
            duration_seconds: 2.5,
            transformation_type: "deep-male".to_string(),
            pitch_shift: -4.0,
            speed_rate: 0.95,
        }
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_emails() {
        let store = memory_store().await;
        let first = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .create_user("jane@example.com", "other", "Jane Again")
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn authentication_checks_the_password() {
        let store = memory_store().await;
        store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap();

        assert!(store
            .authenticate("jane@example.com", "secret")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .authenticate("jane@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .authenticate("nobody@example.com", "secret")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn sessions_resolve_until_deleted() {
        let store = memory_store().await;
        let user = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap()
            .unwrap();

        let token = store.create_session(user.id).await.unwrap();
        assert_eq!(store.validate_session(&token).await.unwrap(), Some(user.id));

        store.delete_session(&token).await.unwrap();
        assert_eq!(store.validate_session(&token).await.unwrap(), None);
        assert_eq!(store.validate_session("bogus").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_sessions_do_not_validate() {
        let store = Store::connect("sqlite::memory:", -1).await.unwrap();
        let user = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap()
            .unwrap();
        let token = store.create_session(user.id).await.unwrap();
        assert_eq!(store.validate_session(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn mailboxes_filter_and_order() {
        let store = memory_store().await;
        let jane = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap()
            .unwrap();
        let sam = store
            .create_user("sam@example.com", "secret", "Sam Smith")
            .await
            .unwrap()
            .unwrap();

        store.save_recording(message_to(jane.id)).await.unwrap();
        let mut from_sam = message_to(jane.id);
        from_sam.sender_id = Some(sam.id);
        let second = store.save_recording(from_sam).await.unwrap();
        store.toggle_favorite(second.id, jane.id).await.unwrap();

        let inbox = store.list_recordings(jane.id, Mailbox::Inbox).await.unwrap();
        assert_eq!(inbox.len(), 2);

        let favorites = store
            .list_recordings(jane.id, Mailbox::Favorites)
            .await
            .unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].peer_name.as_deref(), Some("Sam Smith"));

        let sent = store.list_recordings(sam.id, Mailbox::Sent).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].peer_name.as_deref(), Some("Jane Doe"));

        let empty = store.list_recordings(sam.id, Mailbox::Inbox).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn read_favorite_delete_enforce_ownership() {
        let store = memory_store().await;
        let jane = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap()
            .unwrap();
        let sam = store
            .create_user("sam@example.com", "secret", "Sam Smith")
            .await
            .unwrap()
            .unwrap();

        let msg = store.save_recording(message_to(jane.id)).await.unwrap();

        assert!(!store.mark_read(msg.id, sam.id).await.unwrap());
        assert!(store.mark_read(msg.id, jane.id).await.unwrap());

        assert_eq!(store.toggle_favorite(msg.id, sam.id).await.unwrap(), None);
        assert_eq!(
            store.toggle_favorite(msg.id, jane.id).await.unwrap(),
            Some(true)
        );
        assert_eq!(
            store.toggle_favorite(msg.id, jane.id).await.unwrap(),
            Some(false)
        );

        assert_eq!(store.delete_recording(msg.id, sam.id).await.unwrap(), None);
        assert_eq!(
            store.delete_recording(msg.id, jane.id).await.unwrap(),
            Some("uploads/test.wav".to_string())
        );
        assert!(store
            .list_recordings(jane.id, Mailbox::Inbox)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn playback_access_covers_sender_and_recipient() {
        let store = memory_store().await;
        let jane = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap()
            .unwrap();
        let sam = store
            .create_user("sam@example.com", "secret", "Sam Smith")
            .await
            .unwrap()
            .unwrap();
        let eve = store
            .create_user("eve@example.com", "secret", "Eve")
            .await
            .unwrap()
            .unwrap();

        let mut msg = message_to(jane.id);
        msg.sender_id = Some(sam.id);
        let saved = store.save_recording(msg).await.unwrap();

        assert!(store
            .recording_for_playback(saved.id, jane.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .recording_for_playback(saved.id, sam.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .recording_for_playback(saved.id, eve.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn stats_count_all_four_buckets() {
        let store = memory_store().await;
        let jane = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap()
            .unwrap();
        let sam = store
            .create_user("sam@example.com", "secret", "Sam Smith")
            .await
            .unwrap()
            .unwrap();

        let first = store.save_recording(message_to(jane.id)).await.unwrap();
        store.save_recording(message_to(jane.id)).await.unwrap();
        let mut outgoing = message_to(sam.id);
        outgoing.sender_id = Some(jane.id);
        store.save_recording(outgoing).await.unwrap();

        store.mark_read(first.id, jane.id).await.unwrap();
        store.toggle_favorite(first.id, jane.id).await.unwrap();

        let stats = store.stats(jane.id).await.unwrap();
        assert_eq!(
            stats,
            UserStats {
                messages: 2,
                sent: 1,
                favorites: 1,
                unread: 1,
            }
        );
    }
}
