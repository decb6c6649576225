//! sea-orm entities for the relational store: users, their sessions, and
//! the recordings in their inboxes.

pub mod recording;
pub mod session;
pub mod user;
