//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod calendar_item;
pub mod chat;
pub mod family;
pub mod message;
pub mod session;
pub mod user;

pub use calendar_item::{CalendarItemEntity, ItemKindDb};
pub use chat::{ChatEntity, ChatKindDb, ChatWithUnreadEntity};
pub use family::FamilyEntity;
pub use message::{MessageEntity, MessageKindDb};
pub use session::SessionEntity;
pub use user::UserEntity;
