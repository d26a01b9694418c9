//! Repository implementations for database operations.

pub mod calendar_item;
pub mod chat;
pub mod family;
pub mod message;
pub mod session;
pub mod user;

pub use calendar_item::{CalendarItemRepository, NewCalendarItem};
pub use chat::ChatRepository;
pub use family::FamilyRepository;
pub use message::MessageRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
