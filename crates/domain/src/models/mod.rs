//! Domain models for Family Hub.

pub mod calendar_item;
pub mod chat;
pub mod family;
pub mod message;
pub mod user;

pub use calendar_item::{
    CalendarItem, CalendarItemResponse, CreateCalendarItemRequest, ItemKind, LeaderboardEntry,
    ListCalendarItemsQuery, UpdateCalendarItemRequest,
};
pub use chat::{Chat, ChatKind, ChatSummary, CreateChatRequest};
pub use family::{
    generate_join_code, CreateFamilyRequest, Family, FamilyMember, FamilyResponse, FamilyRole,
    JoinFamilyRequest, LeaveFamilyRequest, SetDeputyRequest,
};
pub use message::{Message, MessageKind, MessageResponse, SendMessageRequest};
pub use user::{UpdateProfileRequest, User, UserResponse};
