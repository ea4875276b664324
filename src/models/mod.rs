pub mod activity;
pub mod assignment;
pub mod availability;
pub mod conversation;
pub mod message;
pub mod profile;
pub mod user;

pub use activity::ActivityEntry;
pub use assignment::Assignment;
pub use availability::Slot;
pub use conversation::Conversation;
pub use message::Message;
pub use profile::ProfileExtension;
pub use user::User;
