// Adapters layer: concrete implementations of the domain ports.

pub mod mail;
pub mod messages;
pub mod sheets;

pub use mail::HttpRelayMailer;
pub use messages::{InMemoryMessageStore, JsonFileMessageStore};
pub use sheets::HttpSheetSource;
