pub mod aggregate;
pub mod broadcast;
pub mod resolve;
pub mod snapshot;

pub use crate::domain::model::{Snapshot, TargetSelector};
pub use crate::domain::ports::{Mailer, MessageStore, SheetSource};
