//! Messaging source abstraction.
//!
//! Inbound events arrive through an [`UpdateSource`]; replies go out through a
//! [`Messenger`]. [`TelegramClient`] implements both against the Bot API.

mod telegram;
mod traits;
mod types;

pub use telegram::{BotUser, TelegramClient};
pub use traits::{Messenger, UpdateSource};
pub use types::{InboundEvent, MessagingError};
