//! Outbound chat delivery for Herald.
//!
//! Composed notifications are queued on a bounded [`OutboundQueue`] and drained
//! by an [`OutboundDispatcher`] into a [`MessageSink`], normally the Telegram
//! Bot API client. A [`MuteGate`] lets operators silence notifications from the
//! chat through the `/mute` command family.

pub mod delivery_commands;
pub mod delivery_dispatcher;
pub mod delivery_i18n;
pub mod delivery_message;
pub mod delivery_mute;
pub mod delivery_telegram;

pub use delivery_commands::*;
pub use delivery_dispatcher::*;
pub use delivery_i18n::*;
pub use delivery_message::*;
pub use delivery_mute::*;
pub use delivery_telegram::*;
