//! Platform data model.
//!
//! These are the boundary types the platform client delivers with each raw
//! event. The core only reads them; it never performs platform actions.
//!
//! Everything here is `serde`-friendly so events can be recorded and replayed
//! as JSON.

pub mod channel;
pub mod guild;
pub mod ids;
pub mod message;
pub mod user;

pub use channel::{Channel, DirectChannel, GuildChannel};
pub use guild::Guild;
pub use ids::{ChannelId, EmojiId, GuildId, MessageId, RoleId, Snowflake, UserId};
pub use message::{Emoji, Message, Reaction};
pub use user::{GuildMember, Role, User};
