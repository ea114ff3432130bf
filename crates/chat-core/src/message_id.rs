//! Message ids and message dates.
//!
//! A message id is `"<other user>_<current user>_<send date>"`: both users by
//! safe email, the date in [`MESSAGE_DATE_FORMAT`]. The id of a conversation is
//! derived from the id of its first message, see
//! [`ConversationId::from_first_message`](chat_storage_traits::ConversationId::from_first_message).
//!
//! Ids are only distinct at second granularity: two messages to the same user
//! sent within the same second get the same id.

use chat_storage_traits::{MessageId, SafeEmail};
use chrono::{DateTime, FixedOffset};

use crate::error::Error;

/// Separator between the parts of a message id
pub const MESSAGE_ID_SEPARATOR: char = '_';

/// Medium date, long time: `Oct 19, 2026 at 3:04:05 PM +02:00`
pub const MESSAGE_DATE_FORMAT: &str = "%b %-d, %Y at %-I:%M:%S %p %:z";

/// Build the id of a message from `current_user_email` to `other_user_email`
/// sent at `now`.
pub fn new_message_id(
    other_user_email: &SafeEmail,
    current_user_email: &SafeEmail,
    now: &DateTime<FixedOffset>,
) -> MessageId {
    let id = format!(
        "{other_user_email}{MESSAGE_ID_SEPARATOR}{current_user_email}{MESSAGE_ID_SEPARATOR}{}",
        message_date_string(now)
    );
    tracing::debug!(message_id = %id, "created message id");
    MessageId::new(id)
}

/// Format a send date the way it is stored with messages
pub fn message_date_string(date: &DateTime<FixedOffset>) -> String {
    date.format(MESSAGE_DATE_FORMAT).to_string()
}

/// Parse a date written by [`message_date_string`]
pub fn parse_message_date(date: &str) -> Result<DateTime<FixedOffset>, Error> {
    Ok(DateTime::parse_from_str(date, MESSAGE_DATE_FORMAT)?)
}
