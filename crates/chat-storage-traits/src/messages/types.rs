//! Types for the messages module

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::error::MessageError;
use crate::{MessageId, SafeEmail};

/// A message as stored inside a conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Message id
    pub id: MessageId,
    /// Wire tag of the [`MessageKind`]
    #[serde(rename = "type")]
    pub kind: String,
    /// Text, media URL or `"<longitude>,<latitude>"`
    pub content: String,
    /// Formatted send date
    pub date: String,
    /// Safe email of the sender
    pub sender_email: SafeEmail,
    /// Display name of the sender
    pub name: String,
    /// Whether the recipient has read the message
    pub is_read: bool,
}

/// The author of a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sender {
    /// Sender id (the sender's safe email)
    pub sender_id: String,
    /// Display name
    pub display_name: String,
    /// Avatar URL, empty when unknown
    pub photo_url: String,
}

/// A photo, video or audio attachment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Media {
    /// Download URL of the uploaded object
    pub url: String,
}

/// A shared location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// What a message carries.
///
/// Only [`MessageKind::Text`], [`MessageKind::Photo`], [`MessageKind::Video`] and
/// [`MessageKind::Location`] are produced by the client. The other kinds are
/// stored and read back verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    /// Plain text
    Text(String),
    /// Text with markup
    AttributedText(String),
    /// Photo attachment
    Photo(Media),
    /// Video attachment
    Video(Media),
    /// Shared location
    Location(Location),
    /// Emoji-only message
    Emoji(String),
    /// Audio attachment
    Audio(Media),
    /// Shared contact
    Contact(String),
    /// Link with preview
    LinkPreview(String),
    /// Application-defined payload
    Custom(String),
}

/// Wire tags of every [`MessageKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKindTag {
    /// `text`
    Text,
    /// `attributed_text`
    AttributedText,
    /// `photo`
    Photo,
    /// `video`
    Video,
    /// `location`
    Location,
    /// `emoji`
    Emoji,
    /// `audio`
    Audio,
    /// `contact`
    Contact,
    /// `link_preview`
    LinkPreview,
    /// `custom`
    Custom,
}

impl MessageKindTag {
    /// Get as `&str`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::AttributedText => "attributed_text",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Location => "location",
            Self::Emoji => "emoji",
            Self::Audio => "audio",
            Self::Contact => "contact",
            Self::LinkPreview => "link_preview",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for MessageKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageKindTag {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "attributed_text" => Ok(Self::AttributedText),
            "photo" => Ok(Self::Photo),
            "video" => Ok(Self::Video),
            "location" => Ok(Self::Location),
            "emoji" => Ok(Self::Emoji),
            "audio" => Ok(Self::Audio),
            "contact" => Ok(Self::Contact),
            "link_preview" => Ok(Self::LinkPreview),
            "custom" => Ok(Self::Custom),
            _ => Err(MessageError::InvalidParameters(format!(
                "Invalid message kind: {}",
                s
            ))),
        }
    }
}

impl MessageKind {
    /// Wire tag of this kind
    pub fn tag(&self) -> MessageKindTag {
        match self {
            Self::Text(_) => MessageKindTag::Text,
            Self::AttributedText(_) => MessageKindTag::AttributedText,
            Self::Photo(_) => MessageKindTag::Photo,
            Self::Video(_) => MessageKindTag::Video,
            Self::Location(_) => MessageKindTag::Location,
            Self::Emoji(_) => MessageKindTag::Emoji,
            Self::Audio(_) => MessageKindTag::Audio,
            Self::Contact(_) => MessageKindTag::Contact,
            Self::LinkPreview(_) => MessageKindTag::LinkPreview,
            Self::Custom(_) => MessageKindTag::Custom,
        }
    }

    /// The `content` field written to the thread
    pub fn content(&self) -> String {
        match self {
            Self::Text(text)
            | Self::AttributedText(text)
            | Self::Emoji(text)
            | Self::Contact(text)
            | Self::LinkPreview(text)
            | Self::Custom(text) => text.clone(),
            Self::Photo(media) | Self::Video(media) | Self::Audio(media) => media.url.clone(),
            Self::Location(location) => format!("{},{}", location.longitude, location.latitude),
        }
    }

    /// Rebuild a kind from its wire tag and content.
    ///
    /// Unknown tags are read as text.
    pub fn from_wire(tag: &str, content: &str) -> Result<Self, MessageError> {
        let Ok(tag) = MessageKindTag::from_str(tag) else {
            return Ok(Self::Text(content.to_string()));
        };
        let content = content.to_string();
        Ok(match tag {
            MessageKindTag::Text => Self::Text(content),
            MessageKindTag::AttributedText => Self::AttributedText(content),
            MessageKindTag::Photo => Self::Photo(Media { url: content }),
            MessageKindTag::Video => Self::Video(Media { url: content }),
            MessageKindTag::Location => Self::Location(parse_location(&content)?),
            MessageKindTag::Emoji => Self::Emoji(content),
            MessageKindTag::Audio => Self::Audio(Media { url: content }),
            MessageKindTag::Contact => Self::Contact(content),
            MessageKindTag::LinkPreview => Self::LinkPreview(content),
            MessageKindTag::Custom => Self::Custom(content),
        })
    }
}

fn parse_location(content: &str) -> Result<Location, MessageError> {
    let invalid = || MessageError::InvalidParameters(format!("Invalid location: {}", content));
    let (longitude, latitude) = content.split_once(',').ok_or_else(invalid)?;
    let longitude: f64 = longitude.trim().parse().map_err(|_| invalid())?;
    let latitude: f64 = latitude.trim().parse().map_err(|_| invalid())?;
    Ok(Location {
        latitude,
        longitude,
    })
}

/// A message as presented to the client
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The author
    pub sender: Sender,
    /// Message id
    pub message_id: MessageId,
    /// When the message was sent
    pub sent_date: DateTime<FixedOffset>,
    /// What the message carries
    pub kind: MessageKind,
}
