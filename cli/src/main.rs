use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use chat_core::message_id::message_date_string;
use chat_core::prelude::*;
use chat_memory_storage::{ChatMemoryStorage, DEFAULT_MEDIA_BASE_URL, MemoryObjectStorage};
use chat_storage_traits::messages::types::{Location, Message, MessageKind};
use chat_storage_traits::users::types::User;
use clap::{Parser, Subcommand};
use serde_json::json;

/// Backend snapshot inside the state dir
const STATE_FILE: &str = "state.json";
/// Session inside the state dir
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Parser)]
#[command(name = "chatctl")]
#[command(about = "Chat client CLI over a local in-memory backend")]
struct Cli {
    /// State directory (backend snapshot, session and config persist here between runs)
    #[arg(long, env = "CHATCTL_STATE_DIR", default_value = ".chatctl")]
    state_dir: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a user and sign in as that user
    SignUp {
        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Profile picture to upload
        #[arg(long)]
        picture: Option<PathBuf>,
    },

    /// Sign in as an existing user
    SignIn {
        /// Email address
        #[arg(long)]
        email: String,
    },

    /// Sign out
    SignOut,

    /// Show the signed in user
    Whoami,

    /// Search users by name prefix
    Search {
        /// Name prefix
        query: String,
    },

    /// List the signed in user's conversations
    Conversations,

    /// Send a text message, starting a conversation if needed
    Send {
        /// Recipient email address
        #[arg(long)]
        to: String,

        /// Conversation id (defaults to the existing conversation with the recipient)
        #[arg(long)]
        conversation: Option<String>,

        /// Message text
        #[arg(long)]
        text: String,
    },

    /// Upload a photo and send it
    SendPhoto {
        /// Recipient email address
        #[arg(long)]
        to: String,

        /// Conversation id (defaults to the existing conversation with the recipient)
        #[arg(long)]
        conversation: Option<String>,

        /// Image file
        #[arg(long)]
        file: PathBuf,
    },

    /// Upload a video and send it
    SendVideo {
        /// Recipient email address
        #[arg(long)]
        to: String,

        /// Conversation id (defaults to the existing conversation with the recipient)
        #[arg(long)]
        conversation: Option<String>,

        /// Video file
        #[arg(long)]
        file: PathBuf,
    },

    /// Send a location
    SendLocation {
        /// Recipient email address
        #[arg(long)]
        to: String,

        /// Conversation id (defaults to the existing conversation with the recipient)
        #[arg(long)]
        conversation: Option<String>,

        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Show the messages of a conversation
    Messages {
        /// Conversation id
        #[arg(long)]
        conversation: String,

        /// Max messages to return (newest last)
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chat_core::logging::init_logging_with_default("warn");

    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.state_dir)
        .with_context(|| format!("create state dir {}", cli.state_dir.display()))?;

    let client = open(&cli.state_dir)?;
    let output = run(&client, &cli.cmd).await?;
    save(&cli.state_dir, &client)?;
    print(output)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

type LocalClient = ChatClient<ChatMemoryStorage>;

fn open(state_dir: &Path) -> anyhow::Result<LocalClient> {
    let config = load_config(state_dir);
    let storage = ChatMemoryStorage::load_from_path(state_dir.join(STATE_FILE))
        .context("load backend state")?;
    let base_url = config
        .media_base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_MEDIA_BASE_URL.to_string());
    let session = Session::load(state_dir.join(SESSION_FILE)).context("load session")?;
    tracing::debug!(
        state_dir = %state_dir.display(),
        signed_in = session.is_signed_in(),
        "opened local state"
    );

    Ok(ChatClient::builder(
        Arc::new(storage),
        Arc::new(MemoryObjectStorage::new(base_url)),
    )
    .with_config(config)
    .with_session(session)
    .build())
}

fn save(state_dir: &Path, client: &LocalClient) -> anyhow::Result<()> {
    client
        .storage()
        .save_to_path(state_dir.join(STATE_FILE))
        .context("save backend state")?;
    client
        .session()
        .save(state_dir.join(SESSION_FILE))
        .context("save session")?;
    tracing::debug!(state_dir = %state_dir.display(), "saved local state");
    Ok(())
}

fn print(v: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&v).context("json encode")?);
    Ok(())
}

fn message_json(message: &Message) -> serde_json::Value {
    json!({
        "id": message.message_id,
        "sender": message.sender.sender_id,
        "name": message.sender.display_name,
        "date": message_date_string(&message.sent_date),
        "type": message.kind.tag().as_str(),
        "content": message.kind.content(),
    })
}

fn sent_json(sent: &SentMessage) -> serde_json::Value {
    json!({
        "conversation_id": sent.conversation_id,
        "message": message_json(&sent.message),
    })
}

/// Recipient key, display name and conversation for a send command
async fn resolve_recipient(
    client: &LocalClient,
    to: &str,
    conversation: Option<&str>,
) -> anyhow::Result<(SafeEmail, String, Option<ConversationId>)> {
    let other = SafeEmail::normalize(to);
    let name = client
        .list_users()
        .await
        .context("list users")?
        .into_iter()
        .find(|entry| entry.email == other)
        .map(|entry| entry.name)
        .ok_or_else(|| anyhow!("no such user: {to}"))?;
    let conversation = match conversation {
        Some(id) => Some(ConversationId::new(id)),
        None => client
            .conversation_exists(&other)
            .await
            .context("look up existing conversation")?,
    };
    Ok((other, name, conversation))
}

// ── Commands ────────────────────────────────────────────────────────────────

async fn run(client: &LocalClient, cmd: &Command) -> anyhow::Result<serde_json::Value> {
    match cmd {
        Command::SignUp {
            first_name,
            last_name,
            email,
            picture,
        } => cmd_sign_up(client, first_name, last_name, email, picture.as_deref()).await,
        Command::SignIn { email } => {
            client
                .sign_in(email)
                .await
                .with_context(|| format!("sign in as {email}"))?;
            Ok(whoami(client))
        }
        Command::SignOut => {
            client.sign_out();
            Ok(json!({ "signed_in": false }))
        }
        Command::Whoami => Ok(whoami(client)),
        Command::Search { query } => {
            let results = client.search_users(query).await.context("search users")?;
            Ok(json!({ "users": results }))
        }
        Command::Conversations => {
            let conversations = client
                .get_all_conversations()
                .await
                .context("list conversations")?;
            Ok(json!({ "conversations": conversations }))
        }
        Command::Send {
            to,
            conversation,
            text,
        } => {
            let (other, name, conversation) =
                resolve_recipient(client, to, conversation.as_deref()).await?;
            let sent = client
                .send(
                    conversation.as_ref(),
                    &other,
                    &name,
                    MessageKind::Text(text.clone()),
                )
                .await
                .context("send message")?;
            Ok(sent_json(&sent))
        }
        Command::SendPhoto {
            to,
            conversation,
            file,
        } => {
            let (other, name, conversation) =
                resolve_recipient(client, to, conversation.as_deref()).await?;
            let bytes = tokio::fs::read(file)
                .await
                .with_context(|| format!("read {}", file.display()))?;
            let sent = client
                .send_photo(conversation.as_ref(), &other, &name, bytes)
                .await
                .context("send photo")?;
            Ok(sent_json(&sent))
        }
        Command::SendVideo {
            to,
            conversation,
            file,
        } => {
            let (other, name, conversation) =
                resolve_recipient(client, to, conversation.as_deref()).await?;
            let sent = client
                .send_video(conversation.as_ref(), &other, &name, file)
                .await
                .context("send video")?;
            Ok(sent_json(&sent))
        }
        Command::SendLocation {
            to,
            conversation,
            latitude,
            longitude,
        } => {
            let (other, name, conversation) =
                resolve_recipient(client, to, conversation.as_deref()).await?;
            let location = Location {
                latitude: *latitude,
                longitude: *longitude,
            };
            let sent = client
                .send_location(conversation.as_ref(), &other, &name, location)
                .await
                .context("send location")?;
            Ok(sent_json(&sent))
        }
        Command::Messages {
            conversation,
            limit,
        } => {
            let messages = client
                .get_all_messages(&ConversationId::new(conversation.as_str()))
                .await
                .with_context(|| format!("read conversation {conversation}"))?;
            let skip = messages.len().saturating_sub(*limit);
            let out: Vec<serde_json::Value> = messages.iter().skip(skip).map(message_json).collect();
            Ok(json!({ "messages": out }))
        }
    }
}

async fn cmd_sign_up(
    client: &LocalClient,
    first_name: &str,
    last_name: &str,
    email: &str,
    picture: Option<&Path>,
) -> anyhow::Result<serde_json::Value> {
    let user = User::new(first_name, last_name, email);
    client
        .sign_up(&user)
        .await
        .with_context(|| format!("sign up {email}"))?;

    let mut out = whoami(client);
    if let Some(picture) = picture {
        let bytes = tokio::fs::read(picture)
            .await
            .with_context(|| format!("read {}", picture.display()))?;
        let url = client
            .upload_profile_picture(bytes)
            .await
            .context("upload profile picture")?;
        out["profile_picture_url"] = json!(url);
    }
    Ok(out)
}

fn whoami(client: &LocalClient) -> serde_json::Value {
    let session = client.session();
    json!({
        "signed_in": session.is_signed_in(),
        "email": session.email(),
        "safe_email": session.safe_email(),
        "name": session.name(),
    })
}
