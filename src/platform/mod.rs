pub mod telegram;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

/// An update received from the messaging platform
#[derive(Debug, Clone)]
pub enum IncomingEvent {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

/// A text message (non-text messages arrive with empty text)
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Chat the reply goes to; doubles as the user key
    pub chat_id: i64,
    /// Display name of the sender, for logs
    pub user_name: Option<String>,
    pub text: String,
}

/// A button press on an inline keyboard
#[derive(Debug, Clone)]
pub struct IncomingCallback {
    pub chat_id: i64,
    /// Token used to acknowledge the press
    pub callback_id: String,
    /// Opaque action key attached to the button
    pub data: String,
}

/// One inline button carrying an action key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard as rows of buttons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }
}

/// Entry of the platform's command menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCommand {
    pub name: String,
    pub description: String,
}

/// Outbound side of the platform. Text and captions use Markdown emphasis.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()>;

    async fn send_photo(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()>;

    /// Clear the client's pending indicator for a button press
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;

    async fn set_commands(&self, commands: &[MenuCommand]) -> Result<()>;
}
