pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};
use teloxide::utils::command::BotCommands;

/// Commands the bot answers, in matching precedence order.
#[derive(BotCommands, Debug, Clone, Copy, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Start the bot and create avatar")]
    Start,
    #[command(description = "Show this help message")]
    Help,
    #[command(description = "Learn about this bot")]
    About,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Start, Command::Help, Command::About];

    pub fn literal(self) -> &'static str {
        match self {
            Command::Start => "/start",
            Command::Help => "/help",
            Command::About => "/about",
        }
    }

    /// First command whose literal appears anywhere in `text` (case-sensitive).
    pub fn detect(text: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|c| text.contains(c.literal()))
    }
}

/// A message received from the chat platform, reduced to the fields the bot reads.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub user_id: Option<UserId>,
    pub first_name: Option<String>,
    pub text: Option<String>,
    /// Raw `web_app_data.data` string, if the message came from the web app.
    pub web_app_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        command: Command,
        chat_id: ChatId,
        first_name: Option<String>,
    },
    WebAppData {
        chat_id: ChatId,
        user_id: Option<UserId>,
        data: String,
    },
    Other,
}

impl IncomingMessage {
    /// Commands take precedence over web app data; anything else is ignored.
    pub fn classify(self) -> InboundEvent {
        if let Some(command) = self.text.as_deref().and_then(Command::detect) {
            return InboundEvent::Command {
                command,
                chat_id: self.chat_id,
                first_name: self.first_name,
            };
        }
        match self.web_app_data {
            Some(data) => InboundEvent::WebAppData {
                chat_id: self.chat_id,
                user_id: self.user_id,
                data,
            },
            None => InboundEvent::Other,
        }
    }
}

/// Outbound side of the chat platform. All sends target a single chat.
#[async_trait]
pub trait Messenger: Clone + Send + Sync + 'static {
    /// Plain text, no markup.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Text rendered with the platform's HTML markup.
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()>;

    /// Plain text with a single button that opens `url` in the web app container.
    async fn send_web_app_button(
        &self,
        chat_id: ChatId,
        text: &str,
        label: &str,
        url: &str,
    ) -> Result<()>;

    /// Ask the platform to fetch `url` and deliver it as a file attachment.
    async fn send_document_url(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<()>;
}
