use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::{SendDocumentSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode, WebAppInfo,
};

use crate::platform::{IncomingMessage, Messenger};

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        let user = msg.from.as_ref();
        Self {
            chat_id: msg.chat.id,
            user_id: user.map(|u| u.id),
            first_name: user
                .map(|u| u.first_name.clone())
                .filter(|name| !name.is_empty()),
            text: msg.text().map(str::to_string),
            web_app_data: msg.web_app_data().map(|d| d.data.clone()),
        }
    }
}

fn parse_url(url: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(url).with_context(|| format!("Invalid URL: {}", url))
}

#[async_trait]
impl Messenger for Bot {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_message(chat_id, text)
            .await
            .context("Failed to send message")?;
        Ok(())
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.send_message(chat_id, html)
            .parse_mode(ParseMode::Html)
            .await
            .context("Failed to send formatted message")?;
        Ok(())
    }

    async fn send_web_app_button(
        &self,
        chat_id: ChatId,
        text: &str,
        label: &str,
        url: &str,
    ) -> Result<()> {
        let button = InlineKeyboardButton::web_app(
            label,
            WebAppInfo {
                url: parse_url(url)?,
            },
        );
        self.send_message(chat_id, text)
            .reply_markup(InlineKeyboardMarkup::new([[button]]))
            .await
            .context("Failed to send web app button")?;
        Ok(())
    }

    async fn send_document_url(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<()> {
        self.send_document(chat_id, InputFile::url(parse_url(url)?))
            .caption(caption)
            .await
            .context("Failed to send document")?;
        Ok(())
    }
}
