use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::payload::AvatarPayload;
use crate::platform::{Command, InboundEvent, IncomingMessage, Messenger};
use crate::replies;

/// What a dispatch left running after the primary reply was sent.
#[derive(Debug, Default)]
pub struct Dispatched {
    /// Detached best-effort document send. Its failure is only logged;
    /// dropping the handle does not cancel it.
    pub attachment: Option<JoinHandle<()>>,
}

/// Route one classified event to its reply.
pub async fn dispatch<M: Messenger>(
    messenger: &M,
    config: &Config,
    event: InboundEvent,
) -> Result<Dispatched> {
    match event {
        InboundEvent::Command {
            command,
            chat_id,
            first_name,
        } => {
            info!("Command {} in chat {}", command.literal(), chat_id.0);
            match command {
                Command::Start => {
                    messenger
                        .send_web_app_button(
                            chat_id,
                            &replies::welcome(first_name.as_deref()),
                            replies::LAUNCH_BUTTON_LABEL,
                            &config.web_app_url,
                        )
                        .await?
                }
                Command::Help => messenger.send_html(chat_id, replies::HELP).await?,
                Command::About => messenger.send_html(chat_id, replies::ABOUT).await?,
            }
            Ok(Dispatched::default())
        }
        InboundEvent::WebAppData {
            chat_id,
            user_id,
            data,
        } => {
            let payload = match AvatarPayload::parse(&data) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Error parsing web app data from chat {}: {}", chat_id.0, e);
                    messenger.send_text(chat_id, replies::PAYLOAD_ERROR).await?;
                    return Ok(Dispatched::default());
                }
            };

            match user_id {
                Some(user_id) => info!(
                    "Received avatar URL from user {}: {}",
                    user_id.0, payload.avatar_url
                ),
                None => info!(
                    "Received avatar URL in chat {}: {}",
                    chat_id.0, payload.avatar_url
                ),
            }

            let confirmation = messenger
                .send_html(chat_id, &replies::avatar_ready(&payload.avatar_url))
                .await;
            let attachment = spawn_attachment(messenger.clone(), chat_id, payload.avatar_url);
            confirmation?;

            Ok(Dispatched {
                attachment: Some(attachment),
            })
        }
        InboundEvent::Other => Ok(Dispatched::default()),
    }
}

/// Telegram may refuse to fetch or preview the model, so this never reaches the user.
fn spawn_attachment<M: Messenger>(messenger: M, chat_id: ChatId, url: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = messenger
            .send_document_url(chat_id, &url, replies::DOCUMENT_CAPTION)
            .await
        {
            warn!("Could not send avatar model as document: {:#}", e);
        }
    })
}

/// Start the Telegram bot and poll until Ctrl-C.
pub async fn run(config: Arc<Config>) -> Result<()> {
    let bot = Bot::new(&config.bot_token);

    match bot.get_me().await {
        Ok(me) => info!("Authorized as @{}", me.username()),
        Err(e) => warn!("Could not fetch bot info: {}", e),
    }

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register command menu: {}", e);
    }

    info!("Starting Telegram bot...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![config])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("bot"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, config: Arc<Config>) -> ResponseResult<()> {
    let event = IncomingMessage::from(&msg).classify();
    if event == InboundEvent::Other {
        return Ok(());
    }

    if let Err(e) = dispatch(&bot, &config, event).await {
        error!("Failed to reply in chat {}: {:#}", msg.chat.id.0, e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use teloxide::types::UserId;

    use crate::config::RawConfig;

    const WEB_APP_URL: &str = "https://example.github.io/app";

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Text(ChatId, String),
        Html(ChatId, String),
        Button {
            chat_id: ChatId,
            text: String,
            label: String,
            url: String,
        },
        Document {
            chat_id: ChatId,
            url: String,
            caption: String,
        },
    }

    /// Records every send; optionally fails document sends.
    #[derive(Clone, Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<Sent>>>,
        fail_documents: bool,
    }

    impl Recorder {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn documents(&self) -> usize {
            self.sent()
                .iter()
                .filter(|s| matches!(s, Sent::Document { .. }))
                .count()
        }
    }

    #[async_trait]
    impl Messenger for Recorder {
        async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Text(chat_id, text.to_string()));
            Ok(())
        }

        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Html(chat_id, html.to_string()));
            Ok(())
        }

        async fn send_web_app_button(
            &self,
            chat_id: ChatId,
            text: &str,
            label: &str,
            url: &str,
        ) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Button {
                chat_id,
                text: text.to_string(),
                label: label.to_string(),
                url: url.to_string(),
            });
            Ok(())
        }

        async fn send_document_url(
            &self,
            chat_id: ChatId,
            url: &str,
            caption: &str,
        ) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Document {
                chat_id,
                url: url.to_string(),
                caption: caption.to_string(),
            });
            if self.fail_documents {
                anyhow::bail!("Bad Request: wrong file identifier/HTTP URL specified");
            }
            Ok(())
        }
    }

    fn config() -> Config {
        RawConfig::new(
            Some("123456789:ABCdefGhIjKlmNoPQRsTUVwxyZ"),
            Some(WEB_APP_URL),
        )
        .validate()
        .unwrap()
    }

    fn command(command: Command, first_name: Option<&str>) -> InboundEvent {
        InboundEvent::Command {
            command,
            chat_id: ChatId(42),
            first_name: first_name.map(str::to_string),
        }
    }

    fn web_app_data(data: &str) -> InboundEvent {
        InboundEvent::WebAppData {
            chat_id: ChatId(42),
            user_id: Some(UserId(7)),
            data: data.to_string(),
        }
    }

    async fn run_to_completion(recorder: &Recorder, event: InboundEvent) -> Dispatched {
        let mut dispatched = dispatch(recorder, &config(), event).await.unwrap();
        if let Some(handle) = dispatched.attachment.take() {
            handle.await.unwrap();
        }
        dispatched
    }

    #[tokio::test]
    async fn test_start_sends_single_launch_button() {
        let recorder = Recorder::default();
        run_to_completion(&recorder, command(Command::Start, Some("Ada"))).await;

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Sent::Button {
                chat_id,
                text,
                label,
                url,
            } => {
                assert_eq!(*chat_id, ChatId(42));
                assert!(text.contains("Hello Ada!"));
                assert_eq!(label, replies::LAUNCH_BUTTON_LABEL);
                assert_eq!(url, WEB_APP_URL);
            }
            other => panic!("expected launch button, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_without_first_name_greets_there() {
        let recorder = Recorder::default();
        run_to_completion(&recorder, command(Command::Start, None)).await;

        match &recorder.sent()[0] {
            Sent::Button { text, .. } => assert!(text.contains("Hello there!")),
            other => panic!("expected launch button, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_help_and_about_are_static() {
        let recorder = Recorder::default();
        run_to_completion(&recorder, command(Command::Help, Some("Ada"))).await;
        run_to_completion(&recorder, command(Command::About, Some("Grace"))).await;

        assert_eq!(
            recorder.sent(),
            vec![
                Sent::Html(ChatId(42), replies::HELP.to_string()),
                Sent::Html(ChatId(42), replies::ABOUT.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_avatar_payload_confirms_and_attaches() {
        let recorder = Recorder::default();
        let url = "https://models.readyplayer.me/64f0c1.glb";
        let dispatched = dispatch(
            &recorder,
            &config(),
            web_app_data(&format!(r#"{{"avatarUrl":"{url}"}}"#)),
        )
        .await
        .unwrap();

        let handle = dispatched.attachment.expect("attachment task");
        handle.await.unwrap();

        let sent = recorder.sent();
        assert_eq!(sent.len(), 2);
        match &sent[0] {
            Sent::Html(chat_id, text) => {
                assert_eq!(*chat_id, ChatId(42));
                assert!(text.contains(url));
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
        assert_eq!(
            sent[1],
            Sent::Document {
                chat_id: ChatId(42),
                url: url.to_string(),
                caption: replies::DOCUMENT_CAPTION.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_document_failure_is_swallowed() {
        let recorder = Recorder {
            fail_documents: true,
            ..Default::default()
        };
        let dispatched = dispatch(
            &recorder,
            &config(),
            web_app_data(r#"{"avatarUrl":"https://x/a.glb"}"#),
        )
        .await
        .unwrap();

        // The detached task completes normally even though the send failed.
        dispatched.attachment.unwrap().await.unwrap();
        assert_eq!(recorder.documents(), 1);
        assert!(matches!(recorder.sent()[0], Sent::Html(..)));
    }

    #[tokio::test]
    async fn test_malformed_payload_sends_apology_only() {
        let recorder = Recorder::default();
        let dispatched = run_to_completion(&recorder, web_app_data("{oops")).await;

        assert!(dispatched.attachment.is_none());
        assert_eq!(
            recorder.sent(),
            vec![Sent::Text(ChatId(42), replies::PAYLOAD_ERROR.to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_avatar_url_sends_apology_only() {
        let recorder = Recorder::default();
        run_to_completion(&recorder, web_app_data(r#"{"avatar":"x"}"#)).await;

        assert_eq!(
            recorder.sent(),
            vec![Sent::Text(ChatId(42), replies::PAYLOAD_ERROR.to_string())]
        );
        assert_eq!(recorder.documents(), 0);
    }

    #[tokio::test]
    async fn test_array_payload_sends_apology_only() {
        let recorder = Recorder::default();
        let dispatched =
            run_to_completion(&recorder, web_app_data(r#"["https://x/a.glb"]"#)).await;

        assert!(dispatched.attachment.is_none());
        assert_eq!(
            recorder.sent(),
            vec![Sent::Text(ChatId(42), replies::PAYLOAD_ERROR.to_string())]
        );
        assert_eq!(recorder.documents(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_avatar_url_is_forwarded() {
        let recorder = Recorder::default();
        run_to_completion(&recorder, web_app_data(r#"{"avatarUrl":"   "}"#)).await;

        assert!(matches!(recorder.sent()[0], Sent::Html(..)));
        assert_eq!(recorder.documents(), 1);
    }

    #[tokio::test]
    async fn test_other_events_are_ignored() {
        let recorder = Recorder::default();
        let dispatched = run_to_completion(&recorder, InboundEvent::Other).await;

        assert!(dispatched.attachment.is_none());
        assert!(recorder.sent().is_empty());
    }
}
