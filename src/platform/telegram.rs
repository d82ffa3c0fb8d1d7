use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    ParseMode,
};
use teloxide::update_listeners::Polling;
use tracing::{info, warn};

use crate::platform::{
    IncomingCallback, IncomingEvent, IncomingMessage, Keyboard, MenuCommand, Messenger,
};
use crate::router::Router;

/// Legacy Markdown: `*bold*` and `_italic_` without escaping every symbol.
#[allow(deprecated)]
const PARSE_MODE: ParseMode = ParseMode::Markdown;

/// Telegram implementation of the outbound port
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
            .collect::<Vec<_>>()
    }))
}

fn callback_query_id(id: &str) -> CallbackQueryId {
    CallbackQueryId(id.to_string())
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        let request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(PARSE_MODE);
        match keyboard {
            Some(keyboard) => request.reply_markup(inline_markup(keyboard)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        let request = self
            .bot
            .send_photo(ChatId(chat_id), InputFile::file(path.to_path_buf()))
            .caption(caption)
            .parse_mode(PARSE_MODE);
        match keyboard {
            Some(keyboard) => request.reply_markup(inline_markup(keyboard)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.bot
            .answer_callback_query(callback_query_id(callback_id))
            .await?;
        Ok(())
    }

    async fn set_commands(&self, commands: &[MenuCommand]) -> Result<()> {
        let commands: Vec<BotCommand> = commands
            .iter()
            .map(|c| BotCommand::new(c.name.clone(), c.description.clone()))
            .collect();
        self.bot.set_my_commands(commands).await?;
        Ok(())
    }
}

/// Run the long-polling receive loop until Ctrl-C.
///
/// The dispatcher runs updates from different chats concurrently; updates from
/// one chat are handled in arrival order.
pub async fn run(bot: Bot, router: Arc<Router>, poll_timeout: Duration) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    let listener = Polling::builder(bot.clone())
        .timeout(poll_timeout)
        .delete_webhook()
        .await
        .build();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("update listener"),
        )
        .await;

    Ok(())
}

async fn handle_message(msg: Message, router: Arc<Router>) -> ResponseResult<()> {
    let event = IncomingEvent::Message(IncomingMessage {
        chat_id: msg.chat.id.0,
        user_name: msg.from.as_ref().map(|user| user.first_name.clone()),
        text: msg.text().unwrap_or_default().to_string(),
    });
    router.handle(event).await;
    Ok(())
}

async fn handle_callback(q: CallbackQuery, router: Arc<Router>) -> ResponseResult<()> {
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    let event = IncomingEvent::Callback(IncomingCallback {
        chat_id: chat_id.0,
        callback_id: q.id.to_string(),
        data: q.data.clone().unwrap_or_default(),
    });
    router.handle(event).await;
    Ok(())
}
