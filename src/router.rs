use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::catalog::{CardId, Catalog};
use crate::config::MessagesConfig;
use crate::platform::{IncomingCallback, IncomingEvent, IncomingMessage, Messenger};
use crate::presentation::{self, CardKind, Reply};
use crate::selector::{self, SelectError};
use crate::session::{Audience, SessionStore};

/// Slash commands, matched by exact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Card,
    Random,
    Help,
    About,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "/start" => Some(Command::Start),
            "/card" => Some(Command::Card),
            "/random" => Some(Command::Random),
            "/help" => Some(Command::Help),
            "/about" => Some(Command::About),
            _ => None,
        }
    }
}

/// Inline button actions, keyed by callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DailyCard,
    RandomCard,
    MainMenu,
    About,
    Help,
}

impl Action {
    pub fn key(self) -> &'static str {
        match self {
            Action::DailyCard => "get_daily_card",
            Action::RandomCard => "get_random_card",
            Action::MainMenu => "main_menu",
            Action::About => "about",
            Action::Help => "help",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get_daily_card" => Some(Action::DailyCard),
            "get_random_card" => Some(Action::RandomCard),
            "main_menu" => Some(Action::MainMenu),
            "about" => Some(Action::About),
            "help" => Some(Action::Help),
            _ => None,
        }
    }
}

/// Routes incoming events to replies.
///
/// Handlers for different updates may run at the same time and in any order;
/// the only shared mutable state is behind the session store and audience locks.
pub struct Router {
    catalog: Arc<Catalog>,
    messages: MessagesConfig,
    sessions: SessionStore,
    audience: Audience,
    messenger: Arc<dyn Messenger>,
}

impl Router {
    pub fn new(
        catalog: Arc<Catalog>,
        messages: MessagesConfig,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            catalog,
            messages,
            sessions: SessionStore::new(),
            audience: Audience::new(),
            messenger,
        }
    }

    #[cfg(test)]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    /// Handle one event. Failures stay inside this call.
    pub async fn handle(&self, event: IncomingEvent) {
        match event {
            IncomingEvent::Message(msg) => self.handle_message(msg).await,
            IncomingEvent::Callback(cb) => self.handle_callback(cb).await,
        }
    }

    async fn handle_message(&self, msg: IncomingMessage) {
        let chat_id = msg.chat_id;
        info!(
            "Received message from {} ({}): {}",
            msg.user_name.as_deref().unwrap_or("unknown"),
            chat_id,
            msg.text
        );
        self.remember(chat_id).await;

        match Command::parse(&msg.text) {
            Some(Command::Start) => {
                self.deliver(chat_id, presentation::welcome(&self.messages.welcome))
                    .await;
            }
            Some(Command::Card) => self.run(chat_id, Action::DailyCard).await,
            Some(Command::Random) => self.run(chat_id, Action::RandomCard).await,
            Some(Command::Help) => self.run(chat_id, Action::Help).await,
            Some(Command::About) => self.run(chat_id, Action::About).await,
            None => {
                if let Some(state) = self.sessions.take_pending(chat_id).await {
                    self.handle_pending(chat_id, &msg.text, &state).await;
                } else {
                    self.run(chat_id, Action::MainMenu).await;
                }
            }
        }
    }

    /// Free-text follow-up for a user with a pending state. No flow sets one
    /// yet, so every state resolves back to the main menu.
    async fn handle_pending(&self, chat_id: i64, text: &str, state: &str) {
        debug!(
            "Dropping pending state '{}' for {} on input: {}",
            state, chat_id, text
        );
        self.run(chat_id, Action::MainMenu).await;
    }

    async fn handle_callback(&self, cb: IncomingCallback) {
        info!("Received callback from {}: {}", cb.chat_id, cb.data);
        self.remember(cb.chat_id).await;

        match Action::from_key(&cb.data) {
            Some(action) => self.run(cb.chat_id, action).await,
            None => warn!("Unknown callback data from {}: {}", cb.chat_id, cb.data),
        }

        if let Err(e) = self.messenger.answer_callback(&cb.callback_id).await {
            error!("Error answering callback: {:#}", e);
        }
    }

    async fn run(&self, chat_id: i64, action: Action) {
        let reply = match action {
            Action::DailyCard => self.daily_card(chat_id, Local::now().date_naive()).await,
            Action::RandomCard => self.random_card().await,
            Action::MainMenu => presentation::main_menu(),
            Action::About => presentation::about(&self.messages.about, self.catalog.len()),
            Action::Help => presentation::help(&self.messages.help),
        };
        self.deliver(chat_id, reply).await;
    }

    async fn daily_card(&self, chat_id: i64, day: NaiveDate) -> Reply {
        let pick = selector::select_daily(&self.catalog, chat_id, day);
        self.card_reply(pick, CardKind::Daily).await
    }

    async fn random_card(&self) -> Reply {
        let pick = selector::select_random(&self.catalog);
        self.card_reply(pick, CardKind::Random).await
    }

    async fn card_reply(&self, pick: Result<CardId, SelectError>, kind: CardKind) -> Reply {
        let id = match pick {
            Ok(id) => id,
            Err(SelectError::EmptyCatalog) => {
                return presentation::error(presentation::EMPTY_CATALOG_TEXT)
            }
        };

        // The file may have been removed after the catalog was loaded.
        let path = self.catalog.image_path(id);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!("Image {} disappeared from {}", id, path.display());
            return presentation::missing_card(id);
        }
        presentation::card(path, kind)
    }

    /// Best-effort send; failures are logged and the reply is dropped.
    async fn deliver(&self, chat_id: i64, reply: Reply) -> bool {
        let result = match &reply {
            Reply::Text { text, keyboard } => {
                self.messenger.send_text(chat_id, text, Some(keyboard)).await
            }
            Reply::Photo {
                path,
                caption,
                keyboard,
            } => {
                self.messenger
                    .send_photo(chat_id, path, caption, Some(keyboard))
                    .await
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!("Error sending reply to {}: {:#}", chat_id, e);
                false
            }
        }
    }

    async fn remember(&self, chat_id: i64) {
        if self.audience.record(chat_id).await {
            debug!("New chat {}", chat_id);
        }
    }

    /// Publish the command menu to the platform.
    pub async fn register_commands(&self) {
        match self
            .messenger
            .set_commands(&presentation::menu_commands())
            .await
        {
            Ok(()) => info!("Bot commands set successfully"),
            Err(e) => error!("Error setting bot commands: {:#}", e),
        }
    }

    /// Send the reminder to every chat seen so far. Returns how many got it.
    pub async fn broadcast_reminder(&self) -> usize {
        let chats = self.audience.snapshot().await;
        let mut delivered = 0;
        for chat_id in &chats {
            if self
                .deliver(*chat_id, presentation::reminder(&self.messages.reminder))
                .await
            {
                delivered += 1;
            }
        }
        info!("Daily reminder delivered to {}/{} chats", delivered, chats.len());
        delivered
    }
}
