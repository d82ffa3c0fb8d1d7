use std::path::PathBuf;

use crate::catalog::CardId;
use crate::platform::{Button, Keyboard, MenuCommand};
use crate::router::Action;

/// A composed outbound message, ready for the messenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Keyboard,
    },
    Photo {
        path: PathBuf,
        caption: String,
        keyboard: Keyboard,
    },
}

#[cfg(test)]
impl Reply {
    pub fn keyboard(&self) -> &Keyboard {
        match self {
            Reply::Text { keyboard, .. } | Reply::Photo { keyboard, .. } => keyboard,
        }
    }
}

/// Which selection produced a card; decides the caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Daily,
    Random,
}

impl CardKind {
    fn title(self) -> &'static str {
        match self {
            CardKind::Daily => "💫 *YOUR MESSAGE OF THE DAY* 💫",
            CardKind::Random => "✨ *RANDOM MESSAGE* ✨",
        }
    }

    fn subtitle(self) -> &'static str {
        match self {
            CardKind::Daily => {
                "This message stays with you until the end of the day. \
                 Open your heart and accept its energy."
            }
            CardKind::Random => {
                "This message came to you right now. \
                 Accept its energy and let it fill you."
            }
        }
    }
}

pub const EMPTY_CATALOG_TEXT: &str = "Messages are not loaded yet. Please try again later.";

fn button(label: &str, action: Action) -> Button {
    Button::new(label, action.key())
}

pub fn main_keyboard() -> Keyboard {
    Keyboard::new(vec![
        vec![
            button("💫 Message of the Day", Action::DailyCard),
            button("✨ Random Message", Action::RandomCard),
        ],
        vec![
            button("📖 About", Action::About),
            button("🆘 Help", Action::Help),
        ],
    ])
}

pub fn card_keyboard() -> Keyboard {
    Keyboard::new(vec![
        vec![
            button("💫 Message of the day", Action::DailyCard),
            button("✨ Random", Action::RandomCard),
        ],
        vec![button("🏠 Main menu", Action::MainMenu)],
    ])
}

pub fn back_keyboard() -> Keyboard {
    Keyboard::new(vec![vec![button("🏠 Main menu", Action::MainMenu)]])
}

pub fn welcome(template: &str) -> Reply {
    Reply::Text {
        text: template.to_string(),
        keyboard: main_keyboard(),
    }
}

pub fn main_menu() -> Reply {
    Reply::Text {
        text: "✨ *Main menu* ✨\n\nChoose an action:".to_string(),
        keyboard: main_keyboard(),
    }
}

pub fn help(template: &str) -> Reply {
    Reply::Text {
        text: template.to_string(),
        keyboard: back_keyboard(),
    }
}

pub fn about(template: &str, card_count: usize) -> Reply {
    Reply::Text {
        text: format!(
            "{}\n\n📊 *Collection stats:*\n• Total messages: {}",
            template, card_count
        ),
        keyboard: back_keyboard(),
    }
}

pub fn error(message: &str) -> Reply {
    Reply::Text {
        text: format!("❌ *Error:* {}", message),
        keyboard: main_keyboard(),
    }
}

pub fn missing_card(id: CardId) -> Reply {
    error(&format!("Message {} not found.", id))
}

pub fn card(path: PathBuf, kind: CardKind) -> Reply {
    Reply::Photo {
        path,
        caption: format!(
            "{}\n\n{}\n\n🌟 *Let the energy of the message fill you* 🌟",
            kind.title(),
            kind.subtitle()
        ),
        keyboard: card_keyboard(),
    }
}

pub fn reminder(template: &str) -> Reply {
    Reply::Text {
        text: template.to_string(),
        keyboard: main_keyboard(),
    }
}

/// Commands shown in the platform's command menu.
pub fn menu_commands() -> Vec<MenuCommand> {
    [
        ("start", "Start the bot"),
        ("card", "Get your message of the day"),
        ("random", "Get a random message"),
        ("help", "Help"),
        ("about", "About the bot"),
    ]
    .into_iter()
    .map(|(name, description)| MenuCommand {
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(keyboard: &Keyboard) -> Vec<Vec<&str>> {
        keyboard
            .rows
            .iter()
            .map(|row| row.iter().map(|b| b.data.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_main_keyboard_layout() {
        assert_eq!(
            layout(&main_keyboard()),
            vec![
                vec!["get_daily_card", "get_random_card"],
                vec!["about", "help"],
            ]
        );
    }

    #[test]
    fn test_card_keyboard_layout() {
        assert_eq!(
            layout(&card_keyboard()),
            vec![vec!["get_daily_card", "get_random_card"], vec!["main_menu"]]
        );
    }

    #[test]
    fn test_help_and_about_return_to_menu() {
        assert_eq!(layout(help("h").keyboard()), vec![vec!["main_menu"]]);
        assert_eq!(layout(about("a", 3).keyboard()), vec![vec!["main_menu"]]);
    }

    #[test]
    fn test_about_includes_live_count() {
        let Reply::Text { text, .. } = about("*About*", 42) else {
            panic!("about must be text");
        };
        assert!(text.starts_with("*About*\n\n"));
        assert!(text.ends_with("Total messages: 42"));
    }

    #[test]
    fn test_error_prefix_and_menu() {
        let reply = missing_card(17);
        let Reply::Text { text, keyboard } = reply else {
            panic!("error must be text");
        };
        assert_eq!(text, "❌ *Error:* Message 17 not found.");
        assert_eq!(keyboard, main_keyboard());
    }

    #[test]
    fn test_card_captions_differ_by_kind() {
        let daily = card(PathBuf::from("images/1.jpg"), CardKind::Daily);
        let random = card(PathBuf::from("images/1.jpg"), CardKind::Random);
        match (&daily, &random) {
            (
                Reply::Photo { caption: a, path, .. },
                Reply::Photo { caption: b, .. },
            ) => {
                assert_ne!(a, b);
                assert!(a.contains("MESSAGE OF THE DAY"));
                assert!(b.contains("RANDOM MESSAGE"));
                assert_eq!(path, &PathBuf::from("images/1.jpg"));
            }
            _ => panic!("cards must be photos"),
        }
        assert_eq!(daily.keyboard(), &card_keyboard());
    }

    #[test]
    fn test_menu_commands() {
        let names: Vec<String> = menu_commands().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["start", "card", "random", "help", "about"]);
    }
}
