//! Line-oriented console adapter.
//!
//! Parses player input into [`SessionCommand`]s and renders what the
//! session reports back. Input grammar, one command per line:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `n` `s` `e` `w` (or `north` ...) | step one tile |
//! | `move <dx> <dy>` | step by an offset |
//! | `interact <entity>` / `i <entity>` | chop, mine, fight, or inspect |
//! | `flee`, `cancel`, `smelt` | leave combat, stop the action, smelt bronze |
//! | `travel <location>` | travel to a named location |
//! | `use <item>`, `equip <item>`, `buy <item>` | item commands |
//! | `say <message>` | post to global chat |
//! | `status`, `help`, `quit` | console controls |

use std::fmt::Write as _;

use runequest_core::{EngineEvent, FrameObserver, SessionCommand, SessionStatus};
use runequest_types::{Combatant, EntityId, ItemId, LocationId};

/// Help text printed by `help`.
pub const HELP: &str = "\
commands:
  n | s | e | w            step one tile
  move <dx> <dy>           step by an offset
  interact <entity>        chop, mine, fight or inspect (alias: i)
  flee | cancel | smelt    leave combat, stop the action, smelt bronze
  travel <location>        e.g. travel lumbridge_forest
  use | equip | buy <item> e.g. buy healing_potion
  say <message>            post to global chat
  status | help | quit";

/// Errors produced while parsing a console line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// The first word is not a known command.
    #[error("unknown command {0:?}, type `help` for a list")]
    UnknownCommand(String),

    /// A required argument is missing.
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        /// The command that was typed.
        command: &'static str,
        /// What is missing.
        argument: &'static str,
    },

    /// An offset is not an integer.
    #[error("{0:?} is not a whole number")]
    InvalidNumber(String),
}

/// What a console line asks for.
#[derive(Debug)]
pub enum ConsoleInput {
    /// Forward a command to the session.
    Command(SessionCommand),
    /// Request and print the status.
    Status,
    /// Print the help text.
    Help,
    /// Nothing to do.
    Empty,
}

/// Parse one line of input.
pub fn parse_line(line: &str) -> Result<ConsoleInput, ConsoleError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(ConsoleInput::Empty),
        "help" | "?" => return Ok(ConsoleInput::Help),
        "status" | "stats" => return Ok(ConsoleInput::Status),
        "quit" | "exit" | "logout" => SessionCommand::Shutdown,
        "n" | "north" => SessionCommand::Move { dx: 0, dy: -1 },
        "s" | "south" => SessionCommand::Move { dx: 0, dy: 1 },
        "e" | "east" => SessionCommand::Move { dx: 1, dy: 0 },
        "w" | "west" => SessionCommand::Move { dx: -1, dy: 0 },
        "move" => {
            let mut parts = rest.split_whitespace();
            let (Some(dx), Some(dy)) = (parts.next(), parts.next()) else {
                return Err(ConsoleError::MissingArgument {
                    command: "move",
                    argument: "two offsets",
                });
            };
            SessionCommand::Move {
                dx: parse_offset(dx)?,
                dy: parse_offset(dy)?,
            }
        }
        "interact" | "i" => SessionCommand::Interact(EntityId::new(argument(rest, "interact", "an entity id")?)),
        "flee" => SessionCommand::Flee,
        "cancel" | "stop" => SessionCommand::Cancel,
        "smelt" => SessionCommand::Smelt,
        "travel" | "go" => SessionCommand::Travel(LocationId::new(argument(rest, "travel", "a location id")?)),
        "use" | "eat" => SessionCommand::UseItem(ItemId::new(argument(rest, "use", "an item id")?)),
        "equip" | "wield" => SessionCommand::Equip(ItemId::new(argument(rest, "equip", "an item id")?)),
        "buy" => SessionCommand::Buy(ItemId::new(argument(rest, "buy", "an item id")?)),
        "say" | "chat" => SessionCommand::Chat(argument(rest, "say", "a message")?.to_owned()),
        other => return Err(ConsoleError::UnknownCommand(other.to_owned())),
    };
    Ok(ConsoleInput::Command(command))
}

fn argument<'a>(rest: &'a str, command: &'static str, argument: &'static str) -> Result<&'a str, ConsoleError> {
    if rest.is_empty() {
        Err(ConsoleError::MissingArgument { command, argument })
    } else {
        Ok(rest)
    }
}

fn parse_offset(raw: &str) -> Result<i32, ConsoleError> {
    raw.parse()
        .map_err(|_parse_error| ConsoleError::InvalidNumber(raw.to_owned()))
}

/// Render a status reply for the terminal.
pub fn format_status(status: &SessionStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} at {} ({}) | HP {}/{} | {} GP",
        status.username, status.position, status.location, status.hp, status.max_hp, status.gold
    );
    let skills: Vec<String> = status
        .skills
        .iter()
        .map(|(skill, level, xp)| format!("{skill} {level} ({xp} xp)"))
        .collect();
    let _ = writeln!(out, "skills: {}", skills.join(", "));
    if status.inventory.is_empty() {
        let _ = writeln!(out, "inventory: empty");
    } else {
        let items: Vec<String> = status
            .inventory
            .iter()
            .map(|(name, quantity)| format!("{name} x{quantity}"))
            .collect();
        let _ = writeln!(out, "inventory: {}", items.join(", "));
    }
    if let Some(item) = &status.equipped {
        let _ = writeln!(out, "equipped: {item}");
    }
    if let Some(action) = &status.action {
        let _ = writeln!(out, "doing: {} {}%", action.kind, action.progress);
    }
    if let Some(combat) = &status.combat {
        let _ = writeln!(out, "fighting: {} {}/{}", combat.enemy, combat.hp.max(0), combat.max_hp);
    }
    for message in status.chat.iter().take(3) {
        let _ = writeln!(out, "[chat] {}: {}", message.username, message.message);
    }
    out.trim_end().to_owned()
}

/// Prints new activity log lines and hitsplats to stdout.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl FrameObserver for ConsoleObserver {
    fn on_frame(&mut self, events: &[EngineEvent], new_lines: &[&str]) {
        for event in events {
            if let EngineEvent::Hitsplat { target, damage } = event {
                let who = match target {
                    Combatant::Player => "you",
                    Combatant::Enemy => "enemy",
                };
                println!("  *{damage}* ({who})");
            }
        }
        for line in new_lines {
            println!("{line}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use runequest_types::{ActionKind, ActiveAction, Position, Skill};

    use super::*;

    fn command(line: &str) -> SessionCommand {
        match parse_line(line).unwrap() {
            ConsoleInput::Command(command) => command,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn compass_directions() {
        assert!(matches!(command("n"), SessionCommand::Move { dx: 0, dy: -1 }));
        assert!(matches!(command("South"), SessionCommand::Move { dx: 0, dy: 1 }));
        assert!(matches!(command("  e "), SessionCommand::Move { dx: 1, dy: 0 }));
        assert!(matches!(command("west"), SessionCommand::Move { dx: -1, dy: 0 }));
    }

    #[test]
    fn move_with_offsets() {
        assert!(matches!(command("move -1 1"), SessionCommand::Move { dx: -1, dy: 1 }));
        assert_eq!(
            parse_line("move 1").unwrap_err(),
            ConsoleError::MissingArgument {
                command: "move",
                argument: "two offsets"
            }
        );
        assert_eq!(
            parse_line("move a 1").unwrap_err(),
            ConsoleError::InvalidNumber(String::from("a"))
        );
    }

    #[test]
    fn id_arguments() {
        match command("i oak_1") {
            SessionCommand::Interact(id) => assert_eq!(id.as_str(), "oak_1"),
            other => panic!("unexpected {other:?}"),
        }
        match command("travel lumbridge_forest") {
            SessionCommand::Travel(id) => assert_eq!(id.as_str(), "lumbridge_forest"),
            other => panic!("unexpected {other:?}"),
        }
        match command("buy healing_potion") {
            SessionCommand::Buy(id) => assert_eq!(id.as_str(), "healing_potion"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_line("equip").is_err());
    }

    #[test]
    fn chat_keeps_the_whole_message() {
        match command("say  buying logs, 5gp ea ") {
            SessionCommand::Chat(message) => assert_eq!(message, "buying logs, 5gp ea"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn console_controls() {
        assert!(matches!(parse_line("").unwrap(), ConsoleInput::Empty));
        assert!(matches!(parse_line("help").unwrap(), ConsoleInput::Help));
        assert!(matches!(parse_line("status").unwrap(), ConsoleInput::Status));
        assert!(matches!(command("quit"), SessionCommand::Shutdown));
        assert_eq!(
            parse_line("dance").unwrap_err(),
            ConsoleError::UnknownCommand(String::from("dance"))
        );
    }

    #[test]
    fn status_rendering() {
        let status = SessionStatus {
            username: String::from("zezima"),
            position: Position::new(10, 10),
            location: LocationId::new("lumbridge_courtyard"),
            hp: 7,
            max_hp: 10,
            gold: 42,
            skills: vec![(Skill::Woodcutting, 2, 100)],
            inventory: vec![(String::from("Logs"), 4)],
            equipped: None,
            action: Some(ActiveAction {
                kind: ActionKind::Woodcutting,
                progress: 40,
            }),
            combat: None,
            recent_log: Vec::new(),
            chat: Vec::new(),
            virtual_ms: 0,
        };
        let text = format_status(&status);
        assert!(text.starts_with("zezima at (10, 10) (lumbridge_courtyard) | HP 7/10 | 42 GP"));
        assert!(text.contains("woodcutting 2 (100 xp)"));
        assert!(text.contains("Logs x4"));
        assert!(text.contains("doing: Woodcutting 40%"));
    }
}
