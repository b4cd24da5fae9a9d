//! `quest` player command parsing and dispatch.

use crate::quest::engine::QuestEngine;
use crate::quest::tracker;
use crate::quest::types::QuestId;
use crate::quest::world::{CharId, World};

pub const USAGE: &str = "Usage: quest list|history|join <n>|leave|progress|status <id>";
pub const JOIN_USAGE: &str = "Which quest would you like to join? Use the number from 'quest list'.";
pub const STATUS_USAGE: &str = "Usage: quest status <quest id>";
pub const NO_QUESTMASTER: &str = "There is no questmaster here.";

/// A parsed `quest ...` command. Bad arguments parse to `None` selectors so
/// the handler can answer with a usage line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestCommand {
    List,
    History,
    Join(Option<usize>),
    Leave,
    Progress,
    Status(Option<QuestId>),
    Usage,
}

impl QuestCommand {
    /// Parse a full input line. Returns `None` when it is not a quest command.
    pub fn parse(input: &str) -> Option<Self> {
        let mut words = input.split_whitespace();
        if !words.next()?.eq_ignore_ascii_case("quest") {
            return None;
        }
        let Some(sub) = words.next() else {
            return Some(QuestCommand::Usage);
        };
        let arg = words.next();
        let cmd = match sub.to_ascii_lowercase().as_str() {
            "list" => QuestCommand::List,
            "history" => QuestCommand::History,
            "join" => QuestCommand::Join(arg.and_then(|a| a.parse().ok()).filter(|n| *n > 0)),
            "leave" => QuestCommand::Leave,
            "progress" => QuestCommand::Progress,
            "status" => QuestCommand::Status(arg.and_then(|a| a.parse().ok()).map(QuestId)),
            _ => QuestCommand::Usage,
        };
        Some(cmd)
    }
}

/// First NPC in the player's room that offers quests, permanent or
/// temporary.
pub fn find_questmaster(engine: &QuestEngine, world: &dyn World, player: CharId) -> Option<CharId> {
    let room = world.room_of(player)?;
    world
        .people_in_room(room)
        .into_iter()
        .find(|ch| *ch != player && world.is_npc(*ch) && engine.is_questmaster(world, *ch))
}

pub fn handle_quest_command(engine: &mut QuestEngine, world: &mut dyn World, player: CharId, cmd: &QuestCommand) {
    match *cmd {
        QuestCommand::List => match find_questmaster(engine, world, player) {
            Some(qm) => tracker::list(engine, world, player, qm),
            None => world.send(player, NO_QUESTMASTER),
        },
        QuestCommand::Join(selector) => {
            let Some(qm) = find_questmaster(engine, world, player) else {
                world.send(player, NO_QUESTMASTER);
                return;
            };
            match selector {
                Some(n) => {
                    let _ = tracker::join(engine, world, player, qm, n);
                }
                None => world.send(player, JOIN_USAGE),
            }
        }
        QuestCommand::History => tracker::history(engine, world, player),
        QuestCommand::Leave => {
            tracker::quit(engine, world, player);
        }
        QuestCommand::Progress => tracker::progress(engine, world, player),
        QuestCommand::Status(id) => {
            if !world.is_privileged(player) {
                world.send(player, "Huh!?!");
                return;
            }
            match id {
                Some(id) => tracker::status(engine, world, player, id),
                None => world.send(player, STATUS_USAGE),
            }
        }
        QuestCommand::Usage => world.send(player, USAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        assert_eq!(QuestCommand::parse("quest list"), Some(QuestCommand::List));
        assert_eq!(QuestCommand::parse("QUEST History"), Some(QuestCommand::History));
        assert_eq!(QuestCommand::parse("quest join 2"), Some(QuestCommand::Join(Some(2))));
        assert_eq!(QuestCommand::parse("quest leave"), Some(QuestCommand::Leave));
        assert_eq!(QuestCommand::parse("quest progress"), Some(QuestCommand::Progress));
        assert_eq!(
            QuestCommand::parse("quest status 500"),
            Some(QuestCommand::Status(Some(QuestId(500))))
        );
    }

    #[test]
    fn bad_arguments_keep_the_command() {
        assert_eq!(QuestCommand::parse("quest join"), Some(QuestCommand::Join(None)));
        assert_eq!(QuestCommand::parse("quest join zero"), Some(QuestCommand::Join(None)));
        assert_eq!(QuestCommand::parse("quest join 0"), Some(QuestCommand::Join(None)));
        assert_eq!(QuestCommand::parse("quest status abc"), Some(QuestCommand::Status(None)));
        assert_eq!(QuestCommand::parse("quest"), Some(QuestCommand::Usage));
        assert_eq!(QuestCommand::parse("quest dance"), Some(QuestCommand::Usage));
    }

    #[test]
    fn other_commands_are_not_ours() {
        assert_eq!(QuestCommand::parse("look"), None);
        assert_eq!(QuestCommand::parse(""), None);
        assert_eq!(QuestCommand::parse("questing"), None);
    }
}
