//! Player quest tracker: the single active-quest slot plus completed history.
//!
//! Every operation reports to the player through [`World::send`]. Rejections
//! never mutate state.

use std::fmt;

use log::{debug, info, warn};

use crate::logutil::escape_log;
use crate::quest::engine::QuestEngine;
use crate::quest::reward;
use crate::quest::types::{QuestDefinition, QuestId, TickOutcome, TimeLimit};
use crate::quest::world::{CharId, World};

pub const NOT_ON_QUEST: &str = "But you currently aren't on a quest!";
pub const QUEST_VANISHED: &str = "Your quest seems to have faded from the world.";
pub const TIMED_OUT: &str = "You have run out of time to complete the quest.";

/// Why a join attempt was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRejection {
    AlreadyActive,
    NoSuchQuest,
    LevelTooLow,
    LevelTooHigh,
    AlreadyCompleted,
    MissingPrerequisiteQuest,
    MissingPrerequisiteItem,
}

impl fmt::Display for JoinRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            JoinRejection::AlreadyActive => "But you are already part of a quest!",
            JoinRejection::NoSuchQuest => "That is not a valid quest!",
            JoinRejection::LevelTooLow => "You are not experienced enough for that quest!",
            JoinRejection::LevelTooHigh => "You are too experienced for that quest!",
            JoinRejection::AlreadyCompleted => "You have already completed that quest!",
            JoinRejection::MissingPrerequisiteQuest => {
                "That quest is not available to you yet!"
            }
            JoinRejection::MissingPrerequisiteItem => {
                "You lack the item needed to start that quest!"
            }
        };
        f.write_str(text)
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn send_time_limit(world: &mut dyn World, player: CharId, limit: TimeLimit) {
    if let TimeLimit::Ticks(ticks) = limit {
        world.send(
            player,
            &format!(
                "You have a time limit of {} turn{} to complete the quest.",
                ticks,
                plural(ticks)
            ),
        );
    }
}

/// Clear a holder whose quest id no longer resolves.
pub(crate) fn clear_vanished(world: &mut dyn World, holder: CharId, id: QuestId) {
    warn!("Quest {} held by {:?} no longer exists; clearing", id, holder);
    if world.is_npc(holder) {
        if let Some(state) = world.mob_quest_mut(holder) {
            state.clear();
        }
    } else {
        if let Some(state) = world.player_quests_mut(holder) {
            state.clear();
        }
        world.send(holder, QUEST_VANISHED);
    }
}

/// Active definition of a player, clearing it first if it vanished.
fn active_definition<'e>(
    engine: &'e QuestEngine,
    world: &mut dyn World,
    player: CharId,
) -> Option<&'e QuestDefinition> {
    let id = world.player_quests(player)?.active_id()?;
    match engine.registry().by_id(id) {
        Some(def) => Some(def),
        None => {
            clear_vanished(world, player, id);
            None
        }
    }
}

fn is_available(def: &QuestDefinition, world: &dyn World, player: CharId) -> bool {
    let done = world
        .player_quests(player)
        .is_some_and(|s| s.is_completed(def.id));
    !done || def.is_repeatable()
}

/// Quests `questmaster` offers that the player could still take, in offer
/// order. Selectors given to [`join`] index into this list from 1.
pub fn available_from(
    engine: &QuestEngine,
    world: &dyn World,
    player: CharId,
    questmaster: CharId,
) -> Vec<QuestId> {
    engine
        .offered_by(world, questmaster)
        .into_iter()
        .filter(|id| {
            engine
                .registry()
                .by_id(*id)
                .is_some_and(|def| is_available(def, world, player))
        })
        .collect()
}

/// `quest list` at a questmaster.
pub fn list(engine: &QuestEngine, world: &mut dyn World, player: CharId, questmaster: CharId) {
    let available = available_from(engine, world, player, questmaster);
    if available.is_empty() {
        world.send(player, "There are no quests available here at the moment.");
        return;
    }
    let mut out = String::from("The following quests are available:\n");
    out.push_str("Index Description                                Done?\n");
    out.push_str("----- ------------------------------------------ -----\n");
    for (n, id) in available.iter().enumerate() {
        if let Some(def) = engine.registry().by_id(*id) {
            let done = world
                .player_quests(player)
                .is_some_and(|s| s.is_completed(*id));
            out.push_str(&format!(
                "{:>4}) {:<42} {}\n",
                n + 1,
                def.description,
                if done { "(Yes)" } else { "(No)" }
            ));
        }
    }
    world.send(player, out.trim_end());
}

/// Check every gate for `def` without touching state.
pub fn check_join(def: &QuestDefinition, world: &dyn World, player: CharId) -> Result<(), JoinRejection> {
    let Some(state) = world.player_quests(player) else {
        return Err(JoinRejection::NoSuchQuest);
    };
    if state.active_id().is_some() {
        return Err(JoinRejection::AlreadyActive);
    }
    let level = world.level(player);
    if level < def.min_level() {
        return Err(JoinRejection::LevelTooLow);
    }
    if level > def.max_level() {
        return Err(JoinRejection::LevelTooHigh);
    }
    if state.is_completed(def.id) && !def.is_repeatable() {
        return Err(JoinRejection::AlreadyCompleted);
    }
    if let Some(prev) = def.links.previous {
        if !state.is_completed(prev) {
            return Err(JoinRejection::MissingPrerequisiteQuest);
        }
    }
    if let Some(item) = def.links.prerequisite_item {
        if !world.carries(player, item) {
            return Err(JoinRejection::MissingPrerequisiteItem);
        }
    }
    Ok(())
}

fn accept(world: &mut dyn World, player: CharId, def: &QuestDefinition) {
    if let Some(state) = world.player_quests_mut(player) {
        state.activate(def);
    }
    world.send(player, &format!("You have accepted the quest: {}.", def.name));
    world.send(player, &def.info);
    send_time_limit(world, player, def.time_limit());
}

fn select(
    engine: &QuestEngine,
    world: &dyn World,
    player: CharId,
    questmaster: CharId,
    selector: usize,
) -> Result<QuestId, JoinRejection> {
    if world
        .player_quests(player)
        .is_some_and(|s| s.active_id().is_some())
    {
        return Err(JoinRejection::AlreadyActive);
    }
    let available = available_from(engine, world, player, questmaster);
    let id = selector
        .checked_sub(1)
        .and_then(|i| available.get(i).copied())
        .ok_or(JoinRejection::NoSuchQuest)?;
    let def = engine.registry().by_id(id).ok_or(JoinRejection::NoSuchQuest)?;
    check_join(def, world, player)?;
    Ok(id)
}

/// `quest join <n>`: take the n-th (1-based) available quest of
/// `questmaster`.
pub fn join(
    engine: &mut QuestEngine,
    world: &mut dyn World,
    player: CharId,
    questmaster: CharId,
    selector: usize,
) -> Result<QuestId, JoinRejection> {
    let result = select(engine, world, player, questmaster, selector);

    let id = match result {
        Ok(id) => id,
        Err(rejection) => {
            world.send(player, &rejection.to_string());
            return Err(rejection);
        }
    };

    if let Some(def) = engine.registry().by_id(id) {
        accept(world, player, def);
    }
    if engine.temp_mut().remove(questmaster, id) {
        debug!("Quest {} taken from temporary questmaster {:?}", id, questmaster);
    }
    info!("{} joined quest {}", escape_log(&world.name(player)), id);
    Ok(id)
}

/// `quest progress`.
pub fn progress(engine: &QuestEngine, world: &mut dyn World, player: CharId) {
    let Some(def) = active_definition(engine, world, player) else {
        if world.player_quests(player).is_some() {
            world.send(player, NOT_ON_QUEST);
        }
        return;
    };
    let (remaining, time_left) = match world.player_quests(player) {
        Some(state) => (state.remaining(), state.time_left()),
        None => return,
    };
    world.send(
        player,
        &format!("You are on the following quest:\n{}\n{}", def.description, def.info),
    );
    if def.quantity() > 1 {
        world.send(
            player,
            &format!(
                "You still have to achieve {} out of {} goals for the quest.",
                remaining,
                def.quantity()
            ),
        );
    }
    if let TimeLimit::Ticks(ticks) = time_left {
        world.send(
            player,
            &format!(
                "You have {} turn{} remaining to complete the quest.",
                ticks,
                plural(ticks)
            ),
        );
    }
}

/// `quest leave`: abandon the active quest, paying its point penalty.
pub fn quit(engine: &QuestEngine, world: &mut dyn World, player: CharId) -> Option<QuestId> {
    let Some(def) = active_definition(engine, world, player) else {
        if world.player_quests(player).is_some() {
            world.send(player, NOT_ON_QUEST);
        }
        return None;
    };
    let penalty = def.quit_penalty();
    let id = world.player_quests_mut(player).and_then(|state| {
        if penalty > 0 {
            state.add_points(-i64::from(penalty));
        }
        state.clear()
    });
    if def.quit_text.trim().is_empty() {
        world.send(player, "You have now abandoned your quest.");
    } else {
        world.send(player, &def.quit_text);
    }
    if penalty > 0 {
        world.send(
            player,
            &format!("You have lost {} quest points for your cowardice.", penalty),
        );
    }
    info!("{} abandoned quest {}", escape_log(&world.name(player)), def.id);
    id
}

/// `quest history`: completed quests in the order they were finished.
pub fn history(engine: &QuestEngine, world: &mut dyn World, player: CharId) {
    let completed = match world.player_quests(player) {
        Some(state) => state.completed().to_vec(),
        None => return,
    };
    if completed.is_empty() {
        world.send(player, "You haven't completed any quests yet.");
        return;
    }
    let mut out = String::from("Quests that you have completed:\n");
    for (n, id) in completed.iter().enumerate() {
        match engine.registry().by_id(*id) {
            Some(def) => {
                let giver = world
                    .mob_proto_name(def.questmaster)
                    .unwrap_or_else(|| "Unknown".to_string());
                out.push_str(&format!("{:>4}) {} : {}\n", n + 1, def.description, giver));
            }
            None => out.push_str(&format!("{:>4}) Unknown quest!\n", n + 1)),
        }
    }
    world.send(player, out.trim_end());
}

/// `quest status <id>`: full definition dump, privileged accounts only.
pub fn status(engine: &QuestEngine, world: &mut dyn World, player: CharId, id: QuestId) {
    if !world.is_privileged(player) {
        world.send(player, "Huh!?!");
        return;
    }
    let Some(def) = engine.registry().by_id(id) else {
        world.send(player, "That quest does not exist.");
        return;
    };
    let giver = world
        .mob_proto_name(def.questmaster)
        .unwrap_or_else(|| "Unknown".to_string());
    let time = match def.time_limit() {
        TimeLimit::Unlimited => "unlimited".to_string(),
        TimeLimit::Ticks(t) => t.to_string(),
    };
    let link = |q: Option<QuestId>| q.map_or_else(|| "None".to_string(), |q| q.to_string());
    let mut out = String::new();
    out.push_str(&format!(
        "VNum  : [{:5}], RNum: [{:5}] -- Questmaster: [{:5}] {}\n",
        def.id.0,
        engine.registry().resolve(id).map_or(0, |i| i.get()),
        def.questmaster.0,
        giver
    ));
    out.push_str(&format!("Name  : {}\n", def.name));
    out.push_str(&format!("Desc  : {}\n", def.description));
    out.push_str(&format!("Accept Message:\n{}\n", def.info));
    out.push_str(&format!("Completion Message:\n{}\n", def.completion_text));
    out.push_str(&format!("Quit Message:\n{}\n", def.quit_text));
    out.push_str(&format!("Type  : {}\n", def.kind));
    out.push_str(&format!("Target: {}, Quantity: {}\n", def.target, def.quantity()));
    out.push_str(&format!(
        "Value : {}, Penalty: {}, Min Level: {:2}, Max Level: {:2}\n",
        def.points(),
        def.quit_penalty(),
        def.min_level(),
        def.max_level()
    ));
    out.push_str(&format!("Flags : {}\n", def.flags.to_letters()));
    out.push_str(&format!("Time Limit: {}\n", time));
    out.push_str(&format!(
        "Prior : {}, Next: {}, Prereq item: {}\n",
        link(def.links.previous),
        link(def.links.next),
        def.links
            .prerequisite_item
            .map_or_else(|| "None".to_string(), |v| v.to_string())
    ));
    out.push_str(&format!(
        "Rewards: {} gold, {} exp, item {}",
        def.reward.gold,
        def.reward.experience,
        def.reward
            .item
            .map_or_else(|| "None".to_string(), |v| v.to_string())
    ));
    world.send(player, &out);
}

/// The objective counter of the player's quest reached zero.
///
/// Grants rewards, records the quest (unless repeatable), clears the slot
/// and starts the chained quest if there is one. Calling it again for the
/// same crossing finds an empty slot and does nothing.
pub fn complete(engine: &QuestEngine, world: &mut dyn World, player: CharId) {
    let Some(def) = active_definition(engine, world, player) else {
        return;
    };
    if !def.completion_text.trim().is_empty() {
        world.send(player, &def.completion_text);
    }
    reward::grant(world, engine.happy_hour(), player, &def.reward);

    let Some(state) = world.player_quests_mut(player) else {
        return;
    };
    if !def.is_repeatable() {
        state.mark_completed(def.id);
    }
    state.clear();
    info!("{} completed quest {}", escape_log(&world.name(player)), def.id);

    let Some(next_id) = def.links.next.filter(|next| *next != def.id) else {
        return;
    };
    let already_done = world
        .player_quests(player)
        .is_some_and(|s| s.is_completed(next_id));
    if already_done {
        return;
    }
    match engine.registry().by_id(next_id) {
        Some(next) => {
            world.send(player, "The next stage of your quest awaits:");
            accept(world, player, next);
        }
        None => warn!("Quest {} chains to missing quest {}", def.id, next_id),
    }
}

/// Count one tick off a player's quest timer. Returns true when it ran out.
pub fn timeout(engine: &QuestEngine, world: &mut dyn World, player: CharId) -> bool {
    if active_definition(engine, world, player).is_none() {
        return false;
    }
    let outcome = match world.player_quests_mut(player) {
        Some(state) => state.tick(),
        None => return false,
    };
    if outcome != TickOutcome::Expired {
        return false;
    }
    let id = world.player_quests_mut(player).and_then(|s| s.clear());
    world.send(player, TIMED_OUT);
    if let Some(id) = id {
        info!("{} ran out of time on quest {}", escape_log(&world.name(player)), id);
    }
    true
}

/// Run [`timeout`] for every connected player holding a quest. The player
/// list is captured up front, so a player leaving mid-sweep is skipped
/// rather than disturbing the iteration.
pub fn timeout_sweep(engine: &QuestEngine, world: &mut dyn World) -> usize {
    let players = world.players();
    let mut expired = 0;
    for player in players {
        let holding = world
            .player_quests(player)
            .is_some_and(|s| s.active_id().is_some());
        if holding && timeout(engine, world, player) {
            expired += 1;
        }
    }
    expired
}
