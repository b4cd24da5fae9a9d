//! NPC quest AI: capability scoring, acceptance and outcome effects.
//!
//! Traits and reputation belong to the host's NPC AI and are only adjusted
//! here when an NPC-held quest succeeds or fails. Deciding *when* an NPC
//! gives up is left to the host; timers merely flag a quest as overdue.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logutil::escape_log;
use crate::quest::engine::QuestEngine;
use crate::quest::errors::QuestError;
use crate::quest::registry::QuestRegistry;
use crate::quest::reward;
use crate::quest::types::{NpcTraits, QuestDefinition, QuestId, QuestType, TickOutcome};
use crate::quest::world::{CharId, World};

/// Bounds of the random adjustments applied on quest outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcAiSettings {
    #[serde(default = "default_reputation_step")]
    pub reputation_gain_max: i32,
    #[serde(default = "default_reputation_step")]
    pub reputation_loss_max: i32,
    #[serde(default = "default_trait_step")]
    pub trait_gain_max: i32,
    #[serde(default = "default_trait_step")]
    pub trait_loss_max: i32,
}

fn default_reputation_step() -> i32 {
    5
}

fn default_trait_step() -> i32 {
    3
}

impl Default for NpcAiSettings {
    fn default() -> Self {
        Self {
            reputation_gain_max: default_reputation_step(),
            reputation_loss_max: default_reputation_step(),
            trait_gain_max: default_trait_step(),
            trait_loss_max: default_trait_step(),
        }
    }
}

/// How likely (0..=100) an NPC is to pull off `def`. Summed in `i64` so
/// no combination of traits and levels can overflow.
pub fn capability(world: &dyn World, npc: CharId, def: &QuestDefinition) -> i32 {
    let traits = world.npc_traits(npc).copied().unwrap_or_default();
    let wide = |v: i32| i64::from(v);
    let mut score = wide(traits.quest_tendency) + wide(traits.adventurer_tendency);

    let level = wide(world.level(npc));
    let min_level = wide(def.min_level());
    if level < min_level {
        score -= (min_level - level) * 10;
    } else if level >= min_level + 10 {
        score += 20;
    }

    score += wide(traits.reputation);
    score += match def.kind {
        k if k.is_kill() => wide(traits.bravery) / 10,
        k if k.is_find() => wide(traits.roaming) / 10,
        QuestType::RoomClear => (wide(traits.bravery) + wide(traits.group)) / 2 / 10,
        _ => 0,
    };
    score.clamp(0, 100) as i32
}

/// Roll whether an idle NPC takes a mob-postable quest.
pub fn should_accept<R: Rng + ?Sized>(
    world: &dyn World,
    rng: &mut R,
    npc: CharId,
    def: &QuestDefinition,
) -> bool {
    let Some(state) = world.mob_quest(npc) else {
        return false;
    };
    if state.active_id().is_some() || !def.is_mob_postable() {
        return false;
    }
    let chance = capability(world, npc, def);
    rng.gen_range(0..100) < chance
}

/// Offer `quest` to an NPC. Returns whether it took it on.
pub fn try_accept<R: Rng + ?Sized>(
    registry: &QuestRegistry,
    world: &mut dyn World,
    rng: &mut R,
    npc: CharId,
    quest: QuestId,
) -> Result<bool, QuestError> {
    let def = registry.by_id(quest).ok_or(QuestError::NotFound(quest))?;
    if !def.is_mob_postable() {
        return Err(QuestError::NotPostable(quest));
    }
    if !should_accept(world, rng, npc, def) {
        return Ok(false);
    }
    if let Some(state) = world.mob_quest_mut(npc) {
        state.activate(def);
    }
    info!("{} took on quest {}", escape_log(&world.name(npc)), quest);
    Ok(true)
}

/// Which traits an outcome moves, by quest type.
fn adjust_traits(traits: &mut NpcTraits, kind: QuestType, delta: i32) {
    match kind {
        QuestType::ObjectFind | QuestType::RoomFind | QuestType::MobFind => {
            traits.roaming += delta;
            traits.adventurer_tendency += delta;
        }
        QuestType::ObjectReturn => {
            let small = delta.signum();
            traits.roaming += small;
            traits.quest_tendency += small;
        }
        QuestType::MobKill
        | QuestType::MobKillBounty
        | QuestType::PlayerKill
        | QuestType::MobSave
        | QuestType::RoomClear => {
            traits.quest_tendency += delta;
            traits.bravery += delta;
        }
    }
    traits.clamp_all();
}

fn roll<R: Rng + ?Sized>(rng: &mut R, max: i32) -> i32 {
    if max < 1 {
        0
    } else {
        rng.gen_range(1..=max)
    }
}

fn active_definition<'e>(engine: &'e QuestEngine, world: &mut dyn World, npc: CharId) -> Option<&'e QuestDefinition> {
    let id = world.mob_quest(npc)?.active_id()?;
    match engine.registry().by_id(id) {
        Some(def) => Some(def),
        None => {
            crate::quest::tracker::clear_vanished(world, npc, id);
            None
        }
    }
}

/// The NPC finished its quest: pay out, raise standing and clear the slot.
pub fn complete<R: Rng + ?Sized>(engine: &QuestEngine, world: &mut dyn World, rng: &mut R, npc: CharId) {
    let Some(def) = active_definition(engine, world, npc) else {
        return;
    };
    reward::grant(world, engine.happy_hour(), npc, &def.reward);

    let settings = engine.ai_settings();
    let reputation = roll(rng, settings.reputation_gain_max);
    let delta = roll(rng, settings.trait_gain_max);
    if let Some(traits) = world.npc_traits_mut(npc) {
        traits.reputation += reputation;
        adjust_traits(traits, def.kind, delta);
    }
    if let Some(state) = world.mob_quest_mut(npc) {
        state.clear();
    }
    info!(
        "{} completed quest {} (reputation +{})",
        escape_log(&world.name(npc)),
        def.id,
        reputation
    );
}

/// The host's goal system gave up on the NPC's quest.
pub fn fail<R: Rng + ?Sized>(
    engine: &QuestEngine,
    world: &mut dyn World,
    rng: &mut R,
    npc: CharId,
    reason: &str,
) {
    let Some(def) = active_definition(engine, world, npc) else {
        return;
    };
    let settings = engine.ai_settings();
    let reputation = roll(rng, settings.reputation_loss_max);
    let delta = roll(rng, settings.trait_loss_max);
    if let Some(traits) = world.npc_traits_mut(npc) {
        traits.reputation -= reputation;
        adjust_traits(traits, def.kind, -delta);
    }
    if let Some(state) = world.mob_quest_mut(npc) {
        state.clear();
    }
    info!(
        "{} failed quest {}: {} (reputation -{})",
        escape_log(&world.name(npc)),
        def.id,
        escape_log(reason),
        reputation
    );
}

/// Count NPC quest timers down. Returns how many became overdue this tick.
pub fn tick_timers(engine: &QuestEngine, world: &mut dyn World) -> usize {
    let mut overdue = 0;
    for npc in world.npcs() {
        if active_definition(engine, world, npc).is_none() {
            continue;
        }
        let outcome = world.mob_quest_mut(npc).map(|s| s.tick());
        if outcome == Some(TickOutcome::Expired) {
            debug!("NPC {:?} is overdue on its quest", npc);
            overdue += 1;
        }
    }
    overdue
}
