//! Completion-trigger evaluator.
//!
//! Game event hooks call [`evaluate`] with the acting character, the other
//! character involved (victim or recipient) and the object involved. The
//! holder may be a player or an NPC with AI; both count objectives the
//! same way and only differ in how completion is paid out.

use log::debug;
use rand::Rng;

use crate::quest::engine::QuestEngine;
use crate::quest::npc_ai;
use crate::quest::tracker;
use crate::quest::types::{QuestDefinition, QuestType};
use crate::quest::world::{CharId, ObjId, World};

/// Returns true when the event counted toward the actor's quest.
pub fn evaluate<R: Rng + ?Sized>(
    engine: &QuestEngine,
    world: &mut dyn World,
    rng: &mut R,
    actor: CharId,
    other: Option<CharId>,
    object: Option<ObjId>,
    kind: QuestType,
) -> bool {
    let holder_is_npc = world.is_npc(actor);
    let active = if holder_is_npc {
        world.mob_quest(actor).and_then(|s| s.active_id())
    } else {
        world.player_quests(actor).and_then(|s| s.active_id())
    };
    let Some(id) = active else {
        return false;
    };
    let Some(def) = engine.registry().by_id(id) else {
        tracker::clear_vanished(world, actor, id);
        return false;
    };
    if def.kind != kind {
        return false;
    }
    if !matches(def, world, actor, other, object) {
        return false;
    }

    let remaining = if holder_is_npc {
        world.mob_quest_mut(actor).map_or(0, |s| s.decrement())
    } else {
        world.player_quests_mut(actor).map_or(0, |s| s.decrement())
    };
    debug!("{:?} advanced quest {} ({} left)", actor, id, remaining);

    if remaining == 0 {
        if holder_is_npc {
            npc_ai::complete(engine, world, rng, actor);
        } else {
            tracker::complete(engine, world, actor);
        }
    }
    true
}

fn npcs_in_room(world: &dyn World, actor: CharId) -> Vec<CharId> {
    match world.room_of(actor) {
        Some(room) => world
            .people_in_room(room)
            .into_iter()
            .filter(|ch| *ch != actor && world.is_npc(*ch))
            .collect(),
        None => Vec::new(),
    }
}

fn is_victim_of_kind(world: &dyn World, def: &QuestDefinition, actor: CharId, victim: CharId) -> bool {
    victim != actor && world.is_npc(victim) && world.mob_vnum(victim) == Some(def.target_mob())
}

/// Per-type match rule. Object returns relay the object as a side effect
/// when it was handed to the questmaster instead of the requester.
fn matches(
    def: &QuestDefinition,
    world: &mut dyn World,
    actor: CharId,
    other: Option<CharId>,
    object: Option<ObjId>,
) -> bool {
    match def.kind {
        QuestType::ObjectFind => {
            object.and_then(|o| world.obj_vnum(o)) == Some(def.target_obj())
        }
        QuestType::RoomFind => world.room_of(actor) == Some(def.target_room()),
        QuestType::MobFind => npcs_in_room(world, actor)
            .into_iter()
            .any(|ch| world.mob_vnum(ch) == Some(def.target_mob())),
        QuestType::MobKill | QuestType::MobKillBounty => {
            other.is_some_and(|victim| is_victim_of_kind(world, def, actor, victim))
        }
        QuestType::MobSave => {
            if other == Some(actor) {
                return false;
            }
            // A room without any NPC counts as saved too.
            npcs_in_room(world, actor).into_iter().all(|ch| {
                world.mob_vnum(ch) == Some(def.target_mob()) || world.is_charmed(ch)
            })
        }
        QuestType::ObjectReturn => object_returned(def, world, other, object),
        QuestType::RoomClear => {
            world.room_of(actor) == Some(def.target_room())
                && npcs_in_room(world, actor).is_empty()
        }
        QuestType::PlayerKill => other.is_some_and(|victim| {
            victim != actor && !world.is_npc(victim) && !world.is_npc(actor)
        }),
    }
}

fn object_returned(
    def: &QuestDefinition,
    world: &mut dyn World,
    recipient: Option<CharId>,
    object: Option<ObjId>,
) -> bool {
    let (Some(recipient), Some(obj)) = (recipient, object) else {
        return false;
    };
    if world.obj_vnum(obj) != Some(def.target_obj()) || !world.is_npc(recipient) {
        return false;
    }
    let Some(vnum) = world.mob_vnum(recipient) else {
        return false;
    };
    let requester = def.return_mob().unwrap_or(def.questmaster);
    if vnum == requester {
        return true;
    }
    if vnum != def.questmaster {
        return false;
    }
    // Handed to the questmaster: pass it on to the first requester instance.
    if let Some(target) = world.find_mob(requester) {
        world.transfer_obj(obj, target);
        debug!("Relayed object {:?} from questmaster to {:?}", obj, target);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::memory_world::MemoryWorld;
    use crate::quest::registry::QuestRegistry;
    use crate::quest::types::{MobVnum, ObjVnum, QuestId, RoomVnum, ZoneVnum};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(id: i32, kind: i32, target: i32, return_mob: i32, quantity: i32) -> String {
        format!(
            "#{id}\nq{id}~\nd~\ni~\ndone~\nquit~\n{kind} 100 0 {target} -1 -1 -1\n5 0 1 50 -1 {return_mob} {quantity}\n0 0 -1\nS\n"
        )
    }

    fn engine_with(records: &[String]) -> QuestEngine {
        let src = format!("{}$\n", records.concat());
        QuestEngine::new(QuestRegistry::load_str(&src).unwrap())
    }

    fn setup() -> (MemoryWorld, CharId) {
        let mut world = MemoryWorld::new();
        world.add_room(RoomVnum(1), ZoneVnum(1));
        world.add_room(RoomVnum(2), ZoneVnum(1));
        let player = world.add_player("Ana", 10, RoomVnum(1));
        (world, player)
    }

    fn give(engine: &QuestEngine, world: &mut MemoryWorld, player: CharId, id: i32) {
        let def = engine.registry().by_id(QuestId(id)).unwrap();
        world.player_quests_mut(player).unwrap().activate(def);
    }

    #[test]
    fn wrong_event_kind_is_ignored() {
        let engine = engine_with(&[record(1, 1, 2, -1, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        world.move_char(player, RoomVnum(2));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobFind));
        assert!(evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::RoomFind));
        assert!(world.player_quests(player).unwrap().is_completed(QuestId(1)));
    }

    #[test]
    fn quantity_counts_down_before_completion() {
        let engine = engine_with(&[record(1, 0, 40, -1, 2)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let a = world.add_obj(ObjVnum(40), player);
        let b = world.add_obj(ObjVnum(41), player);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, Some(b), QuestType::ObjectFind));
        assert!(evaluate(&engine, &mut world, &mut rng, player, None, Some(a), QuestType::ObjectFind));
        assert_eq!(world.player_quests(player).unwrap().remaining(), 1);
        assert!(evaluate(&engine, &mut world, &mut rng, player, None, Some(a), QuestType::ObjectFind));
        assert_eq!(world.player_quests(player).unwrap().active_id(), None);
    }

    #[test]
    fn mob_find_needs_the_target_in_the_same_room() {
        let engine = engine_with(&[record(1, 2, 70, -1, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobFind));
        world.add_npc(MobVnum(70), 5, RoomVnum(2));
        world.add_npc(MobVnum(71), 5, RoomVnum(1));
        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobFind));

        world.add_npc(MobVnum(70), 5, RoomVnum(1));
        assert!(evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobFind));
        assert!(world.player_quests(player).unwrap().is_completed(QuestId(1)));
    }

    #[test]
    fn mob_kill_rejects_wrong_victims() {
        let engine = engine_with(&[record(1, 3, 70, -1, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let other_kind = world.add_npc(MobVnum(71), 5, RoomVnum(1));
        let bystander = world.add_player("Bo", 10, RoomVnum(1));
        let target = world.add_npc(MobVnum(70), 5, RoomVnum(2));
        let mut rng = StdRng::seed_from_u64(1);

        for victim in [other_kind, bystander, player] {
            assert!(!evaluate(&engine, &mut world, &mut rng, player, Some(victim), None, QuestType::MobKill));
        }
        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobKill));
        assert_eq!(world.player_quests(player).unwrap().remaining(), 1);

        assert!(evaluate(&engine, &mut world, &mut rng, player, Some(target), None, QuestType::MobKill));
        assert!(world.player_quests(player).unwrap().is_completed(QuestId(1)));
    }

    #[test]
    fn bounty_completes_like_a_kill() {
        let engine = engine_with(&[record(1, 8, 70, -1, 2)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let first = world.add_npc(MobVnum(70), 5, RoomVnum(1));
        let second = world.add_npc(MobVnum(70), 5, RoomVnum(2));
        let wrong = world.add_npc(MobVnum(71), 5, RoomVnum(1));
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!evaluate(&engine, &mut world, &mut rng, player, Some(first), None, QuestType::MobKill));
        assert!(!evaluate(&engine, &mut world, &mut rng, player, Some(wrong), None, QuestType::MobKillBounty));
        assert!(evaluate(&engine, &mut world, &mut rng, player, Some(first), None, QuestType::MobKillBounty));
        assert_eq!(world.player_quests(player).unwrap().remaining(), 1);
        assert!(evaluate(&engine, &mut world, &mut rng, player, Some(second), None, QuestType::MobKillBounty));
        assert!(world.player_quests(player).unwrap().is_completed(QuestId(1)));
    }

    #[test]
    fn mob_save_counts_empty_room_as_saved() {
        let engine = engine_with(&[record(1, 4, 70, -1, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let hostile = world.add_npc(MobVnum(71), 5, RoomVnum(1));
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobSave));
        world.set_charmed(hostile, true);
        world.add_npc(MobVnum(70), 5, RoomVnum(1));
        assert!(evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobSave));

        give(&engine, &mut world, player, 1);
        world.move_char(player, RoomVnum(2));
        assert!(evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::MobSave));
    }

    #[test]
    fn room_clear_needs_no_npcs_left() {
        let engine = engine_with(&[record(1, 6, 1, -1, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let rat = world.add_npc(MobVnum(9), 1, RoomVnum(1));
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::RoomClear));
        world.remove_char(rat);
        assert!(evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::RoomClear));
    }

    #[test]
    fn player_kill_ignores_npc_victims_and_self() {
        let engine = engine_with(&[record(1, 7, 0, -1, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let npc = world.add_npc(MobVnum(9), 1, RoomVnum(1));
        let rival = world.add_player("Bo", 10, RoomVnum(1));
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!evaluate(&engine, &mut world, &mut rng, player, Some(npc), None, QuestType::PlayerKill));
        assert!(!evaluate(&engine, &mut world, &mut rng, player, Some(player), None, QuestType::PlayerKill));
        assert!(evaluate(&engine, &mut world, &mut rng, player, Some(rival), None, QuestType::PlayerKill));
    }

    #[test]
    fn object_given_to_questmaster_is_relayed_to_requester() {
        let engine = engine_with(&[record(1, 5, 40, 300, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let qm = world.add_npc(MobVnum(100), 20, RoomVnum(1));
        let requester = world.add_npc(MobVnum(300), 20, RoomVnum(2));
        let ring = world.add_obj(ObjVnum(40), qm);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(evaluate(&engine, &mut world, &mut rng, player, Some(qm), Some(ring), QuestType::ObjectReturn));
        assert_eq!(world.holder_of(ring), Some(requester));
        assert!(world.player_quests(player).unwrap().is_completed(QuestId(1)));
    }

    #[test]
    fn vanished_quest_is_cleared_quietly() {
        let engine = engine_with(&[record(1, 1, 2, -1, 1)]);
        let (mut world, player) = setup();
        give(&engine, &mut world, player, 1);
        let engine = engine_with(&[record(2, 1, 2, -1, 1)]);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!evaluate(&engine, &mut world, &mut rng, player, None, None, QuestType::RoomFind));
        assert_eq!(world.player_quests(player).unwrap().active_id(), None);
        assert!(world.saw(player, tracker::QUEST_VANISHED));
    }
}
