//! Loading, binding and reloading quest definitions.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::*;
use mudquest::quest::tracker;
use mudquest::quest::{
    Behavior, BehaviorTable, QuestEngine, QuestError, QuestId, QuestRegistry, QuestType, World,
};
use tempfile::TempDir;

#[test]
fn sample_file_loads_every_record() {
    let registry = QuestRegistry::load_file(quest_file()).unwrap();
    assert_eq!(registry.len(), 7);
    let mayor: Vec<_> = registry.for_questmaster(MAYOR).map(|q| q.id.0).collect();
    assert_eq!(mayor, vec![101, 102, 103, 500, 501]);

    let rat_king = registry.by_id(QuestId(500)).unwrap();
    assert_eq!(rat_king.kind, QuestType::MobKill);
    assert_eq!(rat_king.target_mob(), RAT_KING);
    assert_eq!((rat_king.min_level(), rat_king.max_level()), (5, 50));
    assert_eq!(rat_king.reward.gold, 100);
}

#[test]
fn malformed_record_is_fatal() {
    let src = std::fs::read_to_string(quest_file()).unwrap();
    let broken = src.replacen("10 5 5 50 10 -1 1", "10 5 5 50 10", 1);
    match QuestRegistry::load_str(&broken) {
        Err(QuestError::Parse { line, message }) => {
            assert!(line > 0);
            assert!(message.contains("value line needs 7 fields"), "{}", message);
        }
        other => panic!("expected a parse error, got {:?}", other.map(|r| r.len())),
    }

    let unterminated = src.replacen("100 500 -1\nS", "100 500 -1\nX", 1);
    assert!(QuestRegistry::load_str(&unterminated).is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        QuestRegistry::load_file(dir.path().join("nope.qst")),
        Err(QuestError::Io(_))
    ));
}

#[test]
fn existing_behavior_runs_before_the_questmaster() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let mut behaviors = BehaviorTable::new();
    behaviors.register(
        MAYOR,
        Behavior::custom(move |_, call| {
            seen.set(seen.get() + 1);
            call.command == "greet"
        }),
    );
    let registry = QuestRegistry::load_file(quest_file()).unwrap();
    let mut engine = QuestEngine::with_behaviors(registry, behaviors);
    let mut t = town();

    assert!(engine.dispatch_behaviors(&mut t.world, t.mayor, t.player, "greet"));
    assert_eq!(calls.get(), 1);
    assert!(t.world.messages(t.player).is_empty());

    assert!(engine.dispatch_behaviors(&mut t.world, t.mayor, t.player, "quest list"));
    assert_eq!(calls.get(), 2);
    assert!(t.world.saw(t.player, "Slay the rat king lurking in the sewers."));

    assert!(!engine.dispatch_behaviors(&mut t.world, t.mayor, t.player, "dance"));
    assert!(!engine.dispatch_behaviors(&mut t.world, t.widow, t.player, "quest list"));
}

#[test]
fn reload_clears_vanished_quests_lazily() {
    let dir = TempDir::new().unwrap();
    let trimmed = dir.path().join("quests.qst");
    let src = std::fs::read_to_string(quest_file()).unwrap();
    let start = src.find("#500").unwrap();
    let end = src.find("#501").unwrap();
    std::fs::write(&trimmed, format!("{}{}", &src[..start], &src[end..])).unwrap();

    let mut engine = boot_engine();
    let mut t = town();
    tracker::join(&mut engine, &mut t.world, t.player, t.mayor, 4).unwrap();

    assert_eq!(engine.reload(&trimmed).unwrap(), 6);
    // Nothing happens until the quest is touched.
    assert_eq!(
        t.world.player_quests(t.player).unwrap().active_id(),
        Some(QuestId(500))
    );

    tracker::progress(&engine, &mut t.world, t.player);
    assert_eq!(t.world.player_quests(t.player).unwrap().active_id(), None);
    assert!(t.world.saw(t.player, tracker::QUEST_VANISHED));
    assert!(engine.is_questmaster(&t.world, t.mayor));
}

#[test]
fn failed_reload_keeps_current_definitions() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.qst");
    std::fs::write(&broken, "#1\nunterminated\n").unwrap();

    let mut engine = boot_engine();
    assert!(engine.reload(&broken).is_err());
    assert_eq!(engine.registry().len(), 7);
}
