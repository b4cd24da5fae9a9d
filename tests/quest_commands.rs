//! The `quest` player command, end to end through the engine.

mod common;

use common::*;
use mudquest::quest::commands::{JOIN_USAGE, NO_QUESTMASTER, STATUS_USAGE, USAGE};
use mudquest::quest::tracker::NOT_ON_QUEST;
use mudquest::quest::{QuestId, QuestType, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn non_quest_input_is_left_to_the_host() {
    let mut engine = boot_engine();
    let mut t = town();
    assert!(!engine.handle_command(&mut t.world, t.player, "look"));
    assert!(!engine.handle_command(&mut t.world, t.player, "questions"));
    assert!(t.world.messages(t.player).is_empty());

    assert!(engine.handle_command(&mut t.world, t.player, "quest"));
    assert!(t.world.saw(t.player, USAGE));
}

#[test]
fn list_needs_a_questmaster_in_the_room() {
    let mut engine = boot_engine();
    let mut t = town();
    engine.handle_command(&mut t.world, t.player, "quest list");
    assert!(t.world.saw(t.player, "The following quests are available:"));
    assert!(t.world.saw(t.player, "Slay the rat king lurking in the sewers."));
    assert!(!t.world.saw(t.player, "Find the ring the widow lost"));

    t.world.take_messages(t.player);
    t.world.move_char(t.player, SEWERS);
    engine.handle_command(&mut t.world, t.player, "quest list");
    engine.handle_command(&mut t.world, t.player, "quest join 1");
    assert_eq!(
        t.world.take_messages(t.player),
        vec![NO_QUESTMASTER.to_string(), NO_QUESTMASTER.to_string()]
    );
}

#[test]
fn join_progress_and_leave() {
    let mut engine = boot_engine();
    let mut t = town();

    engine.handle_command(&mut t.world, t.player, "quest progress");
    assert!(t.world.saw(t.player, NOT_ON_QUEST));

    engine.handle_command(&mut t.world, t.player, "quest join");
    assert!(t.world.saw(t.player, JOIN_USAGE));

    engine.handle_command(&mut t.world, t.player, "quest join 4");
    assert!(t.world.saw(t.player, "You have accepted the quest: The Rat King."));
    assert!(t.world.saw(t.player, "You have a time limit of 10 turns to complete the quest."));

    t.world.take_messages(t.player);
    engine.tick(&mut t.world);
    engine.handle_command(&mut t.world, t.player, "quest progress");
    assert!(t.world.saw(t.player, "You are on the following quest:"));
    assert!(t.world.saw(t.player, "You have 9 turns remaining to complete the quest."));

    engine.handle_command(&mut t.world, t.player, "quest leave");
    assert!(t.world.saw(t.player, "The mayor shakes his head as you walk away."));
    assert!(t.world.saw(t.player, "You have lost 5 quest points for your cowardice."));
    let state = t.world.player_quests(t.player).unwrap();
    assert_eq!(state.active_id(), None);
    assert_eq!(state.points(), -5);
}

#[test]
fn prerequisite_quest_gates_the_second_stage() {
    let mut engine = boot_engine();
    let mut t = town();
    t.world.move_char(t.player, TAVERN);

    engine.handle_command(&mut t.world, t.player, "quest list");
    assert!(t.world.saw(t.player, "Find the ring the widow lost in the market."));
    assert!(t.world.saw(t.player, "Return the ring to the widow."));

    engine.handle_command(&mut t.world, t.player, "quest join 2");
    assert!(t.world.saw(t.player, "That quest is not available to you yet!"));
    assert_eq!(t.world.player_quests(t.player).unwrap().active_id(), None);

    engine.handle_command(&mut t.world, t.player, "quest join 3");
    assert!(t.world.saw(t.player, "That is not a valid quest!"));
}

#[test]
fn history_lists_completed_quests_with_their_giver() {
    let mut engine = boot_engine();
    let mut t = town();
    let mut rng = StdRng::seed_from_u64(21);

    engine.handle_command(&mut t.world, t.player, "quest history");
    assert!(t.world.saw(t.player, "You haven't completed any quests yet."));

    let rat_king = t.world.add_npc(RAT_KING, 5, SEWERS);
    engine.handle_command(&mut t.world, t.player, "quest join 4");
    engine.trigger(
        &mut t.world,
        &mut rng,
        t.player,
        Some(rat_king),
        None,
        QuestType::MobKill,
    );

    t.world.take_messages(t.player);
    engine.handle_command(&mut t.world, t.player, "quest history");
    assert!(t.world.saw(t.player, "Quests that you have completed:"));
    assert!(t
        .world
        .saw(t.player, "1) Slay the rat king lurking in the sewers. : the mayor"));
}

#[test]
fn status_is_for_privileged_accounts() {
    let mut engine = boot_engine();
    let mut t = town();

    engine.handle_command(&mut t.world, t.player, "quest status 500");
    assert_eq!(t.world.take_messages(t.player), vec!["Huh!?!".to_string()]);

    t.world.set_privileged(t.player, true);
    engine.handle_command(&mut t.world, t.player, "quest status 500");
    assert!(t.world.saw(t.player, "Name  : The Rat King"));
    assert!(t.world.saw(t.player, "Time Limit: 10"));

    t.world.take_messages(t.player);
    engine.handle_command(&mut t.world, t.player, "quest status 999");
    engine.handle_command(&mut t.world, t.player, "quest status");
    assert_eq!(
        t.world.take_messages(t.player),
        vec![
            "That quest does not exist.".to_string(),
            STATUS_USAGE.to_string()
        ]
    );
    assert!(engine.registry().by_id(QuestId(500)).is_some());
}
