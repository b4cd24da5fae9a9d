//! Test utilities & fixtures.
//! Loads the sample quest file under `data/` and builds a small town around it.

use std::path::{Path, PathBuf};

use mudquest::quest::{
    CharId, MemoryWorld, MobVnum, NpcTraits, ObjVnum, QuestEngine, QuestRegistry, RoomVnum,
    ZoneVnum,
};

pub const MAYOR: MobVnum = MobVnum(3001);
pub const TAVERN_KEEPER: MobVnum = MobVnum(3005);
pub const WIDOW: MobVnum = MobVnum(3006);
pub const RAT_KING: MobVnum = MobVnum(700);
pub const SCOUT: MobVnum = MobVnum(300);

pub const TOWN_SQUARE: RoomVnum = RoomVnum(3001);
pub const TAVERN: RoomVnum = RoomVnum(3005);
pub const SEWERS: RoomVnum = RoomVnum(3050);
pub const RIDGE_CAMP: RoomVnum = RoomVnum(5000);
pub const WATCHTOWER: RoomVnum = RoomVnum(5050);

pub const RING: ObjVnum = ObjVnum(3100);
pub const WIDOW_TOKEN: ObjVnum = ObjVnum(3101);

/// Return the path to the sample quest definition file.
pub fn quest_file() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("quests.qst")
}

pub fn boot_engine() -> QuestEngine {
    let registry = QuestRegistry::load_file(quest_file()).expect("sample quests load");
    QuestEngine::new(registry)
}

/// The live characters of the sample town.
#[allow(dead_code)] // Not every test binary touches every character.
pub struct Town {
    pub world: MemoryWorld,
    pub mayor: CharId,
    pub keeper: CharId,
    pub widow: CharId,
    pub player: CharId,
}

pub fn town() -> Town {
    let mut world = MemoryWorld::new();
    for room in [TOWN_SQUARE, TAVERN, SEWERS] {
        world.add_room(room, ZoneVnum(30));
    }
    for room in [RIDGE_CAMP, WATCHTOWER] {
        world.add_room(room, ZoneVnum(50));
    }
    world.name_mob_proto(MAYOR, "the mayor");
    world.name_mob_proto(TAVERN_KEEPER, "the tavern keeper");
    world.name_mob_proto(WIDOW, "the widow");
    world.name_mob_proto(RAT_KING, "the rat king");
    world.name_mob_proto(SCOUT, "a ridge scout");
    world.name_obj_proto(RING, "a gold wedding ring");
    world.name_obj_proto(WIDOW_TOKEN, "a silver token");

    let mayor = world.add_npc(MAYOR, 40, TOWN_SQUARE);
    let keeper = world.add_npc(TAVERN_KEEPER, 30, TAVERN);
    let widow = world.add_npc(WIDOW, 10, TOWN_SQUARE);
    let player = world.add_player("Ana", 10, TOWN_SQUARE);
    Town {
        world,
        mayor,
        keeper,
        widow,
        player,
    }
}

/// A bold, well-travelled NPC personality.
#[allow(dead_code)]
pub fn eager_traits() -> NpcTraits {
    NpcTraits {
        quest_tendency: 60,
        adventurer_tendency: 50,
        bravery: 80,
        roaming: 70,
        group: 40,
        reputation: 10,
    }
}
