//! Collaborator contract between the quest engine and the host game.
//!
//! The engine never owns rooms, characters or objects. It reaches them through
//! [`World`], using opaque live-instance handles and template ids.

use serde::{Deserialize, Serialize};

use crate::quest::types::{
    MobQuestState, MobVnum, NpcTraits, ObjVnum, PlayerQuestState, RoomVnum, ZoneVnum,
};

/// Live character handle (player or NPC instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharId(pub u64);

/// Live object instance handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjId(pub u64);

pub trait World {
    // identity

    fn is_npc(&self, ch: CharId) -> bool;
    fn name(&self, ch: CharId) -> String;
    fn level(&self, ch: CharId) -> i32;
    /// Immortal/administrator accounts.
    fn is_privileged(&self, ch: CharId) -> bool;
    fn mob_vnum(&self, ch: CharId) -> Option<MobVnum>;
    fn mob_proto_name(&self, vnum: MobVnum) -> Option<String>;
    fn obj_vnum(&self, obj: ObjId) -> Option<ObjVnum>;
    fn obj_proto_name(&self, vnum: ObjVnum) -> Option<String>;

    // placement

    fn room_of(&self, ch: CharId) -> Option<RoomVnum>;
    fn zone_of(&self, room: RoomVnum) -> Option<ZoneVnum>;
    /// Everyone in the room, in the host's display order.
    fn people_in_room(&self, room: RoomVnum) -> Vec<CharId>;
    fn is_charmed(&self, ch: CharId) -> bool;
    fn carries(&self, ch: CharId, vnum: ObjVnum) -> bool;
    /// First live instance of a template in world order.
    fn find_mob(&self, vnum: MobVnum) -> Option<CharId>;
    fn npcs(&self) -> Vec<CharId>;
    fn players(&self) -> Vec<CharId>;
    /// True while the NPC's travel behavior is walking it to `dest`.
    fn is_en_route_to(&self, _npc: CharId, _dest: MobVnum) -> bool {
        false
    }

    // mutation

    fn transfer_obj(&mut self, obj: ObjId, to: CharId);
    fn add_gold(&mut self, ch: CharId, amount: i64);
    /// May level the character up.
    fn gain_exp(&mut self, ch: CharId, amount: i64);
    /// Instantiate an object from its template directly into `to`'s inventory.
    fn load_obj(&mut self, vnum: ObjVnum, to: CharId) -> Option<ObjId>;
    fn send(&mut self, ch: CharId, text: &str);
    fn send_room(&mut self, room: RoomVnum, text: &str) {
        for ch in self.people_in_room(room) {
            if !self.is_npc(ch) {
                self.send(ch, text);
            }
        }
    }

    // quest storage embedded in host records

    fn player_quests(&self, ch: CharId) -> Option<&PlayerQuestState>;
    fn player_quests_mut(&mut self, ch: CharId) -> Option<&mut PlayerQuestState>;
    /// `None` unless the NPC was spawned with AI enabled.
    fn mob_quest(&self, ch: CharId) -> Option<&MobQuestState>;
    fn mob_quest_mut(&mut self, ch: CharId) -> Option<&mut MobQuestState>;
    fn npc_traits(&self, ch: CharId) -> Option<&NpcTraits>;
    fn npc_traits_mut(&mut self, ch: CharId) -> Option<&mut NpcTraits>;
}
