//! In-memory [`World`] used by the test suite and as a reference for hosts.

use std::collections::{BTreeMap, HashMap};

use crate::quest::types::{
    MobQuestState, MobVnum, NpcTraits, ObjVnum, PlayerQuestState, RoomVnum, ZoneVnum,
};
use crate::quest::world::{CharId, ObjId, World};

#[derive(Debug, Default)]
struct CharData {
    name: String,
    level: i32,
    vnum: Option<MobVnum>,
    room: Option<RoomVnum>,
    privileged: bool,
    charmed: bool,
    gold: i64,
    exp: i64,
    en_route: Option<MobVnum>,
    quests: Option<PlayerQuestState>,
    mob_quest: Option<MobQuestState>,
    traits: Option<NpcTraits>,
    outbox: Vec<String>,
}

#[derive(Debug)]
struct ObjData {
    vnum: ObjVnum,
    holder: Option<CharId>,
}

#[derive(Debug, Default)]
pub struct MemoryWorld {
    rooms: HashMap<RoomVnum, ZoneVnum>,
    chars: BTreeMap<CharId, CharData>,
    objs: BTreeMap<ObjId, ObjData>,
    mob_names: HashMap<MobVnum, String>,
    obj_names: HashMap<ObjVnum, String>,
    next_id: u64,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_room(&mut self, room: RoomVnum, zone: ZoneVnum) {
        self.rooms.insert(room, zone);
    }

    pub fn name_mob_proto(&mut self, vnum: MobVnum, name: &str) {
        self.mob_names.insert(vnum, name.to_string());
    }

    pub fn name_obj_proto(&mut self, vnum: ObjVnum, name: &str) {
        self.obj_names.insert(vnum, name.to_string());
    }

    pub fn add_player(&mut self, name: &str, level: i32, room: RoomVnum) -> CharId {
        let id = CharId(self.alloc());
        self.chars.insert(
            id,
            CharData {
                name: name.to_string(),
                level,
                room: Some(room),
                quests: Some(PlayerQuestState::new()),
                ..CharData::default()
            },
        );
        id
    }

    pub fn add_npc(&mut self, vnum: MobVnum, level: i32, room: RoomVnum) -> CharId {
        let id = CharId(self.alloc());
        let name = self
            .mob_names
            .get(&vnum)
            .cloned()
            .unwrap_or_else(|| format!("mob #{}", vnum));
        self.chars.insert(
            id,
            CharData {
                name,
                level,
                vnum: Some(vnum),
                room: Some(room),
                ..CharData::default()
            },
        );
        id
    }

    /// Spawn an NPC with AI state and the given personality.
    pub fn add_ai_npc(&mut self, vnum: MobVnum, level: i32, room: RoomVnum, traits: NpcTraits) -> CharId {
        let id = self.add_npc(vnum, level, room);
        if let Some(data) = self.chars.get_mut(&id) {
            data.mob_quest = Some(MobQuestState::new());
            data.traits = Some(traits);
        }
        id
    }

    pub fn add_obj(&mut self, vnum: ObjVnum, holder: CharId) -> ObjId {
        let id = ObjId(self.alloc());
        self.objs.insert(
            id,
            ObjData {
                vnum,
                holder: Some(holder),
            },
        );
        id
    }

    pub fn remove_char(&mut self, ch: CharId) {
        self.chars.remove(&ch);
        for obj in self.objs.values_mut() {
            if obj.holder == Some(ch) {
                obj.holder = None;
            }
        }
    }

    pub fn move_char(&mut self, ch: CharId, room: RoomVnum) {
        if let Some(data) = self.chars.get_mut(&ch) {
            data.room = Some(room);
        }
    }

    pub fn set_charmed(&mut self, ch: CharId, charmed: bool) {
        if let Some(data) = self.chars.get_mut(&ch) {
            data.charmed = charmed;
        }
    }

    pub fn set_privileged(&mut self, ch: CharId, privileged: bool) {
        if let Some(data) = self.chars.get_mut(&ch) {
            data.privileged = privileged;
        }
    }

    pub fn set_en_route(&mut self, ch: CharId, dest: Option<MobVnum>) {
        if let Some(data) = self.chars.get_mut(&ch) {
            data.en_route = dest;
        }
    }

    pub fn gold(&self, ch: CharId) -> i64 {
        self.chars.get(&ch).map_or(0, |c| c.gold)
    }

    pub fn exp(&self, ch: CharId) -> i64 {
        self.chars.get(&ch).map_or(0, |c| c.exp)
    }

    pub fn inventory(&self, ch: CharId) -> Vec<ObjVnum> {
        self.objs
            .values()
            .filter(|o| o.holder == Some(ch))
            .map(|o| o.vnum)
            .collect()
    }

    pub fn holder_of(&self, obj: ObjId) -> Option<CharId> {
        self.objs.get(&obj).and_then(|o| o.holder)
    }

    pub fn messages(&self, ch: CharId) -> &[String] {
        self.chars.get(&ch).map(|c| c.outbox.as_slice()).unwrap_or(&[])
    }

    pub fn take_messages(&mut self, ch: CharId) -> Vec<String> {
        self.chars
            .get_mut(&ch)
            .map(|c| std::mem::take(&mut c.outbox))
            .unwrap_or_default()
    }

    /// True when any message sent to `ch` contains `needle`.
    pub fn saw(&self, ch: CharId, needle: &str) -> bool {
        self.messages(ch).iter().any(|m| m.contains(needle))
    }
}

impl World for MemoryWorld {
    fn is_npc(&self, ch: CharId) -> bool {
        self.chars.get(&ch).is_some_and(|c| c.vnum.is_some())
    }

    fn name(&self, ch: CharId) -> String {
        self.chars
            .get(&ch)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "someone".to_string())
    }

    fn level(&self, ch: CharId) -> i32 {
        self.chars.get(&ch).map_or(0, |c| c.level)
    }

    fn is_privileged(&self, ch: CharId) -> bool {
        self.chars.get(&ch).is_some_and(|c| c.privileged)
    }

    fn mob_vnum(&self, ch: CharId) -> Option<MobVnum> {
        self.chars.get(&ch).and_then(|c| c.vnum)
    }

    fn mob_proto_name(&self, vnum: MobVnum) -> Option<String> {
        self.mob_names.get(&vnum).cloned()
    }

    fn obj_vnum(&self, obj: ObjId) -> Option<ObjVnum> {
        self.objs.get(&obj).map(|o| o.vnum)
    }

    fn obj_proto_name(&self, vnum: ObjVnum) -> Option<String> {
        self.obj_names.get(&vnum).cloned()
    }

    fn room_of(&self, ch: CharId) -> Option<RoomVnum> {
        self.chars.get(&ch).and_then(|c| c.room)
    }

    fn zone_of(&self, room: RoomVnum) -> Option<ZoneVnum> {
        self.rooms.get(&room).copied()
    }

    fn people_in_room(&self, room: RoomVnum) -> Vec<CharId> {
        self.chars
            .iter()
            .filter(|(_, c)| c.room == Some(room))
            .map(|(id, _)| *id)
            .collect()
    }

    fn is_charmed(&self, ch: CharId) -> bool {
        self.chars.get(&ch).is_some_and(|c| c.charmed)
    }

    fn carries(&self, ch: CharId, vnum: ObjVnum) -> bool {
        self.objs
            .values()
            .any(|o| o.holder == Some(ch) && o.vnum == vnum)
    }

    fn find_mob(&self, vnum: MobVnum) -> Option<CharId> {
        self.chars
            .iter()
            .find(|(_, c)| c.vnum == Some(vnum))
            .map(|(id, _)| *id)
    }

    fn npcs(&self) -> Vec<CharId> {
        self.chars
            .iter()
            .filter(|(_, c)| c.vnum.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    fn players(&self) -> Vec<CharId> {
        self.chars
            .iter()
            .filter(|(_, c)| c.vnum.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    fn is_en_route_to(&self, npc: CharId, dest: MobVnum) -> bool {
        self.chars.get(&npc).is_some_and(|c| c.en_route == Some(dest))
    }

    fn transfer_obj(&mut self, obj: ObjId, to: CharId) {
        if let Some(o) = self.objs.get_mut(&obj) {
            o.holder = Some(to);
        }
    }

    fn add_gold(&mut self, ch: CharId, amount: i64) {
        if let Some(c) = self.chars.get_mut(&ch) {
            c.gold = c.gold.saturating_add(amount);
        }
    }

    fn gain_exp(&mut self, ch: CharId, amount: i64) {
        if let Some(c) = self.chars.get_mut(&ch) {
            c.exp = c.exp.saturating_add(amount);
        }
    }

    fn load_obj(&mut self, vnum: ObjVnum, to: CharId) -> Option<ObjId> {
        if !self.chars.contains_key(&to) {
            return None;
        }
        Some(self.add_obj(vnum, to))
    }

    fn send(&mut self, ch: CharId, text: &str) {
        if let Some(c) = self.chars.get_mut(&ch) {
            c.outbox.push(text.to_string());
        }
    }

    fn player_quests(&self, ch: CharId) -> Option<&PlayerQuestState> {
        self.chars.get(&ch).and_then(|c| c.quests.as_ref())
    }

    fn player_quests_mut(&mut self, ch: CharId) -> Option<&mut PlayerQuestState> {
        self.chars.get_mut(&ch).and_then(|c| c.quests.as_mut())
    }

    fn mob_quest(&self, ch: CharId) -> Option<&MobQuestState> {
        self.chars.get(&ch).and_then(|c| c.mob_quest.as_ref())
    }

    fn mob_quest_mut(&mut self, ch: CharId) -> Option<&mut MobQuestState> {
        self.chars.get_mut(&ch).and_then(|c| c.mob_quest.as_mut())
    }

    fn npc_traits(&self, ch: CharId) -> Option<&NpcTraits> {
        self.chars.get(&ch).and_then(|c| c.traits.as_ref())
    }

    fn npc_traits_mut(&mut self, ch: CharId) -> Option<&mut NpcTraits> {
        self.chars.get_mut(&ch).and_then(|c| c.traits.as_mut())
    }
}
