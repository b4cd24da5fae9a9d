use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel used by the record and save file formats for "no id".
pub const NOTHING: i32 = -1;

/// Number of generic value slots carried by every quest definition.
pub const QUEST_VALUE_SLOTS: usize = 7;

/// Upper bound for NPC personality traits and reputation.
pub const TRAIT_MAX: i32 = 100;

macro_rules! vnum_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Map the `-1` sentinel to `None`.
            pub fn from_raw(raw: i32) -> Option<Self> {
                if raw == NOTHING {
                    None
                } else {
                    Some(Self(raw))
                }
            }

            pub fn raw(opt: Option<Self>) -> i32 {
                opt.map_or(NOTHING, |v| v.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

vnum_type!(
    /// Stable quest identifier. Never an array position.
    QuestId
);
vnum_type!(
    /// NPC template id.
    MobVnum
);
vnum_type!(
    /// Object template id.
    ObjVnum
);
vnum_type!(
    /// Room id.
    RoomVnum
);
vnum_type!(
    /// World zone id.
    ZoneVnum
);

/// Process-lifetime position of a definition inside the registry.
/// Recomputed on every load and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestIndex(pub(crate) usize);

impl QuestIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// The nine completion-trigger kinds. Also used as the event kind passed to
/// the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    ObjectFind,
    RoomFind,
    MobFind,
    MobKill,
    MobSave,
    ObjectReturn,
    RoomClear,
    PlayerKill,
    MobKillBounty,
}

impl QuestType {
    pub const ALL: [QuestType; 9] = [
        QuestType::ObjectFind,
        QuestType::RoomFind,
        QuestType::MobFind,
        QuestType::MobKill,
        QuestType::MobSave,
        QuestType::ObjectReturn,
        QuestType::RoomClear,
        QuestType::PlayerKill,
        QuestType::MobKillBounty,
    ];

    /// Numeric code used in the record file.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn code(self) -> i32 {
        match self {
            QuestType::ObjectFind => 0,
            QuestType::RoomFind => 1,
            QuestType::MobFind => 2,
            QuestType::MobKill => 3,
            QuestType::MobSave => 4,
            QuestType::ObjectReturn => 5,
            QuestType::RoomClear => 6,
            QuestType::PlayerKill => 7,
            QuestType::MobKillBounty => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestType::ObjectFind => "Object",
            QuestType::RoomFind => "Room",
            QuestType::MobFind => "Find mob",
            QuestType::MobKill => "Kill mob",
            QuestType::MobSave => "Save mob",
            QuestType::ObjectReturn => "Return object",
            QuestType::RoomClear => "Clear room",
            QuestType::PlayerKill => "Kill player",
            QuestType::MobKillBounty => "Bounty",
        }
    }

    /// Kill-style types share the same match rule.
    pub fn is_kill(self) -> bool {
        matches!(
            self,
            QuestType::MobKill | QuestType::MobKillBounty | QuestType::PlayerKill
        )
    }

    pub fn is_find(self) -> bool {
        matches!(
            self,
            QuestType::ObjectFind | QuestType::RoomFind | QuestType::MobFind
        )
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Quest flag bitvector. Letter `a` is bit 0, `b` bit 1, and so on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestFlags(pub u64);

impl QuestFlags {
    pub const REPEATABLE: u64 = 1 << 0;
    pub const MOB_POSTABLE: u64 = 1 << 1;
    pub const KNOWN: u64 = Self::REPEATABLE | Self::MOB_POSTABLE;

    pub fn contains(self, bit: u64) -> bool {
        self.0 & bit == bit
    }

    pub fn unknown_bits(self) -> u64 {
        self.0 & !Self::KNOWN
    }

    /// Render back to the letter form used by the record file.
    pub fn to_letters(self) -> String {
        if self.0 == 0 {
            return "0".to_string();
        }
        let mut out = String::new();
        for bit in 0..52u32 {
            if self.0 & (1u64 << bit) != 0 {
                let ch = if bit < 26 {
                    (b'a' + bit as u8) as char
                } else {
                    (b'A' + (bit - 26) as u8) as char
                };
                out.push(ch);
            }
        }
        out
    }
}

/// Chain links of a quest definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLinks {
    pub previous: Option<QuestId>,
    pub next: Option<QuestId>,
    pub prerequisite_item: Option<ObjVnum>,
}

/// What a holder receives on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBundle {
    pub points: i32,
    pub gold: i32,
    pub experience: i32,
    pub item: Option<ObjVnum>,
}

/// Countdown of an active quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeLimit {
    Unlimited,
    Ticks(u32),
}

impl TimeLimit {
    pub fn from_raw(raw: i32) -> Self {
        match u32::try_from(raw) {
            Ok(ticks) if ticks > 0 => TimeLimit::Ticks(ticks),
            _ => TimeLimit::Unlimited,
        }
    }

    pub fn is_limited(self) -> bool {
        matches!(self, TimeLimit::Ticks(_))
    }
}

/// Immutable quest definition, as loaded from the record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: QuestId,
    pub name: String,
    pub description: String,
    /// Shown when the quest is accepted and on `quest progress`.
    pub info: String,
    pub completion_text: String,
    pub quit_text: String,
    pub kind: QuestType,
    pub questmaster: MobVnum,
    pub flags: QuestFlags,
    /// Object, room or NPC template id depending on `kind`.
    pub target: i32,
    pub links: QuestLinks,
    pub values: [i32; QUEST_VALUE_SLOTS],
    pub reward: RewardBundle,
}

impl QuestDefinition {
    pub fn points(&self) -> i32 {
        self.values[0]
    }

    pub fn quit_penalty(&self) -> i32 {
        self.values[1]
    }

    pub fn min_level(&self) -> i32 {
        self.values[2]
    }

    pub fn max_level(&self) -> i32 {
        self.values[3]
    }

    pub fn time_limit(&self) -> TimeLimit {
        TimeLimit::from_raw(self.values[4])
    }

    /// NPC template that originally asked for an object back.
    pub fn return_mob(&self) -> Option<MobVnum> {
        MobVnum::from_raw(self.values[5])
    }

    pub fn quantity(&self) -> u32 {
        u32::try_from(self.values[6]).unwrap_or(0).max(1)
    }

    pub fn is_repeatable(&self) -> bool {
        self.flags.contains(QuestFlags::REPEATABLE)
    }

    pub fn is_mob_postable(&self) -> bool {
        self.flags.contains(QuestFlags::MOB_POSTABLE)
    }

    pub fn level_allows(&self, level: i32) -> bool {
        level >= self.min_level() && level <= self.max_level()
    }

    pub fn target_obj(&self) -> ObjVnum {
        ObjVnum(self.target)
    }

    pub fn target_room(&self) -> RoomVnum {
        RoomVnum(self.target)
    }

    pub fn target_mob(&self) -> MobVnum {
        MobVnum(self.target)
    }
}

/// An in-progress quest held by a player or an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuest {
    pub id: QuestId,
    pub time_left: TimeLimit,
    pub remaining: u32,
}

impl ActiveQuest {
    pub fn start(def: &QuestDefinition) -> Self {
        Self {
            id: def.id,
            time_left: def.time_limit(),
            remaining: def.quantity(),
        }
    }
}

/// Result of counting one tick off an active quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running,
    Expired,
}

fn tick_active(active: &mut Option<ActiveQuest>) -> TickOutcome {
    match active {
        Some(ActiveQuest {
            time_left: TimeLimit::Ticks(ticks),
            ..
        }) => {
            *ticks = ticks.saturating_sub(1);
            if *ticks == 0 {
                TickOutcome::Expired
            } else {
                TickOutcome::Running
            }
        }
        _ => TickOutcome::Idle,
    }
}

/// Quest slot and history embedded in a player record.
///
/// With no active quest the remaining time reads as [`TimeLimit::Unlimited`]
/// and the objective count as zero. The representation makes any other
/// combination unreachable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerQuestState {
    #[serde(default)]
    active: Option<ActiveQuest>,
    /// Insertion ordered, duplicate free.
    #[serde(default)]
    completed: Vec<QuestId>,
    #[serde(default)]
    points: i64,
}

impl PlayerQuestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveQuest> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<QuestId> {
        self.active.map(|a| a.id)
    }

    pub fn time_left(&self) -> TimeLimit {
        self.active.map_or(TimeLimit::Unlimited, |a| a.time_left)
    }

    pub fn remaining(&self) -> u32 {
        self.active.map_or(0, |a| a.remaining)
    }

    pub fn activate(&mut self, def: &QuestDefinition) {
        self.active = Some(ActiveQuest::start(def));
    }

    pub fn clear(&mut self) -> Option<QuestId> {
        self.active.take().map(|a| a.id)
    }

    /// Count one objective off. Returns what is left.
    pub fn decrement(&mut self) -> u32 {
        match self.active.as_mut() {
            Some(active) => {
                active.remaining = active.remaining.saturating_sub(1);
                active.remaining
            }
            None => 0,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        tick_active(&mut self.active)
    }

    pub fn completed(&self) -> &[QuestId] {
        &self.completed
    }

    pub fn is_completed(&self, id: QuestId) -> bool {
        self.completed.contains(&id)
    }

    /// Returns false when `id` was already recorded.
    pub fn mark_completed(&mut self, id: QuestId) -> bool {
        if self.is_completed(id) {
            return false;
        }
        self.completed.push(id);
        true
    }

    pub fn forget_completed(&mut self, id: QuestId) -> bool {
        let before = self.completed.len();
        self.completed.retain(|q| *q != id);
        self.completed.len() != before
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn add_points(&mut self, delta: i64) {
        self.points = self.points.saturating_add(delta);
    }
}

/// Quest slot of an NPC with AI enabled. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MobQuestState {
    active: Option<ActiveQuest>,
    overdue: bool,
}

impl MobQuestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveQuest> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<QuestId> {
        self.active.map(|a| a.id)
    }

    pub fn remaining(&self) -> u32 {
        self.active.map_or(0, |a| a.remaining)
    }

    pub fn time_left(&self) -> TimeLimit {
        self.active.map_or(TimeLimit::Unlimited, |a| a.time_left)
    }

    pub fn activate(&mut self, def: &QuestDefinition) {
        self.active = Some(ActiveQuest::start(def));
        self.overdue = false;
    }

    pub fn clear(&mut self) -> Option<QuestId> {
        self.overdue = false;
        self.active.take().map(|a| a.id)
    }

    pub fn decrement(&mut self) -> u32 {
        match self.active.as_mut() {
            Some(active) => {
                active.remaining = active.remaining.saturating_sub(1);
                active.remaining
            }
            None => 0,
        }
    }

    /// Counts the timer down. An expired timer only raises the overdue mark,
    /// and an overdue quest reports `Expired` just once.
    pub fn tick(&mut self) -> TickOutcome {
        if self.overdue {
            return TickOutcome::Running;
        }
        let outcome = tick_active(&mut self.active);
        if outcome == TickOutcome::Expired {
            self.overdue = true;
        }
        outcome
    }

    pub fn is_overdue(&self) -> bool {
        self.overdue
    }
}

/// Personality and standing of an NPC, owned by the host's NPC AI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcTraits {
    pub quest_tendency: i32,
    pub adventurer_tendency: i32,
    pub bravery: i32,
    pub roaming: i32,
    pub group: i32,
    pub reputation: i32,
}

impl NpcTraits {
    pub fn clamp_all(&mut self) {
        for value in [
            &mut self.quest_tendency,
            &mut self.adventurer_tendency,
            &mut self.bravery,
            &mut self.roaming,
            &mut self.group,
            &mut self.reputation,
        ] {
            *value = (*value).clamp(0, TRAIT_MAX);
        }
    }
}
