//! Temporary questmasters.
//!
//! An NPC that posts a quest while its real questmaster is out of reach
//! keeps offering that quest itself. The assignment is per NPC instance and
//! survives restarts through a small text file:
//!
//! ```text
//! # comment
//! <npc_template> <room|-1> <count> <quest ids...>
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use log::{debug, error, info, warn};

use crate::logutil::escape_log;
use crate::quest::errors::QuestError;
use crate::quest::registry::QuestRegistry;
use crate::quest::types::{MobVnum, QuestId, RoomVnum};
use crate::quest::world::{CharId, World};

/// Most quests one temporary questmaster can hold.
pub const MAX_TEMP_QUESTS: usize = 10;

/// Result of an NPC posting a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// The real questmaster is reachable and already offers the quest.
    Delivered,
    /// The NPC is walking to its questmaster.
    EnRoute,
    /// The NPC now offers the quest as a temporary questmaster.
    Posted,
}

/// Whether `npc` can get to `questmaster`. Both must stand in rooms of the
/// same zone. Anything undecidable counts as unreachable.
pub fn questmaster_reachable(world: &dyn World, npc: CharId, questmaster: MobVnum) -> bool {
    let Some(qm) = world.find_mob(questmaster) else {
        return false;
    };
    let zone = |ch: CharId| world.room_of(ch).and_then(|room| world.zone_of(room));
    match (zone(npc), zone(qm)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Temporary quest lists keyed by NPC instance. An NPC is a temporary
/// questmaster exactly while it has an entry here.
#[derive(Debug, Default)]
pub struct TempQuestmasters {
    assignments: BTreeMap<CharId, Vec<QuestId>>,
}

impl TempQuestmasters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_temp(&self, npc: CharId) -> bool {
        self.assignments.contains_key(&npc)
    }

    pub fn quests(&self, npc: CharId) -> &[QuestId] {
        self.assignments
            .get(&npc)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CharId, &[QuestId])> {
        self.assignments.iter().map(|(npc, quests)| (*npc, quests.as_slice()))
    }

    /// Append `quest` to the NPC's list. Returns false if it was already
    /// there. A full list or a failed allocation leaves the list untouched.
    pub fn add(&mut self, npc: CharId, quest: QuestId) -> Result<bool, QuestError> {
        let list = self.assignments.entry(npc).or_default();
        if list.contains(&quest) {
            return Ok(false);
        }
        if list.len() >= MAX_TEMP_QUESTS {
            return Err(QuestError::TempListFull(MAX_TEMP_QUESTS));
        }
        if let Err(e) = list.try_reserve(1) {
            error!("Could not grow temporary quest list of {:?}: {}", npc, e);
            if list.is_empty() {
                self.assignments.remove(&npc);
            }
            return Err(e.into());
        }
        list.push(quest);
        Ok(true)
    }

    /// Drop `quest` from the NPC's list. The last removal ends the NPC's
    /// temporary questmaster status.
    pub fn remove(&mut self, npc: CharId, quest: QuestId) -> bool {
        let Some(list) = self.assignments.get_mut(&npc) else {
            return false;
        };
        let before = list.len();
        list.retain(|q| *q != quest);
        let removed = list.len() != before;
        if list.is_empty() {
            self.assignments.remove(&npc);
        }
        removed
    }

    /// Forget an NPC entirely, e.g. when it is extracted from the world.
    pub fn forget(&mut self, npc: CharId) -> bool {
        self.assignments.remove(&npc).is_some()
    }

    /// Apply the posting rule for a mob-originated quest.
    pub fn post(
        &mut self,
        registry: &QuestRegistry,
        world: &mut dyn World,
        npc: CharId,
        quest: QuestId,
    ) -> Result<PostOutcome, QuestError> {
        let def = registry.by_id(quest).ok_or(QuestError::NotFound(quest))?;
        if !def.is_mob_postable() {
            return Err(QuestError::NotPostable(quest));
        }
        if world.is_en_route_to(npc, def.questmaster) {
            return Ok(PostOutcome::EnRoute);
        }
        if questmaster_reachable(world, npc, def.questmaster) {
            return Ok(PostOutcome::Delivered);
        }

        if self.add(npc, quest)? {
            let name = world.name(npc);
            if let Some(room) = world.room_of(npc) {
                world.send_room(room, &format!("{} has a quest to offer: {}", name, def.name));
            }
            info!(
                "{} became a temporary questmaster for quest {} ({})",
                escape_log(&name),
                quest,
                escape_log(&def.name)
            );
        }
        Ok(PostOutcome::Posted)
    }

    /// Render the save file. NPCs no longer in the world are skipped.
    pub fn save_string(&self, world: &dyn World) -> String {
        let mut out = String::from("# Temporary questmaster assignments\n");
        out.push_str("# <npc_template> <room|-1> <count> <quest ids...>\n");
        for (npc, quests) in &self.assignments {
            let Some(vnum) = world.mob_vnum(*npc) else {
                continue;
            };
            out.push_str(&format!(
                "{} {} {}",
                vnum,
                RoomVnum::raw(world.room_of(*npc)),
                quests.len()
            ));
            for id in quests {
                out.push_str(&format!(" {}", id));
            }
            out.push('\n');
        }
        out
    }

    pub fn save<P: AsRef<Path>>(&self, world: &dyn World, path: P) -> Result<usize, QuestError> {
        let path = path.as_ref();
        let text = self.save_string(world);
        let count = text.lines().filter(|l| !l.starts_with('#')).count();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, text)?;
        info!("Saved {} temporary questmasters to {}", count, path.display());
        Ok(count)
    }

    /// Restore assignments from save file text, matching each line to the
    /// first live NPC of the template (and room, when given) that is not
    /// already assigned. Lines that match nobody are dropped.
    pub fn load_str(&mut self, world: &dyn World, src: &str) -> usize {
        let mut restored = 0;
        for (line_no, line) in src.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(entry) = parse_line(line) else {
                warn!("Skipping malformed temporary questmaster line {}: {}", line_no + 1, escape_log(line));
                continue;
            };
            let candidate = world.npcs().into_iter().find(|npc| {
                world.mob_vnum(*npc) == Some(entry.vnum)
                    && !self.is_temp(*npc)
                    && entry.room.map_or(true, |room| world.room_of(*npc) == Some(room))
            });
            let Some(npc) = candidate else {
                debug!("No live NPC {} for temporary questmaster line {}", entry.vnum, line_no + 1);
                continue;
            };
            let mut quests = entry.quests;
            let mut seen = HashSet::new();
            quests.retain(|q| seen.insert(*q));
            if quests.len() > MAX_TEMP_QUESTS {
                warn!("Temporary questmaster {} lists {} quests; keeping {}", entry.vnum, quests.len(), MAX_TEMP_QUESTS);
                quests.truncate(MAX_TEMP_QUESTS);
            }
            if quests.is_empty() {
                continue;
            }
            self.assignments.insert(npc, quests);
            restored += 1;
        }
        restored
    }

    /// Load the save file. A missing file restores nothing.
    pub fn load<P: AsRef<Path>>(&mut self, world: &dyn World, path: P) -> Result<usize, QuestError> {
        let path = path.as_ref();
        let src = match std::fs::read_to_string(path) {
            Ok(src) => src,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No temporary questmaster file at {}", path.display());
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        let restored = self.load_str(world, &src);
        info!("Restored {} temporary questmasters from {}", restored, path.display());
        Ok(restored)
    }
}

/// One parsed save file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAssignment {
    pub vnum: MobVnum,
    pub room: Option<RoomVnum>,
    pub quests: Vec<QuestId>,
}

/// Parse one data line. The count must match the ids that follow.
pub fn parse_line(line: &str) -> Option<SavedAssignment> {
    let mut fields = line.split_whitespace().map(str::parse::<i32>);
    let vnum = MobVnum(fields.next()?.ok()?);
    let room = RoomVnum::from_raw(fields.next()?.ok()?);
    let count = usize::try_from(fields.next()?.ok()?).ok()?;
    let quests = fields
        .map(|f| f.ok().map(QuestId))
        .collect::<Option<Vec<_>>>()?;
    if quests.len() != count {
        return None;
    }
    Some(SavedAssignment { vnum, room, quests })
}

/// Read a save file without a world, for inspection tools.
pub fn read_save_file<P: AsRef<Path>>(path: P) -> Result<Vec<SavedAssignment>, QuestError> {
    let src = std::fs::read_to_string(path)?;
    Ok(src
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(parse_line)
        .collect())
}
