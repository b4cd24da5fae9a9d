//! Quest Registry
//!
//! Holds the dense definition array built at boot, the stable-id index over
//! it, and installs the questmaster dispatcher on every quest-giving NPC
//! template.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use log::{info, warn};

use crate::logutil::escape_log;
use crate::quest::behavior::BehaviorTable;
use crate::quest::errors::QuestError;
use crate::quest::parser::parse_quests;
use crate::quest::types::{MobVnum, QuestDefinition, QuestId, QuestIndex};

#[derive(Debug, Default)]
pub struct QuestRegistry {
    quests: Vec<QuestDefinition>,
    index: HashMap<QuestId, QuestIndex>,
}

impl QuestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already parsed definitions. Duplicate ids are rejected.
    pub fn from_definitions(quests: Vec<QuestDefinition>) -> Result<Self, QuestError> {
        let mut index = HashMap::with_capacity(quests.len());
        for (pos, quest) in quests.iter().enumerate() {
            if index.insert(quest.id, QuestIndex(pos)).is_some() {
                return Err(QuestError::parse(0, format!("duplicate quest id {}", quest.id)));
            }
            if quest.flags.unknown_bits() != 0 {
                warn!(
                    "Quest {} ({}) carries unknown flag bits {:#x}",
                    quest.id,
                    escape_log(&quest.name),
                    quest.flags.unknown_bits()
                );
            }
        }
        let registry = Self { quests, index };
        registry.check_links();
        Ok(registry)
    }

    pub fn load_str(src: &str) -> Result<Self, QuestError> {
        Self::from_definitions(parse_quests(src)?)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, QuestError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)?;
        let registry = Self::load_str(&src)?;
        info!("Loaded {} quest definitions from {}", registry.len(), path.display());
        Ok(registry)
    }

    fn check_links(&self) {
        for quest in &self.quests {
            for (label, link) in [("previous", quest.links.previous), ("next", quest.links.next)] {
                if let Some(id) = link {
                    if !self.index.contains_key(&id) {
                        warn!("Quest {} references non-existent {} quest {}", quest.id, label, id);
                    }
                }
            }
        }
    }

    pub fn resolve(&self, id: QuestId) -> Option<QuestIndex> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, index: QuestIndex) -> Option<&QuestDefinition> {
        self.quests.get(index.0)
    }

    pub fn by_id(&self, id: QuestId) -> Option<&QuestDefinition> {
        self.resolve(id).and_then(|idx| self.get(idx))
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestDefinition> {
        self.quests.iter()
    }

    /// Permanent quests of a questmaster template, in file order.
    pub fn for_questmaster(&self, qm: MobVnum) -> impl Iterator<Item = &QuestDefinition> {
        self.quests.iter().filter(move |q| q.questmaster == qm)
    }

    pub fn questmasters(&self) -> BTreeSet<MobVnum> {
        self.quests.iter().map(|q| q.questmaster).collect()
    }

    /// Install the quest dispatcher on every questmaster template, behind any
    /// handler already registered for it. Returns how many were installed.
    pub fn bind(&self, behaviors: &mut BehaviorTable) -> usize {
        let mut installed = 0;
        for qm in self.questmasters() {
            if !behaviors.handlers(qm).is_empty() && !behaviors.is_questmaster(qm) {
                info!("Questmaster {} keeps its existing behavior; quests chained behind it", qm);
            }
            if behaviors.install_questmaster(qm) {
                installed += 1;
            }
        }
        info!("Bound {} questmaster templates", installed);
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::behavior::Behavior;

    const TWO_QUESTS: &str = "#10
First~
d~
i~
c~
q~
0 100 0 1 -1 11 -1
1 0 1 10 -1 -1 1
0 0 -1
S
#11
Second~
d~
i~
c~
q~
1 100 0 2 10 -1 -1
1 0 1 10 -1 -1 1
0 0 -1
S
#20
Elsewhere~
d~
i~
c~
q~
1 200 0 2 -1 -1 -1
1 0 1 10 -1 -1 1
0 0 -1
S
$
";

    #[test]
    fn resolves_ids_to_positions() {
        let registry = QuestRegistry::load_str(TWO_QUESTS).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve(QuestId(11)).map(QuestIndex::get), Some(1));
        assert_eq!(registry.resolve(QuestId(99)), None);
        assert_eq!(registry.by_id(QuestId(20)).unwrap().name, "Elsewhere");
    }

    #[test]
    fn lists_by_questmaster() {
        let registry = QuestRegistry::load_str(TWO_QUESTS).unwrap();
        let ids: Vec<_> = registry.for_questmaster(MobVnum(100)).map(|q| q.id).collect();
        assert_eq!(ids, vec![QuestId(10), QuestId(11)]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let src = TWO_QUESTS.replace("#20", "#10");
        assert!(matches!(QuestRegistry::load_str(&src), Err(QuestError::Parse { .. })));
    }

    #[test]
    fn bind_chains_behind_existing_handlers() {
        let registry = QuestRegistry::load_str(TWO_QUESTS).unwrap();
        let mut behaviors = BehaviorTable::new();
        behaviors.register(MobVnum(200), Behavior::custom(|_, _| false));

        assert_eq!(registry.bind(&mut behaviors), 2);
        let handlers = behaviors.handlers(MobVnum(200));
        assert!(matches!(handlers[0], Behavior::Custom(_)));
        assert!(matches!(handlers[1], Behavior::Questmaster));
        assert_eq!(registry.bind(&mut behaviors), 0);
    }
}
