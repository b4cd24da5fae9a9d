//! Ordered behavior handlers per NPC template.
//!
//! Every NPC template may carry several handlers. They run in registration
//! order and the first one that claims a command stops the chain. The quest
//! dispatcher is appended by [`QuestRegistry::bind`](crate::quest::QuestRegistry::bind),
//! so any handler the host registered earlier keeps precedence.

use std::collections::HashMap;
use std::fmt;

use crate::quest::types::MobVnum;
use crate::quest::world::{CharId, World};

/// Arguments handed to a custom behavior.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorCall<'a> {
    pub npc: CharId,
    pub actor: CharId,
    pub command: &'a str,
}

/// Host supplied handler. Returns true when it consumed the command.
pub type CustomBehavior = Box<dyn FnMut(&mut dyn World, BehaviorCall<'_>) -> bool>;

pub enum Behavior {
    Custom(CustomBehavior),
    /// Answers `quest list` and `quest join` on behalf of the NPC.
    Questmaster,
}

impl Behavior {
    pub fn custom<F>(handler: F) -> Self
    where
        F: FnMut(&mut dyn World, BehaviorCall<'_>) -> bool + 'static,
    {
        Behavior::Custom(Box::new(handler))
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Custom(_) => f.write_str("Custom(..)"),
            Behavior::Questmaster => f.write_str("Questmaster"),
        }
    }
}

#[derive(Debug, Default)]
pub struct BehaviorTable {
    handlers: HashMap<MobVnum, Vec<Behavior>>,
}

impl BehaviorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, vnum: MobVnum, behavior: Behavior) {
        self.handlers.entry(vnum).or_default().push(behavior);
    }

    /// Append the quest dispatcher once per template.
    pub fn install_questmaster(&mut self, vnum: MobVnum) -> bool {
        let list = self.handlers.entry(vnum).or_default();
        if list.iter().any(|b| matches!(b, Behavior::Questmaster)) {
            return false;
        }
        list.push(Behavior::Questmaster);
        true
    }

    /// Drop every quest dispatcher, keeping custom handlers. Used on reload.
    pub fn clear_questmasters(&mut self) {
        for list in self.handlers.values_mut() {
            list.retain(|b| !matches!(b, Behavior::Questmaster));
        }
        self.handlers.retain(|_, list| !list.is_empty());
    }

    pub fn is_questmaster(&self, vnum: MobVnum) -> bool {
        self.handlers
            .get(&vnum)
            .is_some_and(|list| list.iter().any(|b| matches!(b, Behavior::Questmaster)))
    }

    pub fn handlers(&self, vnum: MobVnum) -> &[Behavior] {
        self.handlers.get(&vnum).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Detach a template's handlers so they can run while the caller holds
    /// the rest of the engine mutably. Pair with [`BehaviorTable::restore`].
    pub(crate) fn take(&mut self, vnum: MobVnum) -> Vec<Behavior> {
        self.handlers.remove(&vnum).unwrap_or_default()
    }

    /// Put detached handlers back in front of anything registered meanwhile.
    pub(crate) fn restore(&mut self, vnum: MobVnum, mut detached: Vec<Behavior>) {
        if detached.is_empty() {
            return;
        }
        if let Some(added) = self.handlers.remove(&vnum) {
            detached.extend(added);
        }
        self.handlers.insert(vnum, detached);
    }
}
