//! Server-lifetime quest engine context.
//!
//! Owns the definition registry, the behavior table, the temporary
//! questmaster lists, the happy-hour toggles and the NPC AI tuning. Every
//! operation takes it explicitly together with the host [`World`].

use std::path::Path;

use log::{debug, info};
use rand::Rng;

use crate::config::Config;
use crate::quest::behavior::{Behavior, BehaviorCall, BehaviorTable};
use crate::quest::commands::{self, QuestCommand};
use crate::quest::errors::QuestError;
use crate::quest::evaluator;
use crate::quest::npc_ai::{self, NpcAiSettings};
use crate::quest::registry::QuestRegistry;
use crate::quest::reward::{HappyHour, RewardCategory};
use crate::quest::temp_questmaster::{PostOutcome, TempQuestmasters};
use crate::quest::tracker;
use crate::quest::types::{QuestId, QuestType};
use crate::quest::world::{CharId, ObjId, World};

/// What one engine tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub expired_players: usize,
    pub overdue_npcs: usize,
    pub happy_hour_ended: Vec<RewardCategory>,
}

#[derive(Debug, Default)]
pub struct QuestEngine {
    registry: QuestRegistry,
    behaviors: BehaviorTable,
    temp: TempQuestmasters,
    happy_hour: HappyHour,
    ai: NpcAiSettings,
}

impl QuestEngine {
    /// Wrap a loaded registry and bind its questmasters.
    pub fn new(registry: QuestRegistry) -> Self {
        Self::with_behaviors(registry, BehaviorTable::new())
    }

    /// Like [`QuestEngine::new`], chaining questmasters behind handlers the
    /// host already registered.
    pub fn with_behaviors(registry: QuestRegistry, mut behaviors: BehaviorTable) -> Self {
        registry.bind(&mut behaviors);
        Self {
            registry,
            behaviors,
            ..Self::default()
        }
    }

    /// Boot from configuration: load definitions (fatal on any error) and
    /// apply the AI tuning and any configured happy hour.
    pub fn boot(config: &Config) -> Result<Self, QuestError> {
        let registry = QuestRegistry::load_file(&config.quests.definitions)?;
        let mut engine = Self::new(registry);
        engine.ai = config.npc_ai;
        engine.happy_hour = config.happy_hour;
        if engine.happy_hour.any_active() {
            info!("Happy hour active at boot: {:?}", engine.happy_hour);
        }
        Ok(engine)
    }

    /// Swap in freshly loaded definitions. On error the current registry
    /// stays in place. Holders of ids that disappeared are cleared lazily.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, QuestError> {
        let registry = QuestRegistry::load_file(path)?;
        self.behaviors.clear_questmasters();
        registry.bind(&mut self.behaviors);
        self.registry = registry;
        info!("Quest definitions reloaded: {}", self.registry.len());
        Ok(self.registry.len())
    }

    pub fn registry(&self) -> &QuestRegistry {
        &self.registry
    }

    pub fn behaviors_mut(&mut self) -> &mut BehaviorTable {
        &mut self.behaviors
    }

    pub fn temp(&self) -> &TempQuestmasters {
        &self.temp
    }

    pub fn temp_mut(&mut self) -> &mut TempQuestmasters {
        &mut self.temp
    }

    pub fn happy_hour(&self) -> &HappyHour {
        &self.happy_hour
    }

    pub fn happy_hour_mut(&mut self) -> &mut HappyHour {
        &mut self.happy_hour
    }

    pub fn ai_settings(&self) -> &NpcAiSettings {
        &self.ai
    }

    pub fn set_ai_settings(&mut self, settings: NpcAiSettings) {
        self.ai = settings;
    }

    /// Quests an NPC offers: its template's permanent quests in file order,
    /// then anything on its temporary list.
    pub fn offered_by(&self, world: &dyn World, npc: CharId) -> Vec<QuestId> {
        let mut offered: Vec<QuestId> = match world.mob_vnum(npc) {
            Some(vnum) => self.registry.for_questmaster(vnum).map(|q| q.id).collect(),
            None => Vec::new(),
        };
        for id in self.temp.quests(npc) {
            if !offered.contains(id) {
                offered.push(*id);
            }
        }
        offered
    }

    pub fn is_questmaster(&self, world: &dyn World, npc: CharId) -> bool {
        self.temp.is_temp(npc)
            || world
                .mob_vnum(npc)
                .is_some_and(|vnum| self.behaviors.is_questmaster(vnum))
    }

    /// Feed one game event to the completion evaluator.
    pub fn trigger<R: Rng + ?Sized>(
        &mut self,
        world: &mut dyn World,
        rng: &mut R,
        actor: CharId,
        other: Option<CharId>,
        object: Option<ObjId>,
        kind: QuestType,
    ) -> bool {
        evaluator::evaluate(self, world, rng, actor, other, object, kind)
    }

    /// Run a player's `quest ...` input. Returns false when the input is not
    /// a quest command.
    pub fn handle_command(&mut self, world: &mut dyn World, player: CharId, input: &str) -> bool {
        match QuestCommand::parse(input) {
            Some(cmd) => {
                commands::handle_quest_command(self, world, player, &cmd);
                true
            }
            None => false,
        }
    }

    /// Offer `command` to the NPC's behavior handlers in order. The first
    /// handler that claims it ends the chain. Temporary questmasters answer
    /// quest commands even without a registered dispatcher.
    pub fn dispatch_behaviors(
        &mut self,
        world: &mut dyn World,
        npc: CharId,
        actor: CharId,
        command: &str,
    ) -> bool {
        let Some(vnum) = world.mob_vnum(npc) else {
            return false;
        };
        let mut handlers = self.behaviors.take(vnum);
        let mut claimed = false;
        let mut answered_as_questmaster = false;
        for handler in handlers.iter_mut() {
            claimed = match handler {
                Behavior::Custom(run) => run(&mut *world, BehaviorCall { npc, actor, command }),
                Behavior::Questmaster => {
                    answered_as_questmaster = true;
                    self.questmaster_behavior(world, npc, actor, command)
                }
            };
            if claimed {
                break;
            }
        }
        self.behaviors.restore(vnum, handlers);

        if !claimed && !answered_as_questmaster && self.temp.is_temp(npc) {
            claimed = self.questmaster_behavior(world, npc, actor, command);
        }
        if claimed {
            debug!("NPC {:?} handled command from {:?}", npc, actor);
        }
        claimed
    }

    fn questmaster_behavior(
        &mut self,
        world: &mut dyn World,
        npc: CharId,
        actor: CharId,
        command: &str,
    ) -> bool {
        if world.is_npc(actor) {
            return false;
        }
        match QuestCommand::parse(command) {
            Some(QuestCommand::List) => {
                tracker::list(self, world, actor, npc);
                true
            }
            Some(QuestCommand::Join(selector)) => {
                match selector {
                    Some(n) => {
                        let _ = tracker::join(self, world, actor, npc, n);
                    }
                    None => world.send(actor, commands::JOIN_USAGE),
                }
                true
            }
            _ => false,
        }
    }

    /// An NPC tries to hand a mob-postable quest to its questmaster.
    pub fn post_mob_quest(
        &mut self,
        world: &mut dyn World,
        npc: CharId,
        quest: QuestId,
    ) -> Result<PostOutcome, QuestError> {
        self.temp.post(&self.registry, world, npc, quest)
    }

    /// An NPC with AI considers taking a quest.
    pub fn offer_to_npc<R: Rng + ?Sized>(
        &mut self,
        world: &mut dyn World,
        rng: &mut R,
        npc: CharId,
        quest: QuestId,
    ) -> Result<bool, QuestError> {
        npc_ai::try_accept(&self.registry, world, rng, npc, quest)
    }

    pub fn complete_npc_quest<R: Rng + ?Sized>(&mut self, world: &mut dyn World, rng: &mut R, npc: CharId) {
        npc_ai::complete(self, world, rng, npc);
    }

    pub fn fail_npc_quest<R: Rng + ?Sized>(
        &mut self,
        world: &mut dyn World,
        rng: &mut R,
        npc: CharId,
        reason: &str,
    ) {
        npc_ai::fail(self, world, rng, npc, reason);
    }

    /// An NPC instance left the world.
    pub fn forget_npc(&mut self, npc: CharId) {
        self.temp.forget(npc);
    }

    /// One server heartbeat.
    pub fn tick(&mut self, world: &mut dyn World) -> TickReport {
        let happy_hour_ended = self.happy_hour.tick();
        for category in &happy_hour_ended {
            let text = format!("The {} happy hour has ended.", category.label());
            for player in world.players() {
                world.send(player, &text);
            }
            info!("Happy hour for {} ended", category.label());
        }
        TickReport {
            expired_players: tracker::timeout_sweep(self, world),
            overdue_npcs: npc_ai::tick_timers(self, world),
            happy_hour_ended,
        }
    }

    pub fn save_temp_questmasters<P: AsRef<Path>>(&self, world: &dyn World, path: P) -> Result<usize, QuestError> {
        self.temp.save(world, path)
    }

    pub fn load_temp_questmasters<P: AsRef<Path>>(&mut self, world: &dyn World, path: P) -> Result<usize, QuestError> {
        self.temp.load(world, path)
    }
}
