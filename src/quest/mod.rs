//! Quest engine for a text MUD server.
//!
//! Definitions are loaded once at boot into a [`QuestRegistry`]; players and
//! AI-enabled NPCs hold quests by stable id; game event hooks feed
//! [`evaluate`]; rewards go through [`grant`] with the happy-hour bonus; and
//! NPCs whose questmaster is out of reach become [`TempQuestmasters`].
//! Everything is reached through one [`QuestEngine`] context and the host's
//! [`World`] implementation.

pub mod behavior;
pub mod commands;
pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod memory_world;
pub mod npc_ai;
pub mod parser;
pub mod registry;
pub mod reward;
pub mod temp_questmaster;
pub mod tracker;
pub mod types;
pub mod world;

pub use behavior::{Behavior, BehaviorCall, BehaviorTable};
pub use commands::{handle_quest_command, QuestCommand};
pub use engine::{QuestEngine, TickReport};
pub use errors::QuestError;
pub use evaluator::evaluate;
pub use memory_world::MemoryWorld;
pub use npc_ai::{capability, should_accept, NpcAiSettings};
pub use parser::parse_quests;
pub use registry::QuestRegistry;
pub use reward::{grant, Bonus, Granted, HappyHour, RewardCategory};
pub use temp_questmaster::{PostOutcome, TempQuestmasters, MAX_TEMP_QUESTS};
pub use tracker::JoinRejection;
pub use types::*;
pub use world::{CharId, ObjId, World};
