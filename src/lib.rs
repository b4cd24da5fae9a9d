//! # Mudquest - Quest Engine for Text MUD Servers
//!
//! Mudquest implements the quest subsystem of a persistent multiplayer text
//! game: quest definitions loaded from a record file, per-player and per-NPC
//! quest progress, event-driven completion triggers, rewards with a timed
//! global bonus, and NPCs that stand in as temporary questmasters when their
//! real questmaster is out of reach.
//!
//! ## Features
//!
//! - **Record File Loader**: Strict reader for the classic `#id` / `~` / `S` quest format. Any malformed record is fatal.
//! - **Nine Quest Types**: Object, room and mob find, mob kill and bounty, mob save, object return, room clear and player kill.
//! - **Player Tracker**: `quest list|history|join|leave|progress|status` with level gates, prerequisites and chained quests.
//! - **NPC Quest AI**: Capability scoring from personality traits, probabilistic acceptance and reputation effects.
//! - **Temporary Questmasters**: Capacity-bounded per-NPC quest lists with their own save file.
//! - **Happy Hour**: Independent timed percentage bonuses for points, gold and experience.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mudquest::config::Config;
//! use mudquest::quest::{MemoryWorld, QuestEngine};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("mudquest.toml")?;
//!     let mut engine = QuestEngine::boot(&config)?;
//!
//!     // The host game implements `World`; the in-memory one works for tools.
//!     let mut world = MemoryWorld::new();
//!     engine.load_temp_questmasters(&world, &config.quests.temp_questmasters)?;
//!     engine.tick(&mut world);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`quest`] - The quest engine and the `World` collaborator contract
//! - [`config`] - Configuration management
//! - [`logutil`] - Single-line escaping of quest text for logs

pub mod config;
pub mod logutil;
pub mod quest;
