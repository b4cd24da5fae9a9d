//! Reward dispensing and the timed global "happy hour" bonus.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::quest::types::RewardBundle;
use crate::quest::world::{CharId, ObjId, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardCategory {
    Points,
    Gold,
    Experience,
}

impl RewardCategory {
    pub fn label(self) -> &'static str {
        match self {
            RewardCategory::Points => "quest point",
            RewardCategory::Gold => "gold",
            RewardCategory::Experience => "experience",
        }
    }
}

/// One category's bonus: a percentage and the ticks it stays on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    #[serde(default)]
    pub percent: i32,
    #[serde(default)]
    pub ticks: u32,
}

impl Bonus {
    pub fn is_active(&self) -> bool {
        self.ticks > 0
    }

    /// `floor(base * (100 + percent) / 100)`, never below zero.
    pub fn apply(&self, base: i64) -> i64 {
        let scaled = if self.is_active() {
            (base * (100 + i64::from(self.percent))).div_euclid(100)
        } else {
            base
        };
        scaled.max(0)
    }
}

/// Three independent bonus toggles, each with its own countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HappyHour {
    #[serde(default)]
    pub points: Bonus,
    #[serde(default)]
    pub gold: Bonus,
    #[serde(default)]
    pub experience: Bonus,
}

impl HappyHour {
    pub fn bonus(&self, category: RewardCategory) -> Bonus {
        match category {
            RewardCategory::Points => self.points,
            RewardCategory::Gold => self.gold,
            RewardCategory::Experience => self.experience,
        }
    }

    fn bonus_mut(&mut self, category: RewardCategory) -> &mut Bonus {
        match category {
            RewardCategory::Points => &mut self.points,
            RewardCategory::Gold => &mut self.gold,
            RewardCategory::Experience => &mut self.experience,
        }
    }

    pub fn start(&mut self, category: RewardCategory, percent: i32, ticks: u32) {
        *self.bonus_mut(category) = Bonus { percent, ticks };
    }

    pub fn stop(&mut self, category: RewardCategory) {
        *self.bonus_mut(category) = Bonus::default();
    }

    pub fn is_active(&self, category: RewardCategory) -> bool {
        self.bonus(category).is_active()
    }

    pub fn any_active(&self) -> bool {
        self.points.is_active() || self.gold.is_active() || self.experience.is_active()
    }

    pub fn scale(&self, category: RewardCategory, base: i64) -> i64 {
        self.bonus(category).apply(base)
    }

    /// Count every running bonus down one tick. Returns the categories that
    /// switched off on this tick.
    pub fn tick(&mut self) -> Vec<RewardCategory> {
        let mut ended = Vec::new();
        for category in [
            RewardCategory::Points,
            RewardCategory::Gold,
            RewardCategory::Experience,
        ] {
            let bonus = self.bonus_mut(category);
            if bonus.ticks > 0 {
                bonus.ticks -= 1;
                if bonus.ticks == 0 {
                    bonus.percent = 0;
                    ended.push(category);
                }
            }
        }
        ended
    }
}

/// What a grant actually handed out after bonuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Granted {
    pub points: i64,
    pub gold: i64,
    pub experience: i64,
    pub item: Option<ObjId>,
}

/// Hand a reward bundle to a player or an NPC.
///
/// Quest points and experience only go to players. Gold and the reward item
/// go to either.
pub fn grant(world: &mut dyn World, happy: &HappyHour, holder: CharId, bundle: &RewardBundle) -> Granted {
    let is_player = !world.is_npc(holder);
    let mut granted = Granted::default();

    if is_player {
        granted.points = happy.scale(RewardCategory::Points, i64::from(bundle.points));
        if let Some(state) = world.player_quests_mut(holder) {
            state.add_points(granted.points);
        }
        if granted.points > 0 {
            world.send(
                holder,
                &format!(
                    "You have been awarded {} quest points for your service.",
                    granted.points
                ),
            );
        }
    }

    if bundle.gold > 0 {
        granted.gold = happy.scale(RewardCategory::Gold, i64::from(bundle.gold));
        world.add_gold(holder, granted.gold);
        if is_player {
            world.send(
                holder,
                &format!("You have been awarded {} gold coins for your service.", granted.gold),
            );
        }
    }

    if is_player && bundle.experience > 0 {
        granted.experience = happy.scale(RewardCategory::Experience, i64::from(bundle.experience));
        world.gain_exp(holder, granted.experience);
        world.send(
            holder,
            &format!(
                "You have been awarded {} experience points for your service.",
                granted.experience
            ),
        );
    }

    if let Some(vnum) = bundle.item {
        granted.item = world.load_obj(vnum, holder);
        match granted.item {
            Some(_) if is_player => {
                let name = world
                    .obj_proto_name(vnum)
                    .unwrap_or_else(|| "something".to_string());
                world.send(holder, &format!("You have been awarded {} for your service.", name));
            }
            Some(_) => {}
            None => warn!("Reward object {} could not be loaded for {:?}", vnum, holder),
        }
    }

    debug!("Granted {:?} to {:?}", granted, holder);
    granted
}
