//! IdleSmith save state and derived stats.
//!
//! `SaveState` is the single persisted record: everything the game needs to
//! resume is in here, and everything in here is written to localStorage.
//! Transient UI state (active tab, prompts, flashes) lives in `SmithGame`.

use serde::{Deserialize, Serialize};

/// Save format version, written into every save blob.
pub const SAVE_VERSION: u32 = 1;

/// Each hammer level adds this much to gold per click.
pub const HAMMER_CLICK_BONUS: f64 = 1.0;
/// Each anvil level adds this much to gold per second.
pub const ANVIL_GPS_BONUS: f64 = 0.5;
/// Each forge level adds +10% to the global multiplier.
pub const FORGE_MULT_STEP: f64 = 0.1;
/// Each point of essence adds +2% to the global multiplier.
pub const ESSENCE_MULT_STEP: f64 = 0.02;

/// Kinds of purchasable upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    Hammer,
    Anvil,
    Forge,
    Apprentice,
}

impl UpgradeKind {
    /// All upgrade kinds in display order.
    pub fn all() -> &'static [UpgradeKind] {
        &[
            UpgradeKind::Hammer,
            UpgradeKind::Anvil,
            UpgradeKind::Forge,
            UpgradeKind::Apprentice,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            UpgradeKind::Hammer => 0,
            UpgradeKind::Anvil => 1,
            UpgradeKind::Forge => 2,
            UpgradeKind::Apprentice => 3,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            UpgradeKind::Hammer => "Hammer",
            UpgradeKind::Anvil => "Anvil",
            UpgradeKind::Forge => "Forge",
            UpgradeKind::Apprentice => "Apprentice",
        }
    }

    /// One-line effect description for the upgrades panel.
    pub fn description(&self) -> &str {
        match self {
            UpgradeKind::Hammer => "+1 gold per strike",
            UpgradeKind::Anvil => "+0.5 gold per second",
            UpgradeKind::Forge => "+10% all income",
            UpgradeKind::Apprentice => "+1 auto-strike per second",
        }
    }

    /// Cost of the first level.
    pub fn base_cost(&self) -> f64 {
        match self {
            UpgradeKind::Hammer => 10.0,
            UpgradeKind::Anvil => 60.0,
            UpgradeKind::Forge => 300.0,
            UpgradeKind::Apprentice => 1_500.0,
        }
    }

    /// Per-level cost growth factor (all > 1, so costs strictly increase).
    pub fn cost_mult(&self) -> f64 {
        match self {
            UpgradeKind::Hammer => 1.15,
            UpgradeKind::Anvil => 1.18,
            UpgradeKind::Forge => 1.25,
            UpgradeKind::Apprentice => 1.30,
        }
    }

    /// Key to buy (1-4 mapped to upgrade index).
    pub fn key(&self) -> char {
        match self {
            UpgradeKind::Hammer => '1',
            UpgradeKind::Anvil => '2',
            UpgradeKind::Forge => '3',
            UpgradeKind::Apprentice => '4',
        }
    }
}

/// Current level of each upgrade. Serialized under the same keys the
/// browser build used, so old saves import cleanly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeLevels {
    pub hammer: u32,
    pub anvil: u32,
    pub forge: u32,
    pub apprentice: u32,
}

impl UpgradeLevels {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Hammer => self.hammer,
            UpgradeKind::Anvil => self.anvil,
            UpgradeKind::Forge => self.forge,
            UpgradeKind::Apprentice => self.apprentice,
        }
    }

    pub fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Hammer => &mut self.hammer,
            UpgradeKind::Anvil => &mut self.anvil,
            UpgradeKind::Forge => &mut self.forge,
            UpgradeKind::Apprentice => &mut self.apprentice,
        }
    }
}

/// Permanent prestige progress. Survives every reset except a hard reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prestige {
    pub count: u32,
    pub essence: f64,
}

/// The full persisted game state.
///
/// Deserialization is shallow-merge: the container-level `#[serde(default)]`
/// fills any missing field from `SaveState::default()`, so a partial or
/// older save never fails to load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveState {
    pub version: u32,
    /// Spendable currency. Never negative.
    pub gold: f64,
    /// Base gold per click before upgrades. Inert in this version; reserved
    /// for future resources.
    pub gold_per_click_base: f64,
    /// Base gold per second before upgrades. Inert, see above.
    pub gold_per_second_base: f64,
    pub upgrades: UpgradeLevels,
    pub prestige: Prestige,
    /// Wall-clock timestamp (ms since epoch) of the last applied income
    /// tick. Drives the offline-progress credit at startup.
    pub last_tick: f64,
}

impl Default for SaveState {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            gold: 0.0,
            gold_per_click_base: 1.0,
            gold_per_second_base: 0.0,
            upgrades: UpgradeLevels::default(),
            prestige: Prestige::default(),
            last_tick: 0.0,
        }
    }
}

/// Income rates computed from a `SaveState`. Pure function of the save;
/// recomputed on demand rather than cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedStats {
    /// Gold earned per manual strike.
    pub click: f64,
    /// Gold earned per second from passive income.
    pub gps: f64,
    /// Forge × essence multiplier applied to both rates above.
    pub global_mult: f64,
    /// Automatic strikes per second, each worth `click` gold.
    pub auto_clicks_per_sec: f64,
}

impl SaveState {
    /// Fresh save with `last_tick` anchored to the given wall-clock time.
    pub fn new(now_ms: f64) -> Self {
        Self {
            last_tick: now_ms,
            ..Self::default()
        }
    }

    /// Compute current income rates from upgrade levels and essence.
    pub fn derived(&self) -> DerivedStats {
        let hammer_bonus = self.upgrades.hammer as f64 * HAMMER_CLICK_BONUS;
        let anvil_bonus = self.upgrades.anvil as f64 * ANVIL_GPS_BONUS;
        let forge_mult = 1.0 + self.upgrades.forge as f64 * FORGE_MULT_STEP;
        let essence_mult = 1.0 + self.prestige.essence * ESSENCE_MULT_STEP;
        let global_mult = forge_mult * essence_mult;

        DerivedStats {
            click: (self.gold_per_click_base + hammer_bonus) * global_mult,
            gps: (self.gold_per_second_base + anvil_bonus) * global_mult,
            global_mult,
            auto_clicks_per_sec: self.upgrades.apprentice as f64,
        }
    }

    /// Total passive income per second, counting apprentice auto-strikes.
    pub fn income_per_sec(&self) -> f64 {
        let d = self.derived();
        d.gps + d.auto_clicks_per_sec * d.click
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_save_rates() {
        let d = SaveState::default().derived();
        assert!((d.click - 1.0).abs() < 1e-9);
        assert!((d.gps - 0.0).abs() < 1e-9);
        assert!((d.global_mult - 1.0).abs() < 1e-9);
        assert!((d.auto_clicks_per_sec - 0.0).abs() < 1e-9);
    }

    #[test]
    fn hammer_adds_click_power() {
        let mut save = SaveState::default();
        save.upgrades.hammer = 3;
        assert!((save.derived().click - 4.0).abs() < 1e-9); // 1 base + 3
    }

    #[test]
    fn anvil_adds_gps() {
        let mut save = SaveState::default();
        save.upgrades.anvil = 4;
        assert!((save.derived().gps - 2.0).abs() < 1e-9); // 4 × 0.5
    }

    #[test]
    fn forge_multiplies_both_rates() {
        let mut save = SaveState::default();
        save.upgrades.hammer = 1;
        save.upgrades.anvil = 2;
        save.upgrades.forge = 5; // ×1.5
        let d = save.derived();
        assert!((d.click - 3.0).abs() < 1e-9); // (1+1) × 1.5
        assert!((d.gps - 1.5).abs() < 1e-9); // (0+1) × 1.5
    }

    #[test]
    fn essence_compounds_with_forge() {
        let mut save = SaveState::default();
        save.upgrades.forge = 10; // ×2.0
        save.prestige.essence = 50.0; // ×2.0
        assert!((save.derived().global_mult - 4.0).abs() < 1e-9);
    }

    #[test]
    fn apprentice_counts_as_auto_clicks_not_gps() {
        let mut save = SaveState::default();
        save.upgrades.apprentice = 3;
        let d = save.derived();
        assert!((d.auto_clicks_per_sec - 3.0).abs() < 1e-9);
        assert!((d.gps - 0.0).abs() < 1e-9);
        // But auto-strikes do count toward total passive income
        assert!((save.income_per_sec() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn base_rate_fields_are_inert_defaults() {
        let save = SaveState::default();
        assert!((save.gold_per_click_base - 1.0).abs() < 1e-9);
        assert!((save.gold_per_second_base - 0.0).abs() < 1e-9);
    }
}
