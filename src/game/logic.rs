//! IdleSmith game rules — pure functions, fully testable.
//!
//! Every mutation here is atomic on the whole `SaveState`: a purchase either
//! deducts gold and bumps the level together, or does nothing.

use super::state::{SaveState, UpgradeKind};

/// Minimum gold required before prestige becomes available.
pub const PRESTIGE_THRESHOLD: f64 = 50_000.0;
/// Essence gained = floor(sqrt(gold / ESSENCE_DIVISOR)).
pub const ESSENCE_DIVISOR: f64 = 5_000.0;
/// Offline progress is credited for at most 8 hours.
pub const OFFLINE_CAP_SECS: f64 = 28_800.0;

/// Cost of buying `kind` when it is currently at `level`.
/// Strictly increasing in level since every cost_mult > 1.
pub fn upgrade_cost(kind: UpgradeKind, level: u32) -> f64 {
    (kind.base_cost() * kind.cost_mult().powi(level as i32)).floor()
}

/// One manual strike: earn the current click value.
pub fn click(save: &mut SaveState) {
    save.gold += save.derived().click;
}

/// Buy one level of `kind`. Returns false (and changes nothing) when gold
/// is insufficient — callers treat that as a disabled button, not an error.
pub fn buy_upgrade(save: &mut SaveState, kind: UpgradeKind) -> bool {
    let cost = upgrade_cost(kind, save.upgrades.level(kind));
    if save.gold < cost {
        return false;
    }
    save.gold -= cost;
    *save.upgrades.level_mut(kind) += 1;
    true
}

/// Apply `seconds` whole seconds of passive income and stamp `last_tick`.
pub fn advance_seconds(save: &mut SaveState, seconds: u32, now_ms: f64) {
    if seconds == 0 {
        return;
    }
    save.gold += seconds as f64 * save.income_per_sec();
    save.last_tick = now_ms;
}

/// Credit income for time elapsed while the game was closed.
///
/// Runs once at startup. The whole offline window is valued at the
/// *post-load* rates, capped at 8 hours. Returns the seconds credited
/// (0.0 when the gap was too short or there was no passive income),
/// which the UI uses for the welcome-back recap.
pub fn apply_offline_progress(save: &mut SaveState, now_ms: f64) -> f64 {
    let delta_sec = ((now_ms - save.last_tick) / 1000.0).clamp(0.0, OFFLINE_CAP_SECS);
    let rate = save.income_per_sec();
    if delta_sec <= 1.0 || rate <= 0.0 {
        return 0.0;
    }
    save.gold += delta_sec * rate;
    save.last_tick = now_ms;
    delta_sec
}

/// Essence that a prestige at the given gold balance would grant.
pub fn essence_gain(gold: f64) -> f64 {
    (gold / ESSENCE_DIVISOR).sqrt().floor()
}

/// Whether prestige is currently available.
pub fn can_prestige(save: &SaveState) -> bool {
    save.gold >= PRESTIGE_THRESHOLD && essence_gain(save.gold) > 0.0
}

/// Reset all progress in exchange for essence. Keeps only the prestige
/// counters; everything else reverts to defaults. Returns the essence
/// gained, or 0.0 if not eligible (state unchanged).
pub fn perform_prestige(save: &mut SaveState, now_ms: f64) -> f64 {
    if !can_prestige(save) {
        return 0.0;
    }
    let gain = essence_gain(save.gold);

    let mut fresh = SaveState::new(now_ms);
    fresh.prestige.count = save.prestige.count + 1;
    fresh.prestige.essence = save.prestige.essence + gain;
    *save = fresh;
    gain
}

/// Destroy everything, including prestige progress.
pub fn hard_reset(save: &mut SaveState, now_ms: f64) {
    *save = SaveState::new(now_ms);
}

/// Format a gold amount with thousands separators and at most one decimal.
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    let int_part = n.floor() as u64;
    let frac = n - int_part as f64;

    let s = int_part.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let result: String = result.chars().rev().collect();

    if frac > 0.05 {
        format!("{}.{}", result, ((frac * 10.0).round() as u8))
    } else {
        result
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_upgrade_kind() -> impl Strategy<Value = UpgradeKind> {
        prop_oneof![
            Just(UpgradeKind::Hammer),
            Just(UpgradeKind::Anvil),
            Just(UpgradeKind::Forge),
            Just(UpgradeKind::Apprentice),
        ]
    }

    // ── cost curve properties ─────────────────────────────

    proptest! {
        #[test]
        fn prop_upgrade_cost_always_positive(
            kind in arb_upgrade_kind(),
            level in 0u32..120,
        ) {
            prop_assert!(upgrade_cost(kind, level) > 0.0);
        }

        #[test]
        fn prop_upgrade_cost_strictly_increases(
            kind in arb_upgrade_kind(),
            level in 0u32..119,
        ) {
            let a = upgrade_cost(kind, level);
            let b = upgrade_cost(kind, level + 1);
            prop_assert!(b > a, "cost did not increase: {} -> {}", a, b);
        }

        #[test]
        fn prop_upgrade_cost_is_whole_gold(
            kind in arb_upgrade_kind(),
            level in 0u32..120,
        ) {
            let c = upgrade_cost(kind, level);
            prop_assert!((c - c.floor()).abs() < f64::EPSILON);
        }
    }

    // ── purchase atomicity ────────────────────────────────

    proptest! {
        #[test]
        fn prop_buy_fails_without_funds(kind in arb_upgrade_kind()) {
            let mut save = SaveState::default();
            save.gold = 0.0;
            prop_assert!(!buy_upgrade(&mut save, kind));
            prop_assert_eq!(save.upgrades.level(kind), 0);
        }

        #[test]
        fn prop_buy_never_leaves_negative_gold(
            kind in arb_upgrade_kind(),
            gold in 0.0f64..1e9,
            level in 0u32..50,
        ) {
            let mut save = SaveState::default();
            save.gold = gold;
            *save.upgrades.level_mut(kind) = level;
            let level_before = save.upgrades.level(kind);
            let gold_before = save.gold;

            let bought = buy_upgrade(&mut save, kind);
            prop_assert!(save.gold >= 0.0, "gold went negative: {}", save.gold);
            if bought {
                prop_assert_eq!(save.upgrades.level(kind), level_before + 1);
                let cost = upgrade_cost(kind, level_before);
                prop_assert!((save.gold - (gold_before - cost)).abs() < 1e-6);
            } else {
                // no partial purchase
                prop_assert_eq!(save.upgrades.level(kind), level_before);
                prop_assert!((save.gold - gold_before).abs() < f64::EPSILON);
            }
        }
    }

    // ── income properties ─────────────────────────────────

    proptest! {
        #[test]
        fn prop_advance_income_proportional_to_seconds(
            anvil in 1u32..50,
            secs in 1u32..100,
        ) {
            let mut s1 = SaveState::default();
            s1.upgrades.anvil = anvil;
            let mut s2 = s1.clone();

            advance_seconds(&mut s1, secs, 0.0);
            advance_seconds(&mut s2, secs * 2, 0.0);
            prop_assert!((s2.gold / s1.gold - 2.0).abs() < 1e-9);
        }

        #[test]
        fn prop_offline_credit_never_exceeds_cap(
            gap_secs in 0.0f64..1e7,
            anvil in 0u32..50,
            apprentice in 0u32..10,
        ) {
            let now = 1e12;
            let mut save = SaveState::default();
            save.upgrades.anvil = anvil;
            save.upgrades.apprentice = apprentice;
            save.last_tick = now - gap_secs * 1000.0;

            let rate = save.income_per_sec();
            apply_offline_progress(&mut save, now);
            prop_assert!(
                save.gold <= OFFLINE_CAP_SECS * rate + 1e-6,
                "credited more than the 8h cap: {}", save.gold
            );
        }
    }

    // ── prestige properties ───────────────────────────────

    proptest! {
        #[test]
        fn prop_essence_gain_monotone_in_gold(gold in 0.0f64..1e9) {
            prop_assert!(essence_gain(gold + ESSENCE_DIVISOR) >= essence_gain(gold));
        }

        #[test]
        fn prop_prestige_below_threshold_never_fires(gold in 0.0f64..49_999.0) {
            let mut save = SaveState::default();
            save.gold = gold;
            let before = save.clone();
            prop_assert!((perform_prestige(&mut save, 0.0) - 0.0).abs() < 1e-9);
            prop_assert_eq!(save, before);
        }

        #[test]
        fn prop_prestige_accumulates_essence(gold in 50_000.0f64..1e9) {
            let mut save = SaveState::default();
            save.gold = gold;
            save.prestige.essence = 7.0;
            let gain = perform_prestige(&mut save, 0.0);
            prop_assert!(gain >= 3.0);
            prop_assert!((save.prestige.essence - (7.0 + gain)).abs() < 1e-9);
            prop_assert_eq!(save.prestige.count, 1);
            prop_assert!((save.gold - 0.0).abs() < f64::EPSILON);
        }
    }

    // ── format_number properties ──────────────────────────

    proptest! {
        #[test]
        fn prop_format_number_no_panic(n in -1e12f64..1e12) {
            let _ = format_number(n);
        }

        #[test]
        fn prop_format_number_commas_at_correct_positions(int_val in 0u64..1_000_000_000) {
            let s = format_number(int_val as f64);
            let stripped: String = s.chars().filter(|c| *c != ',').collect();
            prop_assert_eq!(stripped, int_val.to_string());
        }
    }
}
