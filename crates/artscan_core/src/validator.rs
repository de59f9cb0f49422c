use std::cmp::Ordering;

use tracing::debug;

use crate::stat::{StatValue, cmp_magnitude, format_magnitude};
use crate::tables::{ReferenceTables, base_roll_counts};

/// Decides whether a secondary-stat multiset is reachable under the
/// game's generation rules: a rarity-dependent number of initial rolls
/// plus one extra roll every four levels, each roll drawn from a small
/// per-kind value set. Given only the on-screen sums, this inverts that
/// process and checks whether any assignment of roll counts to stats
/// fits the budget. A single misread OCR digit very often makes the
/// value inexpressible, so this doubles as an integrity check.
pub fn reachable(
    rarity: u8,
    level: u32,
    substats: &[StatValue],
    tables: &ReferenceTables,
) -> bool {
    let upgrades = (level / 4) as usize;

    let mut possibility_sets = Vec::with_capacity(substats.len());
    for stat in substats {
        let Some(rolls) = tables.roll_values(rarity, stat.kind()) else {
            debug!(stat = %stat, rarity, "no roll table for substat kind");
            return false;
        };
        let candidates = roll_count_candidates(stat, rolls, upgrades);
        if candidates.is_empty() {
            debug!(stat = %stat, rarity, level, "substat admits no roll decomposition");
            return false;
        }
        possibility_sets.push(candidates);
    }

    admissible_total_exists(&possibility_sets, upgrades, base_roll_counts(rarity))
}

/// Roll counts `n` for which the stat's magnitude is exactly expressible
/// as a sum of `n` single-roll values (with repetition), judged on the
/// rendered string.
fn roll_count_candidates(stat: &StatValue, rolls: &[f64], upgrades: usize) -> Vec<usize> {
    if rolls.is_empty() {
        return Vec::new();
    }
    // The early cutoff below relies on the minimum achievable sum
    // growing with n, which holds only while every single-roll
    // magnitude is non-negative.
    debug_assert!(rolls[0] >= 0.0);

    let kind = stat.kind();
    let target = stat.formatted();
    let min_roll = rolls[0];
    let max_roll = rolls[rolls.len() - 1];

    let mut candidates = Vec::new();
    for n in 1..=upgrades + 1 {
        // Too few rolls to reach this magnitude.
        if cmp_magnitude(kind, stat.magnitude(), max_roll * n as f64) == Ordering::Greater {
            continue;
        }
        // Even the smallest rolls overshoot; larger n only overshoots more.
        if cmp_magnitude(kind, stat.magnitude(), min_roll * n as f64) == Ordering::Less {
            break;
        }
        let hit = achievable_sums(rolls, n)
            .iter()
            .any(|&sum| format_magnitude(kind, sum) == target);
        if hit {
            candidates.push(n);
        }
    }
    candidates
}

/// All sums of `n` values drawn with repetition from `rolls`, built by
/// iterated accumulation. Bounded by `rolls.len()^n`, which stays tiny
/// for this domain (at most 4 roll values, n at most 6).
fn achievable_sums(rolls: &[f64], n: usize) -> Vec<f64> {
    let mut sums = vec![0.0];
    for _ in 0..n {
        let mut next = Vec::with_capacity(sums.len() * rolls.len());
        for &roll in rolls {
            for &sum in &sums {
                next.push(roll + sum);
            }
        }
        sums = next;
    }
    sums
}

/// Walks the Cartesian product of the per-stat possibility sets and
/// accepts as soon as one combination's total roll count, less the
/// level-granted upgrades, lands on a legal creation-time roll count.
fn admissible_total_exists(
    sets: &[Vec<usize>],
    upgrades: usize,
    base_counts: &[usize],
) -> bool {
    if base_counts.is_empty() {
        return false;
    }

    let mut indices = vec![0usize; sets.len()];
    loop {
        let total: usize = sets.iter().zip(&indices).map(|(set, &i)| set[i]).sum();
        if total >= upgrades && base_counts.contains(&(total - upgrades)) {
            return true;
        }

        // Odometer advance; done once every position has wrapped.
        let mut pos = sets.len();
        loop {
            if pos == 0 {
                return false;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < sets[pos].len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}
