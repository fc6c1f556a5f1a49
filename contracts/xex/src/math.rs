//! Emission clock and reward curves.
//!
//! Every function here is pure: time, rank and snapshots come in as
//! arguments so the same inputs always produce the same integer result.
//! All divisions floor. Multiplications are checked and return `None` on
//! overflow; callers map that to `Error::Overflow`.

use crate::constants::*;
use crate::types::{EmissionModel, MintInfo};
use primitive_types::U256;

/// `floor(a * b / denominator)` with a 256-bit intermediate product.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let result = U256::from(a) * U256::from(b) / U256::from(denominator);
    if result > U256::from(u128::MAX) {
        return None;
    }
    Some(result.low_u128())
}

// =========================================================================
// EMISSION CLOCK
// =========================================================================

/// Whole days since genesis. A timestamp before genesis counts as day 0.
pub fn elapsed_days(genesis_ts: u64, now: u64) -> u64 {
    now.saturating_sub(genesis_ts) / SECONDS_IN_DAY
}

/// Longest mint term accepted at `now`, in days.
pub fn max_term_days(model: EmissionModel, genesis_ts: u64, now: u64) -> u32 {
    match model {
        EmissionModel::Flat => FLAT_MAX_TERM_DAYS,
        EmissionModel::Decaying => {
            let decay = elapsed_days(genesis_ts, now) / TERM_DECAY_INTERVAL_DAYS;
            let start = MAX_TERM_START_DAYS as u64;
            let floor = MAX_TERM_FLOOR_DAYS as u64;
            // bounded by MAX_TERM_START_DAYS, fits u32
            start.saturating_sub(decay).max(floor) as u32
        }
    }
}

/// Reward amplifier at `now`. Never below `REWARD_AMPLIFIER_END` under the
/// decaying model; 0 under the flat model where it is unused.
pub fn reward_amplifier(model: EmissionModel, genesis_ts: u64, now: u64) -> u64 {
    match model {
        EmissionModel::Flat => 0,
        EmissionModel::Decaying => REWARD_AMPLIFIER_START
            .saturating_sub(elapsed_days(genesis_ts, now))
            .max(REWARD_AMPLIFIER_END),
    }
}

/// Early-adopter amplifier (per mille) for the given global rank.
pub fn eaa_rate(model: EmissionModel, global_rank: u64) -> u64 {
    match model {
        EmissionModel::Flat => 0,
        EmissionModel::Decaying => {
            let decrease = (global_rank / EAA_RANK_STEP).saturating_mul(EAA_PM_STEP);
            EAA_PM_START.saturating_sub(decrease).max(EAA_PM_END)
        }
    }
}

pub fn maturity_ts(now: u64, term_days: u32) -> Option<u64> {
    (term_days as u64)
        .checked_mul(SECONDS_IN_DAY)
        .and_then(|secs| now.checked_add(secs))
}

// =========================================================================
// REWARD CURVE
// =========================================================================

/// Late-claim penalty in percent: 0, 1, 3, 8, 17, 35, 72 for the first seven
/// days late, then `MAX_PENALTY_PCT` for any lateness beyond that.
pub fn penalty_pct(secs_late: u64) -> u64 {
    let days_late = secs_late / SECONDS_IN_DAY;
    if days_late > WITHDRAWAL_WINDOW_DAYS - 1 {
        return MAX_PENALTY_PCT;
    }
    // days_late <= 6 here, the shift cannot overflow
    let penalty = (1u64 << (days_late + 3)) / WITHDRAWAL_WINDOW_DAYS - 1;
    penalty.min(MAX_PENALTY_PCT)
}

/// Amount withheld from `gross` for claiming `secs_late` seconds after
/// maturity. Never exceeds `gross`.
pub fn penalty(gross: u128, secs_late: u64) -> u128 {
    gross - apply_penalty(gross, secs_late)
}

/// `gross` minus the late-claim penalty.
pub fn apply_penalty(gross: u128, secs_late: u64) -> u128 {
    let keep = 100 - penalty_pct(secs_late) as u128;
    // gross * keep cannot overflow for any gross below u128::MAX / 100;
    // above that, divide first and accept the coarser rounding.
    match gross.checked_mul(keep) {
        Some(scaled) => scaled / 100,
        None => gross / 100 * keep,
    }
}

/// Reward before the late penalty, in base units.
///
/// Flat: `REWARD_PER_DAY * term`.
/// Decaying: `term * amplifier * (1000 + eaa) / 1000` XEX, divided by
/// `1 + log2(rank)` so that later claimers earn less for the same term.
pub fn gross_reward(
    model: EmissionModel,
    rank: u64,
    amplifier: u64,
    term: u32,
    eaa_rate: u64,
) -> Option<u128> {
    match model {
        EmissionModel::Flat => REWARD_PER_DAY.checked_mul(term as u128),
        EmissionModel::Decaying => {
            let rank_divisor = 1 + rank.max(GENESIS_RANK).ilog2() as u128;
            (term as u128)
                .checked_mul(amplifier as u128)?
                .checked_mul((EAA_DENOMINATOR + eaa_rate) as u128)?
                .checked_mul(SCALING_FACTOR)?
                .checked_div(EAA_DENOMINATOR as u128)?
                .checked_div(rank_divisor)
        }
    }
}

/// Net reward of `mint` if claimed at `now`.
///
/// Before maturity this is a projection of the on-time reward; callers that
/// pay out must check maturity themselves.
pub fn mint_reward(model: EmissionModel, now: u64, mint: &MintInfo) -> Option<u128> {
    let gross = gross_reward(model, mint.rank, mint.amplifier, mint.term, mint.eaa_rate)?;
    Some(apply_penalty(gross, now.saturating_sub(mint.maturity_ts)))
}

// =========================================================================
// STAKING
// =========================================================================

/// Rate snapshot for a stake of `term_days`: `APR_DAY` per day of term.
pub fn stake_apy(term_days: u32) -> u128 {
    APR_DAY * term_days as u128
}

/// Reward for `amount` locked at `apy` (percent, 18 decimals).
pub fn stake_reward(amount: u128, apy: u128) -> Option<u128> {
    mul_div(amount, apy, 100 * SCALING_FACTOR)
}

/// `share_pct` percent of `amount`, floored.
pub fn percent_of(amount: u128, share_pct: u8) -> Option<u128> {
    amount.checked_mul(share_pct as u128).map(|v| v / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = SECONDS_IN_DAY;

    #[test]
    fn penalty_table_matches_doubling_schedule() {
        let expected = [0, 1, 3, 8, 17, 35, 72, 99, 99];
        for (days, pct) in expected.iter().enumerate() {
            assert_eq!(penalty_pct(days as u64 * DAY), *pct, "day {}", days);
        }
    }

    #[test]
    fn penalty_is_zero_within_first_day() {
        assert_eq!(penalty_pct(0), 0);
        assert_eq!(penalty_pct(DAY - 1), 0);
    }

    #[test]
    fn penalty_is_monotonic_and_bounded() {
        let mut last = 0;
        for secs in (0..30 * DAY).step_by(3_600) {
            let pct = penalty_pct(secs);
            assert!(pct >= last);
            last = pct;
        }
        assert_eq!(penalty_pct(u64::MAX), MAX_PENALTY_PCT);
        assert_eq!(penalty(u128::MAX, u64::MAX), u128::MAX - u128::MAX / 100);
        assert_eq!(penalty(1_000, 3 * DAY), 80);
    }

    #[test]
    fn flat_reward_is_five_per_term_day() {
        for term in 1..=10u32 {
            assert_eq!(
                gross_reward(EmissionModel::Flat, 1, 0, term, 0),
                Some(5 * SCALING_FACTOR * term as u128)
            );
        }
    }

    #[test]
    fn flat_clock_is_constant() {
        assert_eq!(max_term_days(EmissionModel::Flat, 0, 0), 10);
        assert_eq!(max_term_days(EmissionModel::Flat, 0, 1_000 * DAY), 10);
        assert_eq!(reward_amplifier(EmissionModel::Flat, 0, 0), 0);
        assert_eq!(eaa_rate(EmissionModel::Flat, 1), 0);
    }

    #[test]
    fn decaying_max_term_reaches_floor() {
        let m = EmissionModel::Decaying;
        assert_eq!(max_term_days(m, 0, 0), 100);
        assert_eq!(max_term_days(m, 0, 7 * DAY), 99);
        assert_eq!(max_term_days(m, 0, 70 * DAY), 90);
        assert_eq!(max_term_days(m, 0, 10_000 * DAY), MAX_TERM_FLOOR_DAYS);
        // clock before genesis behaves like genesis
        assert_eq!(max_term_days(m, 500, 0), 100);
    }

    #[test]
    fn amplifier_and_eaa_never_reach_zero() {
        let m = EmissionModel::Decaying;
        assert_eq!(reward_amplifier(m, 0, 0), 3_000);
        assert_eq!(reward_amplifier(m, 0, 10 * DAY), 2_990);
        assert_eq!(reward_amplifier(m, 0, 100_000 * DAY), REWARD_AMPLIFIER_END);

        assert_eq!(eaa_rate(m, 1), 100);
        assert_eq!(eaa_rate(m, 250_000), 98);
        assert_eq!(eaa_rate(m, u64::MAX), EAA_PM_END);
    }

    #[test]
    fn decaying_reward_shrinks_with_rank() {
        let m = EmissionModel::Decaying;
        let first = gross_reward(m, 1, 3_000, 10, 100).unwrap();
        assert_eq!(first, 10 * 3_000 * 1_100 * SCALING_FACTOR / 1_000);
        let later = gross_reward(m, 1_024, 3_000, 10, 100).unwrap();
        assert_eq!(later, first / 11);
        assert!(gross_reward(m, 2, 3_000, 10, 100).unwrap() < first);
    }

    #[test]
    fn mint_reward_applies_lateness() {
        let mint = MintInfo { rank: 1, term: 5, maturity_ts: 10 * DAY, amplifier: 0, eaa_rate: 0 };
        let gross = 25 * SCALING_FACTOR;
        // projection before maturity is the on-time amount
        assert_eq!(mint_reward(EmissionModel::Flat, 0, &mint), Some(gross));
        assert_eq!(mint_reward(EmissionModel::Flat, 10 * DAY + 1, &mint), Some(gross));
        assert_eq!(
            mint_reward(EmissionModel::Flat, 13 * DAY, &mint),
            Some(gross * 92 / 100)
        );
    }

    #[test]
    fn stake_apy_is_linear_in_term() {
        assert_eq!(stake_apy(MAX_TERM_END_DAYS), APR_DAY * 365);
        assert!(XEX_APR - stake_apy(MAX_TERM_END_DAYS) < 365);
        assert_eq!(stake_apy(36) * 10, stake_apy(360));
    }

    #[test]
    fn stake_reward_for_hundred_tokens_equals_apy() {
        let amount = 100 * SCALING_FACTOR;
        assert_eq!(stake_reward(amount, stake_apy(10)), Some(APR_DAY * 10));
        let full_year = stake_reward(amount, stake_apy(MAX_TERM_END_DAYS)).unwrap();
        assert!(full_year <= 20 * SCALING_FACTOR);
        assert!(20 * SCALING_FACTOR - full_year < 1_000);
    }

    #[test]
    fn mul_div_uses_wide_intermediate() {
        assert_eq!(mul_div(u128::MAX, 2, 2), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 2, 1), None);
        assert_eq!(mul_div(7, 3, 2), Some(10));
        assert_eq!(mul_div(1, 1, 0), None);
    }

    #[test]
    fn maturity_overflow_is_reported() {
        assert_eq!(maturity_ts(100, 1), Some(100 + DAY));
        assert_eq!(maturity_ts(u64::MAX, 1), None);
    }
}
