// =========================================================================
// UNITS
// =========================================================================

/// 18-decimal fixed point: 1 XEX = 10^18 base units.
pub const SCALING_FACTOR: u128 = 1_000_000_000_000_000_000;

pub const SECONDS_IN_DAY: u64 = 86_400;
pub const DAYS_IN_YEAR: u64 = 365;

/// Milliseconds per second. `block_timestamp()` is reported in ms.
pub const MS_PER_SECOND: u64 = 1_000;

// =========================================================================
// RANK & TERM
// =========================================================================

/// First rank handed out. A stored rank of 0 therefore never denotes a live mint.
pub const GENESIS_RANK: u64 = 1;

pub const MIN_TERM_DAYS: u32 = 1;

/// Fixed maximum mint term of the flat emission model.
pub const FLAT_MAX_TERM_DAYS: u32 = 10;

/// Flat model payout: 5 XEX per day of term.
pub const REWARD_PER_DAY: u128 = 5 * SCALING_FACTOR;

// ── Decaying model ────────────────────────────────────────────────────────

/// Maximum term at genesis under the decaying model.
pub const MAX_TERM_START_DAYS: u32 = 100;

/// The decaying maximum term never drops below this.
pub const MAX_TERM_FLOOR_DAYS: u32 = 10;

/// One day is shaved off the maximum term per this many elapsed days.
pub const TERM_DECAY_INTERVAL_DAYS: u64 = 7;

/// Reward amplifier at genesis; decreases by one per elapsed day.
pub const REWARD_AMPLIFIER_START: u64 = 3_000;
pub const REWARD_AMPLIFIER_END: u64 = 1;

/// Early-adopter amplifier, per mille.
pub const EAA_PM_START: u64 = 100;
pub const EAA_PM_STEP: u64 = 1;
pub const EAA_PM_END: u64 = 1;

/// Global ranks per EAA step.
pub const EAA_RANK_STEP: u64 = 100_000;
pub const EAA_DENOMINATOR: u64 = 1_000;

// =========================================================================
// LATE-CLAIM PENALTY
// =========================================================================

/// Days after maturity before the penalty saturates.
pub const WITHDRAWAL_WINDOW_DAYS: u64 = 7;
pub const MAX_PENALTY_PCT: u64 = 99;

// =========================================================================
// STAKING
// =========================================================================

/// Yearly staking rate: 20%, expressed with 18 decimals.
pub const XEX_APR: u128 = 20 * SCALING_FACTOR;

/// Longest stake term; a stake of this length earns the full `XEX_APR`.
pub const MAX_TERM_END_DAYS: u32 = 365;

/// Rate earned per day of stake term.
pub const APR_DAY: u128 = XEX_APR / MAX_TERM_END_DAYS as u128;

// =========================================================================
// BATCH MINTERS
// =========================================================================

/// Upper bound on slots touched by one batch message.
pub const MAX_MINTERS_PER_CALL: u32 = 100;

// =========================================================================
// TOKEN METADATA
// =========================================================================

pub const TOKEN_NAME: &str = "XEX";
pub const TOKEN_SYMBOL: &str = "XEX";
pub const TOKEN_DECIMALS: u8 = 18;
