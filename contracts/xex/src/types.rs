//! Storage records shared by the contract and the reward maths.

/// Which emission curve the contract was deployed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub enum EmissionModel {
    /// Fixed 10 day max term, 5 XEX per term day, no amplifier or EAA.
    Flat,
    /// Max term, amplifier and EAA decay with elapsed time and global rank;
    /// the base reward shrinks as the claimed rank grows.
    Decaying,
}

/// One rank claim waiting for (or past) maturity.
///
/// `amplifier` and `eaa_rate` are snapshots taken at claim time and are
/// always 0 under [`EmissionModel::Flat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct MintInfo {
    pub rank: u64,
    /// Term in days.
    pub term: u32,
    /// Seconds since epoch.
    pub maturity_ts: u64,
    pub amplifier: u64,
    pub eaa_rate: u64,
}

/// A locked stake. `apy` is the rate for the whole term (percent, 18 decimals).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct StakeInfo {
    pub amount: u128,
    /// Term in days.
    pub term: u32,
    /// Seconds since epoch.
    pub maturity_ts: u64,
    pub apy: u128,
}

/// Arena cell of the batch minter ledger. The slot outlives its mints:
/// `mint` is `None` once the reward has been paid, and the slot can be
/// re-armed later with the same `term`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct MinterSlot {
    pub term: u32,
    pub mint: Option<MintInfo>,
}

impl MinterSlot {
    pub fn is_live(&self) -> bool {
        self.mint.is_some()
    }
}

/// Read-only projection of a live minter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct MinterInfo {
    pub id: u32,
    pub rank: u64,
    pub term: u32,
    pub maturity_ts: u64,
    pub amplifier: u64,
    pub eaa_rate: u64,
}

impl MinterInfo {
    pub fn new(id: u32, mint: &MintInfo) -> Self {
        Self {
            id,
            rank: mint.rank,
            term: mint.term,
            maturity_ts: mint.maturity_ts,
            amplifier: mint.amplifier,
            eaa_rate: mint.eaa_rate,
        }
    }
}
