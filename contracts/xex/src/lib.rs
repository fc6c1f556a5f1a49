#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! # XEX: rank-based mint and fixed-APR staking token
//!
//! ```text
//!   claim_rank(term) ──► [live mint] ──maturity──► claim_mint_reward ──► mint XEX
//!                                                         │
//!   minter_create(n, term) ──► n minter slots ────────────┤ (batch claim)
//!                                                         ▼
//!                            stake(amount, term) ◄── spendable balance
//!                                     │
//!                                  maturity ──► withdraw ──► amount + reward
//! ```
//!
//! The contract is its own fungible token: rewards are minted into the
//! caller's balance and stakes burn spendable balance until withdrawal.
//!
//! Two emission curves are supported (see [`types::EmissionModel`]). The
//! flat curve pays 5 XEX per term day with a fixed 10 day max term; the
//! decaying curve shrinks the max term, amplifier and early-adopter bonus
//! over time and rank. Claiming more than a day after maturity costs a
//! penalty that doubles daily up to 99%.

pub mod constants;
pub mod math;
pub mod types;

#[ink::contract]
mod xex {
    use crate::constants::*;
    use crate::math;
    use crate::types::{EmissionModel, MintInfo, MinterInfo, MinterSlot, StakeInfo};
    use ink::prelude::string::String;
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct Xex {
        // ── Token ledger ──────────────────────────────────────────────────
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        total_supply: Balance,

        // ── Access control ────────────────────────────────────────────────
        owner: AccountId,
        /// Receives claim fees. Fees stay in the contract while unset.
        treasury: Option<AccountId>,
        /// Native-currency fee per mint slot claimed.
        fee: Balance,
        paused: bool,

        // ── Emission clock ────────────────────────────────────────────────
        model: EmissionModel,
        /// Seconds since epoch.
        genesis_ts: u64,
        /// Rank handed to the next claim.
        global_rank: u64,
        /// Rank claims whose reward has not been paid yet.
        active_minters: u64,

        // ── Single mint per address ───────────────────────────────────────
        user_mints: Mapping<AccountId, MintInfo>,

        // ── Batch minters (arena per owner) ───────────────────────────────
        minter_count: Mapping<AccountId, u32>,
        /// Every slot below the head is idle; reward scans start here.
        minter_head: Mapping<AccountId, u32>,
        minters: Mapping<(AccountId, u32), MinterSlot>,

        // ── Staking ───────────────────────────────────────────────────────
        user_stakes: Mapping<AccountId, StakeInfo>,
        active_stakes: u64,
        total_staked: Balance,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct RankClaimed {
        #[ink(topic)]
        user: AccountId,
        term: u32,
        rank: u64,
    }

    #[ink(event)]
    pub struct MintClaimed {
        #[ink(topic)]
        user: AccountId,
        #[ink(topic)]
        recipient: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct MintersCreated {
        #[ink(topic)]
        owner: AccountId,
        count: u32,
        term: u32,
    }

    #[ink(event)]
    pub struct MintersClaimed {
        #[ink(topic)]
        owner: AccountId,
        count: u32,
    }

    #[ink(event)]
    pub struct Staked {
        #[ink(topic)]
        user: AccountId,
        amount: Balance,
        term: u32,
    }

    #[ink(event)]
    pub struct Withdrawn {
        #[ink(topic)]
        user: AccountId,
        amount: Balance,
        reward: Balance,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous_owner: AccountId,
        #[ink(topic)]
        new_owner: AccountId,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Term outside `[1, max term]`.
        InvalidTerm,
        /// The caller already has a live single mint.
        MintAlreadyActive,
        /// No live mint to claim.
        NoMintFound,
        /// Maturity has not been reached.
        MintNotMatured,
        /// Stake withdrawal before maturity.
        LockupPeriodNotOver,
        InsufficientBalance,
        InsufficientAllowance,
        /// Caller is not the contract owner.
        Unauthorized,
        /// The caller already has a live stake.
        StakeAlreadyActive,
        NoStakeFound,
        ZeroAmount,
        /// Share percentage outside `[1, 100]`.
        InvalidPercentage,
        /// Batch count outside `[1, MAX_MINTERS_PER_CALL]`.
        InvalidBatchSize,
        /// Transferred value does not cover the claim fee.
        InsufficientFee,
        /// Forwarding the fee to the treasury failed.
        TransferFailed,
        ContractPaused,
        Overflow,
    }

    pub type Result<T> = core::result::Result<T, Error>;

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl Xex {
        /// Flat emission, `initial_supply` credited to the deployer.
        #[ink(constructor)]
        pub fn new(initial_supply: Balance) -> Self {
            Self::with_model(EmissionModel::Flat, initial_supply)
        }

        #[ink(constructor)]
        pub fn with_model(model: EmissionModel, initial_supply: Balance) -> Self {
            let caller = Self::env().caller();
            let mut balances = Mapping::default();
            if initial_supply > 0 {
                balances.insert(caller, &initial_supply);
            }

            let contract = Self {
                balances,
                allowances: Mapping::default(),
                total_supply: initial_supply,
                owner: caller,
                treasury: None,
                fee: 0,
                paused: false,
                model,
                genesis_ts: Self::env().block_timestamp() / MS_PER_SECOND,
                global_rank: GENESIS_RANK,
                active_minters: 0,
                user_mints: Mapping::default(),
                minter_count: Mapping::default(),
                minter_head: Mapping::default(),
                minters: Mapping::default(),
                user_stakes: Mapping::default(),
                active_stakes: 0,
                total_staked: 0,
            };

            if initial_supply > 0 {
                Self::env().emit_event(Transfer {
                    from: None,
                    to: Some(caller),
                    value: initial_supply,
                });
            }

            contract
        }

        // =================================================================
        // TOKEN
        // =================================================================

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(TOKEN_NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(TOKEN_SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            TOKEN_DECIMALS
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()> {
            let from = self.env().caller();
            self.process_transfer(from, to, value)
        }

        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<()> {
            let owner = self.env().caller();
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()> {
            let caller = self.env().caller();
            let allowance = self.allowance(from, caller);
            if allowance < value {
                return Err(Error::InsufficientAllowance);
            }
            self.process_transfer(from, to, value)?;
            self.allowances.insert((from, caller), &(allowance - value));
            Ok(())
        }

        fn process_transfer(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()> {
            if value == 0 {
                return Err(Error::ZeroAmount);
            }
            let from_bal = self.balance_of(from);
            if from_bal < value {
                return Err(Error::InsufficientBalance);
            }
            self.balances.insert(from, &(from_bal - value));
            let to_bal = self.balance_of(to);
            self.balances
                .insert(to, &to_bal.checked_add(value).ok_or(Error::Overflow)?);

            self.env().emit_event(Transfer { from: Some(from), to: Some(to), value });
            Ok(())
        }

        fn mint_to(&mut self, to: AccountId, value: Balance) -> Result<()> {
            if value == 0 {
                return Ok(());
            }
            let supply = self.total_supply.checked_add(value).ok_or(Error::Overflow)?;
            let balance = self.balance_of(to).checked_add(value).ok_or(Error::Overflow)?;
            self.total_supply = supply;
            self.balances.insert(to, &balance);
            self.env().emit_event(Transfer { from: None, to: Some(to), value });
            Ok(())
        }

        fn burn_from(&mut self, from: AccountId, value: Balance) -> Result<()> {
            let balance = self.balance_of(from);
            if balance < value {
                return Err(Error::InsufficientBalance);
            }
            self.balances.insert(from, &(balance - value));
            self.total_supply = self.total_supply.saturating_sub(value);
            self.env().emit_event(Transfer { from: Some(from), to: None, value });
            Ok(())
        }

        // =================================================================
        // EMISSION CLOCK
        // =================================================================

        /// Block time in whole seconds.
        fn now(&self) -> u64 {
            self.env().block_timestamp() / MS_PER_SECOND
        }

        #[ink(message)]
        pub fn genesis_ts(&self) -> u64 {
            self.genesis_ts
        }

        #[ink(message)]
        pub fn global_rank(&self) -> u64 {
            self.global_rank
        }

        #[ink(message)]
        pub fn active_minters(&self) -> u64 {
            self.active_minters
        }

        #[ink(message)]
        pub fn emission_model(&self) -> EmissionModel {
            self.model
        }

        /// Current maximum mint term in seconds.
        #[ink(message)]
        pub fn calculate_max_term(&self) -> u64 {
            self.get_current_max_term() as u64 * SECONDS_IN_DAY
        }

        /// Current maximum mint term in days.
        #[ink(message)]
        pub fn get_current_max_term(&self) -> u32 {
            math::max_term_days(self.model, self.genesis_ts, self.now())
        }

        #[ink(message)]
        pub fn get_current_amp(&self) -> u64 {
            math::reward_amplifier(self.model, self.genesis_ts, self.now())
        }

        #[ink(message)]
        pub fn get_current_eaar(&self) -> u64 {
            math::eaa_rate(self.model, self.global_rank)
        }

        /// Rate a stake of `term` days would lock in now.
        #[ink(message)]
        pub fn get_current_apy(&self, term: u32) -> Balance {
            math::stake_apy(term)
        }

        // =================================================================
        // REWARD CURVE VIEWS
        // =================================================================

        /// Late-claim penalty in percent for `secs_late` seconds past maturity.
        #[ink(message)]
        pub fn penalty(&self, secs_late: u64) -> u64 {
            math::penalty_pct(secs_late)
        }

        /// Amount the owner's live mint would lose to the late penalty if
        /// claimed now. 0 without a mint or before the penalty starts.
        #[ink(message)]
        pub fn mint_penalty_of(&self, owner: AccountId) -> Result<Balance> {
            let Some(mint) = self.user_mints.get(owner) else {
                return Ok(0);
            };
            let gross = math::gross_reward(self.model, mint.rank, mint.amplifier, mint.term, mint.eaa_rate)
                .ok_or(Error::Overflow)?;
            Ok(math::penalty(gross, self.now().saturating_sub(mint.maturity_ts)))
        }

        #[ink(message)]
        pub fn get_gross_reward(&self, rank: u64, amplifier: u64, term: u32, eaa_rate: u64) -> Result<Balance> {
            math::gross_reward(self.model, rank, amplifier, term, eaa_rate).ok_or(Error::Overflow)
        }

        /// Net reward for the given mint snapshot if it were claimed now.
        #[ink(message)]
        pub fn calculate_mint_reward(
            &self,
            rank: u64,
            term: u32,
            maturity_ts: u64,
            amplifier: u64,
            eaa_rate: u64,
        ) -> Result<Balance> {
            let mint = MintInfo { rank, term, maturity_ts, amplifier, eaa_rate };
            math::mint_reward(self.model, self.now(), &mint).ok_or(Error::Overflow)
        }

        // =================================================================
        // SINGLE MINT LIFECYCLE
        // =================================================================

        /// Claim the next global rank and start a mint of `term` days.
        #[ink(message)]
        pub fn claim_rank(&mut self, term: u32) -> Result<()> {
            self.ensure_not_paused()?;
            let caller = self.env().caller();
            let now = self.now();
            self.ensure_mint_term(term, now)?;
            if self.user_mints.contains(caller) {
                return Err(Error::MintAlreadyActive);
            }

            let mint = self.open_mint(term, now)?;
            self.user_mints.insert(caller, &mint);

            self.env().emit_event(RankClaimed { user: caller, term, rank: mint.rank });
            Ok(())
        }

        #[ink(message, payable)]
        pub fn claim_mint_reward(&mut self) -> Result<Balance> {
            let caller = self.env().caller();
            self.claim_mint_reward_to(caller)
        }

        /// Pay the caller's matured mint to `recipient` and free the slot.
        #[ink(message, payable)]
        pub fn claim_mint_reward_to(&mut self, recipient: AccountId) -> Result<Balance> {
            let caller = self.env().caller();
            let (_, reward) = self.matured_mint(caller)?;
            let fee_paid = self.ensure_fee(1)?;

            self.close_mint(caller)?;
            self.mint_to(recipient, reward)?;

            self.env().emit_event(MintClaimed { user: caller, recipient, amount: reward });
            self.forward_fee(fee_paid)?;
            Ok(reward)
        }

        /// Claim the matured mint, sending `pct` percent of the reward to
        /// `other` and the rest to the caller. The event carries the full
        /// reward with `other` as recipient.
        #[ink(message, payable)]
        pub fn claim_mint_reward_and_share(&mut self, other: AccountId, pct: u8) -> Result<Balance> {
            Self::ensure_percentage(pct)?;
            let caller = self.env().caller();
            let (_, reward) = self.matured_mint(caller)?;
            let shared = math::percent_of(reward, pct).ok_or(Error::Overflow)?;
            let fee_paid = self.ensure_fee(1)?;

            self.close_mint(caller)?;
            self.mint_to(other, shared)?;
            self.mint_to(caller, reward - shared)?;

            self.env().emit_event(MintClaimed { user: caller, recipient: other, amount: reward });
            self.forward_fee(fee_paid)?;
            Ok(reward)
        }

        /// Claim the matured mint and lock `pct` percent of it as a new stake
        /// of `term` days; the rest is paid to the caller. Opening the stake
        /// is blocked while paused; use `claim_mint_reward` instead.
        #[ink(message, payable)]
        pub fn claim_mint_reward_and_stake(&mut self, pct: u8, term: u32) -> Result<Balance> {
            self.ensure_not_paused()?;
            Self::ensure_percentage(pct)?;
            Self::ensure_stake_term(term)?;
            let caller = self.env().caller();
            if self.user_stakes.contains(caller) {
                return Err(Error::StakeAlreadyActive);
            }
            let (_, reward) = self.matured_mint(caller)?;
            let staked = math::percent_of(reward, pct).ok_or(Error::Overflow)?;
            if staked == 0 {
                return Err(Error::ZeroAmount);
            }
            let fee_paid = self.ensure_fee(1)?;

            self.close_mint(caller)?;
            self.mint_to(caller, reward - staked)?;
            self.open_stake(caller, staked, term)?;

            self.env().emit_event(MintClaimed { user: caller, recipient: caller, amount: reward });
            self.env().emit_event(Staked { user: caller, amount: staked, term });
            self.forward_fee(fee_paid)?;
            Ok(reward)
        }

        #[ink(message)]
        pub fn get_user_mint(&self, owner: AccountId) -> Option<MintInfo> {
            self.user_mints.get(owner)
        }

        /// Snapshot the clock into a new mint and advance the global counters.
        fn open_mint(&mut self, term: u32, now: u64) -> Result<MintInfo> {
            let maturity_ts = math::maturity_ts(now, term).ok_or(Error::Overflow)?;
            let next_rank = self.global_rank.checked_add(1).ok_or(Error::Overflow)?;
            let active = self.active_minters.checked_add(1).ok_or(Error::Overflow)?;

            let mint = MintInfo {
                rank: self.global_rank,
                term,
                maturity_ts,
                amplifier: math::reward_amplifier(self.model, self.genesis_ts, now),
                eaa_rate: math::eaa_rate(self.model, self.global_rank),
            };
            self.global_rank = next_rank;
            self.active_minters = active;
            Ok(mint)
        }

        fn matured_mint(&self, user: AccountId) -> Result<(MintInfo, Balance)> {
            let mint = self.user_mints.get(user).ok_or(Error::NoMintFound)?;
            let now = self.now();
            if now < mint.maturity_ts {
                return Err(Error::MintNotMatured);
            }
            let reward = math::mint_reward(self.model, now, &mint).ok_or(Error::Overflow)?;
            Ok((mint, reward))
        }

        fn close_mint(&mut self, user: AccountId) -> Result<()> {
            let active = self.active_minters.checked_sub(1).ok_or(Error::Overflow)?;
            self.user_mints.remove(user);
            self.active_minters = active;
            Ok(())
        }

        // =================================================================
        // BATCH MINTERS
        // =================================================================

        /// Open `count` minter slots of `term` days, each claiming its own rank.
        #[ink(message)]
        pub fn minter_create(&mut self, count: u32, term: u32) -> Result<()> {
            self.ensure_not_paused()?;
            Self::ensure_batch_size(count)?;
            let caller = self.env().caller();
            let now = self.now();
            self.ensure_mint_term(term, now)?;

            let start = self.minter_count.get(caller).unwrap_or(0);
            let end = start.checked_add(count).ok_or(Error::Overflow)?;
            for id in start..end {
                let mint = self.open_mint(term, now)?;
                self.minters.insert((caller, id), &MinterSlot { term, mint: Some(mint) });
            }
            self.minter_count.insert(caller, &end);

            self.env().emit_event(MintersCreated { owner: caller, count, term });
            Ok(())
        }

        /// Re-arm up to `count` paid-out slots, oldest first, with their
        /// original term. Slots whose term exceeds the current max term are
        /// left idle. Returns how many slots claimed a new rank, which is 0
        /// when every slot already holds one.
        #[ink(message)]
        pub fn minter_claim_rank(&mut self, count: u32) -> Result<u32> {
            self.ensure_not_paused()?;
            Self::ensure_batch_size(count)?;
            let caller = self.env().caller();
            let now = self.now();
            let max_term = math::max_term_days(self.model, self.genesis_ts, now);

            let mut armed = 0u32;
            let mut first_armed = None;
            for id in 0..self.minter_count.get(caller).unwrap_or(0) {
                if armed == count {
                    break;
                }
                let Some(mut slot) = self.minters.get((caller, id)) else {
                    continue;
                };
                if slot.is_live() || slot.term > max_term {
                    continue;
                }
                slot.mint = Some(self.open_mint(slot.term, now)?);
                self.minters.insert((caller, id), &slot);
                if first_armed.is_none() {
                    first_armed = Some(id);
                }
                armed += 1;
            }
            if let Some(id) = first_armed {
                if id < self.minter_head_of(caller) {
                    self.minter_head.insert(caller, &id);
                }
            }

            self.env().emit_event(MintersClaimed { owner: caller, count: armed });
            Ok(armed)
        }

        /// Pay up to `count` matured slots, oldest first, to `recipient`.
        /// Immature slots are skipped and stay live.
        #[ink(message, payable)]
        pub fn minter_claim_mint_reward(&mut self, count: u32, recipient: AccountId) -> Result<Balance> {
            Self::ensure_batch_size(count)?;
            let caller = self.env().caller();
            let now = self.now();

            let head = self.minter_head_of(caller);
            let end = self.minter_count.get(caller).unwrap_or(0);
            let mut ready: Vec<(u32, u32)> = Vec::new();
            let mut total: Balance = 0;
            let mut any_live = false;
            for id in head..end {
                if ready.len() as u32 == count {
                    break;
                }
                let Some(slot) = self.minters.get((caller, id)) else {
                    continue;
                };
                let Some(mint) = slot.mint else {
                    continue;
                };
                any_live = true;
                if now < mint.maturity_ts {
                    continue;
                }
                let reward = math::mint_reward(self.model, now, &mint).ok_or(Error::Overflow)?;
                total = total.checked_add(reward).ok_or(Error::Overflow)?;
                ready.push((id, slot.term));
            }

            if ready.is_empty() {
                return Err(if any_live { Error::MintNotMatured } else { Error::NoMintFound });
            }
            let fee_paid = self.ensure_fee(ready.len() as u32)?;

            let active = self
                .active_minters
                .checked_sub(ready.len() as u64)
                .ok_or(Error::Overflow)?;
            for (id, term) in ready {
                self.minters.insert((caller, id), &MinterSlot { term, mint: None });
            }
            self.active_minters = active;
            self.advance_minter_head(caller, head, end);
            self.mint_to(recipient, total)?;

            self.env().emit_event(MintClaimed { user: caller, recipient, amount: total });
            self.forward_fee(fee_paid)?;
            Ok(total)
        }

        /// Ids of the owner's live slots, in creation order.
        #[ink(message)]
        pub fn get_user_minters(&self, owner: AccountId) -> Vec<u32> {
            self.live_minters(owner).map(|(id, _)| id).collect()
        }

        #[ink(message)]
        pub fn get_user_minter_info(&self, owner: AccountId) -> Vec<MinterInfo> {
            self.live_minters(owner)
                .map(|(id, mint)| MinterInfo::new(id, &mint))
                .collect()
        }

        /// Projected net reward of each live slot, in creation order.
        #[ink(message)]
        pub fn minter_get_mint_reward(&self, owner: AccountId) -> Result<Vec<Balance>> {
            let now = self.now();
            self.live_minters(owner)
                .map(|(_, mint)| math::mint_reward(self.model, now, &mint).ok_or(Error::Overflow))
                .collect()
        }

        /// Number of slots ever created by `owner`, idle ones included.
        #[ink(message)]
        pub fn get_minter_count(&self, owner: AccountId) -> u32 {
            self.minter_count.get(owner).unwrap_or(0)
        }

        /// Index of the first slot that may be live.
        #[ink(message)]
        pub fn get_minter_head(&self, owner: AccountId) -> u32 {
            self.minter_head_of(owner)
        }

        fn minter_head_of(&self, owner: AccountId) -> u32 {
            self.minter_head.get(owner).unwrap_or(0)
        }

        /// Move the head past idle slots starting at `from`.
        fn advance_minter_head(&mut self, owner: AccountId, from: u32, end: u32) {
            let mut head = from;
            while head < end && !matches!(self.minters.get((owner, head)), Some(slot) if slot.is_live()) {
                head += 1;
            }
            if head != from {
                self.minter_head.insert(owner, &head);
            }
        }

        fn live_minters(&self, owner: AccountId) -> impl Iterator<Item = (u32, MintInfo)> + '_ {
            let head = self.minter_head_of(owner);
            (head..self.minter_count.get(owner).unwrap_or(0)).filter_map(move |id| {
                self.minters
                    .get((owner, id))
                    .and_then(|slot| slot.mint)
                    .map(|mint| (id, mint))
            })
        }

        // =================================================================
        // STAKING
        // =================================================================

        /// Lock `amount` of spendable balance for `term` days.
        #[ink(message)]
        pub fn stake(&mut self, amount: Balance, term: u32) -> Result<()> {
            self.ensure_not_paused()?;
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            Self::ensure_stake_term(term)?;
            let caller = self.env().caller();
            if self.user_stakes.contains(caller) {
                return Err(Error::StakeAlreadyActive);
            }
            if self.balance_of(caller) < amount {
                return Err(Error::InsufficientBalance);
            }

            self.burn_from(caller, amount)?;
            self.open_stake(caller, amount, term)?;

            self.env().emit_event(Staked { user: caller, amount, term });
            Ok(())
        }

        /// Release a matured stake plus its reward. Returns the reward.
        #[ink(message)]
        pub fn withdraw(&mut self) -> Result<Balance> {
            let caller = self.env().caller();
            let stake = self.user_stakes.get(caller).ok_or(Error::NoStakeFound)?;
            if self.now() < stake.maturity_ts {
                return Err(Error::LockupPeriodNotOver);
            }
            let reward = math::stake_reward(stake.amount, stake.apy).ok_or(Error::Overflow)?;
            let payout = stake.amount.checked_add(reward).ok_or(Error::Overflow)?;

            self.user_stakes.remove(caller);
            self.active_stakes = self.active_stakes.saturating_sub(1);
            self.total_staked = self.total_staked.saturating_sub(stake.amount);
            self.mint_to(caller, payout)?;

            self.env().emit_event(Withdrawn { user: caller, amount: stake.amount, reward });
            Ok(reward)
        }

        #[ink(message)]
        pub fn get_user_stake(&self, owner: AccountId) -> Option<StakeInfo> {
            self.user_stakes.get(owner)
        }

        /// `(matured, maturity_ts)`; `(false, 0)` without a stake.
        #[ink(message)]
        pub fn is_mature(&self, owner: AccountId) -> (bool, u64) {
            match self.user_stakes.get(owner) {
                Some(stake) => (self.now() >= stake.maturity_ts, stake.maturity_ts),
                None => (false, 0),
            }
        }

        /// Reward payable by `withdraw` right now; 0 until maturity.
        #[ink(message)]
        pub fn stake_reward_of(&self, owner: AccountId) -> Result<Balance> {
            match self.user_stakes.get(owner) {
                Some(stake) if self.now() >= stake.maturity_ts => {
                    math::stake_reward(stake.amount, stake.apy).ok_or(Error::Overflow)
                }
                _ => Ok(0),
            }
        }

        /// `(projected single-mint reward, stake reward)` for `owner`.
        #[ink(message)]
        pub fn rewards_of(&self, owner: AccountId) -> Result<(Balance, Balance)> {
            let mint_reward = match self.user_mints.get(owner) {
                Some(mint) => math::mint_reward(self.model, self.now(), &mint).ok_or(Error::Overflow)?,
                None => 0,
            };
            Ok((mint_reward, self.stake_reward_of(owner)?))
        }

        #[ink(message)]
        pub fn active_stakes(&self) -> u64 {
            self.active_stakes
        }

        #[ink(message)]
        pub fn total_staked(&self) -> Balance {
            self.total_staked
        }

        fn open_stake(&mut self, user: AccountId, amount: Balance, term: u32) -> Result<()> {
            let maturity_ts = math::maturity_ts(self.now(), term).ok_or(Error::Overflow)?;
            let total = self.total_staked.checked_add(amount).ok_or(Error::Overflow)?;
            let stake = StakeInfo { amount, term, maturity_ts, apy: math::stake_apy(term) };

            self.user_stakes.insert(user, &stake);
            self.active_stakes = self.active_stakes.saturating_add(1);
            self.total_staked = total;
            Ok(())
        }

        // =================================================================
        // ADMIN
        // =================================================================

        #[ink(message)]
        pub fn set_fee(&mut self, fee: Balance) -> Result<()> {
            self.ensure_owner()?;
            self.fee = fee;
            Ok(())
        }

        #[ink(message)]
        pub fn set_treasury(&mut self, treasury: AccountId) -> Result<()> {
            self.ensure_owner()?;
            self.treasury = Some(treasury);
            Ok(())
        }

        /// Pausing stops new rank claims, minters and stakes. Claims and
        /// withdrawals stay open.
        #[ink(message)]
        pub fn set_paused(&mut self, paused: bool) -> Result<()> {
            self.ensure_owner()?;
            self.paused = paused;
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<()> {
            self.ensure_owner()?;
            let previous_owner = self.owner;
            self.owner = new_owner;
            self.env().emit_event(OwnershipTransferred { previous_owner, new_owner });
            Ok(())
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        #[ink(message)]
        pub fn fee(&self) -> Balance {
            self.fee
        }

        #[ink(message)]
        pub fn treasury(&self) -> Option<AccountId> {
            self.treasury
        }

        #[ink(message)]
        pub fn is_paused(&self) -> bool {
            self.paused
        }

        // =================================================================
        // GUARDS
        // =================================================================

        fn ensure_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner {
                return Err(Error::Unauthorized);
            }
            Ok(())
        }

        fn ensure_not_paused(&self) -> Result<()> {
            if self.paused {
                return Err(Error::ContractPaused);
            }
            Ok(())
        }

        fn ensure_mint_term(&self, term: u32, now: u64) -> Result<()> {
            let max_term = math::max_term_days(self.model, self.genesis_ts, now);
            if term < MIN_TERM_DAYS || term > max_term {
                return Err(Error::InvalidTerm);
            }
            Ok(())
        }

        fn ensure_stake_term(term: u32) -> Result<()> {
            if !(MIN_TERM_DAYS..=MAX_TERM_END_DAYS).contains(&term) {
                return Err(Error::InvalidTerm);
            }
            Ok(())
        }

        fn ensure_batch_size(count: u32) -> Result<()> {
            if count == 0 || count > MAX_MINTERS_PER_CALL {
                return Err(Error::InvalidBatchSize);
            }
            Ok(())
        }

        fn ensure_percentage(pct: u8) -> Result<()> {
            if pct == 0 || pct > 100 {
                return Err(Error::InvalidPercentage);
            }
            Ok(())
        }

        /// Checks the transferred value covers `slots` claim fees and returns it.
        fn ensure_fee(&self, slots: u32) -> Result<Balance> {
            let due = self.fee.checked_mul(slots as Balance).ok_or(Error::Overflow)?;
            let paid = self.env().transferred_value();
            if paid < due {
                return Err(Error::InsufficientFee);
            }
            Ok(paid)
        }

        /// Runs after all state is final. Native transfers cannot re-enter.
        fn forward_fee(&self, paid: Balance) -> Result<()> {
            match self.treasury {
                Some(treasury) if paid > 0 => self
                    .env()
                    .transfer(treasury, paid)
                    .map_err(|_| Error::TransferFailed),
                _ => Ok(()),
            }
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
