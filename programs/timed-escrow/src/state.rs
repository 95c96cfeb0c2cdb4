use anchor_lang::prelude::*;
use crate::authority::{require_upgrade_authority, AuthorityResolver};
use crate::constants::*;
use crate::errors::EscrowError;

/// Lifecycle of an escrow record
///
/// Transitions only move forward:
/// Uninitialized -> Funded -> Withdrawn | Claimed
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EscrowStatus {
    /// Fresh account, or opened and waiting for a deposit
    #[default]
    Uninitialized,
    /// Vault holds `amount`
    Funded,
    /// Released to a receiver by the upgrade authority
    Withdrawn,
    /// Reclaimed by the initializer after the claim window
    Claimed,
}

impl EscrowStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Withdrawn | Self::Claimed)
    }

    /// Whether `next` is a legal successor of this status
    pub fn can_transition_to(&self, next: EscrowStatus) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Funded)
                | (Self::Funded, Self::Withdrawn)
                | (Self::Funded, Self::Claimed)
        )
    }
}

/// How a funded escrow ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    Withdrawn,
    Claimed,
}

impl From<Settlement> for EscrowStatus {
    fn from(settlement: Settlement) -> Self {
        match settlement {
            Settlement::Withdrawn => EscrowStatus::Withdrawn,
            Settlement::Claimed => EscrowStatus::Claimed,
        }
    }
}

/// Token balances on both sides of a transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferBalances {
    pub from: u64,
    pub to: u64,
}

impl TransferBalances {
    /// Fails unless exactly `amount` left `from` and arrived at `to`
    pub fn require_moved(&self, after: &TransferBalances, amount: u64) -> Result<()> {
        require!(
            self.from.checked_sub(amount) == Some(after.from)
                && self.to.checked_add(amount) == Some(after.to),
            EscrowError::TokenTransferFailed
        );
        Ok(())
    }
}

/// Escrow record, one per (initializer, mint)
///
/// Architecture:
/// - Vault token account is owned by this record's PDA
/// - Upgrade authority may release to any nominated receiver
/// - Initializer may reclaim once `start_time + CLAIM_WINDOW` passes
///
/// The record is never closed. A terminal record keeps its
/// derivation key occupied so it cannot fund a second cycle.
///
/// Seeds: ["escrow", initializer, mint]
#[account]
pub struct EscrowAccount {
    /// Depositor
    pub initializer: Pubkey,

    /// Candidate receivers, fixed at creation
    pub receivers: Vec<Pubkey>,

    /// Token mint under escrow
    pub mint: Pubkey,

    /// Tokens locked at funding time
    pub amount: u64,

    /// Claim clock start
    pub start_time: i64,

    pub status: EscrowStatus,

    /// Record PDA bump (vault signing authority)
    pub bump: u8,

    /// Vault PDA bump
    pub vault_bump: u8,

    /// Ledger time the record was opened
    pub created_at: i64,

    /// Ledger time of the terminal transition
    pub settled_at: i64,

    /// Owner of the token account that received the vault
    pub settled_to: Pubkey,

    /// Reserved for future upgrades
    pub reserved: [u8; RESERVED_LEN],
}

impl EscrowAccount {
    /// Account space calculation for rent exemption
    pub const INIT_SPACE: usize =
        32 +                        // initializer
        4 + 32 * MAX_RECEIVERS +    // receivers
        32 +                        // mint
        8 +                         // amount
        8 +                         // start_time
        1 +                         // status
        1 +                         // bump
        1 +                         // vault_bump
        8 +                         // created_at
        8 +                         // settled_at
        32 +                        // settled_to
        RESERVED_LEN;               // reserved

    /// Check if the parties have been written
    #[inline]
    pub fn is_open(&self) -> bool {
        self.initializer != Pubkey::default()
    }

    pub fn validate_receivers(receivers: &[Pubkey]) -> Result<()> {
        require!(
            !receivers.is_empty() && receivers.len() <= MAX_RECEIVERS,
            EscrowError::InvalidReceiverCount
        );

        for (i, receiver) in receivers.iter().enumerate() {
            require!(
                *receiver != Pubkey::default(),
                EscrowError::InvalidReceiver
            );
            require!(
                !receivers[..i].contains(receiver),
                EscrowError::DuplicateReceiver
            );
        }

        Ok(())
    }

    /// Write the parties of a fresh record. Status stays `Uninitialized`
    /// until `record_deposit`.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        initializer: Pubkey,
        mint: Pubkey,
        receivers: Vec<Pubkey>,
        start_time: i64,
        bump: u8,
        vault_bump: u8,
        now: i64,
    ) -> Result<()> {
        require!(
            self.status == EscrowStatus::Uninitialized && !self.is_open(),
            EscrowError::AlreadyInitialized
        );
        Self::validate_receivers(&receivers)?;

        self.initializer = initializer;
        self.receivers = receivers;
        self.mint = mint;
        self.amount = 0;
        self.start_time = start_time;
        self.status = EscrowStatus::Uninitialized;
        self.bump = bump;
        self.vault_bump = vault_bump;
        self.created_at = now;
        self.settled_at = 0;
        self.settled_to = Pubkey::default();
        self.reserved = [0; RESERVED_LEN];
        Ok(())
    }

    fn check_deposit(&self, amount: u64) -> Result<()> {
        require!(self.is_open(), EscrowError::NotOpened);
        require!(
            self.status == EscrowStatus::Uninitialized,
            EscrowError::AlreadyFunded
        );
        require!(amount > 0, EscrowError::ZeroAmount);
        Ok(())
    }

    /// Lock `amount` and move to `Funded`
    pub fn record_deposit(&mut self, amount: u64) -> Result<()> {
        self.check_deposit(amount)?;
        self.amount = amount;
        self.transition(EscrowStatus::Funded)
    }

    /// Deposit by `signer` from an account holding `source_balance`
    ///
    /// Nothing is written unless every check passes.
    pub fn fund(&mut self, signer: &Pubkey, amount: u64, source_balance: u64) -> Result<()> {
        require_keys_eq!(*signer, self.initializer, EscrowError::Unauthorized);
        self.check_deposit(amount)?;
        require!(
            source_balance >= amount,
            EscrowError::TokenTransferFailed
        );
        self.record_deposit(amount)
    }

    /// First timestamp at which the initializer may claim
    pub fn claim_unlocks_at(&self) -> Result<i64> {
        self.start_time
            .checked_add(CLAIM_WINDOW)
            .ok_or_else(|| error!(EscrowError::MathOverflow))
    }

    pub fn receiver_at(&self, receiver_index: u8) -> Result<Pubkey> {
        self.receivers
            .get(receiver_index as usize)
            .copied()
            .ok_or_else(|| error!(EscrowError::IndexOutOfRange))
    }

    /// Resolve the receiver a privileged withdrawal pays out to
    pub fn release_target(&self, receiver_index: u8) -> Result<Pubkey> {
        require!(
            self.status == EscrowStatus::Funded,
            EscrowError::NotFunded
        );
        self.receiver_at(receiver_index)
    }

    /// Check the initializer's claim is allowed at `now`
    pub fn check_claim(&self, now: i64) -> Result<()> {
        require!(
            self.status == EscrowStatus::Funded,
            EscrowError::NotFunded
        );
        require!(now >= self.claim_unlocks_at()?, EscrowError::TooEarly);
        Ok(())
    }

    /// Privileged withdrawal checks, in order: authority, status,
    /// receiver index, destination owner. Returns the receiver.
    pub fn authorize_withdraw<R>(
        &self,
        resolver: &R,
        signer: &Pubkey,
        receiver_index: u8,
        destination_owner: &Pubkey,
    ) -> Result<Pubkey>
    where
        R: AuthorityResolver + ?Sized,
    {
        require_upgrade_authority(resolver, signer)?;
        let receiver = self.release_target(receiver_index)?;
        require_keys_eq!(
            *destination_owner,
            receiver,
            EscrowError::InvalidDestination
        );
        Ok(receiver)
    }

    /// Claim checks, in order: signer, status, window, vault balance
    pub fn authorize_claim(&self, signer: &Pubkey, now: i64, vault_balance: u64) -> Result<()> {
        require_keys_eq!(*signer, self.initializer, EscrowError::Unauthorized);
        self.check_claim(now)?;
        require!(vault_balance > 0, EscrowError::NotFunded);
        Ok(())
    }

    /// Move to a terminal status and return the amount released
    pub fn settle(
        &mut self,
        outcome: Settlement,
        settled_to: Pubkey,
        now: i64,
    ) -> Result<u64> {
        self.transition(outcome.into())?;
        self.settled_at = now;
        self.settled_to = settled_to;
        Ok(self.amount)
    }

    fn transition(&mut self, next: EscrowStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return match next {
                EscrowStatus::Funded => err!(EscrowError::AlreadyFunded),
                _ => err!(EscrowError::NotFunded),
            };
        }
        self.status = next;
        Ok(())
    }
}
