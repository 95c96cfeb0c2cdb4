use anchor_lang::prelude::*;

/// Escrow record populated, vault created
#[event]
pub struct EscrowOpened {
    pub escrow: Pubkey,
    pub initializer: Pubkey,
    pub mint: Pubkey,
    pub receiver_count: u8,
    pub start_time: i64,
    pub timestamp: i64,
}

/// Tokens locked in the vault
#[event]
pub struct EscrowFunded {
    pub escrow: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Upgrade authority released the vault to a receiver
#[event]
pub struct EscrowWithdrawn {
    pub escrow: Pubkey,
    pub authority: Pubkey,
    pub receiver: Pubkey,
    pub receiver_index: u8,
    pub amount: u64,
    pub timestamp: i64,
}

/// Initializer reclaimed the vault after the claim window
#[event]
pub struct EscrowClaimed {
    pub escrow: Pubkey,
    pub initializer: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}
