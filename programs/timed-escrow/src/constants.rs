/// Protocol constants for the timed receiver escrow

// PDA seeds
pub const ESCROW_SEED: &[u8] = b"escrow";
pub const VAULT_SEED: &[u8] = b"vault";

// Receivers
pub const MAX_RECEIVERS: usize = 10;

// Timing
pub const CLAIM_WINDOW: i64 = 60 * 60 * 24; // 1 day before the initializer may reclaim

// Reserved bytes at the tail of the escrow record
pub const RESERVED_LEN: usize = 64;
