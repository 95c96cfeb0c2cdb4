use anchor_lang::prelude::*;

#[error_code]
pub enum EscrowError {
    #[msg("Escrow already initialized for this initializer and mint")]
    AlreadyInitialized,

    #[msg("Invalid receiver count: Must be between 1 and 10")]
    InvalidReceiverCount,

    #[msg("Invalid amount: Must be greater than 0")]
    ZeroAmount,

    #[msg("Escrow is not funded")]
    NotFunded,

    #[msg("Unauthorized: Signer may not perform this action")]
    Unauthorized,

    #[msg("Too early: Claim window has not elapsed")]
    TooEarly,

    #[msg("Receiver index out of range")]
    IndexOutOfRange,

    #[msg("Token transfer failed: Insufficient balance")]
    TokenTransferFailed,

    #[msg("Escrow already funded")]
    AlreadyFunded,

    #[msg("Escrow has not been opened")]
    NotOpened,

    #[msg("Invalid receiver: Cannot be default pubkey")]
    InvalidReceiver,

    #[msg("Duplicate receiver in list")]
    DuplicateReceiver,

    #[msg("Invalid token mint")]
    InvalidTokenMint,

    #[msg("Invalid destination account")]
    InvalidDestination,

    #[msg("Math overflow: Timestamp too large")]
    MathOverflow,
}
