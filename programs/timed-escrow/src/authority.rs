//! Privileged withdrawal authority.
//!
//! The authority is whoever may upgrade this program. It is read from the
//! BPF upgradeable loader's `ProgramData` account at call time and never
//! copied into escrow records, so rotating (or revoking) the upgrade
//! authority takes effect for every escrow at once.

use anchor_lang::prelude::*;
use crate::errors::EscrowError;

/// Source of the identity allowed to run privileged instructions
pub trait AuthorityResolver {
    /// `None` when the program is immutable
    fn resolve_authority(&self) -> Option<Pubkey>;
}

impl AuthorityResolver for ProgramData {
    fn resolve_authority(&self) -> Option<Pubkey> {
        self.upgrade_authority_address
    }
}

/// Fails with `Unauthorized` unless `signer` is the resolved authority
pub fn require_upgrade_authority<R>(resolver: &R, signer: &Pubkey) -> Result<()>
where
    R: AuthorityResolver + ?Sized,
{
    match resolver.resolve_authority() {
        Some(authority) if authority == *signer => Ok(()),
        _ => err!(EscrowError::Unauthorized),
    }
}
