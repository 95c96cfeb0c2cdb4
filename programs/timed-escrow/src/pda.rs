//! Deterministic addresses for the escrow record and its vault.
//!
//! Both are program-derived: off the ed25519 curve, so no keypair can
//! sign for them, and reproducible by any client holding the initializer
//! and mint keys. The record PDA doubles as the vault's token authority,
//! so only this program can move tokens out of a vault.

use anchor_lang::prelude::*;
use crate::constants::{ESCROW_SEED, VAULT_SEED};

/// Seeds of the escrow record, without the bump
pub fn escrow_seeds<'a>(initializer: &'a Pubkey, mint: &'a Pubkey) -> [&'a [u8]; 3] {
    [ESCROW_SEED, initializer.as_ref(), mint.as_ref()]
}

/// Escrow record seeds with the bump appended, for `invoke_signed`
pub fn escrow_signer_seeds<'a>(
    initializer: &'a Pubkey,
    mint: &'a Pubkey,
    bump: &'a [u8; 1],
) -> [&'a [u8]; 4] {
    let [tag, initializer, mint] = escrow_seeds(initializer, mint);
    [tag, initializer, mint, bump]
}

/// Seeds of the vault token account, without the bump
pub fn vault_seeds<'a>(initializer: &'a Pubkey, mint: &'a Pubkey) -> [&'a [u8]; 3] {
    [VAULT_SEED, initializer.as_ref(), mint.as_ref()]
}

pub fn find_escrow_address_with_program_id(
    program_id: &Pubkey,
    initializer: &Pubkey,
    mint: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(&escrow_seeds(initializer, mint), program_id)
}

pub fn find_vault_address_with_program_id(
    program_id: &Pubkey,
    initializer: &Pubkey,
    mint: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(&vault_seeds(initializer, mint), program_id)
}

/// Escrow record address under this program's id
pub fn find_escrow_address(initializer: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    find_escrow_address_with_program_id(&crate::ID, initializer, mint)
}

/// Vault address under this program's id
pub fn find_vault_address(initializer: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    find_vault_address_with_program_id(&crate::ID, initializer, mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let initializer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        assert_eq!(
            find_escrow_address(&initializer, &mint),
            find_escrow_address(&initializer, &mint)
        );
        assert_eq!(
            find_vault_address(&initializer, &mint),
            find_vault_address(&initializer, &mint)
        );
    }

    #[test]
    fn test_bump_reproduces_address() {
        let initializer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (escrow, bump) = find_escrow_address(&initializer, &mint);
        let (vault, vault_bump) = find_vault_address(&initializer, &mint);

        let [a, b, c] = escrow_seeds(&initializer, &mint);
        assert_eq!(
            Pubkey::create_program_address(&[a, b, c, &[bump]], &crate::ID).unwrap(),
            escrow
        );

        let [a, b, c] = vault_seeds(&initializer, &mint);
        assert_eq!(
            Pubkey::create_program_address(&[a, b, c, &[vault_bump]], &crate::ID).unwrap(),
            vault
        );
    }

    #[test]
    fn test_signer_seeds_sign_for_escrow() {
        let initializer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (escrow, bump) = find_escrow_address(&initializer, &mint);

        let bump = [bump];
        let seeds = escrow_signer_seeds(&initializer, &mint, &bump);
        assert_eq!(seeds[0], ESCROW_SEED);
        assert_eq!(
            Pubkey::create_program_address(&seeds, &crate::ID).unwrap(),
            escrow
        );
    }

    #[test]
    fn test_addresses_are_distinct() {
        let initializer = Pubkey::new_unique();
        let other_initializer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let other_mint = Pubkey::new_unique();

        let (escrow, _) = find_escrow_address(&initializer, &mint);
        let (vault, _) = find_vault_address(&initializer, &mint);
        assert_ne!(escrow, vault);

        assert_ne!(escrow, find_escrow_address(&other_initializer, &mint).0);
        assert_ne!(escrow, find_escrow_address(&initializer, &other_mint).0);
        // the order of the parts matters
        assert_ne!(escrow, find_escrow_address(&mint, &initializer).0);
    }

    #[test]
    fn test_program_id_scopes_addresses() {
        let initializer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let other_program = Pubkey::new_unique();

        assert_ne!(
            find_escrow_address(&initializer, &mint).0,
            find_escrow_address_with_program_id(&other_program, &initializer, &mint).0
        );
    }
}
