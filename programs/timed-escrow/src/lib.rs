use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, TransferChecked};

declare_id!("Ex88ZtvTMggrjXCjwFZj57cnzGgdWULt1hXbxaYQkQvp");

pub mod authority;
pub mod constants;
pub mod errors;
pub mod events;
pub mod pda;
pub mod state;

use constants::*;
use errors::*;
use events::*;
use state::*;

#[program]
pub mod timed_escrow {
    use super::*;

    /// Open and fund an escrow in one instruction
    ///
    /// Security:
    /// - One record per (initializer, mint), never reusable
    /// - Receivers: 1..=10, unique, non-default
    /// - Balance checked before the transfer, deltas verified after
    pub fn initialize_escrow(
        ctx: Context<InitializeEscrow>,
        receivers: Vec<Pubkey>,
        start_time: i64,
        amount: u64,
    ) -> Result<()> {
        let escrow_key = ctx.accounts.escrow.key();
        let initializer_key = ctx.accounts.initializer.key();
        let clock = Clock::get()?;
        let timestamp = clock.unix_timestamp;

        let before = TransferBalances {
            from: ctx.accounts.initializer_token_account.amount,
            to: ctx.accounts.vault.amount,
        };

        // CHECKS + EFFECTS
        let escrow = &mut ctx.accounts.escrow;
        escrow.open(
            initializer_key,
            ctx.accounts.mint.key(),
            receivers,
            start_time,
            ctx.bumps.escrow,
            ctx.bumps.vault,
            timestamp,
        )?;
        escrow.fund(&initializer_key, amount, before.from)?;

        emit!(EscrowOpened {
            escrow: escrow_key,
            initializer: escrow.initializer,
            mint: escrow.mint,
            receiver_count: escrow.receivers.len() as u8,
            start_time,
            timestamp,
        });

        // INTERACTIONS
        transfer_to_vault(
            &ctx.accounts.token_program,
            &ctx.accounts.initializer_token_account,
            &ctx.accounts.mint,
            &ctx.accounts.vault,
            &ctx.accounts.initializer,
            amount,
        )?;

        ctx.accounts.initializer_token_account.reload()?;
        ctx.accounts.vault.reload()?;
        before.require_moved(
            &TransferBalances {
                from: ctx.accounts.initializer_token_account.amount,
                to: ctx.accounts.vault.amount,
            },
            amount,
        )?;

        emit!(EscrowFunded {
            escrow: escrow_key,
            amount,
            timestamp,
        });

        msg!("Escrow initialized: {} tokens locked", amount);
        Ok(())
    }

    /// Open an escrow without funding it
    ///
    /// The record stays `Uninitialized` until `deposit`.
    pub fn open_escrow(
        ctx: Context<OpenEscrow>,
        receivers: Vec<Pubkey>,
        start_time: i64,
    ) -> Result<()> {
        let escrow_key = ctx.accounts.escrow.key();
        let clock = Clock::get()?;
        let timestamp = clock.unix_timestamp;

        let escrow = &mut ctx.accounts.escrow;
        escrow.open(
            ctx.accounts.initializer.key(),
            ctx.accounts.mint.key(),
            receivers,
            start_time,
            ctx.bumps.escrow,
            ctx.bumps.vault,
            timestamp,
        )?;

        emit!(EscrowOpened {
            escrow: escrow_key,
            initializer: escrow.initializer,
            mint: escrow.mint,
            receiver_count: escrow.receivers.len() as u8,
            start_time,
            timestamp,
        });

        msg!("Escrow opened with {} receivers", escrow.receivers.len());
        Ok(())
    }

    /// Fund an opened escrow
    ///
    /// Security:
    /// - Initializer only
    /// - Single funding, no top-ups
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        let escrow_key = ctx.accounts.escrow.key();
        let clock = Clock::get()?;

        let before = TransferBalances {
            from: ctx.accounts.initializer_token_account.amount,
            to: ctx.accounts.vault.amount,
        };

        // CHECKS + EFFECTS
        ctx.accounts
            .escrow
            .fund(&ctx.accounts.initializer.key(), amount, before.from)?;

        // INTERACTIONS
        transfer_to_vault(
            &ctx.accounts.token_program,
            &ctx.accounts.initializer_token_account,
            &ctx.accounts.mint,
            &ctx.accounts.vault,
            &ctx.accounts.initializer,
            amount,
        )?;

        ctx.accounts.initializer_token_account.reload()?;
        ctx.accounts.vault.reload()?;
        before.require_moved(
            &TransferBalances {
                from: ctx.accounts.initializer_token_account.amount,
                to: ctx.accounts.vault.amount,
            },
            amount,
        )?;

        emit!(EscrowFunded {
            escrow: escrow_key,
            amount,
            timestamp: clock.unix_timestamp,
        });

        msg!("Escrow funded: {} tokens", amount);
        Ok(())
    }

    /// Release the vault to one nominated receiver
    ///
    /// Security:
    /// - Program upgrade authority ONLY, resolved from ProgramData
    /// - Authority checked before the receiver index
    /// - No time restriction
    ///
    /// Account constraints (escrow seeds, `has_one = mint`, receiver
    /// account mint, ProgramData link) are evaluated by Anchor before this
    /// handler runs. A caller passing mismatched accounts therefore sees
    /// `InvalidTokenMint` or a constraint error ahead of `Unauthorized`;
    /// no transfer happens on either path.
    pub fn privileged_withdraw(
        ctx: Context<PrivilegedWithdraw>,
        receiver_index: u8,
    ) -> Result<()> {
        let escrow_key = ctx.accounts.escrow.key();
        let authority_key = ctx.accounts.authority.key();
        let clock = Clock::get()?;

        // CHECKS
        let receiver = ctx.accounts.escrow.authorize_withdraw(
            &*ctx.accounts.program_data,
            &authority_key,
            receiver_index,
            &ctx.accounts.receiver_token_account.owner,
        )?;

        let released = ctx.accounts.vault.amount;
        let before = TransferBalances {
            from: released,
            to: ctx.accounts.receiver_token_account.amount,
        };

        // EFFECTS
        ctx.accounts
            .escrow
            .settle(Settlement::Withdrawn, receiver, clock.unix_timestamp)?;

        emit!(EscrowWithdrawn {
            escrow: escrow_key,
            authority: authority_key,
            receiver,
            receiver_index,
            amount: released,
            timestamp: clock.unix_timestamp,
        });

        // INTERACTIONS
        transfer_from_vault(
            &ctx.accounts.token_program,
            &ctx.accounts.vault,
            &ctx.accounts.mint,
            &ctx.accounts.receiver_token_account,
            &ctx.accounts.escrow,
            released,
        )?;

        ctx.accounts.vault.reload()?;
        ctx.accounts.receiver_token_account.reload()?;
        before.require_moved(
            &TransferBalances {
                from: ctx.accounts.vault.amount,
                to: ctx.accounts.receiver_token_account.amount,
            },
            released,
        )?;

        msg!("Privileged withdrawal: {} tokens to receiver {}", released, receiver_index);
        Ok(())
    }

    /// Return the vault to the initializer after the claim window
    ///
    /// Security:
    /// - Initializer only, checked before the window
    /// - now >= start_time + CLAIM_WINDOW
    pub fn claim(ctx: Context<Claim>) -> Result<()> {
        let escrow_key = ctx.accounts.escrow.key();
        let initializer_key = ctx.accounts.initializer.key();
        let clock = Clock::get()?;

        // CHECKS
        let released = ctx.accounts.vault.amount;
        ctx.accounts
            .escrow
            .authorize_claim(&initializer_key, clock.unix_timestamp, released)?;

        let before = TransferBalances {
            from: released,
            to: ctx.accounts.initializer_token_account.amount,
        };

        // EFFECTS
        ctx.accounts
            .escrow
            .settle(Settlement::Claimed, initializer_key, clock.unix_timestamp)?;

        emit!(EscrowClaimed {
            escrow: escrow_key,
            initializer: initializer_key,
            amount: released,
            timestamp: clock.unix_timestamp,
        });

        // INTERACTIONS
        transfer_from_vault(
            &ctx.accounts.token_program,
            &ctx.accounts.vault,
            &ctx.accounts.mint,
            &ctx.accounts.initializer_token_account,
            &ctx.accounts.escrow,
            released,
        )?;

        ctx.accounts.vault.reload()?;
        ctx.accounts.initializer_token_account.reload()?;
        before.require_moved(
            &TransferBalances {
                from: ctx.accounts.vault.amount,
                to: ctx.accounts.initializer_token_account.amount,
            },
            released,
        )?;

        msg!("Escrow claimed: {} tokens", released);
        Ok(())
    }
}

/// Move `amount` from the depositor into the vault, signed by the depositor
fn transfer_to_vault<'info>(
    token_program: &Program<'info, Token>,
    from: &Account<'info, TokenAccount>,
    mint: &Account<'info, Mint>,
    vault: &Account<'info, TokenAccount>,
    authority: &Signer<'info>,
    amount: u64,
) -> Result<()> {
    let cpi_accounts = TransferChecked {
        from: from.to_account_info(),
        mint: mint.to_account_info(),
        to: vault.to_account_info(),
        authority: authority.to_account_info(),
    };
    token::transfer_checked(
        CpiContext::new(token_program.to_account_info(), cpi_accounts),
        amount,
        mint.decimals,
    )
}

/// Move `amount` out of the vault, signed by the escrow PDA
fn transfer_from_vault<'info>(
    token_program: &Program<'info, Token>,
    vault: &Account<'info, TokenAccount>,
    mint: &Account<'info, Mint>,
    to: &Account<'info, TokenAccount>,
    escrow: &Account<'info, EscrowAccount>,
    amount: u64,
) -> Result<()> {
    let bump = [escrow.bump];
    let seeds = pda::escrow_signer_seeds(&escrow.initializer, &escrow.mint, &bump);
    let signer: &[&[&[u8]]] = &[&seeds[..]];

    let cpi_accounts = TransferChecked {
        from: vault.to_account_info(),
        mint: mint.to_account_info(),
        to: to.to_account_info(),
        authority: escrow.to_account_info(),
    };
    token::transfer_checked(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            cpi_accounts,
            signer,
        ),
        amount,
        mint.decimals,
    )
}

// ============================================================
// ACCOUNT VALIDATION STRUCTS
// ============================================================

#[derive(Accounts)]
pub struct InitializeEscrow<'info> {
    #[account(mut)]
    pub initializer: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = initializer
    )]
    pub initializer_token_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = initializer,
        space = 8 + EscrowAccount::INIT_SPACE,
        seeds = [ESCROW_SEED, initializer.key().as_ref(), mint.key().as_ref()],
        bump
    )]
    pub escrow: Box<Account<'info, EscrowAccount>>,

    #[account(
        init_if_needed,
        payer = initializer,
        seeds = [VAULT_SEED, initializer.key().as_ref(), mint.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = escrow
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct OpenEscrow<'info> {
    #[account(mut)]
    pub initializer: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = initializer,
        space = 8 + EscrowAccount::INIT_SPACE,
        seeds = [ESCROW_SEED, initializer.key().as_ref(), mint.key().as_ref()],
        bump
    )]
    pub escrow: Box<Account<'info, EscrowAccount>>,

    #[account(
        init_if_needed,
        payer = initializer,
        seeds = [VAULT_SEED, initializer.key().as_ref(), mint.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = escrow
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub initializer: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = initializer
    )]
    pub initializer_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.initializer.as_ref(), escrow.mint.as_ref()],
        bump = escrow.bump,
        has_one = mint @ EscrowError::InvalidTokenMint
    )]
    pub escrow: Box<Account<'info, EscrowAccount>>,

    #[account(
        mut,
        seeds = [VAULT_SEED, escrow.initializer.as_ref(), escrow.mint.as_ref()],
        bump = escrow.vault_bump,
        token::mint = mint,
        token::authority = escrow
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct PrivilegedWithdraw<'info> {
    pub authority: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.initializer.as_ref(), escrow.mint.as_ref()],
        bump = escrow.bump,
        has_one = mint @ EscrowError::InvalidTokenMint
    )]
    pub escrow: Box<Account<'info, EscrowAccount>>,

    #[account(
        mut,
        seeds = [VAULT_SEED, escrow.initializer.as_ref(), escrow.mint.as_ref()],
        bump = escrow.vault_bump,
        token::mint = mint,
        token::authority = escrow
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == mint.key() @ EscrowError::InvalidTokenMint
    )]
    pub receiver_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = program.programdata_address()? == Some(program_data.key()) @ EscrowError::Unauthorized
    )]
    pub program: Program<'info, program::TimedEscrow>,

    pub program_data: Account<'info, ProgramData>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct Claim<'info> {
    #[account(mut)]
    pub initializer: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.initializer.as_ref(), escrow.mint.as_ref()],
        bump = escrow.bump,
        has_one = mint @ EscrowError::InvalidTokenMint
    )]
    pub escrow: Box<Account<'info, EscrowAccount>>,

    #[account(
        mut,
        seeds = [VAULT_SEED, escrow.initializer.as_ref(), escrow.mint.as_ref()],
        bump = escrow.vault_bump,
        token::mint = mint,
        token::authority = escrow
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = initializer
    )]
    pub initializer_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}
