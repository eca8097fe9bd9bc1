//! Builds the ordered cross-chain instruction batch for a sweep.
//!
//! ERC-20 transfers carry a balance-at-execution amount: the relay reads
//! the smart account's balance when the instruction runs, so no dust is
//! left behind by drift between quote time and execution time. Native
//! transfers carry the fixed snapshot captured at normalization, since
//! the relay's dynamic-balance primitive only covers token contracts.

use alloy::primitives::{Address, U256};
use tracing::{debug, warn};

use super::token::SweepToken;
use crate::account::MultichainAccount;
use crate::chains;

const TRANSFER_GAS_LIMIT: u64 = 100_000;

/// An instruction amount, resolved either at execution time or fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAmount {
    /// The relay evaluates `token.balanceOf(holder)` when executing.
    ExecutionTimeBalance { holder: Address, token: Address },
    Fixed(U256),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    Erc20Transfer {
        token: Address,
        recipient: Address,
        amount: TransferAmount,
    },
    NativeTransfer {
        recipient: Address,
        value: U256,
    },
}

/// One transfer within a supertransaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub chain_id: u64,
    pub kind: InstructionKind,
    pub gas_limit: u64,
}

/// How native-asset balances leave the smart account. The engine ships a
/// single selected implementation; alternatives (e.g. a forwarder
/// contract call) plug in here without touching the builder.
pub trait NativeSweepStrategy: Send + Sync {
    fn build(&self, chain_id: u64, recipient: Address, value: U256) -> Instruction;
}

/// Sweeps native balances with a plain value transfer to the recipient.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectValueTransfer;

impl NativeSweepStrategy for DirectValueTransfer {
    fn build(&self, chain_id: u64, recipient: Address, value: U256) -> Instruction {
        Instruction {
            chain_id,
            kind: InstructionKind::NativeTransfer { recipient, value },
            gas_limit: TRANSFER_GAS_LIMIT,
        }
    }
}

/// Converts sweep tokens into an ordered instruction batch, one
/// instruction per successfully processed token.
///
/// Tokens on unsupported chains, or on chains where the smart account has
/// no derived address, produce no instruction. Native tokens with a
/// missing or zero snapshot are skipped with a warning. An empty result
/// is the caller's error to surface, not the builder's.
pub fn build_sweep_instructions(
    account: &MultichainAccount,
    recipient: Address,
    tokens: &[SweepToken],
    native_strategy: &dyn NativeSweepStrategy,
) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(tokens.len());

    for token in tokens {
        if !chains::is_supported(token.chain_id) {
            debug!(chain_id = token.chain_id, "Skipping token on unsupported chain");
            continue;
        }

        let Some(holder) = account.address_on(token.chain_id) else {
            debug!(
                chain_id = token.chain_id,
                "Skipping token: no smart-account address on chain"
            );
            continue;
        };

        if token.is_native {
            let Some(value) = token.atomic_amount() else {
                warn!(
                    chain_id = token.chain_id,
                    "Native token missing amount or decimals, skipping"
                );
                continue;
            };
            if value.is_zero() {
                warn!(chain_id = token.chain_id, "Native token has zero balance, skipping");
                continue;
            }
            instructions.push(native_strategy.build(token.chain_id, recipient, value));
        } else {
            instructions.push(Instruction {
                chain_id: token.chain_id,
                kind: InstructionKind::Erc20Transfer {
                    token: token.address,
                    recipient,
                    amount: TransferAmount::ExecutionTimeBalance {
                        holder,
                        token: token.address,
                    },
                },
                gas_limit: TRANSFER_GAS_LIMIT,
            });
        }
    }

    instructions
}
