//! Interface of the title registry the escrow takes custody through.

use soroban_sdk::{contractclient, Address, Env};

/// The subset of the title registry the escrow calls into.
///
/// The seller must have approved the escrow contract as operator for the title before listing,
/// otherwise `transfer_from` is rejected by the registry.
#[contractclient(name = "AssetRegistryClient")]
pub trait AssetRegistry {
    /// Current owner of `token_id`. Fails if the title does not exist.
    fn owner_of(env: Env, token_id: u32) -> Address;

    /// Moves `token_id` from `from` to `to` on behalf of `spender`.
    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, token_id: u32);
}
