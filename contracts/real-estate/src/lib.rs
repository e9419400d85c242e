/*!
 * Real Estate Title Registry
 *
 * A minimal non-fungible registry of tokenized property titles. Each title is identified by a
 * sequential `u32` token id and carries a metadata URI.
 *
 * Key features:
 * - Minting of titles to an owner
 * - Single-operator approval per title
 * - Custodial transfers by the owner or the approved operator
 *
 * The escrow contract relies on `owner_of` and `transfer_from` to take custody of a title at
 * listing time and to hand it to the buyer (or back to the seller) when the sale resolves.
 */

#![no_std]

mod types;


use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, Env, Map, String, Symbol};

pub use types::{Error, APPROVED, MINTED, TRANSFERRED};

#[contract]
pub struct RealEstate;

// All registry state lives in instance storage, keyed by short symbols
const OWNERS_KEY: Symbol = symbol_short!("OWNERS");        // token_id -> owner
const APPROVALS_KEY: Symbol = symbol_short!("APPROVALS");  // token_id -> approved operator
const URIS_KEY: Symbol = symbol_short!("URIS");            // token_id -> metadata uri
const SUPPLY_KEY: Symbol = symbol_short!("SUPPLY");        // number of titles minted so far

#[contractimpl]
impl RealEstate {
    fn _owners(env: &Env) -> Map<u32, Address> {
        env.storage().instance().get(&OWNERS_KEY).unwrap_or_else(|| Map::new(env))
    }

    fn _approvals(env: &Env) -> Map<u32, Address> {
        env.storage().instance().get(&APPROVALS_KEY).unwrap_or_else(|| Map::new(env))
    }

    /// Mints a new title to `owner` and returns its token id.
    ///
    /// Token ids are assigned sequentially starting at 1, so the first title minted is id 1.
    ///
    /// # Arguments
    /// * `owner` - The address receiving the title (must sign)
    /// * `uri` - Metadata URI describing the property
    pub fn mint(env: Env, owner: Address, uri: String) -> u32 {
        owner.require_auth();

        let token_id: u32 = Self::total_supply(env.clone()) + 1;

        let mut owners = Self::_owners(&env);
        owners.set(token_id, owner.clone());

        let mut uris: Map<u32, String> =
            env.storage().instance().get(&URIS_KEY).unwrap_or_else(|| Map::new(&env));
        uris.set(token_id, uri.clone());

        env.storage().instance().set(&OWNERS_KEY, &owners);
        env.storage().instance().set(&URIS_KEY, &uris);
        env.storage().instance().set(&SUPPLY_KEY, &token_id);

        env.events().publish((MINTED, owner), (token_id, uri));

        token_id
    }

    /// Returns the current owner of a title.
    ///
    /// # Errors
    /// - TokenNotFound: If the title was never minted
    pub fn owner_of(env: Env, token_id: u32) -> Result<Address, Error> {
        Self::_owners(&env).get(token_id).ok_or(Error::TokenNotFound)
    }

    /// Approves `operator` to move the title on the owner's behalf.
    ///
    /// Only one operator is tracked per title; a later approval replaces the earlier one.
    /// The approval is cleared whenever the title is transferred.
    ///
    /// # Errors
    /// - TokenNotFound: If the title was never minted
    /// - NotOwner: If `owner` does not hold the title
    pub fn approve(env: Env, owner: Address, operator: Address, token_id: u32) -> Result<(), Error> {
        owner.require_auth();

        let current = Self::owner_of(env.clone(), token_id)?;
        if current != owner {
            return Err(Error::NotOwner);
        }

        let mut approvals = Self::_approvals(&env);
        approvals.set(token_id, operator.clone());
        env.storage().instance().set(&APPROVALS_KEY, &approvals);

        env.events().publish((APPROVED, owner), (token_id, operator));

        Ok(())
    }

    /// Returns the operator currently approved for a title, if any.
    pub fn get_approved(env: Env, token_id: u32) -> Option<Address> {
        Self::_approvals(&env).get(token_id)
    }

    /// Moves a title from `from` to `to`.
    ///
    /// # Authorization
    /// `spender` must sign and must be either the owner itself or the approved operator.
    /// A contract calling this directly with its own address as `spender` is authorized
    /// implicitly by the host.
    ///
    /// # Errors
    /// - TokenNotFound: If the title was never minted
    /// - NotOwner: If `from` is not the current owner
    /// - NotApproved: If `spender` is neither owner nor approved operator
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u32,
    ) -> Result<(), Error> {
        spender.require_auth();

        let mut owners = Self::_owners(&env);
        let owner = owners.get(token_id).ok_or(Error::TokenNotFound)?;
        if owner != from {
            return Err(Error::NotOwner);
        }

        let mut approvals = Self::_approvals(&env);
        if spender != owner && approvals.get(token_id) != Some(spender.clone()) {
            log!(&env, "Spender {} not approved for token {}", spender, token_id);
            return Err(Error::NotApproved);
        }

        owners.set(token_id, to.clone());
        approvals.remove(token_id);

        env.storage().instance().set(&OWNERS_KEY, &owners);
        env.storage().instance().set(&APPROVALS_KEY, &approvals);

        env.events().publish((TRANSFERRED, spender), (token_id, from, to));

        Ok(())
    }

    /// Returns the metadata URI of a title.
    pub fn token_uri(env: Env, token_id: u32) -> Result<String, Error> {
        let uris: Map<u32, String> =
            env.storage().instance().get(&URIS_KEY).unwrap_or_else(|| Map::new(&env));
        uris.get(token_id).ok_or(Error::TokenNotFound)
    }

    /// Number of titles minted so far.
    pub fn total_supply(env: Env) -> u32 {
        env.storage().instance().get(&SUPPLY_KEY).unwrap_or(0)
    }
}
