/*!
 * Real Estate Escrow Smart Contract
 *
 * This contract mediates the sale of a tokenized property title between a buyer and a seller.
 * The sale is gated by two trusted roles: an inspector, who attests the physical condition of
 * the property, and a lender, who finances the part of the price not covered by the buyer.
 *
 * Key features:
 * - Custody of the title from listing until the sale resolves
 * - Pooled custody of earnest deposits and financing in the payment token
 * - Inspector-controlled inspection flag
 * - Three-party sign-off (buyer, seller, lender) before the sale can complete
 * - Cancellation that refunds the buyer when inspection was recorded as failed, the seller otherwise
 *
 * Business Logic:
 * 1. The seller approves this contract on the registry and lists the title for a named buyer
 * 2. The buyer deposits earnest money; the lender tops up the remainder
 * 3. The inspector records the inspection result
 * 4. Buyer, seller and lender each approve
 * 5. Anyone finalizes: price to seller, title to buyer
 *    Or anyone cancels: pooled funds refunded according to the inspection flag
 *
 * Deposits are not earmarked per listing. All funds sit in one pool (the contract's balance
 * on the payment token), so one listing is expected to resolve before another one draws on
 * the same funds.
 */

#![no_std]

mod registry;
mod types;


use soroban_sdk::{
    contract,
    contractimpl,
    token,
    Address, Env, Map, Symbol, log, symbol_short
};

pub use registry::{AssetRegistry, AssetRegistryClient};
pub use types::{
    Error, Listing,
    LISTED, DEPOSITED, INSPECTED, APPROVED, FINALIZED, CANCELLED
};

#[contract]
pub struct RealEstateEscrow;

// Storage keys
// Role configuration is written once by `initialize` into persistent storage
// Listings live in instance storage next to the contract
const REGISTRY_KEY: Symbol = symbol_short!("REGISTRY");            // Title registry contract
const SELLER_KEY: Symbol = symbol_short!("SELLER");                // The single seller of this escrow
const INSPECTOR_KEY: Symbol = symbol_short!("INSPECTOR");          // Sets the inspection flag
const LENDER_KEY: Symbol = symbol_short!("LENDER");                // Third required approver
const PAYMENT_TOKEN_KEY: Symbol = symbol_short!("PAY_TKN");        // Token the pool is held in
const LISTINGS_KEY: Symbol = symbol_short!("LISTINGS");            // Map<u32, Listing>

#[contractimpl]
impl RealEstateEscrow {
    /// Configures the escrow. Can only be called once; the roles are immutable afterwards.
    ///
    /// # Arguments
    /// * `registry` - The title registry contract holding the properties
    /// * `seller` - The only address allowed to list titles
    /// * `inspector` - The only address allowed to record inspection results
    /// * `lender` - The financing party whose approval finalize requires
    /// * `payment_token` - The token deposits and payouts are made in
    ///
    /// # Errors
    /// - AlreadyInitialized: If the escrow was configured before
    pub fn initialize(
        env: Env,
        registry: Address,
        seller: Address,
        inspector: Address,
        lender: Address,
        payment_token: Address,
    ) -> Result<(), Error> {
        if env.storage().persistent().has(&SELLER_KEY) {
            return Err(Error::AlreadyInitialized);
        }

        env.storage().persistent().set(&REGISTRY_KEY, &registry);
        env.storage().persistent().set(&SELLER_KEY, &seller);
        env.storage().persistent().set(&INSPECTOR_KEY, &inspector);
        env.storage().persistent().set(&LENDER_KEY, &lender);
        env.storage().persistent().set(&PAYMENT_TOKEN_KEY, &payment_token);

        env.storage().instance().set(&LISTINGS_KEY, &Map::<u32, Listing>::new(&env));

        Ok(())
    }

    fn _config(env: &Env, key: &Symbol) -> Result<Address, Error> {
        env.storage().persistent().get(key).ok_or(Error::NotInitialized)
    }

    fn _listings(env: &Env) -> Map<u32, Listing> {
        env.storage().instance().get(&LISTINGS_KEY).unwrap_or_else(|| Map::new(env))
    }

    fn _save_listing(env: &Env, asset_id: u32, listing: &Listing) {
        let mut listings = Self::_listings(env);
        listings.set(asset_id, listing.clone());
        env.storage().instance().set(&LISTINGS_KEY, &listings);
    }

    fn _has_approved(listing: &Listing, participant: &Address) -> bool {
        listing.approvals.get(participant.clone()).unwrap_or(false)
    }

    /// Balance of the pool, i.e. this contract's holding of the payment token.
    fn _pool_balance(env: &Env, payment_token: &Address) -> i128 {
        token::Client::new(env, payment_token).balance(&env.current_contract_address())
    }

    /// Pays `amount` out of the pool. Zero amounts are skipped.
    fn _pay_out(env: &Env, payment_token: &Address, to: &Address, amount: i128) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }
        let token_client = token::Client::new(env, payment_token);
        match token_client.try_transfer(&env.current_contract_address(), to, &amount) {
            Ok(_) => Ok(()),
            Err(_) => {
                log!(env, "Failed to pay {} out of the pool", amount);
                Err(Error::ValueTransferFailure)
            }
        }
    }

    /// Moves a title held by this contract to `to`.
    fn _release_title(env: &Env, asset_id: u32, to: &Address) -> Result<(), Error> {
        let registry = AssetRegistryClient::new(env, &Self::_config(env, &REGISTRY_KEY)?);
        let escrow = env.current_contract_address();
        match registry.try_transfer_from(&escrow, &escrow, to, &asset_id) {
            Ok(_) => Ok(()),
            Err(_) => {
                log!(env, "Failed to release title {}", asset_id);
                Err(Error::TransferFailure)
            }
        }
    }

    /// Lists a title for sale to a specific buyer and takes custody of it.
    ///
    /// # Business Flow
    /// 1. Checks the caller is the configured seller
    /// 2. Confirms with the registry that the seller owns the title
    /// 3. Pulls the title into this contract (the seller must have approved it beforehand)
    /// 4. Writes a fresh listing: inspection reset, approvals cleared
    ///
    /// Relisting a title whose previous sale was resolved overwrites the old record.
    ///
    /// # Errors
    /// - NotAuthorized: If `caller` is not the seller
    /// - InvalidAmount: If price or escrow amount is negative
    /// - AlreadyListed: If the title has an unresolved listing
    /// - TransferFailure: If the registry refuses the custody transfer
    pub fn list(
        env: Env,
        caller: Address,
        asset_id: u32,
        buyer: Address,
        purchase_price: i128,
        escrow_amount: i128,
    ) -> Result<(), Error> {
        caller.require_auth();

        let seller = Self::_config(&env, &SELLER_KEY)?;
        if caller != seller {
            return Err(Error::NotAuthorized);
        }

        if purchase_price < 0 || escrow_amount < 0 {
            return Err(Error::InvalidAmount);
        }

        if let Some(existing) = Self::_listings(&env).get(asset_id) {
            if existing.is_listed {
                return Err(Error::AlreadyListed);
            }
        }

        let registry = AssetRegistryClient::new(&env, &Self::_config(&env, &REGISTRY_KEY)?);
        let escrow = env.current_contract_address();

        match registry.try_owner_of(&asset_id) {
            Ok(Ok(owner)) if owner == seller => {}
            _ => {
                log!(&env, "Seller does not hold title {}", asset_id);
                return Err(Error::TransferFailure);
            }
        }

        match registry.try_transfer_from(&escrow, &seller, &escrow, &asset_id) {
            Ok(_) => {}
            Err(_) => {
                log!(&env, "Custody transfer of title {} refused", asset_id);
                return Err(Error::TransferFailure);
            }
        }

        let listing = Listing {
            buyer: buyer.clone(),
            purchase_price,
            escrow_amount,
            is_listed: true,
            inspection: None,
            approvals: Map::new(&env),
        };
        Self::_save_listing(&env, asset_id, &listing);

        env.events().publish(
            (LISTED, seller),
            (asset_id, buyer, purchase_price, escrow_amount),
        );

        Ok(())
    }

    /// Deposits earnest money into the pool.
    ///
    /// Open to any depositor and any non-negative amount. Neither the buyer identity nor the
    /// listing's `escrow_amount` is checked, and the asset id is only recorded in the event.
    ///
    /// # Errors
    /// - InvalidAmount: If `amount` is negative
    /// - ValueTransferFailure: If the token transfer into the pool fails
    pub fn deposit_earnest(env: Env, depositor: Address, asset_id: u32, amount: i128) -> Result<(), Error> {
        depositor.require_auth();

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        let payment_token = Self::_config(&env, &PAYMENT_TOKEN_KEY)?;
        if amount > 0 {
            let token_client = token::Client::new(&env, &payment_token);
            match token_client.try_transfer(&depositor, &env.current_contract_address(), &amount) {
                Ok(_) => {}
                Err(_) => {
                    log!(&env, "Deposit of {} failed", amount);
                    return Err(Error::ValueTransferFailure);
                }
            }
        }

        env.events().publish((DEPOSITED, depositor), (asset_id, amount));

        Ok(())
    }

    /// Records the inspection result. The last write wins.
    ///
    /// The result is stored on the listing record, so the title must have been listed at least
    /// once. Resolved listings still accept writes; `list` clears them on relisting.
    ///
    /// # Errors
    /// - NotAuthorized: If `caller` is not the inspector
    /// - ListingNotFound: If the title was never listed
    pub fn update_inspection_status(
        env: Env,
        caller: Address,
        asset_id: u32,
        passed: bool,
    ) -> Result<(), Error> {
        caller.require_auth();

        let inspector = Self::_config(&env, &INSPECTOR_KEY)?;
        if caller != inspector {
            return Err(Error::NotAuthorized);
        }

        let mut listing = Self::_listings(&env).get(asset_id).ok_or(Error::ListingNotFound)?;
        listing.inspection = Some(passed);
        Self::_save_listing(&env, asset_id, &listing);

        env.events().publish((INSPECTED, inspector), (asset_id, passed));

        Ok(())
    }

    /// Signs off on a sale on behalf of `caller`.
    ///
    /// Anyone may approve; only the buyer, seller and lender approvals count toward finalize.
    /// Approvals cannot be withdrawn.
    ///
    /// Approvals are stored on the listing record, so ids that were never listed are rejected.
    ///
    /// # Errors
    /// - ListingNotFound: If the title was never listed
    pub fn approve(env: Env, caller: Address, asset_id: u32) -> Result<(), Error> {
        caller.require_auth();

        let mut listing = Self::_listings(&env).get(asset_id).ok_or(Error::ListingNotFound)?;
        listing.approvals.set(caller.clone(), true);
        Self::_save_listing(&env, asset_id, &listing);

        env.events().publish((APPROVED, caller), (asset_id,));

        Ok(())
    }

    /// Completes the sale: the full price goes to the seller and the title to the buyer.
    ///
    /// # Requirements
    /// All of the following must hold, otherwise nothing happens:
    /// - the listing is active
    /// - inspection passed
    /// - buyer, seller and lender have each approved
    /// - the pool holds at least the purchase price
    ///
    /// Exactly `purchase_price` leaves the pool. Any surplus stays pooled.
    ///
    /// # Errors
    /// - PreconditionNotMet: If any requirement above fails
    /// - ValueTransferFailure: If paying the seller fails
    /// - TransferFailure: If the registry refuses to deliver the title
    pub fn finalize_sale(env: Env, asset_id: u32) -> Result<(), Error> {
        let seller = Self::_config(&env, &SELLER_KEY)?;
        let lender = Self::_config(&env, &LENDER_KEY)?;
        let payment_token = Self::_config(&env, &PAYMENT_TOKEN_KEY)?;

        let mut listing = Self::_listings(&env).get(asset_id).ok_or(Error::PreconditionNotMet)?;
        let balance = Self::_pool_balance(&env, &payment_token);

        let ready = listing.is_listed
            && listing.inspection == Some(true)
            && Self::_has_approved(&listing, &listing.buyer)
            && Self::_has_approved(&listing, &seller)
            && Self::_has_approved(&listing, &lender)
            && balance >= listing.purchase_price;
        if !ready {
            log!(&env, "Sale of {} not ready. Pool: {}, price: {}", asset_id, balance, listing.purchase_price);
            return Err(Error::PreconditionNotMet);
        }

        // A failed transfer below aborts the invocation and the host discards this write
        listing.is_listed = false;
        Self::_save_listing(&env, asset_id, &listing);

        Self::_pay_out(&env, &payment_token, &seller, listing.purchase_price)?;
        Self::_release_title(&env, asset_id, &listing.buyer)?;

        env.events().publish(
            (FINALIZED, listing.buyer.clone()),
            (asset_id, listing.purchase_price),
        );

        Ok(())
    }

    /// Unwinds the sale and empties the pool.
    ///
    /// # Refund Policy
    /// - Inspection recorded as failed: whole pool to the buyer
    /// - Inspection passed, or never recorded: whole pool to the seller
    ///
    /// The title is returned to the seller. Callable by anyone.
    ///
    /// # Errors
    /// - PreconditionNotMet: If the listing is unknown or already resolved
    /// - ValueTransferFailure: If the refund fails
    /// - TransferFailure: If the registry refuses to return the title
    pub fn cancel_sale(env: Env, asset_id: u32) -> Result<(), Error> {
        let seller = Self::_config(&env, &SELLER_KEY)?;
        let payment_token = Self::_config(&env, &PAYMENT_TOKEN_KEY)?;

        let mut listing = Self::_listings(&env)
            .get(asset_id)
            .filter(|listing| listing.is_listed)
            .ok_or(Error::PreconditionNotMet)?;

        let recipient = match listing.inspection {
            Some(false) => listing.buyer.clone(),
            Some(true) | None => seller.clone(),
        };
        let refund = Self::_pool_balance(&env, &payment_token);

        listing.is_listed = false;
        Self::_save_listing(&env, asset_id, &listing);

        Self::_pay_out(&env, &payment_token, &recipient, refund)?;
        Self::_release_title(&env, asset_id, &seller)?;

        env.events().publish((CANCELLED, recipient), (asset_id, refund));

        Ok(())
    }

    // ============================================================================================
    // READ-ONLY ACCESSORS
    // Unknown asset ids read as the zero value
    // ============================================================================================

    pub fn is_listed(env: Env, asset_id: u32) -> bool {
        Self::_listings(&env).get(asset_id).map(|l| l.is_listed).unwrap_or(false)
    }

    pub fn buyer(env: Env, asset_id: u32) -> Option<Address> {
        Self::_listings(&env).get(asset_id).map(|l| l.buyer)
    }

    pub fn purchase_price(env: Env, asset_id: u32) -> i128 {
        Self::_listings(&env).get(asset_id).map(|l| l.purchase_price).unwrap_or(0)
    }

    pub fn escrow_amount(env: Env, asset_id: u32) -> i128 {
        Self::_listings(&env).get(asset_id).map(|l| l.escrow_amount).unwrap_or(0)
    }

    pub fn inspection_passed(env: Env, asset_id: u32) -> bool {
        Self::_listings(&env)
            .get(asset_id)
            .and_then(|l| l.inspection)
            .unwrap_or(false)
    }

    /// Whether `participant` has approved the sale of `asset_id`.
    pub fn approval(env: Env, asset_id: u32, participant: Address) -> bool {
        Self::_listings(&env)
            .get(asset_id)
            .map(|l| Self::_has_approved(&l, &participant))
            .unwrap_or(false)
    }

    /// The full listing record, if the title was ever listed.
    pub fn get_listing(env: Env, asset_id: u32) -> Option<Listing> {
        Self::_listings(&env).get(asset_id)
    }

    /// Pooled balance held in custody. Zero before initialization.
    pub fn get_balance(env: Env) -> i128 {
        match Self::_config(&env, &PAYMENT_TOKEN_KEY) {
            Ok(payment_token) => Self::_pool_balance(&env, &payment_token),
            Err(_) => 0,
        }
    }

    pub fn get_registry(env: Env) -> Result<Address, Error> {
        Self::_config(&env, &REGISTRY_KEY)
    }

    pub fn get_seller(env: Env) -> Result<Address, Error> {
        Self::_config(&env, &SELLER_KEY)
    }

    pub fn get_inspector(env: Env) -> Result<Address, Error> {
        Self::_config(&env, &INSPECTOR_KEY)
    }

    pub fn get_lender(env: Env) -> Result<Address, Error> {
        Self::_config(&env, &LENDER_KEY)
    }

    pub fn get_payment_token(env: Env) -> Result<Address, Error> {
        Self::_config(&env, &PAYMENT_TOKEN_KEY)
    }
}
