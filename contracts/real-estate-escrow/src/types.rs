/*!
 * Type Definitions for the Real Estate Escrow Contract
 *
 * This module defines the listing record, the error codes and the event topics used by the
 * escrow contract.
 */

use soroban_sdk::{contracterror, contracttype, symbol_short, Address, Map, Symbol};

// ================================================================================================
// CORE DATA STRUCTURES
// ================================================================================================

/// The escrow record for one property sale, keyed by the title's token id.
///
/// # Lifecycle
/// 1. Created (or overwritten) by `list`, with `is_listed = true`
/// 2. Mutated by `update_inspection_status` and `approve`
/// 3. Resolved exactly once by `finalize_sale` or `cancel_sale`, which clear `is_listed`
///
/// Earnest deposits are not recorded here. They go into the contract's pooled balance,
/// which is shared by every listing.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listing {
    /// The only address the title can be delivered to on finalize
    pub buyer: Address,

    /// Total agreed price, paid out to the seller in full on finalize
    pub purchase_price: i128,

    /// Earnest deposit the buyer is expected to advance.
    /// Informational: deposits are not checked against it
    pub escrow_amount: i128,

    /// True from listing until the sale is finalized or cancelled
    pub is_listed: bool,

    /// Inspection result, `None` until the inspector records one; the last write wins.
    /// Finalize requires `Some(true)`. Cancel refunds the buyer only on `Some(false)`
    pub inspection: Option<bool>,

    /// Sign-offs keyed by participant. Anyone may sign, but only the
    /// buyer, seller and lender entries are consulted by finalize
    pub approvals: Map<Address, bool>,
}

// ================================================================================================
// ERROR DEFINITIONS
// ================================================================================================

/// Error codes returned by the escrow contract.
///
/// Any error aborts the whole invocation; the host rolls back every storage write and nested
/// call made by it, so no operation ever leaves partial state behind.
///
/// # Error Code Ranges
/// - 1-4: Authorization, sale preconditions and custody failures
/// - 5-9: Setup and input validation
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Caller lacks the role the operation requires (seller for `list`,
    /// inspector for `update_inspection_status`)
    NotAuthorized = 1,

    /// Finalize or cancel invoked while its requirements are unmet: listing not active,
    /// inspection not passed, a required approval missing, or pooled balance below price
    PreconditionNotMet = 2,

    /// The registry refused to move the title (missing approval, wrong owner, unknown id)
    TransferFailure = 3,

    /// A payment-token transfer into or out of the pool could not complete
    ValueTransferFailure = 4,

    /// `initialize` has not been called yet
    NotInitialized = 5,

    /// `initialize` was already called; configuration is immutable
    AlreadyInitialized = 6,

    /// The title already has an unresolved listing
    AlreadyListed = 7,

    /// No listing has ever been created for this token id
    ListingNotFound = 8,

    /// Negative price, escrow amount or deposit
    InvalidAmount = 9,
}

// ================================================================================================
// EVENT CONSTANTS
// ================================================================================================

/// Event emitted when the seller lists a title
/// Contains: (asset_id, buyer, purchase_price, escrow_amount)
pub const LISTED: Symbol = symbol_short!("listed");

/// Event emitted when value is deposited into the pool
/// Contains: (asset_id, amount)
pub const DEPOSITED: Symbol = symbol_short!("deposit");

/// Event emitted when the inspector records a result
/// Contains: (asset_id, passed)
pub const INSPECTED: Symbol = symbol_short!("inspected");

/// Event emitted when a participant signs off
/// Contains: (asset_id,)
pub const APPROVED: Symbol = symbol_short!("approved");

/// Event emitted when a sale completes
/// Contains: (asset_id, purchase_price)
pub const FINALIZED: Symbol = symbol_short!("finalized");

/// Event emitted when a sale is unwound; the topic carries the refund recipient
/// Contains: (asset_id, refunded_amount)
pub const CANCELLED: Symbol = symbol_short!("cancelled");
