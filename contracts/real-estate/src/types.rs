/*!
 * Type Definitions for the Real Estate Title Registry
 *
 * Error codes and event topics shared by the registry contract.
 */

use soroban_sdk::{contracterror, symbol_short, Symbol};

/// Failure modes of the title registry.
///
/// # Error Code Ranges
/// - 1: Entity not found
/// - 2-3: Ownership and operator authorization
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// No title has been minted under this token id
    TokenNotFound = 1,

    /// The address named as owner does not currently own the title
    NotOwner = 2,

    /// The spender is neither the owner nor the approved operator
    NotApproved = 3,
}

/// Emitted when a title is minted.
/// Contains: (token_id, uri)
pub const MINTED: Symbol = symbol_short!("mint");

/// Emitted when the owner approves an operator for a title.
/// Contains: (token_id, operator)
pub const APPROVED: Symbol = symbol_short!("approve");

/// Emitted when a title changes hands.
/// Contains: (token_id, from, to)
pub const TRANSFERRED: Symbol = symbol_short!("transfer");
