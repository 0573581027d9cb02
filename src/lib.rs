//! # Soroban Payment Links
//!
//! Named payment collection for the Soroban blockchain.
//!
//! Users claim a human-readable name, publish payment links with an optional
//! fixed amount, receive transfers into an escrow balance held by this
//! contract, and withdraw that balance whenever they like. Features include:
//!
//! - First-come unique names
//! - Sequentially numbered payment links with an "any amount" mode
//! - Per-address escrow balances funded through a token contract
//! - Per-link received totals
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Claim a name and publish a link
//! client.register(&name, &alice);
//! let link_id = client.create_payment_link(&description, &0, &alice);
//!
//! // Pay by name or by link
//! client.pay_to_name(&name, &100, &bob);
//! client.pay_to_link(&link_id, &50, &bob);
//!
//! // Collect the escrow
//! client.withdraw(&alice);
//! ```
//!
//! The contract entry points are thin wrappers over [`Ledger`], a
//! host-agnostic state machine driven through the [`KeyValueStore`] and
//! [`Host`] traits.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod events;
mod host;
mod ledger;
mod link;
mod storage;
mod validation;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use host::{ContractHost, ContractStore, Host, KeyValueStore, LedgerEvent};
pub use ledger::Ledger;
pub use link::{LinkAmount, LinkDetails, PaymentLink};
pub use storage::ConfigKey;
pub use validation::{format_decimal, parse_decimal, validate_name};

use core::fmt;

use soroban_sdk::{contract, contractimpl, panic_with_error, Address, Env, String};

use crate::host::{soroban_string, to_std_string};
use crate::storage::{INSTANCE_TTL_EXTEND, INSTANCE_TTL_THRESHOLD};

/// Error codes for the payment link contract.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LedgerError {
    /// Initialization attempted outside of contract deployment.
    DeploymentOnly = 1,
    /// Ledger has already been initialized.
    AlreadyInitialized = 2,
    /// Ledger has not been initialized.
    NotInitialized = 3,
    /// Name is already registered.
    NameTaken = 4,
    /// Name is not registered.
    NameNotFound = 5,
    /// Payment link does not exist.
    LinkNotFound = 6,
    /// Payment carried no value.
    NoValueSent = 7,
    /// Caller has nothing to withdraw.
    NoBalance = 8,
    /// Name is empty or not valid UTF-8.
    InvalidName = 9,
    /// Payment does not match the link's fixed amount.
    AmountMismatch = 10,
    /// Arithmetic overflow on a balance or counter.
    Overflow = 11,
    /// A stored value could not be decoded.
    CorruptRecord = 12,
    /// The host refused the outbound transfer.
    TransferFailed = 13,
    /// A text argument is not valid UTF-8.
    InvalidText = 14,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            LedgerError::DeploymentOnly => "init is only callable during deployment",
            LedgerError::AlreadyInitialized => "ledger already initialized",
            LedgerError::NotInitialized => "ledger not initialized",
            LedgerError::NameTaken => "Name already taken",
            LedgerError::NameNotFound => "Name not registered",
            LedgerError::LinkNotFound => "Payment link not found",
            LedgerError::NoValueSent => "No value sent",
            LedgerError::NoBalance => "No balance to withdraw",
            LedgerError::InvalidName => "Name must not be empty",
            LedgerError::AmountMismatch => "Payment does not match the link amount",
            LedgerError::Overflow => "Amount overflow",
            LedgerError::CorruptRecord => "Stored record is corrupt",
            LedgerError::TransferFailed => "Outbound transfer failed",
            LedgerError::InvalidText => "Argument is not valid UTF-8",
        };
        f.write_str(message)
    }
}

impl From<LedgerError> for soroban_sdk::Error {
    fn from(e: LedgerError) -> Self {
        soroban_sdk::Error::from_contract_error(e as u32)
    }
}

#[contract]
pub struct PaymentLinkContract;

#[contractimpl]
impl PaymentLinkContract {
    // ========== Deployment ==========

    /// Deploy the contract against the token used for payments.
    ///
    /// Runs exactly once, as part of deployment. Stores the token address
    /// and initializes the link counter.
    pub fn __constructor(env: Env, token: Address) {
        env.storage().instance().set(&ConfigKey::Token, &token);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);

        run(&env, ContractHost::deploying(&env), |ledger| ledger.init());
    }

    /// Get the token contract that payments are made in.
    pub fn token(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&ConfigKey::Token)
            .unwrap_or_else(|| panic_with_error!(&env, LedgerError::NotInitialized))
    }

    // ========== Names ==========

    /// Claim `name` for `caller`.
    ///
    /// # Panics
    /// - If the name is empty or not valid UTF-8
    /// - If the name is already registered
    pub fn register(env: Env, name: String, caller: Address) {
        caller.require_auth();

        let name = text_arg(&env, &name, LedgerError::InvalidName);
        run(&env, ContractHost::new(&env, caller), |ledger| {
            ledger.register(&name)
        });
    }

    /// Resolve a registered name to its owner address.
    pub fn get_name_address(env: Env, name: String) -> String {
        let name = text_arg(&env, &name, LedgerError::InvalidName);
        let owner = run(&env, ContractHost::view(&env), |ledger| {
            ledger.get_name_address(&name)
        });
        soroban_string(&env, &owner)
    }

    /// Check if a name can still be registered.
    ///
    /// Names that are not valid UTF-8 can never be registered.
    pub fn is_name_available(env: Env, name: String) -> bool {
        let Ok(name) = to_std_string(&name) else {
            return false;
        };
        run(&env, ContractHost::view(&env), |ledger| {
            ledger.is_name_available(&name)
        })
    }

    // ========== Payment Links ==========

    /// Create a payment link paying out to `caller`.
    ///
    /// A `fixed_amount` of `0` accepts any positive amount.
    ///
    /// # Returns
    /// The new link id as a decimal string.
    pub fn create_payment_link(
        env: Env,
        description: String,
        fixed_amount: u64,
        caller: Address,
    ) -> String {
        caller.require_auth();

        let description = text_arg(&env, &description, LedgerError::InvalidText);
        let link_id = run(&env, ContractHost::new(&env, caller), |ledger| {
            ledger.create_payment_link(&description, fixed_amount)
        });
        soroban_string(&env, &link_id)
    }

    /// Get the stored `recipient|description|amount` record of a link.
    pub fn get_payment_link(env: Env, link_id: String) -> String {
        let link_id = text_arg(&env, &link_id, LedgerError::InvalidText);
        let record = run(&env, ContractHost::view(&env), |ledger| {
            ledger.get_payment_link(&link_id)
        });
        soroban_string(&env, &record)
    }

    /// Comma-joined ids of the links created by `address` (defaults to `caller`).
    pub fn get_my_links(env: Env, caller: Address, address: Option<String>) -> String {
        let address = address.map(|a| text_arg(&env, &a, LedgerError::InvalidText));
        let links = run(&env, ContractHost::new(&env, caller), |ledger| {
            ledger.get_my_links(address.as_deref())
        });
        soroban_string(&env, &links)
    }

    /// Comma-joined `id|recipient|description|amount` entries for every link
    /// created by `address` (defaults to `caller`).
    pub fn get_all_my_link_details(env: Env, caller: Address, address: Option<String>) -> String {
        let address = address.map(|a| text_arg(&env, &a, LedgerError::InvalidText));
        let details = run(&env, ContractHost::new(&env, caller), |ledger| {
            ledger.get_all_my_link_details(address.as_deref())
        });
        soroban_string(&env, &details)
    }

    /// Number of payment links created so far.
    pub fn link_count(env: Env) -> u64 {
        run(&env, ContractHost::view(&env), |ledger| ledger.link_count())
    }

    /// Total value received through a link.
    pub fn get_link_received(env: Env, link_id: String) -> String {
        let link_id = text_arg(&env, &link_id, LedgerError::InvalidText);
        let total = run(&env, ContractHost::view(&env), |ledger| {
            ledger.get_link_received(&link_id)
        });
        soroban_string(&env, &format_decimal(total))
    }

    // ========== Payments ==========

    /// Pay `amount` to the owner of `name`.
    ///
    /// The amount is moved from `payer` into the contract's escrow.
    pub fn pay_to_name(env: Env, name: String, amount: u64, payer: Address) {
        payer.require_auth();

        let name = text_arg(&env, &name, LedgerError::InvalidName);
        let mut host = ContractHost::new(&env, payer).with_value(amount);
        run(&env, &mut host, |ledger| ledger.pay_to_name(&name));
        host.collect()
            .unwrap_or_else(|e| panic_with_error!(&env, e));
    }

    /// Pay `amount` through a payment link.
    ///
    /// # Panics
    /// - If the link does not exist
    /// - If the link has a fixed amount and `amount` differs from it
    pub fn pay_to_link(env: Env, link_id: String, amount: u64, payer: Address) {
        payer.require_auth();

        let link_id = text_arg(&env, &link_id, LedgerError::InvalidText);
        let mut host = ContractHost::new(&env, payer).with_value(amount);
        run(&env, &mut host, |ledger| ledger.pay_to_link(&link_id));
        host.collect()
            .unwrap_or_else(|e| panic_with_error!(&env, e));
    }

    // ========== Balances ==========

    /// Escrow balance of `caller` as a decimal string.
    pub fn get_balance(env: Env, caller: Address) -> String {
        let balance = run(&env, ContractHost::new(&env, caller), |ledger| {
            ledger.get_balance(None)
        });
        soroban_string(&env, &balance)
    }

    /// Withdraw the whole escrow balance of `caller`.
    pub fn withdraw(env: Env, caller: Address) {
        caller.require_auth();

        run(&env, ContractHost::new(&env, caller), |ledger| {
            ledger.withdraw().map(|_| ())
        });
    }
}

// ========== Internal Helpers ==========

/// Execute one ledger operation, aborting the invocation on error.
fn run<T, H, F>(env: &Env, host: H, op: F) -> T
where
    H: Host,
    F: FnOnce(&mut Ledger<ContractStore, H>) -> Result<T, LedgerError>,
{
    let mut ledger = Ledger::new(ContractStore::new(env), host);
    op(&mut ledger).unwrap_or_else(|e| panic_with_error!(env, e))
}

/// Decode a text argument byte-for-byte, aborting with `invalid` if it is
/// not valid UTF-8.
fn text_arg(env: &Env, value: &String, invalid: LedgerError) -> alloc::string::String {
    to_std_string(value).unwrap_or_else(|_| panic_with_error!(env, invalid))
}
