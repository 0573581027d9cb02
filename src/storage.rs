//! Storage layout for the payment link contract.
//!
//! Ledger state lives in persistent storage under flat string keys so that
//! off-chain readers can address entries directly. Deployment config lives in
//! instance storage under [`ConfigKey`].

use alloc::string::String;

use soroban_sdk::contracttype;

/// Name -> owner address.
pub const NAME_TO_ADDR_PREFIX: &str = "name_to_addr:";

/// Link id -> `recipient|description|amount`.
pub const PAYMENT_LINK_PREFIX: &str = "payment_link:";

/// Address -> escrow balance.
pub const BALANCE_PREFIX: &str = "balance:";

/// Address -> comma-joined link ids.
pub const USER_LINKS_PREFIX: &str = "user_links:";

/// Link id -> total value received through the link.
pub const LINK_RECEIVED_PREFIX: &str = "link_received:";

/// Next link id.
pub const LINK_COUNTER_KEY: &str = "link_counter";

/// Instance storage keys for deployment configuration.
#[contracttype]
#[derive(Clone, Debug)]
pub enum ConfigKey {
    /// Token contract that payments and withdrawals move.
    Token,
}

/// Time-to-live for ledger entries.
pub const LEDGER_TTL_THRESHOLD: u32 = 518400; // ~30 days
pub const LEDGER_TTL_EXTEND: u32 = 2592000; // ~150 days

/// Time-to-live for contract instance storage.
pub const INSTANCE_TTL_THRESHOLD: u32 = 518400;
pub const INSTANCE_TTL_EXTEND: u32 = 2592000;

fn prefixed(prefix: &str, suffix: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + suffix.len());
    key.push_str(prefix);
    key.push_str(suffix);
    key
}

pub fn name_key(name: &str) -> String {
    prefixed(NAME_TO_ADDR_PREFIX, name)
}

pub fn payment_link_key(link_id: &str) -> String {
    prefixed(PAYMENT_LINK_PREFIX, link_id)
}

pub fn balance_key(address: &str) -> String {
    prefixed(BALANCE_PREFIX, address)
}

pub fn user_links_key(address: &str) -> String {
    prefixed(USER_LINKS_PREFIX, address)
}

pub fn link_received_key(link_id: &str) -> String {
    prefixed(LINK_RECEIVED_PREFIX, link_id)
}
