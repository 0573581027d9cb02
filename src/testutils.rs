//! In-memory ledger host for tests.
//!
//! [`MemoryChain`] runs ledger calls one after another against a
//! [`MemoryStore`] and gives each call commit-or-abort semantics: a call that
//! returns an error leaves no writes, transfers, or events behind.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::host::{Host, KeyValueStore, LedgerEvent};
use crate::ledger::Ledger;
use crate::LedgerError;

/// Address that deploys a [`MemoryChain`].
pub const DEPLOYER: &str = "GDEPLOYER";

/// Ordered in-memory key-value store.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an entry directly, bypassing the ledger.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.insert(key, value);
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// Host with a fixed caller and attached value that records transfers and
/// events instead of performing them.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHost {
    caller: String,
    value: u64,
    deploying: bool,
    refuse_transfers: bool,
    transfers: Vec<(String, u64)>,
    events: Vec<LedgerEvent>,
}

impl ScriptedHost {
    pub fn new(caller: &str) -> Self {
        Self {
            caller: caller.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: u64) -> Self {
        self.value = value;
        self
    }

    pub fn deploying(mut self) -> Self {
        self.deploying = true;
        self
    }

    /// Fail every outbound transfer with [`LedgerError::TransferFailed`].
    pub fn refusing_transfers(mut self) -> Self {
        self.refuse_transfers = true;
        self
    }

    pub fn transfers(&self) -> &[(String, u64)] {
        &self.transfers
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }
}

impl Host for ScriptedHost {
    fn caller(&self) -> String {
        self.caller.clone()
    }

    fn received_value(&self) -> u64 {
        self.value
    }

    fn is_deploying(&self) -> bool {
        self.deploying
    }

    fn transfer(&mut self, to: &str, amount: u64) -> Result<(), LedgerError> {
        if self.refuse_transfers {
            return Err(LedgerError::TransferFailed);
        }
        self.transfers.push((to.into(), amount));
        Ok(())
    }

    fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }
}

/// Ledger as seen by a single [`MemoryChain`] call.
pub type MemoryLedger<'a> = Ledger<&'a mut MemoryStore, &'a mut ScriptedHost>;

/// Sequential, atomic calls against one in-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryChain {
    store: MemoryStore,
    transfers: Vec<(String, u64)>,
    events: Vec<LedgerEvent>,
    refuse_transfers: bool,
}

impl MemoryChain {
    /// A chain whose ledger has not been deployed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain with a freshly deployed ledger.
    pub fn deployed() -> Self {
        let mut chain = Self::new();
        chain
            .deploy()
            .expect("an empty store accepts deployment");
        chain
    }

    /// Run `init` as the deployment call.
    pub fn deploy(&mut self) -> Result<(), LedgerError> {
        let host = ScriptedHost::new(DEPLOYER).deploying();
        self.execute(host, |ledger| ledger.init())
    }

    /// Make every later outbound transfer fail.
    pub fn refuse_transfers(&mut self, refuse: bool) {
        self.refuse_transfers = refuse;
    }

    /// Call as `caller` with no attached value.
    pub fn call<T, F>(&mut self, caller: &str, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut MemoryLedger<'_>) -> Result<T, LedgerError>,
    {
        self.call_with_value(caller, 0, op)
    }

    /// Call as `caller` with `value` attached.
    pub fn call_with_value<T, F>(&mut self, caller: &str, value: u64, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut MemoryLedger<'_>) -> Result<T, LedgerError>,
    {
        let mut host = ScriptedHost::new(caller).with_value(value);
        host.refuse_transfers = self.refuse_transfers;
        self.execute(host, op)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Transfers out of escrow, in order, across all committed calls.
    pub fn transfers(&self) -> &[(String, u64)] {
        &self.transfers
    }

    /// Events of all committed calls, in order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    fn execute<T, F>(&mut self, mut host: ScriptedHost, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut MemoryLedger<'_>) -> Result<T, LedgerError>,
    {
        let mut staged = self.store.clone();
        let result = op(&mut Ledger::new(&mut staged, &mut host));

        if result.is_ok() {
            self.store = staged;
            self.transfers.append(&mut host.transfers);
            self.events.append(&mut host.events);
        }
        result
    }
}
