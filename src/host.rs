//! Seams between the ledger and its execution environment.
//!
//! The ledger reads and writes through [`KeyValueStore`] and asks [`Host`]
//! for the caller, the attached value, outbound transfers, and event
//! publication. [`ContractStore`] and [`ContractHost`] implement both over a
//! Soroban [`Env`].

use alloc::string::String;
use alloc::vec;

use soroban_sdk::{log, panic_with_error, token, Address, Env, String as SorobanString};

use crate::events;
use crate::link::LinkAmount;
use crate::storage::{ConfigKey, LEDGER_TTL_EXTEND, LEDGER_TTL_THRESHOLD};
use crate::LedgerError;

/// Flat string-keyed store holding all ledger state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }
}

/// Capabilities the host provides to a single call.
pub trait Host {
    /// Address of the account executing this call.
    fn caller(&self) -> String;

    /// Value attached to this call.
    fn received_value(&self) -> u64;

    /// Whether this call is the contract deployment.
    fn is_deploying(&self) -> bool;

    /// Send `amount` out of escrow to `to`.
    fn transfer(&mut self, to: &str, amount: u64) -> Result<(), LedgerError>;

    /// Publish an event for off-chain indexers.
    fn emit(&mut self, event: LedgerEvent);
}

impl<T: Host + ?Sized> Host for &mut T {
    fn caller(&self) -> String {
        (**self).caller()
    }

    fn received_value(&self) -> u64 {
        (**self).received_value()
    }

    fn is_deploying(&self) -> bool {
        (**self).is_deploying()
    }

    fn transfer(&mut self, to: &str, amount: u64) -> Result<(), LedgerError> {
        (**self).transfer(to, amount)
    }

    fn emit(&mut self, event: LedgerEvent) {
        (**self).emit(event)
    }
}

/// Events emitted by successful ledger calls.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LedgerEvent {
    Deployed,
    NameRegistered {
        name: String,
        owner: String,
    },
    LinkCreated {
        link_id: String,
        creator: String,
        description: String,
        amount: LinkAmount,
    },
    PaidToName {
        name: String,
        recipient: String,
        amount: u64,
    },
    PaidToLink {
        link_id: String,
        recipient: String,
        amount: u64,
    },
    Withdrawn {
        recipient: String,
        amount: u64,
    },
}

/// Persistent contract storage keyed by strings.
pub struct ContractStore {
    env: Env,
}

impl ContractStore {
    pub fn new(env: &Env) -> Self {
        Self { env: env.clone() }
    }
}

impl KeyValueStore for ContractStore {
    fn get(&self, key: &str) -> Option<String> {
        let key = soroban_string(&self.env, key);
        self.env
            .storage()
            .persistent()
            .get::<SorobanString, SorobanString>(&key)
            .map(|value| {
                to_std_string(&value)
                    .unwrap_or_else(|_| panic_with_error!(&self.env, LedgerError::CorruptRecord))
            })
    }

    fn set(&mut self, key: &str, value: &str) {
        let key = soroban_string(&self.env, key);
        let storage = self.env.storage().persistent();
        storage.set(&key, &soroban_string(&self.env, value));
        storage.extend_ttl(&key, LEDGER_TTL_THRESHOLD, LEDGER_TTL_EXTEND);
    }

    fn has(&self, key: &str) -> bool {
        self.env
            .storage()
            .persistent()
            .has(&soroban_string(&self.env, key))
    }
}

/// Soroban host for one contract invocation.
///
/// Deployment and view calls execute as the contract itself.
pub struct ContractHost {
    env: Env,
    caller: Address,
    value: u64,
    deploying: bool,
}

impl ContractHost {
    /// Host for a call made by `caller`, who must already be authorized.
    pub fn new(env: &Env, caller: Address) -> Self {
        Self {
            env: env.clone(),
            caller,
            value: 0,
            deploying: false,
        }
    }

    /// Host for the deployment call.
    pub fn deploying(env: &Env) -> Self {
        Self {
            deploying: true,
            ..Self::view(env)
        }
    }

    /// Host for read-only calls that carry no caller.
    pub fn view(env: &Env) -> Self {
        Self::new(env, env.current_contract_address())
    }

    /// Attach `amount` to the call, to be pulled from the caller by [`collect`].
    ///
    /// [`collect`]: ContractHost::collect
    pub fn with_value(mut self, amount: u64) -> Self {
        self.value = amount;
        self
    }

    /// Move the attached value from the caller into escrow.
    pub fn collect(&self) -> Result<(), LedgerError> {
        if self.value == 0 {
            return Ok(());
        }

        let token = self.token()?;
        token::Client::new(&self.env, &token).transfer(
            &self.caller,
            &self.env.current_contract_address(),
            &i128::from(self.value),
        );
        Ok(())
    }

    fn token(&self) -> Result<Address, LedgerError> {
        self.env
            .storage()
            .instance()
            .get(&ConfigKey::Token)
            .ok_or(LedgerError::NotInitialized)
    }
}

impl Host for ContractHost {
    fn caller(&self) -> String {
        to_std_string(&self.caller.to_string())
            .unwrap_or_else(|e| panic_with_error!(&self.env, e))
    }

    fn received_value(&self) -> u64 {
        self.value
    }

    fn is_deploying(&self) -> bool {
        self.deploying
    }

    fn transfer(&mut self, to: &str, amount: u64) -> Result<(), LedgerError> {
        let token = self.token()?;
        let to = Address::from_string(&soroban_string(&self.env, to));
        let client = token::Client::new(&self.env, &token);

        match client.try_transfer(
            &self.env.current_contract_address(),
            &to,
            &i128::from(amount),
        ) {
            Ok(Ok(())) => {
                log!(&self.env, "escrow released", to, amount);
                Ok(())
            }
            _ => Err(LedgerError::TransferFailed),
        }
    }

    fn emit(&mut self, event: LedgerEvent) {
        events::publish(&self.env, &event);
    }
}

/// Copy a Soroban string into an owned string.
///
/// Bytes are kept exactly; anything that is not valid UTF-8 is rejected
/// with [`LedgerError::InvalidText`].
pub(crate) fn to_std_string(value: &SorobanString) -> Result<String, LedgerError> {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    String::from_utf8(buf).map_err(|_| LedgerError::InvalidText)
}

pub(crate) fn soroban_string(env: &Env, value: &str) -> SorobanString {
    SorobanString::from_str(env, value)
}
