//! The payment ledger state machine.
//!
//! [`Ledger`] maps (store contents, call) to (new store contents, output,
//! events). Each operation checks all of its preconditions before its first
//! write, so a failed call leaves the store untouched even on a host that
//! does not roll back.

use alloc::string::String;

use crate::host::{Host, KeyValueStore, LedgerEvent};
use crate::link::{append_link_id, link_ids, LinkAmount, PaymentLink, FIELD_SEPARATOR, LIST_SEPARATOR};
use crate::storage::{
    balance_key, link_received_key, name_key, payment_link_key, user_links_key, LINK_COUNTER_KEY,
};
use crate::validation::{format_decimal, parse_decimal, validate_name};
use crate::LedgerError;

/// Ledger over an injected store and host.
pub struct Ledger<S, H> {
    store: S,
    host: H,
}

impl<S: KeyValueStore, H: Host> Ledger<S, H> {
    pub fn new(store: S, host: H) -> Self {
        Self { store, host }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_parts(self) -> (S, H) {
        (self.store, self.host)
    }

    // ========== Deployment ==========

    /// Initialize the link counter. Only valid during deployment.
    pub fn init(&mut self) -> Result<(), LedgerError> {
        if !self.host.is_deploying() {
            return Err(LedgerError::DeploymentOnly);
        }
        if self.store.has(LINK_COUNTER_KEY) {
            return Err(LedgerError::AlreadyInitialized);
        }

        self.store.set(LINK_COUNTER_KEY, &format_decimal(0));
        self.host.emit(LedgerEvent::Deployed);
        Ok(())
    }

    // ========== Names ==========

    /// Bind `name` to the caller.
    pub fn register(&mut self, name: &str) -> Result<(), LedgerError> {
        self.ensure_deployed()?;

        if !validate_name(name) {
            return Err(LedgerError::InvalidName);
        }

        let key = name_key(name);
        if self.store.has(&key) {
            return Err(LedgerError::NameTaken);
        }

        let owner = self.host.caller();
        self.store.set(&key, &owner);

        self.host.emit(LedgerEvent::NameRegistered {
            name: name.into(),
            owner,
        });
        Ok(())
    }

    pub fn get_name_address(&self, name: &str) -> Result<String, LedgerError> {
        self.ensure_deployed()?;
        self.store
            .get(&name_key(name))
            .ok_or(LedgerError::NameNotFound)
    }

    pub fn is_name_available(&self, name: &str) -> Result<bool, LedgerError> {
        self.ensure_deployed()?;
        Ok(!self.store.has(&name_key(name)))
    }

    // ========== Payment Links ==========

    /// Create a link paying out to the caller and return its id.
    ///
    /// A `fixed_amount` of `0` accepts any positive amount.
    pub fn create_payment_link(
        &mut self,
        description: &str,
        fixed_amount: u64,
    ) -> Result<String, LedgerError> {
        let counter = self.link_count()?;
        let next = counter.checked_add(1).ok_or(LedgerError::Overflow)?;

        let creator = self.host.caller();
        let amount = LinkAmount::from_wire(fixed_amount);
        let link = PaymentLink::new(creator.clone(), description.into(), amount);
        let link_id = format_decimal(counter);

        let index_key = user_links_key(&creator);
        let index = append_link_id(self.store.get(&index_key).as_deref(), &link_id);

        self.store.set(&payment_link_key(&link_id), &link.encode());
        self.store.set(LINK_COUNTER_KEY, &format_decimal(next));
        self.store.set(&index_key, &index);

        self.host.emit(LedgerEvent::LinkCreated {
            link_id: link_id.clone(),
            creator,
            description: link.description,
            amount,
        });
        Ok(link_id)
    }

    /// Stored `recipient|description|amount` record of a link.
    pub fn get_payment_link(&self, link_id: &str) -> Result<String, LedgerError> {
        self.ensure_deployed()?;
        self.store
            .get(&payment_link_key(link_id))
            .ok_or(LedgerError::LinkNotFound)
    }

    /// Decoded link record.
    pub fn payment_link(&self, link_id: &str) -> Result<PaymentLink, LedgerError> {
        PaymentLink::decode(&self.get_payment_link(link_id)?)
    }

    pub fn get_my_links(&self, address: Option<&str>) -> Result<String, LedgerError> {
        self.ensure_deployed()?;
        let address = self.address_or_caller(address);
        Ok(self.store.get(&user_links_key(&address)).unwrap_or_default())
    }

    /// Every link created by `address`, as `id|recipient|description|amount`
    /// entries joined with `,`. Ids whose record is missing are skipped.
    pub fn get_all_my_link_details(&self, address: Option<&str>) -> Result<String, LedgerError> {
        let ids = self.get_my_links(address)?;

        let mut listing = String::new();
        for link_id in link_ids(&ids) {
            if let Some(record) = self.store.get(&payment_link_key(link_id)) {
                if !listing.is_empty() {
                    listing.push(LIST_SEPARATOR);
                }
                listing.push_str(link_id);
                listing.push(FIELD_SEPARATOR);
                listing.push_str(&record);
            }
        }
        Ok(listing)
    }

    /// Number of links created so far, which is also the next link id.
    pub fn link_count(&self) -> Result<u64, LedgerError> {
        let counter = self
            .store
            .get(LINK_COUNTER_KEY)
            .ok_or(LedgerError::NotInitialized)?;
        parse_decimal(&counter).ok_or(LedgerError::CorruptRecord)
    }

    /// Total value received through a link.
    pub fn get_link_received(&self, link_id: &str) -> Result<u64, LedgerError> {
        self.ensure_deployed()?;
        if !self.store.has(&payment_link_key(link_id)) {
            return Err(LedgerError::LinkNotFound);
        }
        self.read_amount(&link_received_key(link_id))
    }

    // ========== Payments ==========

    /// Credit the attached value to the owner of `name`.
    pub fn pay_to_name(&mut self, name: &str) -> Result<(), LedgerError> {
        self.ensure_deployed()?;
        let value = self.attached_value()?;

        let recipient = self
            .store
            .get(&name_key(name))
            .ok_or(LedgerError::NameNotFound)?;
        let balance = self.balance_of(&recipient)?;
        let balance = balance.checked_add(value).ok_or(LedgerError::Overflow)?;

        self.store.set(&balance_key(&recipient), &format_decimal(balance));

        self.host.emit(LedgerEvent::PaidToName {
            name: name.into(),
            recipient,
            amount: value,
        });
        Ok(())
    }

    /// Credit the attached value to the recipient of a link.
    ///
    /// Links with a fixed amount only accept exactly that amount.
    pub fn pay_to_link(&mut self, link_id: &str) -> Result<(), LedgerError> {
        self.ensure_deployed()?;
        let value = self.attached_value()?;

        let link = self.payment_link(link_id)?;
        if !link.amount.accepts(value) {
            return Err(LedgerError::AmountMismatch);
        }

        let received_key = link_received_key(link_id);
        let balance = self.balance_of(&link.recipient)?;
        let balance = balance.checked_add(value).ok_or(LedgerError::Overflow)?;
        let received = self.read_amount(&received_key)?;
        let received = received.checked_add(value).ok_or(LedgerError::Overflow)?;

        self.store
            .set(&balance_key(&link.recipient), &format_decimal(balance));
        self.store.set(&received_key, &format_decimal(received));

        self.host.emit(LedgerEvent::PaidToLink {
            link_id: link_id.into(),
            recipient: link.recipient,
            amount: value,
        });
        Ok(())
    }

    // ========== Balances ==========

    /// Escrow balance of `address` (defaults to the caller).
    pub fn get_balance(&self, address: Option<&str>) -> Result<String, LedgerError> {
        self.ensure_deployed()?;
        let address = self.address_or_caller(address);
        Ok(format_decimal(self.balance_of(&address)?))
    }

    /// Pay the caller's whole balance out of escrow and return the amount.
    pub fn withdraw(&mut self) -> Result<u64, LedgerError> {
        self.ensure_deployed()?;

        let caller = self.host.caller();
        let amount = self.balance_of(&caller)?;
        if amount == 0 {
            return Err(LedgerError::NoBalance);
        }

        let key = balance_key(&caller);
        self.store.set(&key, &format_decimal(0));
        if let Err(err) = self.host.transfer(&caller, amount) {
            self.store.set(&key, &format_decimal(amount));
            return Err(err);
        }

        self.host.emit(LedgerEvent::Withdrawn {
            recipient: caller,
            amount,
        });
        Ok(amount)
    }

    // ========== Internal Helpers ==========

    fn ensure_deployed(&self) -> Result<(), LedgerError> {
        self.link_count().map(|_| ())
    }

    fn attached_value(&self) -> Result<u64, LedgerError> {
        match self.host.received_value() {
            0 => Err(LedgerError::NoValueSent),
            value => Ok(value),
        }
    }

    fn address_or_caller(&self, address: Option<&str>) -> String {
        address.map_or_else(|| self.host.caller(), String::from)
    }

    fn balance_of(&self, address: &str) -> Result<u64, LedgerError> {
        self.read_amount(&balance_key(address))
    }

    fn read_amount(&self, key: &str) -> Result<u64, LedgerError> {
        match self.store.get(key) {
            Some(raw) => parse_decimal(&raw).ok_or(LedgerError::CorruptRecord),
            None => Ok(0),
        }
    }
}
