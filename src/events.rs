//! Event emission helpers for the payment link contract.

use soroban_sdk::{Env, String, Symbol};

use crate::host::{soroban_string, LedgerEvent};

/// Publish a ledger event.
pub fn publish(env: &Env, event: &LedgerEvent) {
    match event {
        LedgerEvent::Deployed => emit_deployed(env),
        LedgerEvent::NameRegistered { name, owner } => emit_name_registered(env, name, owner),
        LedgerEvent::LinkCreated {
            link_id,
            creator,
            description,
            amount,
        } => emit_link_created(env, link_id, creator, description, amount.to_wire()),
        LedgerEvent::PaidToName {
            name,
            recipient,
            amount,
        } => emit_paid_to_name(env, name, recipient, *amount),
        LedgerEvent::PaidToLink {
            link_id,
            recipient,
            amount,
        } => emit_paid_to_link(env, link_id, recipient, *amount),
        LedgerEvent::Withdrawn { recipient, amount } => emit_withdrawn(env, recipient, *amount),
    }
}

/// Emit an event when the contract is deployed.
pub fn emit_deployed(env: &Env) {
    let topics = (Symbol::new(env, "deployed"),);
    env.events().publish(topics, env.current_contract_address());
}

/// Emit an event when a name is registered.
pub fn emit_name_registered(env: &Env, name: &str, owner: &str) {
    let topics = (Symbol::new(env, "name_registered"),);
    env.events().publish(topics, (text(env, name), text(env, owner)));
}

/// Emit an event when a payment link is created.
pub fn emit_link_created(env: &Env, link_id: &str, creator: &str, description: &str, amount: u64) {
    let topics = (Symbol::new(env, "link_created"), text(env, link_id));
    env.events()
        .publish(topics, (text(env, creator), text(env, description), amount));
}

/// Emit an event when a payment is made to a name.
pub fn emit_paid_to_name(env: &Env, name: &str, recipient: &str, amount: u64) {
    let topics = (Symbol::new(env, "paid_to_name"), text(env, name));
    env.events().publish(topics, (text(env, recipient), amount));
}

/// Emit an event when a payment is made through a link.
pub fn emit_paid_to_link(env: &Env, link_id: &str, recipient: &str, amount: u64) {
    let topics = (Symbol::new(env, "paid_to_link"), text(env, link_id));
    env.events().publish(topics, (text(env, recipient), amount));
}

/// Emit an event when an escrow balance is withdrawn.
pub fn emit_withdrawn(env: &Env, recipient: &str, amount: u64) {
    let topics = (Symbol::new(env, "withdrawn"),);
    env.events().publish(topics, (text(env, recipient), amount));
}

fn text(env: &Env, value: &str) -> String {
    soroban_string(env, value)
}
