//! Integration tests for the payment link contract.

use soroban_sdk::{testutils::Address as _, token, Address, Env, String};
use soroban_payment_links::{LedgerError, LinkAmount, LinkDetails, PaymentLinkContract, PaymentLinkContractClient};

struct Setup {
    env: Env,
    client: PaymentLinkContractClient<'static>,
    token: token::Client<'static>,
    token_admin: token::StellarAssetClient<'static>,
}

fn setup() -> Setup {
    let env = Env::default();
    env.mock_all_auths();

    let issuer = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(issuer);

    let contract_id = env.register(PaymentLinkContract, (asset.address(),));
    let client = PaymentLinkContractClient::new(&env, &contract_id);
    let token = token::Client::new(&env, &asset.address());
    let token_admin = token::StellarAssetClient::new(&env, &asset.address());

    Setup {
        env,
        client,
        token,
        token_admin,
    }
}

fn text(env: &Env, value: &str) -> String {
    String::from_str(env, value)
}

fn to_std(value: &String) -> std::string::String {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    std::string::String::from_utf8(buf).unwrap()
}

fn contract_error(error: LedgerError) -> soroban_sdk::Error {
    error.into()
}

#[test]
fn test_deploy() {
    let s = setup();

    assert_eq!(s.client.token(), s.token.address);
    assert_eq!(s.client.link_count(), 0);
}

#[test]
fn test_register_name() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let name = text(&s.env, "alice");

    assert!(s.client.is_name_available(&name));
    s.client.register(&name, &alice);

    assert!(!s.client.is_name_available(&name));
    assert_eq!(s.client.get_name_address(&name), alice.to_string());
}

#[test]
fn test_name_uniqueness() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    let name = text(&s.env, "alice");

    s.client.register(&name, &alice);

    let err = s.client.try_register(&name, &bob).unwrap_err().unwrap();
    assert_eq!(err, contract_error(LedgerError::NameTaken));

    // Original owner is untouched
    assert_eq!(s.client.get_name_address(&name), alice.to_string());
}

#[test]
fn test_empty_name_rejected() {
    let s = setup();
    let alice = Address::generate(&s.env);

    let err = s
        .client
        .try_register(&text(&s.env, ""), &alice)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::InvalidName));
}

#[test]
fn test_non_utf8_names_rejected() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let first = String::from_bytes(&s.env, b"a\xff");
    let second = String::from_bytes(&s.env, b"a\xfe");

    assert!(!s.client.is_name_available(&first));
    assert!(!s.client.is_name_available(&second));

    let err = s.client.try_register(&first, &alice).unwrap_err().unwrap();
    assert_eq!(err, contract_error(LedgerError::InvalidName));
    let err = s.client.try_register(&second, &alice).unwrap_err().unwrap();
    assert_eq!(err, contract_error(LedgerError::InvalidName));

    // Neither invalid name was folded onto a valid one
    let plain = text(&s.env, "a");
    assert!(s.client.is_name_available(&plain));
    s.client.register(&plain, &alice);
    assert_eq!(s.client.get_name_address(&plain), alice.to_string());

    let err = s
        .client
        .try_get_name_address(&first)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::InvalidName));
}

#[test]
fn test_non_utf8_description_rejected() {
    let s = setup();
    let alice = Address::generate(&s.env);

    let err = s
        .client
        .try_create_payment_link(&String::from_bytes(&s.env, b"tea\xff"), &0, &alice)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::InvalidText));
    assert_eq!(s.client.link_count(), 0);
}

#[test]
fn test_unknown_name() {
    let s = setup();

    let err = s
        .client
        .try_get_name_address(&text(&s.env, "nobody"))
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::NameNotFound));
}

#[test]
fn test_pay_to_name_and_withdraw() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    let name = text(&s.env, "alice");
    s.token_admin.mint(&bob, &1_000);

    s.client.register(&name, &alice);
    s.client.pay_to_name(&name, &100, &bob);

    assert_eq!(s.client.get_balance(&alice), text(&s.env, "100"));
    assert_eq!(s.token.balance(&bob), 900);
    assert_eq!(s.token.balance(&s.client.address), 100);

    s.client.withdraw(&alice);

    assert_eq!(s.client.get_balance(&alice), text(&s.env, "0"));
    assert_eq!(s.token.balance(&alice), 100);
    assert_eq!(s.token.balance(&s.client.address), 0);
}

#[test]
fn test_pay_to_name_failures() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    s.token_admin.mint(&bob, &1_000);
    s.client.register(&text(&s.env, "alice"), &alice);

    let err = s
        .client
        .try_pay_to_name(&text(&s.env, "alice"), &0, &bob)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::NoValueSent));

    let err = s
        .client
        .try_pay_to_name(&text(&s.env, "carol"), &10, &bob)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::NameNotFound));

    // Nothing moved
    assert_eq!(s.client.get_balance(&alice), text(&s.env, "0"));
    assert_eq!(s.token.balance(&bob), 1_000);
}

#[test]
fn test_payment_links() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    s.token_admin.mint(&bob, &1_000);

    let link_id = s
        .client
        .create_payment_link(&text(&s.env, "coffee"), &0, &alice);
    assert_eq!(link_id, text(&s.env, "0"));

    s.client.pay_to_link(&link_id, &50, &bob);

    assert_eq!(s.client.get_balance(&alice), text(&s.env, "50"));
    assert_eq!(s.client.get_link_received(&link_id), text(&s.env, "50"));

    let record = to_std(&s.client.get_payment_link(&link_id));
    assert_eq!(record, format!("{}|coffee|0", to_std(&alice.to_string())));
}

#[test]
fn test_link_ids_are_sequential() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);

    for expected in ["0", "1", "2"] {
        let link_id = s
            .client
            .create_payment_link(&text(&s.env, "item"), &0, &alice);
        assert_eq!(link_id, text(&s.env, expected));
    }
    s.client.create_payment_link(&text(&s.env, "other"), &0, &bob);

    assert_eq!(s.client.link_count(), 4);
    assert_eq!(s.client.get_my_links(&alice, &None), text(&s.env, "0,1,2"));
    assert_eq!(
        s.client
            .get_my_links(&alice, &Some(bob.to_string())),
        text(&s.env, "3")
    );
}

#[test]
fn test_fixed_amount_link() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    s.token_admin.mint(&bob, &1_000);

    let link_id = s
        .client
        .create_payment_link(&text(&s.env, "rent"), &300, &alice);

    let err = s
        .client
        .try_pay_to_link(&link_id, &299, &bob)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::AmountMismatch));
    assert_eq!(s.token.balance(&bob), 1_000);

    s.client.pay_to_link(&link_id, &300, &bob);
    assert_eq!(s.client.get_balance(&alice), text(&s.env, "300"));
}

#[test]
fn test_unknown_link() {
    let s = setup();
    let bob = Address::generate(&s.env);
    s.token_admin.mint(&bob, &1_000);

    let err = s
        .client
        .try_pay_to_link(&text(&s.env, "7"), &10, &bob)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::LinkNotFound));

    let err = s
        .client
        .try_get_payment_link(&text(&s.env, "7"))
        .unwrap_err()
        .unwrap();
    assert_eq!(err, contract_error(LedgerError::LinkNotFound));
    assert_eq!(s.token.balance(&bob), 1_000);
}

#[test]
fn test_all_link_details() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);

    s.client
        .create_payment_link(&text(&s.env, "coffee"), &0, &alice);
    s.client
        .create_payment_link(&text(&s.env, "rent"), &900, &bob);
    s.client
        .create_payment_link(&text(&s.env, "lunch"), &12, &alice);

    let listing = to_std(&s.client.get_all_my_link_details(&bob, &Some(alice.to_string())));
    let details = LinkDetails::parse_listing(&listing).unwrap();
    let alice_str = to_std(&alice.to_string());

    assert_eq!(details.len(), 2);
    assert_eq!(details[0].link_id, 0);
    assert_eq!(details[0].link.recipient, alice_str);
    assert_eq!(details[0].link.description, "coffee");
    assert_eq!(details[0].link.amount, LinkAmount::Any);
    assert_eq!(details[1].link_id, 2);
    assert_eq!(details[1].link.description, "lunch");
    assert_eq!(details[1].link.amount, LinkAmount::Fixed(12));

    // Defaults to the caller
    assert_eq!(
        s.client.get_all_my_link_details(&alice, &None),
        s.client.get_all_my_link_details(&bob, &Some(alice.to_string()))
    );
    assert_eq!(
        s.client.get_all_my_link_details(&Address::generate(&s.env), &None),
        text(&s.env, "")
    );
}

#[test]
fn test_withdraw_without_balance() {
    let s = setup();
    let alice = Address::generate(&s.env);

    let err = s.client.try_withdraw(&alice).unwrap_err().unwrap();
    assert_eq!(err, contract_error(LedgerError::NoBalance));
}

#[test]
fn test_withdraw_twice() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    s.token_admin.mint(&bob, &1_000);

    s.client.register(&text(&s.env, "alice"), &alice);
    s.client.pay_to_name(&text(&s.env, "alice"), &40, &bob);
    let link_id = s
        .client
        .create_payment_link(&text(&s.env, "tips"), &0, &alice);
    s.client.pay_to_link(&link_id, &60, &bob);

    s.client.withdraw(&alice);
    assert_eq!(s.token.balance(&alice), 100);

    let err = s.client.try_withdraw(&alice).unwrap_err().unwrap();
    assert_eq!(err, contract_error(LedgerError::NoBalance));
    assert_eq!(s.token.balance(&alice), 100);
}
