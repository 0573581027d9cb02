//! Payment link records and their text encodings.
//!
//! A link is stored as `recipient|description|amount`. No escaping is
//! applied to the description, so decoding takes the recipient up to the
//! first `|` and the amount after the last `|`; whatever sits between is the
//! description, pipes included.
//!
//! Link listings returned to clients join `id|recipient|description|amount`
//! entries with `,`.

use alloc::string::String;
use alloc::vec::Vec;

use crate::validation::{format_decimal, parse_decimal};
use crate::LedgerError;

/// Field separator inside a link record.
pub const FIELD_SEPARATOR: char = '|';

/// Separator between link ids and between listing entries.
pub const LIST_SEPARATOR: char = ',';

/// Amount a link accepts.
///
/// Stored on the wire as `0` for [`LinkAmount::Any`] and the amount itself
/// for [`LinkAmount::Fixed`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinkAmount {
    /// Any positive amount.
    Any,
    /// Exactly this amount.
    Fixed(u64),
}

impl LinkAmount {
    pub fn from_wire(amount: u64) -> Self {
        match amount {
            0 => LinkAmount::Any,
            fixed => LinkAmount::Fixed(fixed),
        }
    }

    pub fn to_wire(self) -> u64 {
        match self {
            LinkAmount::Any => 0,
            LinkAmount::Fixed(amount) => amount,
        }
    }

    /// Check if a payment of `value` satisfies this amount.
    pub fn accepts(self, value: u64) -> bool {
        match self {
            LinkAmount::Any => value > 0,
            LinkAmount::Fixed(amount) => value == amount,
        }
    }
}

/// A payment request paying out to `recipient`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentLink {
    /// Address credited by payments through this link.
    pub recipient: String,

    /// Free-form description shown to payers.
    pub description: String,

    /// Amount the link accepts.
    pub amount: LinkAmount,
}

impl PaymentLink {
    pub fn new(recipient: String, description: String, amount: LinkAmount) -> Self {
        Self {
            recipient,
            description,
            amount,
        }
    }

    /// Encode as `recipient|description|amount`.
    pub fn encode(&self) -> String {
        let amount = format_decimal(self.amount.to_wire());
        let mut record =
            String::with_capacity(self.recipient.len() + self.description.len() + amount.len() + 2);
        record.push_str(&self.recipient);
        record.push(FIELD_SEPARATOR);
        record.push_str(&self.description);
        record.push(FIELD_SEPARATOR);
        record.push_str(&amount);
        record
    }

    /// Decode a stored `recipient|description|amount` record.
    pub fn decode(record: &str) -> Result<Self, LedgerError> {
        let (recipient, rest) = record
            .split_once(FIELD_SEPARATOR)
            .ok_or(LedgerError::CorruptRecord)?;
        let (description, amount) = rest
            .rsplit_once(FIELD_SEPARATOR)
            .ok_or(LedgerError::CorruptRecord)?;
        let amount = parse_decimal(amount).ok_or(LedgerError::CorruptRecord)?;

        Ok(Self::new(
            recipient.into(),
            description.into(),
            LinkAmount::from_wire(amount),
        ))
    }
}

/// A link together with its id, as returned by link listings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkDetails {
    pub link_id: u64,
    pub link: PaymentLink,
}

impl LinkDetails {
    /// Decode one `id|recipient|description|amount` entry.
    pub fn decode(entry: &str) -> Result<Self, LedgerError> {
        let (link_id, record) = entry
            .split_once(FIELD_SEPARATOR)
            .ok_or(LedgerError::CorruptRecord)?;
        let link_id = parse_decimal(link_id).ok_or(LedgerError::CorruptRecord)?;

        Ok(Self {
            link_id,
            link: PaymentLink::decode(record)?,
        })
    }

    /// Parse a full link listing.
    ///
    /// Descriptions are not escaped, so a `,` inside a description splits an
    /// entry in two. A fragment that does not open with `id|recipient|` is
    /// glued back onto the entry before it. A comma followed by text of that
    /// shape cannot be told apart from an entry boundary; such listings fail
    /// with [`LedgerError::CorruptRecord`].
    pub fn parse_listing(listing: &str) -> Result<Vec<Self>, LedgerError> {
        if listing.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<String> = Vec::new();
        for fragment in listing.split(LIST_SEPARATOR) {
            match entries.last_mut() {
                Some(entry) if !opens_entry(fragment) => {
                    entry.push(LIST_SEPARATOR);
                    entry.push_str(fragment);
                }
                _ => entries.push(fragment.into()),
            }
        }

        entries.iter().map(|entry| Self::decode(entry)).collect()
    }
}

fn opens_entry(fragment: &str) -> bool {
    match fragment.split_once(FIELD_SEPARATOR) {
        Some((link_id, rest)) => {
            parse_decimal(link_id).is_some() && rest.contains(FIELD_SEPARATOR)
        }
        None => false,
    }
}

/// Append `link_id` to a comma-joined id list.
pub fn append_link_id(existing: Option<&str>, link_id: &str) -> String {
    match existing {
        Some(ids) if !ids.is_empty() => {
            let mut joined = String::with_capacity(ids.len() + link_id.len() + 1);
            joined.push_str(ids);
            joined.push(LIST_SEPARATOR);
            joined.push_str(link_id);
            joined
        }
        _ => link_id.into(),
    }
}

/// Iterate the ids of a comma-joined id list.
pub fn link_ids(ids: &str) -> impl Iterator<Item = &str> {
    ids.split(LIST_SEPARATOR).filter(|id| !id.is_empty())
}
