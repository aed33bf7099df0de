// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Reviews presented for user confirmation, and the decisions returned
//!
//! A [`Review`] carries pre-rendered strings for display along with a
//! [`PendingDecision`] handle, which must be returned with the user's
//! [`Decision`] via [`Engine::resume`][super::Engine::resume].

use heapless::{String, Vec};
use strum::Display;

use ledger_ton_apdu::{
    address::{AddressFlags, FRIENDLY_ADDRESS_LEN},
    tx::Transaction,
};

use super::{context::AddressInfo, Error, RequestType};
use crate::helpers::{account_hash, fmt_amount, fmt_payload, friendly_address, workchain};

/// Maximum length of a rendered field value
pub const MAX_FIELD_LEN: usize = 64;

/// Maximum number of fields per review
pub const MAX_FIELDS: usize = 3;

/// Displayed when the full wallet balance is sent
pub const SEND_ALL: &str = "ALL YOUR TONs";

/// Displayed when a transaction carries no payload
pub const NO_PAYLOAD: &str = "Nothing";

/// Correlation handle for a presented review
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PendingDecision {
    /// Type of the request under review
    pub request_type: RequestType,
    /// Review identifier, unique per presentation
    pub id: u32,
}

/// User decision for a presented review
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum Decision {
    /// Release the requested address or signature
    Approve,
    /// Refuse the request, answered with `Deny`
    Reject,
}

/// Rendered review field
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    /// Field label
    pub name: &'static str,
    /// Rendered value
    pub value: String<MAX_FIELD_LEN>,
}

/// Review for user confirmation
#[derive(Clone, PartialEq, Debug)]
pub struct Review {
    /// Review title
    pub title: &'static str,
    /// Optional subtitle, shown below the title
    pub subtitle: Option<&'static str>,
    /// Fields presented for confirmation, in display order
    pub fields: Vec<Field, MAX_FIELDS>,
    /// Handle to be provided with the decision
    pub handle: PendingDecision,
}

impl Review {
    /// Fetch a field value by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    fn push(&mut self, name: &'static str, value: &str, err: Error) -> Result<(), Error> {
        let mut v = String::new();
        v.push_str(value).map_err(|_| err)?;

        self.fields
            .push(Field { name, value: v })
            .map_err(|_| Error::EncodingFailure)
    }
}

/// Build an address review
pub(crate) fn address_review(info: &AddressInfo, handle: PendingDecision) -> Result<Review, Error> {
    let mut r = Review {
        title: "Confirm Address",
        subtitle: None,
        fields: Vec::new(),
        handle,
    };

    let hash = account_hash(&info.raw_public_key);

    let mut buff = [0u8; FRIENDLY_ADDRESS_LEN];
    let address = friendly_address(workchain(info.flags), &hash, info.flags, &mut buff)?;
    r.push("Address", address, Error::DisplayAddressFailure)?;

    Ok(r)
}

/// Build a transaction review
pub(crate) fn tx_review(tx: &Transaction, handle: PendingDecision) -> Result<Review, Error> {
    let mut r = Review {
        title: "Review",
        subtitle: Some("Transaction"),
        fields: Vec::new(),
        handle,
    };

    // Destinations are rendered with the transaction bounce flag
    let mut flags = AddressFlags::empty();
    flags.set(AddressFlags::NON_BOUNCEABLE, !tx.bounce);

    let mut buff = [0u8; FRIENDLY_ADDRESS_LEN];
    let address = friendly_address(tx.to_chain, &tx.to_hash, flags, &mut buff)?;
    r.push("Address", address, Error::DisplayAddressFailure)?;

    let mut buff = [0u8; 32];
    let amount = match tx.sends_all() {
        true => SEND_ALL,
        false => fmt_amount(tx.value, &mut buff)?,
    };
    r.push("Amount", amount, Error::DisplayAmountFailure)?;

    let mut buff = [0u8; 44];
    let payload = match &tx.payload_hash {
        Some(h) => fmt_payload(h, &mut buff)?,
        None => NO_PAYLOAD,
    };
    r.push("Payload", payload, Error::EncodingFailure)?;

    Ok(r)
}
