// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Request context, holding the single request in progress

use heapless::Vec;
use strum::{Display, EnumIter};
use zeroize::Zeroize;

use ledger_ton_apdu::{
    address::{AddressFlags, PUBLIC_KEY_LEN},
    path::DerivationPath,
    tx::{Transaction, DIGEST_LEN, MAX_TX_LEN, SIGNATURE_LEN},
};

use super::{review::PendingDecision, State};

/// Request kind, derived from the [`Request`] in progress
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumIter)]
pub enum RequestType {
    /// No request in progress
    None,
    /// Address pending confirmation
    ConfirmAddress,
    /// Transaction pending confirmation
    ConfirmTransaction,
}

/// Derived address pending confirmation
#[derive(Clone, PartialEq, Debug)]
pub struct AddressInfo {
    /// Derived ed25519 public key
    pub raw_public_key: [u8; PUBLIC_KEY_LEN],
    /// Display flags from the request
    pub flags: AddressFlags,
}

/// Transaction being loaded / pending confirmation
#[derive(Clone, PartialEq, Debug)]
pub struct TxInfo {
    /// Raw (accumulated) transaction bytes
    pub raw: Vec<u8, MAX_TX_LEN>,
    /// Decoded transaction, once all chunks are received
    pub transaction: Option<Transaction>,
    /// SHA-256 digest of the raw transaction
    pub digest: [u8; DIGEST_LEN],
    /// Signature, once approved
    pub signature: [u8; SIGNATURE_LEN],
}

impl TxInfo {
    /// Create an empty transaction info object
    pub const fn new() -> Self {
        Self {
            raw: Vec::new(),
            transaction: None,
            digest: [0u8; DIGEST_LEN],
            signature: [0u8; SIGNATURE_LEN],
        }
    }
}

impl Default for TxInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Request payload, at most one request exists at any time
#[derive(Clone, PartialEq, Debug)]
pub enum Request {
    /// No request in progress
    None,
    /// Address pending confirmation
    Address(AddressInfo),
    /// Transaction being loaded or pending confirmation
    Transaction(TxInfo),
}

impl Request {
    /// Fetch the [`RequestType`] for this request
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::None => RequestType::None,
            Request::Address(_) => RequestType::ConfirmAddress,
            Request::Transaction(_) => RequestType::ConfirmTransaction,
        }
    }
}

/// Context for the request in progress, owned by the [Engine][super::Engine]
#[derive(Clone, PartialEq, Debug)]
pub struct RequestContext {
    /// Request state
    pub state: State,
    /// Derivation path for the request key
    pub path: DerivationPath,
    /// Request payload
    pub request: Request,
    /// Handle for the presented review, if any
    pub review: Option<PendingDecision>,
}

impl RequestContext {
    /// Create a new (empty) request context
    pub const fn new() -> Self {
        Self {
            state: State::None,
            path: DerivationPath::new(),
            request: Request::None,
            review: None,
        }
    }

    /// Fetch the current request type
    pub fn request_type(&self) -> RequestType {
        self.request.request_type()
    }

    /// Check whether the context is empty
    pub fn is_empty(&self) -> bool {
        self.state == State::None && self.request == Request::None && self.review.is_none()
    }

    /// Discard any request in progress
    pub fn clear(&mut self) {
        if let Request::Transaction(tx) = &mut self.request {
            tx.raw.iter_mut().for_each(|b| *b = 0);
            tx.signature.zeroize();
        }

        self.path.clear();
        self.request = Request::None;
        self.review = None;
        self.state = State::None;
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
