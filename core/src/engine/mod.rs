// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides functionality required by hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding definitions.
//!
//! Requests follow `derive → present → confirm → act`, with the
//! [`Engine::update`] call for `Confirm` returning a [`Review`] and
//! suspending until [`Engine::resume`] is called with the matching
//! [`PendingDecision`]. Any event not valid for the current
//! `(request type, state)` discards the request and returns [`Error::BadState`].

use ed25519_dalek::{Signer, SigningKey};
use encdec::Decode;
use sha2::{Digest, Sha256};
use strum::{Display, EnumIter};

use ledger_ton_apdu::{
    address::{AddressFlags, FRIENDLY_ADDRESS_LEN, PUBLIC_KEY_LEN},
    path::DerivationPath,
    tx::{Transaction, DIGEST_LEN, SIGNATURE_LEN},
};

use crate::{
    consts::{APP_NAME, APP_VERSION},
    helpers::{account_hash, friendly_address, workchain},
};

mod context;
pub use context::{AddressInfo, Request, RequestContext, RequestType, TxInfo};

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod error;
pub use error::Error;

mod keys;
pub use keys::{PrivateKey, PRIVATE_KEY_LEN};

mod review;
pub use review::{Decision, Field, PendingDecision, Review, NO_PAYLOAD, SEND_ALL};

/// Engine request state
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumIter)]
pub enum State {
    /// Idle, no request in progress
    None,
    /// Accumulating transaction chunks, awaiting chunk `n`
    Receiving(u8),
    /// Request loaded, ready for confirmation
    Parsed,
    /// Review presented, awaiting user decision
    Pending,
    /// Request approved, completing
    Approved,
}

/// [Engine] provides hardware-independent support for TON wallet operations
pub struct Engine<DRV: Driver> {
    ctx: RequestContext,
    review_id: u32,
    drv: DRV,
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// SLIP-0010 derivation for ed25519 keys
    fn slip10_derive_ed25519(&self, path: &[u32]) -> Result<PrivateKey, Error>;

    /// Compute the ed25519 public key for a private key
    fn ed25519_public_key(
        &self,
        private_key: &PrivateKey,
    ) -> Result<[u8; PUBLIC_KEY_LEN], Error> {
        let k = SigningKey::from_bytes(private_key.as_bytes());
        Ok(k.verifying_key().to_bytes())
    }

    /// Sign a digest with the provided private key, returning the signature length
    fn ed25519_sign(
        &self,
        private_key: &PrivateKey,
        digest: &[u8; DIGEST_LEN],
        signature: &mut [u8; SIGNATURE_LEN],
    ) -> Result<usize, Error> {
        let k = SigningKey::from_bytes(private_key.as_bytes());
        signature.copy_from_slice(&k.sign(digest).to_bytes());
        Ok(SIGNATURE_LEN)
    }
}

impl<T: Driver> Driver for &mut T {
    fn slip10_derive_ed25519(&self, path: &[u32]) -> Result<PrivateKey, Error> {
        T::slip10_derive_ed25519(self, path)
    }

    fn ed25519_public_key(
        &self,
        private_key: &PrivateKey,
    ) -> Result<[u8; PUBLIC_KEY_LEN], Error> {
        T::ed25519_public_key(self, private_key)
    }

    fn ed25519_sign(
        &self,
        private_key: &PrivateKey,
        digest: &[u8; DIGEST_LEN],
        signature: &mut [u8; SIGNATURE_LEN],
    ) -> Result<usize, Error> {
        T::ed25519_sign(self, private_key, digest, signature)
    }
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver
    pub const fn new(drv: DRV) -> Self {
        Self {
            ctx: RequestContext::new(),
            review_id: 0,
            drv,
        }
    }

    /// Handle incoming events
    ///
    /// Errors discard the request in progress.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        let r = self.handle(evt);

        if let Err(_e) = &r {
            #[cfg(feature = "log")]
            log::warn!("event failed: {:?}, resetting", _e);

            self.reset();
        }

        r
    }

    fn handle(&mut self, evt: &Event) -> Result<Output, Error> {
        match (self.ctx.state, evt) {
            // Only a decision or reset may follow a presented review
            (State::Pending, Event::GetAppInfo) => Err(Error::BadState),

            // Application info is available outside of reviews
            (_, Event::GetAppInfo) => Ok(Output::AppInfo {
                version: APP_VERSION,
                name: APP_NAME,
            }),

            // Discard any request in progress
            (_, Event::Reset) => {
                self.reset();
                Ok(Output::None)
            }

            // Derive and load an address for confirmation
            (State::None, Event::GetAddress { path, flags }) => self.address_init(path, *flags),

            // Start loading a transaction
            (State::None, Event::TxChunk { index: 0, more, data }) => self.tx_init(*more, data),

            // Append transaction chunks (in order)
            (State::Receiving(n), Event::TxChunk { index, more, data }) if *index == n => {
                self.tx_update(n, *more, data)
            }

            // Present loaded request for review
            (State::Parsed, Event::Confirm) => self.review().map(Output::Review),

            // Handle unexpected events
            (_s, _e) => {
                #[cfg(feature = "log")]
                log::error!(
                    "unexpected event in state {:?} ({}): {:02x?}",
                    _s,
                    self.ctx.request_type(),
                    _e
                );

                Err(Error::BadState)
            }
        }
    }

    /// Resume a suspended request with the user's decision
    ///
    /// The handle must match the presented [`Review`], the request is
    /// discarded on every path.
    pub fn resume(&mut self, handle: PendingDecision, decision: Decision) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("decision: {} for {:?}", decision, handle);

        let r = self.decide(handle, decision);

        self.reset();

        r
    }

    /// Approve a pending request
    pub fn approve(&mut self, handle: PendingDecision) -> Result<Output, Error> {
        self.resume(handle, Decision::Approve)
    }

    /// Reject a pending request
    pub fn reject(&mut self, handle: PendingDecision) -> Result<Output, Error> {
        self.resume(handle, Decision::Reject)
    }

    /// Reset engine state, discarding any request in progress
    pub fn reset(&mut self) {
        self.ctx.clear();
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.ctx.state
    }

    /// Fetch current request type
    pub fn request_type(&self) -> RequestType {
        self.ctx.request_type()
    }

    /// Fetch the request context
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Fetch the handle for the presented review, if any
    pub fn pending(&self) -> Option<PendingDecision> {
        self.ctx.review
    }

    /// Fetch the engine driver
    pub fn driver(&self) -> &DRV {
        &self.drv
    }

    fn address_init(&mut self, path: &DerivationPath, flags: AddressFlags) -> Result<Output, Error> {
        let raw_public_key = keys::derive_public_key(&self.drv, path)?;

        self.ctx.path = path.clone();
        self.ctx.request = Request::Address(AddressInfo {
            raw_public_key,
            flags,
        });
        self.ctx.state = State::Parsed;

        Ok(Output::None)
    }

    fn tx_init(&mut self, more: bool, data: &[u8]) -> Result<Output, Error> {
        let (path, n) = DerivationPath::decode(data).map_err(|_| Error::InvalidData)?;
        if n != data.len() {
            return Err(Error::InvalidData);
        }

        // Transaction data must follow the path
        if !more {
            return Err(Error::TxParsingFailure);
        }

        #[cfg(feature = "log")]
        log::trace!("transaction init, path: {:?}", path);

        self.ctx.path = path;
        self.ctx.request = Request::Transaction(TxInfo::new());
        self.ctx.state = State::Receiving(1);

        Ok(Output::None)
    }

    fn tx_update(&mut self, n: u8, more: bool, data: &[u8]) -> Result<Output, Error> {
        let tx = match &mut self.ctx.request {
            Request::Transaction(tx) => tx,
            _ => return Err(Error::BadState),
        };

        tx.raw
            .extend_from_slice(data)
            .map_err(|_| Error::WrongTxLength)?;

        if more {
            let next = n.checked_add(1).ok_or(Error::WrongTxLength)?;
            self.ctx.state = State::Receiving(next);
            return Ok(Output::None);
        }

        let (t, len) = Transaction::decode(&tx.raw).map_err(|_e| {
            #[cfg(feature = "log")]
            log::warn!("transaction decode failed: {:?}", _e);

            Error::TxParsingFailure
        })?;

        // Reject trailing data
        if len != tx.raw.len() {
            return Err(Error::TxParsingFailure);
        }

        tx.digest = Sha256::digest(&tx.raw).into();
        tx.transaction = Some(t);

        self.ctx.state = State::Parsed;

        Ok(Output::None)
    }

    fn review(&mut self) -> Result<Review, Error> {
        self.review_id = self.review_id.wrapping_add(1);

        let handle = PendingDecision {
            request_type: self.ctx.request_type(),
            id: self.review_id,
        };

        let r = match &self.ctx.request {
            Request::Address(info) => review::address_review(info, handle)?,
            Request::Transaction(TxInfo {
                transaction: Some(tx),
                ..
            }) => review::tx_review(tx, handle)?,
            _ => return Err(Error::BadState),
        };

        self.ctx.review = Some(handle);
        self.ctx.state = State::Pending;

        Ok(r)
    }

    fn decide(&mut self, handle: PendingDecision, decision: Decision) -> Result<Output, Error> {
        match (self.ctx.state, self.ctx.review) {
            (State::Pending, Some(h)) if h == handle => (),
            (_s, _h) => {
                #[cfg(feature = "log")]
                log::error!(
                    "decision for {:?} does not match state {:?} / review {:?}",
                    handle,
                    _s,
                    _h
                );

                return Err(Error::BadState);
            }
        }

        if decision == Decision::Reject {
            return Err(Error::Rejected);
        }

        self.ctx.state = State::Approved;

        match &mut self.ctx.request {
            Request::Address(info) => {
                let hash = account_hash(&info.raw_public_key);

                let mut address = [0u8; FRIENDLY_ADDRESS_LEN];
                friendly_address(workchain(info.flags), &hash, info.flags, &mut address)?;

                Ok(Output::Address {
                    public_key: info.raw_public_key,
                    address,
                })
            }
            Request::Transaction(tx) => {
                let mut private_key = keys::derive(&self.drv, &self.ctx.path)?;
                tx.signature = keys::sign(&self.drv, &mut private_key, &tx.digest)?;

                Ok(Output::TxSignature {
                    signature: tx.signature,
                    digest: tx.digest,
                })
            }
            Request::None => Err(Error::BadState),
        }
    }
}
