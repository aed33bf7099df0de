// Copyright (c) 2022-2023 The MobileCoin Foundation

#![allow(unused)]

use std::cell::Cell;

use bip39::{Language, Mnemonic, Seed};
use encdec::Encode;
use lazy_static::lazy_static;
use log::{debug, trace};

use ledger_ton_core::{
    apdu::{
        address::{AddressFlags, GetAddressReq},
        frame::MAX_FRAME_LEN,
        path::{DerivationPath, HARDENED},
        tx::{encode_tx_frame, tx_chunk_count, Transaction, DIGEST_LEN, SIGNATURE_LEN},
        StatusWord,
    },
    app::{App, Reply},
    engine::{Decision, Driver, Error, PrivateKey, Review},
};

pub const MNEMONIC: &str = "duck deal pretty pen thunder economy wide common goose fit engine main aisle curtain choose cube claim snake enroll detect brief history float unit";

lazy_static! {
    /// BIP-0039 seed for [`MNEMONIC`]
    pub static ref SEED: [u8; 64] = {
        let m = Mnemonic::from_phrase(MNEMONIC, Language::English).unwrap();
        let s = Seed::new(&m, "");

        let mut b = [0u8; 64];
        b.copy_from_slice(s.as_bytes());
        b
    };

    /// Default wallet path
    pub static ref PATH: DerivationPath =
        DerivationPath::from_slice(&[44 | HARDENED, 607 | HARDENED, HARDENED]).unwrap();
}

pub fn setup_log() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

/// Driver implementation for test use, counting derivation and signing calls
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
    pub derives: Cell<usize>,
    pub signs: Cell<usize>,
}

impl TestDriver {
    pub fn new(seed: [u8; 64]) -> Self {
        Self {
            seed,
            derives: Cell::new(0),
            signs: Cell::new(0),
        }
    }

    pub fn calls(&self) -> (usize, usize) {
        (self.derives.get(), self.signs.get())
    }
}

impl Driver for TestDriver {
    fn slip10_derive_ed25519(&self, path: &[u32]) -> Result<PrivateKey, Error> {
        self.derives.set(self.derives.get() + 1);

        let k = slip10_ed25519::derive_ed25519_private_key(&self.seed, path);
        Ok(PrivateKey::from_raw(k))
    }

    fn ed25519_sign(
        &self,
        private_key: &PrivateKey,
        digest: &[u8; DIGEST_LEN],
        signature: &mut [u8; SIGNATURE_LEN],
    ) -> Result<usize, Error> {
        self.signs.set(self.signs.get() + 1);

        let k = ed25519_dalek::SigningKey::from_bytes(private_key.as_bytes());
        signature.copy_from_slice(&ed25519_dalek::Signer::sign(&k, digest).to_bytes());
        Ok(SIGNATURE_LEN)
    }
}

/// Decoded device response
#[derive(Clone, PartialEq, Debug)]
pub enum Resp {
    /// Response data and status word
    Data(Vec<u8>, u16),
    /// Review presented for confirmation
    Review(Review),
}

impl Resp {
    pub fn status(&self) -> u16 {
        match self {
            Resp::Data(_, sw) => *sw,
            Resp::Review(_) => panic!("no status for deferred response"),
        }
    }

    pub fn review(self) -> Review {
        match self {
            Resp::Review(r) => r,
            r => panic!("expected review, got {r:?}"),
        }
    }
}

/// Test device, exchanging raw frames with an [`App`]
pub struct Device {
    pub app: App<TestDriver>,
}

impl Device {
    pub fn new() -> Self {
        Self {
            app: App::new(TestDriver::new(*SEED)),
        }
    }

    pub fn driver(&self) -> &TestDriver {
        self.app.engine().driver()
    }

    /// Exchange a raw command frame
    pub fn exchange(&mut self, rx: &[u8]) -> Resp {
        trace!("rx: {:02x?}", rx);

        let mut tx = [0u8; 300];
        match self.app.handle_apdu(rx, &mut tx) {
            Reply::Response(n) => split(&tx[..n]),
            Reply::Deferred => {
                let r = self.app.review().unwrap().clone();
                debug!("review: {:?}", r);
                Resp::Review(r)
            }
        }
    }

    /// Provide a decision for a presented review
    pub fn decide(&mut self, review: &Review, decision: Decision) -> Resp {
        let mut tx = [0u8; 300];
        let n = self.app.decide(review.handle, decision, &mut tx);
        split(&tx[..n])
    }

    /// Request an address be loaded for confirmation
    pub fn get_address(&mut self, path: &DerivationPath, flags: AddressFlags) -> Resp {
        let mut f = [0u8; MAX_FRAME_LEN];
        let n = GetAddressReq::new(path.clone(), flags)
            .encode_frame(&mut f)
            .unwrap();

        self.exchange(&f[..n])
    }

    /// Load an encoded transaction in chunks, returning the final response
    pub fn load_tx(&mut self, path: &DerivationPath, raw: &[u8], chunk_size: usize) -> Resp {
        let mut r = Resp::Data(vec![], 0);

        for i in 0..tx_chunk_count(raw.len(), chunk_size) {
            let mut f = [0u8; MAX_FRAME_LEN];
            let n = encode_tx_frame(i, chunk_size, path, raw, &mut f).unwrap();

            r = self.exchange(&f[..n]);
            if r.status() != 0x9000 {
                break;
            }
        }

        r
    }

    pub fn confirm(&mut self) -> Resp {
        self.exchange(&[0xe0, 0x04, 0x00, 0x00, 0x00])
    }
}

/// Split a response into data and status
pub fn split(b: &[u8]) -> Resp {
    let (d, sw) = StatusWord::split_response(b).unwrap();
    trace!("tx: {:02x?} ({:04x})", d, sw);
    Resp::Data(d.to_vec(), sw)
}

/// Encode a transaction to bytes
pub fn tx_bytes(tx: &Transaction) -> Vec<u8> {
    let mut b = vec![0u8; tx.encode_len().unwrap()];
    let n = tx.encode(&mut b).unwrap();
    b.truncate(n);
    b
}

pub fn transaction() -> Transaction {
    Transaction {
        seqno: 7,
        timeout: 1_700_000_000,
        value: 1_250_000_000,
        to_chain: 0,
        to_hash: [0x4d; 32],
        bounce: true,
        send_mode: 3,
        payload_hash: None,
    }
}
