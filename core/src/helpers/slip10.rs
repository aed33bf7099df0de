// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Seed-backed SLIP-0010 ed25519 [`Driver`] implementation

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use ledger_ton_apdu::path::HARDENED;

use crate::engine::{Driver, Error, PrivateKey};

type HmacSha512 = Hmac<Sha512>;

const ED25519_CURVE: &[u8] = b"ed25519 seed";

/// Seed length (BIP-0039 derived)
pub const SEED_LEN: usize = 64;

/// [`Driver`] deriving keys from a root seed held in memory, for hosts
/// and simulators without a secure element
pub struct Slip10Driver {
    seed: Zeroizing<[u8; SEED_LEN]>,
}

impl Slip10Driver {
    /// Create a new driver from a root seed
    pub fn new(seed: [u8; SEED_LEN]) -> Self {
        Self {
            seed: Zeroizing::new(seed),
        }
    }

    /// Create a new driver from a seed slice (eg. a BIP-0039 seed)
    pub fn from_slice(seed: &[u8]) -> Result<Self, Error> {
        if seed.len() != SEED_LEN {
            return Err(Error::DerivationFailure);
        }

        let mut s = Zeroizing::new([0u8; SEED_LEN]);
        s.copy_from_slice(seed);

        Ok(Self { seed: s })
    }
}

/// Compute `HMAC-SHA512(key, data..)` into split key / chain code halves
fn hmac_split(
    key: &[u8],
    data: &[&[u8]],
    k: &mut [u8; 32],
    c: &mut [u8; 32],
) -> Result<(), Error> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|_| Error::DerivationFailure)?;
    for d in data {
        mac.update(d);
    }

    let mut i = mac.finalize().into_bytes();
    k.copy_from_slice(&i[..32]);
    c.copy_from_slice(&i[32..]);
    i.as_mut_slice().zeroize();

    Ok(())
}

/// Derive an ed25519 private key from a seed via SLIP-0010
fn derive_from_seed(seed: &[u8], path: &[u32]) -> Result<Zeroizing<[u8; 32]>, Error> {
    let mut k = Zeroizing::new([0u8; 32]);
    let mut c = Zeroizing::new([0u8; 32]);

    hmac_split(ED25519_CURVE, &[seed], &mut k, &mut c)?;

    for index in path {
        // ed25519 supports hardened derivation only
        if index & HARDENED == 0 {
            return Err(Error::DerivationFailure);
        }

        let parent = k.clone();
        let chain = c.clone();
        let index = index.to_be_bytes();

        hmac_split(
            &chain[..],
            &[&[0x00u8][..], &parent[..], &index[..]],
            &mut k,
            &mut c,
        )?;
    }

    Ok(k)
}

impl Driver for Slip10Driver {
    fn slip10_derive_ed25519(&self, path: &[u32]) -> Result<PrivateKey, Error> {
        let k = derive_from_seed(&self.seed[..], path)?;

        Ok(PrivateKey::from_raw(*k))
    }
}
