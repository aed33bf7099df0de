// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Private key handles, derivation and signing
//!
//! Private keys exist only between derivation and use, storage is wiped
//! on drop and on every exit path from [`sign`].

use zeroize::{Zeroize, Zeroizing};

use ledger_ton_apdu::{
    address::PUBLIC_KEY_LEN,
    path::DerivationPath,
    tx::{DIGEST_LEN, SIGNATURE_LEN},
};

use super::{Driver, Error};

/// ed25519 private key length
pub const PRIVATE_KEY_LEN: usize = 32;

/// Derived ed25519 private key, wiped on drop
pub struct PrivateKey(Zeroizing<[u8; PRIVATE_KEY_LEN]>);

impl PrivateKey {
    /// Wrap raw private key bytes
    pub fn from_raw(raw: [u8; PRIVATE_KEY_LEN]) -> Self {
        Self(Zeroizing::new(raw))
    }

    /// Access raw private key bytes
    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_LEN] {
        &self.0
    }

    /// Explicitly wipe key storage
    pub fn wipe(&mut self) {
        self.0.zeroize();
    }

    /// Check whether key storage has been wiped
    pub fn is_wiped(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

/// Keys are never printed
impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PrivateKey(..)")
    }
}

/// Wipes the borrowed key when dropped
struct WipeGuard<'a>(&'a mut PrivateKey);

impl<'a> Drop for WipeGuard<'a> {
    fn drop(&mut self) {
        self.0.wipe();
    }
}

/// Derive the private key for the provided path
pub fn derive<DRV: Driver>(drv: &DRV, path: &DerivationPath) -> Result<PrivateKey, Error> {
    #[cfg(feature = "log")]
    log::trace!("derive key for path: {:?}", path);

    drv.slip10_derive_ed25519(path).map_err(|_e| {
        #[cfg(feature = "log")]
        log::error!("key derivation failed: {:?}", _e);

        Error::DerivationFailure
    })
}

/// Derive the public key for the provided path, the intermediate
/// private key is wiped prior to returning
pub fn derive_public_key<DRV: Driver>(
    drv: &DRV,
    path: &DerivationPath,
) -> Result<[u8; PUBLIC_KEY_LEN], Error> {
    let mut private_key = derive(drv, path)?;
    let guard = WipeGuard(&mut private_key);

    let public_key = drv.ed25519_public_key(&*guard.0);

    drop(guard);

    public_key
}

/// Sign a message digest, the key is wiped whether or not signing succeeds
pub fn sign<DRV: Driver>(
    drv: &DRV,
    private_key: &mut PrivateKey,
    digest: &[u8; DIGEST_LEN],
) -> Result<[u8; SIGNATURE_LEN], Error> {
    let guard = WipeGuard(private_key);

    let mut signature = [0u8; SIGNATURE_LEN];
    let n = drv
        .ed25519_sign(&*guard.0, digest, &mut signature)
        .map_err(|_e| {
            #[cfg(feature = "log")]
            log::error!("signing failed: {:?}", _e);

            Error::SigningFailure
        })?;

    if n != SIGNATURE_LEN {
        #[cfg(feature = "log")]
        log::error!("invalid signature length: {}", n);

        signature.zeroize();
        return Err(Error::SigningFailure);
    }

    Ok(signature)
}

#[cfg(test)]
mod test {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    use ledger_ton_apdu::path::HARDENED;

    use super::*;

    struct RawDriver;

    impl Driver for RawDriver {
        fn slip10_derive_ed25519(&self, path: &[u32]) -> Result<PrivateKey, Error> {
            let mut k = [0x11u8; PRIVATE_KEY_LEN];
            k[0] = path.len() as u8;
            Ok(PrivateKey::from_raw(k))
        }
    }

    /// Driver returning truncated signatures
    struct ShortSigDriver;

    impl Driver for ShortSigDriver {
        fn slip10_derive_ed25519(&self, _path: &[u32]) -> Result<PrivateKey, Error> {
            Ok(PrivateKey::from_raw([0x22; PRIVATE_KEY_LEN]))
        }

        fn ed25519_sign(
            &self,
            _private_key: &PrivateKey,
            _digest: &[u8; DIGEST_LEN],
            _signature: &mut [u8; SIGNATURE_LEN],
        ) -> Result<usize, Error> {
            Ok(SIGNATURE_LEN - 1)
        }
    }

    /// Driver with a failing signing primitive
    struct FailingSigner;

    impl Driver for FailingSigner {
        fn slip10_derive_ed25519(&self, _path: &[u32]) -> Result<PrivateKey, Error> {
            Ok(PrivateKey::from_raw([0x33; PRIVATE_KEY_LEN]))
        }

        fn ed25519_sign(
            &self,
            _private_key: &PrivateKey,
            _digest: &[u8; DIGEST_LEN],
            _signature: &mut [u8; SIGNATURE_LEN],
        ) -> Result<usize, Error> {
            Err(Error::EncodingFailure)
        }
    }

    fn path() -> DerivationPath {
        DerivationPath::from_slice(&[44 | HARDENED, 607 | HARDENED]).unwrap()
    }

    #[test]
    fn sign_wipes_key() {
        let mut k = derive(&RawDriver, &path()).unwrap();
        assert!(!k.is_wiped());

        let digest = [0xab; DIGEST_LEN];
        let public_key = RawDriver.ed25519_public_key(&k).unwrap();

        let signature = sign(&RawDriver, &mut k, &digest).unwrap();
        assert!(k.is_wiped());
        assert_eq!(k.as_bytes(), &[0u8; PRIVATE_KEY_LEN]);

        let vk = VerifyingKey::from_bytes(&public_key).unwrap();
        vk.verify(&digest, &Signature::from_bytes(&signature)).unwrap();
    }

    #[test]
    fn sign_failure_wipes_key() {
        let mut k = derive(&ShortSigDriver, &path()).unwrap();

        let r = sign(&ShortSigDriver, &mut k, &[0u8; DIGEST_LEN]);
        assert_eq!(r, Err(Error::SigningFailure));
        assert!(k.is_wiped());
    }

    #[test]
    fn sign_error_maps_to_signing_failure() {
        let mut k = derive(&FailingSigner, &path()).unwrap();

        let r = sign(&FailingSigner, &mut k, &[0u8; DIGEST_LEN]);
        assert_eq!(r, Err(Error::SigningFailure));
        assert!(k.is_wiped());
    }

    #[test]
    fn sign_deterministic() {
        let digest = [0x5a; DIGEST_LEN];

        let mut k1 = derive(&RawDriver, &path()).unwrap();
        let mut k2 = derive(&RawDriver, &path()).unwrap();

        assert_eq!(
            sign(&RawDriver, &mut k1, &digest).unwrap(),
            sign(&RawDriver, &mut k2, &digest).unwrap()
        );
    }

    #[test]
    fn explicit_wipe() {
        let mut k = PrivateKey::from_raw([0xff; PRIVATE_KEY_LEN]);
        k.wipe();
        assert!(k.is_wiped());
    }
}
