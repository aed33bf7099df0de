// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Hierarchical derivation paths

use core::ops::Deref;

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};
use heapless::Vec;

use crate::ApduError;

/// Maximum number of path components
pub const MAX_PATH_LEN: usize = 10;

/// Hardened derivation flag
pub const HARDENED: u32 = 1 << 31;

/// Derivation path, an ordered set of (at most [`MAX_PATH_LEN`]) path components
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     COUNT     |           COMPONENT[0] (u32, big-endian)      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               |           COMPONENT[..]                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct DerivationPath(Vec<u32, MAX_PATH_LEN>);

impl DerivationPath {
    /// Create a new (empty) derivation path
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a derivation path from components
    pub fn from_slice(path: &[u32]) -> Result<Self, ApduError> {
        Vec::from_slice(path)
            .map(Self)
            .map_err(|_| ApduError::InvalidLength)
    }

    /// Clear path components
    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|c| *c = 0);
        self.0.clear();
    }
}

impl Deref for DerivationPath {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Paths are formatted as `m/44'/607'/0'`
impl core::fmt::Debug for DerivationPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "m")?;
        for c in self.0.iter() {
            match c & HARDENED {
                0 => write!(f, "/{c}")?,
                _ => write!(f, "/{}'", c & !HARDENED)?,
            }
        }
        Ok(())
    }
}

impl Encode for DerivationPath {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + self.0.len() * 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.encode_len()?;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.0.len() as u8;
        for (i, c) in self.0.iter().enumerate() {
            BigEndian::write_u32(&mut buff[1 + i * 4..], *c);
        }

        Ok(n)
    }
}

impl DecodeOwned for DerivationPath {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        // Check component count prior to reading
        let count = buff[0] as usize;
        if count > MAX_PATH_LEN {
            return Err(ApduError::InvalidLength);
        }

        let n = 1 + count * 4;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        let mut path = Vec::new();
        for c in buff[1..n].chunks_exact(4) {
            // Capacity checked above
            let _ = path.push(BigEndian::read_u32(c));
        }

        Ok((Self(path), n))
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use encdec::Decode;
    use rand::random;

    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn path_encode_decode() {
        for n in 0..=MAX_PATH_LEN {
            let mut c = [0u32; MAX_PATH_LEN];
            c.iter_mut().for_each(|v| *v = random());

            let p = DerivationPath::from_slice(&c[..n]).unwrap();

            let mut buff = [0u8; 64];
            let len = encode_decode_apdu(&mut buff, &p);
            assert_eq!(len, 1 + 4 * n);
        }
    }

    #[test]
    fn path_big_endian() {
        let b = [0x02, 0x80, 0x00, 0x00, 0x2c, 0x80, 0x00, 0x02, 0x5f];
        let (p, n) = DerivationPath::decode(&b).unwrap();

        assert_eq!(n, b.len());
        assert_eq!(&p[..], &[44 | HARDENED, 607 | HARDENED]);
    }

    #[test]
    fn path_too_long() {
        let mut b = [0u8; 64];
        b[0] = MAX_PATH_LEN as u8 + 1;
        assert!(DerivationPath::decode(&b).is_err());

        assert!(DerivationPath::from_slice(&[0u32; MAX_PATH_LEN + 1]).is_err());
    }

    #[test]
    fn path_truncated() {
        let b = [0x02, 0x80, 0x00, 0x00, 0x2c, 0x80];
        assert!(DerivationPath::decode(&b).is_err());
        assert!(DerivationPath::decode(&[]).is_err());
    }

    #[test]
    fn path_debug() {
        let p = DerivationPath::from_slice(&[44 | HARDENED, 607 | HARDENED, 3]).unwrap();
        assert_eq!(std::format!("{p:?}"), "m/44'/607'/3");
    }
}
