// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Encoding helper for fixed-size byte arrays
pub(crate) mod arr {
    use crate::ApduError;

    pub fn enc<const N: usize>(d: &[u8; N], buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < d.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..d.len()].copy_from_slice(&d[..]);

        Ok(d.len())
    }

    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), ApduError> {
        if buff.len() < N {
            return Err(ApduError::InvalidLength);
        }

        let mut d = [0u8; N];
        d.copy_from_slice(&buff[..N]);

        Ok((d, N))
    }
}

/// Encoding helper for length-prefixed strings
pub(crate) mod lstr {
    use crate::ApduError;

    pub fn enc(s: &str, buff: &mut [u8]) -> Result<usize, ApduError> {
        let d = s.as_bytes();

        if d.len() > u8::MAX as usize || buff.len() < 1 + d.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = d.len() as u8;
        buff[1..][..d.len()].copy_from_slice(d);

        Ok(1 + d.len())
    }

    pub fn dec(buff: &[u8]) -> Result<(&str, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        let n = buff[0] as usize;
        if buff.len() < 1 + n {
            return Err(ApduError::InvalidLength);
        }

        let s = core::str::from_utf8(&buff[1..][..n]).map_err(|_| ApduError::InvalidUtf8)?;

        Ok((s, 1 + n))
    }
}
