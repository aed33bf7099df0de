// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address APDUs, for deriving and confirming a public key / address

use encdec::{Decode, DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, TON_APDU_CLA};
use crate::{frame::encode_command, helpers::arr, path::DerivationPath, Command};

/// Public key length
pub const PUBLIC_KEY_LEN: usize = 32;

/// User-friendly address length (base64url encoded)
pub const FRIENDLY_ADDRESS_LEN: usize = 48;

bitflags::bitflags! {
    /// Address display flags, carried in `P2` of [`GetAddressReq`]
    pub struct AddressFlags: u8 {
        /// Display a non-bounceable address
        const NON_BOUNCEABLE = 1 << 0;
        /// Display a testnet-only address
        const TESTNET = 1 << 1;
        /// Display a masterchain (rather than basechain) address
        const MASTERCHAIN = 1 << 2;
    }
}

/// Get address request APDU.
///
/// Derives the key for the provided path and loads it for confirmation,
/// the public key is returned only once the address is approved on the device.
/// [`AddressFlags`] are carried in `P2`, an empty payload selects the root key.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                  DERIVATION_PATH (optional)                   /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct GetAddressReq {
    /// Derivation path for the address key
    pub path: DerivationPath,
    /// Display flags
    pub flags: AddressFlags,
}

impl GetAddressReq {
    /// Create a new [`GetAddressReq`] APDU
    pub fn new(path: DerivationPath, flags: AddressFlags) -> Self {
        Self { path, flags }
    }

    /// Decode a [`GetAddressReq`] from a parsed command
    pub fn decode_command(cmd: &Command) -> Result<Self, ApduError> {
        let flags = AddressFlags::from_bits(cmd.p2).ok_or(ApduError::InvalidEncoding)?;

        let path = match cmd.data {
            None => DerivationPath::new(),
            Some(d) => {
                let (path, n) = DerivationPath::decode(d)?;
                // Reject trailing data
                if n != d.len() {
                    return Err(ApduError::InvalidLength);
                }
                path
            }
        };

        Ok(Self { path, flags })
    }

    /// Encode a complete command frame for this request
    pub fn encode_frame(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut data = [0u8; 64];
        let n = match self.path.is_empty() {
            true => 0,
            false => self.path.encode(&mut data)?,
        };

        encode_command(
            Self::CLA,
            Self::INS,
            0x00,
            self.flags.bits(),
            &data[..n],
            buff,
        )
    }
}

impl ApduStatic for GetAddressReq {
    const CLA: u8 = TON_APDU_CLA;
    const INS: u8 = Instruction::GetAddress as u8;
}

/// Address response APDU, returned following user approval
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   PK_LEN (32) |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                          PUBLIC_KEY                           /
/// /                  (32-byte ed25519 public key)                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  ADDR_LEN (48)|                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                            ADDRESS                            /
/// /                (48-byte base64url friendly address)           /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressResp {
    /// Derived public key
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// Friendly address, as displayed
    pub address: [u8; FRIENDLY_ADDRESS_LEN],
}

impl AddressResp {
    /// Create a new [`AddressResp`] APDU
    pub fn new(public_key: [u8; PUBLIC_KEY_LEN], address: [u8; FRIENDLY_ADDRESS_LEN]) -> Self {
        Self {
            public_key,
            address,
        }
    }

    /// Fetch the address as a string
    pub fn address_str(&self) -> Result<&str, ApduError> {
        core::str::from_utf8(&self.address).map_err(|_| ApduError::InvalidUtf8)
    }
}

impl Encode for AddressResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(2 + PUBLIC_KEY_LEN + FRIENDLY_ADDRESS_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[index] = PUBLIC_KEY_LEN as u8;
        index += 1;
        index += arr::enc(&self.public_key, &mut buff[index..])?;

        buff[index] = FRIENDLY_ADDRESS_LEN as u8;
        index += 1;
        index += arr::enc(&self.address, &mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for AddressResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let mut index = 0;

        if buff.len() < 2 + PUBLIC_KEY_LEN + FRIENDLY_ADDRESS_LEN {
            return Err(ApduError::InvalidLength);
        }

        if buff[index] as usize != PUBLIC_KEY_LEN {
            return Err(ApduError::InvalidEncoding);
        }
        index += 1;
        let (public_key, n) = arr::dec(&buff[index..])?;
        index += n;

        if buff[index] as usize != FRIENDLY_ADDRESS_LEN {
            return Err(ApduError::InvalidEncoding);
        }
        index += 1;
        let (address, n) = arr::dec(&buff[index..])?;
        index += n;

        Ok((
            Self {
                public_key,
                address,
            },
            index,
        ))
    }
}

#[cfg(test)]
mod test {
    use rand::random;

    use super::*;
    use crate::{
        frame::MAX_FRAME_LEN,
        path::HARDENED,
        test::encode_decode_apdu,
    };

    #[test]
    fn get_address_frame() {
        let req = GetAddressReq::new(
            DerivationPath::from_slice(&[44 | HARDENED, 607 | HARDENED, HARDENED]).unwrap(),
            AddressFlags::TESTNET | AddressFlags::NON_BOUNCEABLE,
        );

        let mut buff = [0u8; MAX_FRAME_LEN];
        let n = req.encode_frame(&mut buff).unwrap();
        assert_eq!(n, 5 + 13);

        let cmd = Command::parse(&buff[..n]).unwrap();
        assert_eq!(cmd.ins, Instruction::GetAddress as u8);
        assert_eq!(cmd.p2, 0x03);

        let decoded = GetAddressReq::decode_command(&cmd).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn get_address_empty_path() {
        let cmd = Command::parse(&[0x00, 0x02, 0x00, 0x00, 0x00]).unwrap();
        let req = GetAddressReq::decode_command(&cmd).unwrap();

        assert!(req.path.is_empty());
        assert_eq!(req.flags, AddressFlags::empty());
    }

    #[test]
    fn get_address_invalid() {
        // Unknown flag bits
        let cmd = Command::parse(&[0xe0, 0x02, 0x00, 0x80, 0x00]).unwrap();
        assert!(GetAddressReq::decode_command(&cmd).is_err());

        // Trailing data following path
        let cmd = Command::parse(&[0xe0, 0x02, 0x00, 0x00, 0x06, 0x01, 0x80, 0, 0, 0, 0xff])
            .unwrap();
        assert!(GetAddressReq::decode_command(&cmd).is_err());
    }

    #[test]
    fn address_resp_apdu() {
        let mut address = [b'A'; FRIENDLY_ADDRESS_LEN];
        address[0] = b'E';

        let apdu = AddressResp::new(random(), address);

        let mut buff = [0u8; 256];
        encode_decode_apdu(&mut buff, &apdu);
        assert_eq!(apdu.address_str().unwrap().len(), FRIENDLY_ADDRESS_LEN);
    }
}
