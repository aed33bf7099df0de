// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Response status words
//!
//! Every response ends with a 2-byte big-endian status word, failures
//! carry no data.

use byteorder::{BigEndian, ByteOrder};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

use crate::ApduError;

/// Status word length in bytes
pub const STATUS_LEN: usize = 2;

/// Response status words
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u16)]
pub enum StatusWord {
    /// Command completed
    Success = 0x9000,
    /// Request rejected by the user
    Deny = 0x6985,
    /// Frame length did not match declared data length
    MalformedFrame = 0x6a87,
    /// Unsupported P1 / P2 values
    WrongP1P2 = 0x6a86,
    /// Unsupported instruction
    InsNotSupported = 0x6d00,
    /// Unsupported class
    ClaNotSupported = 0x6e00,
    /// Address could not be rendered for display
    DisplayAddressFailure = 0xb002,
    /// Amount could not be rendered for display
    DisplayAmountFailure = 0xb003,
    /// Transaction exceeds the maximum supported length
    WrongTxLength = 0xb004,
    /// Transaction decoding failed
    TxParsingFailure = 0xb005,
    /// Command is not valid for the current request / state
    BadState = 0xb007,
    /// Signing primitive failed
    SigningFailure = 0xb008,
    /// Key derivation primitive failed
    DerivationFailure = 0xb009,
    /// Response encoding failed
    EncodingFailure = 0xb00a,
}

impl StatusWord {
    /// Fetch the raw status value
    pub fn value(&self) -> u16 {
        *self as u16
    }

    /// Check whether this status indicates success
    pub fn is_success(&self) -> bool {
        *self == StatusWord::Success
    }

    /// Write this status following `n` bytes of response data in `buff`,
    /// returning the full response length.
    pub fn write_response(&self, buff: &mut [u8], n: usize) -> Result<usize, ApduError> {
        if buff.len() < n + STATUS_LEN {
            return Err(ApduError::InvalidLength);
        }

        BigEndian::write_u16(&mut buff[n..], self.value());

        Ok(n + STATUS_LEN)
    }

    /// Split a response into data and status word
    pub fn split_response(buff: &[u8]) -> Result<(&[u8], u16), ApduError> {
        if buff.len() < STATUS_LEN {
            return Err(ApduError::InvalidLength);
        }

        let (data, sw) = buff.split_at(buff.len() - STATUS_LEN);
        Ok((data, BigEndian::read_u16(sw)))
    }
}
