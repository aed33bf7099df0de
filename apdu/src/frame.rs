// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command frame parsing
//!
//! Frames arrive straight from the transport and are attacker controlled,
//! parsing is a pure function over the receive buffer and never copies
//! the payload.

use crate::{ApduError, StatusWord};

/// Fixed frame header length (`CLA | INS | P1 | P2 | LC`)
pub const HEADER_LEN: usize = 5;

/// Maximum data length representable by the single-byte `LC` field
pub const MAX_DATA_LEN: usize = u8::MAX as usize;

/// Maximum encoded frame length
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_DATA_LEN;

const OFFSET_CLA: usize = 0;
const OFFSET_INS: usize = 1;
const OFFSET_P1: usize = 2;
const OFFSET_P2: usize = 3;
const OFFSET_LC: usize = 4;

/// Frame decoding errors, both reported as [`StatusWord::MalformedFrame`]
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum FrameError {
    /// Buffer is shorter than the fixed header
    Truncated,
    /// Declared data length does not match the remaining buffer
    LengthMismatch { declared: u8, actual: usize },
}

impl FrameError {
    /// Status word returned to the host for framing errors
    pub fn status(&self) -> StatusWord {
        StatusWord::MalformedFrame
    }
}

/// Decoded command frame, borrowing data from the receive buffer
///
/// `data` is `Some` iff `lc > 0`, in which case `data.len() == lc`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Command<'a> {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub lc: u8,
    pub data: Option<&'a [u8]>,
}

impl<'a> Command<'a> {
    /// Parse a command frame.
    ///
    /// Fails unless `buff.len() == HEADER_LEN + buff[4]`, no trailing or
    /// missing bytes are accepted.
    pub fn parse(buff: &'a [u8]) -> Result<Self, FrameError> {
        if buff.len() < HEADER_LEN {
            return Err(FrameError::Truncated);
        }

        let lc = buff[OFFSET_LC];
        let actual = buff.len() - HEADER_LEN;
        if actual != lc as usize {
            return Err(FrameError::LengthMismatch {
                declared: lc,
                actual,
            });
        }

        Ok(Self {
            cla: buff[OFFSET_CLA],
            ins: buff[OFFSET_INS],
            p1: buff[OFFSET_P1],
            p2: buff[OFFSET_P2],
            lc,
            data: match lc {
                0 => None,
                _ => Some(&buff[HEADER_LEN..]),
            },
        })
    }

    /// Command data, empty where no data is attached
    pub fn data(&self) -> &'a [u8] {
        self.data.unwrap_or(&[])
    }

    /// Encode this command to a frame
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        encode_command(self.cla, self.ins, self.p1, self.p2, self.data(), buff)
    }
}

/// Encode a command frame with the provided header and data,
/// returning the encoded length.
pub fn encode_command(
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: &[u8],
    buff: &mut [u8],
) -> Result<usize, ApduError> {
    if data.len() > MAX_DATA_LEN || buff.len() < HEADER_LEN + data.len() {
        return Err(ApduError::InvalidLength);
    }

    buff[OFFSET_CLA] = cla;
    buff[OFFSET_INS] = ins;
    buff[OFFSET_P1] = p1;
    buff[OFFSET_P2] = p2;
    buff[OFFSET_LC] = data.len() as u8;
    buff[HEADER_LEN..][..data.len()].copy_from_slice(data);

    Ok(HEADER_LEN + data.len())
}
