// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction APDUs, used to load and sign a transaction via the hardware wallet.
//!
//! Transactions are loaded in chunks using [`SignTxReq`], the first chunk (index 0)
//! carries the [`DerivationPath`] for the signing key, following chunks carry
//! the encoded [`Transaction`] split at arbitrary boundaries.
//! The final chunk is indicated by clearing [`P2_MORE`].

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, TON_APDU_CLA};
use crate::{
    frame::{encode_command, MAX_DATA_LEN},
    helpers::arr,
    path::DerivationPath,
    Command,
};

/// Maximum (accumulated) transaction length
pub const MAX_TX_LEN: usize = 510;

/// P2 flag indicating further chunks follow
pub const P2_MORE: u8 = 0x80;

/// P2 value for the last chunk
pub const P2_LAST: u8 = 0x00;

/// Transaction tag (first byte of an encoded transaction)
pub const TX_TAG: u8 = 0x00;

/// Send mode flag indicating the full balance is transferred
pub const SEND_MODE_ALL: u8 = 0x80;

/// Signature length
pub const SIGNATURE_LEN: usize = 64;

/// Message digest length
pub const DIGEST_LEN: usize = 32;

/// Transaction chunk request APDU.
///
/// `P1` carries the chunk index, `P2` is [`P2_MORE`] while further chunks follow.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignTxReq<'a> {
    /// Chunk index
    pub index: u8,
    /// More chunks follow
    pub more: bool,
    /// Chunk data
    pub data: &'a [u8],
}

impl<'a> SignTxReq<'a> {
    /// Create a new [`SignTxReq`] chunk
    pub fn new(index: u8, more: bool, data: &'a [u8]) -> Self {
        Self { index, more, data }
    }

    /// Decode a [`SignTxReq`] from a parsed command
    pub fn decode_command(cmd: &Command<'a>) -> Result<Self, ApduError> {
        let more = match cmd.p2 {
            P2_MORE => true,
            P2_LAST => false,
            _ => return Err(ApduError::InvalidEncoding),
        };

        // Chunks must not be empty
        let data = cmd.data.ok_or(ApduError::InvalidLength)?;

        Ok(Self {
            index: cmd.p1,
            more,
            data,
        })
    }

    /// Encode a complete command frame for this chunk
    pub fn encode_frame(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let p2 = match self.more {
            true => P2_MORE,
            false => P2_LAST,
        };
        encode_command(Self::CLA, Self::INS, self.index, p2, self.data, buff)
    }
}

impl<'a> ApduStatic for SignTxReq<'a> {
    const CLA: u8 = TON_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;
}

/// Compute the number of [`SignTxReq`] frames required to load a transaction
/// of `tx_len` bytes with the provided chunk size (including the path chunk)
pub fn tx_chunk_count(tx_len: usize, chunk_size: usize) -> usize {
    let chunk_size = chunk_size.clamp(1, MAX_DATA_LEN);
    1 + (tx_len + chunk_size - 1) / chunk_size
}

/// Encode frame `index` of the chunked load sequence for a transaction,
/// see [`tx_chunk_count`] for the number of frames.
pub fn encode_tx_frame(
    index: usize,
    chunk_size: usize,
    path: &DerivationPath,
    tx: &[u8],
    buff: &mut [u8],
) -> Result<usize, ApduError> {
    let count = tx_chunk_count(tx.len(), chunk_size);
    let chunk_size = chunk_size.clamp(1, MAX_DATA_LEN);

    if index >= count || index > u8::MAX as usize {
        return Err(ApduError::InvalidLength);
    }
    let more = index + 1 < count;

    // First chunk carries the derivation path
    if index == 0 {
        let mut d = [0u8; 64];
        let n = path.encode(&mut d)?;
        return SignTxReq::new(0, more, &d[..n]).encode_frame(buff);
    }

    let offset = (index - 1) * chunk_size;
    let end = (offset + chunk_size).min(tx.len());

    SignTxReq::new(index as u8, more, &tx[offset..end]).encode_frame(buff)
}

/// Decoded transaction
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    TAG (0)    |                    SEQNO                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               |                   TIMEOUT                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               |   VALUE_LEN   |    VALUE (0..8 bytes) ...     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   TO_CHAIN    |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                       TO_HASH (32-bytes)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    BOUNCE     |   SEND_MODE   |  HAS_PAYLOAD  |               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+               +
/// /              PAYLOAD_HASH (32-bytes, if HAS_PAYLOAD)          /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
/// All integers are big-endian, trailing data is rejected by the engine.
#[derive(Clone, PartialEq, Debug)]
pub struct Transaction {
    /// Wallet sequence number
    pub seqno: u32,
    /// Expiry (unix time)
    pub timeout: u32,
    /// Value in nano-units
    pub value: u64,
    /// Destination workchain
    pub to_chain: i8,
    /// Destination account hash
    pub to_hash: [u8; 32],
    /// Bounce flag
    pub bounce: bool,
    /// Send mode
    pub send_mode: u8,
    /// Optional payload (cell) hash
    pub payload_hash: Option<[u8; 32]>,
}

impl Transaction {
    /// Check whether the transaction sends the full wallet balance
    pub fn sends_all(&self) -> bool {
        self.send_mode & SEND_MODE_ALL != 0
    }

    fn value_len(&self) -> usize {
        8 - (self.value.leading_zeros() / 8) as usize
    }
}

fn dec_bool(v: u8) -> Result<bool, ApduError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ApduError::InvalidEncoding),
    }
}

impl Encode for Transaction {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        let payload_len = match self.payload_hash {
            Some(_) => 32,
            None => 0,
        };
        Ok(1 + 4 + 4 + 1 + self.value_len() + 1 + 32 + 3 + payload_len)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[index] = TX_TAG;
        index += 1;

        BigEndian::write_u32(&mut buff[index..], self.seqno);
        index += 4;

        BigEndian::write_u32(&mut buff[index..], self.timeout);
        index += 4;

        // Minimal big-endian value encoding
        let value_len = self.value_len();
        buff[index] = value_len as u8;
        index += 1;
        buff[index..][..value_len].copy_from_slice(&self.value.to_be_bytes()[8 - value_len..]);
        index += value_len;

        buff[index] = self.to_chain as u8;
        index += 1;
        index += arr::enc(&self.to_hash, &mut buff[index..])?;

        buff[index] = self.bounce as u8;
        buff[index + 1] = self.send_mode;
        buff[index + 2] = self.payload_hash.is_some() as u8;
        index += 3;

        if let Some(h) = &self.payload_hash {
            index += arr::enc(h, &mut buff[index..])?;
        }

        Ok(index)
    }
}

impl DecodeOwned for Transaction {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let mut index = 0;

        // Check fixed header length (tag, seqno, timeout, value_len)
        if buff.len() < 10 {
            return Err(ApduError::InvalidLength);
        }

        if buff[index] != TX_TAG {
            return Err(ApduError::InvalidEncoding);
        }
        index += 1;

        let seqno = BigEndian::read_u32(&buff[index..]);
        index += 4;

        let timeout = BigEndian::read_u32(&buff[index..]);
        index += 4;

        let value_len = buff[index] as usize;
        index += 1;
        if value_len > 8 {
            return Err(ApduError::InvalidEncoding);
        }

        // Check remaining length (value, chain, hash, bounce, mode, payload flag)
        if buff.len() < index + value_len + 1 + 32 + 3 {
            return Err(ApduError::InvalidLength);
        }

        let value = buff[index..][..value_len]
            .iter()
            .fold(0u64, |v, b| (v << 8) | *b as u64);
        index += value_len;

        let to_chain = buff[index] as i8;
        index += 1;

        let (to_hash, n) = arr::dec(&buff[index..])?;
        index += n;

        let bounce = dec_bool(buff[index])?;
        let send_mode = buff[index + 1];
        let has_payload = dec_bool(buff[index + 2])?;
        index += 3;

        let payload_hash = match has_payload {
            true => {
                let (h, n) = arr::dec(&buff[index..])?;
                index += n;
                Some(h)
            }
            false => None,
        };

        Ok((
            Self {
                seqno,
                timeout,
                value,
                to_chain,
                to_hash,
                bounce,
                send_mode,
                payload_hash,
            },
            index,
        ))
    }
}

/// Transaction signature response APDU, returned following user approval
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  SIG_LEN (64) |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                           SIGNATURE                           /
/// /                  (64-byte ed25519 signature)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                             DIGEST                            /
/// /                   (32-byte message digest)                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TxSignResp {
    /// Signature over the message digest
    pub signature: [u8; SIGNATURE_LEN],
    /// Signed message digest
    pub digest: [u8; DIGEST_LEN],
}

impl TxSignResp {
    /// Create a new [`TxSignResp`] APDU
    pub fn new(signature: [u8; SIGNATURE_LEN], digest: [u8; DIGEST_LEN]) -> Self {
        Self { signature, digest }
    }
}

impl Encode for TxSignResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + SIGNATURE_LEN + DIGEST_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = SIGNATURE_LEN as u8;
        let mut index = 1;
        index += arr::enc(&self.signature, &mut buff[index..])?;
        index += arr::enc(&self.digest, &mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for TxSignResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < 1 + SIGNATURE_LEN + DIGEST_LEN {
            return Err(ApduError::InvalidLength);
        }
        if buff[0] as usize != SIGNATURE_LEN {
            return Err(ApduError::InvalidEncoding);
        }

        let mut index = 1;
        let (signature, n) = arr::dec(&buff[index..])?;
        index += n;
        let (digest, n) = arr::dec(&buff[index..])?;
        index += n;

        Ok((Self { signature, digest }, index))
    }
}
