// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for TON app communication
//!
//! This module provides the framing, status words and request / response encodings
//! used between a host and the TON signing application.
//!
//! Every command is a short frame with a fixed 5-byte header:
//!
//! ```text
//! +-------+-------+-------+-------+-------+----------------+
//! |  CLA  |  INS  |  P1   |  P2   |  LC   |  DATA (LC)     |
//! +-------+-------+-------+-------+-------+----------------+
//! ```
//!
//! See [`frame::Command::parse`] for the (strict) frame validation rules.
//!
//! Responses carry optional data followed by a 2-byte big-endian [`StatusWord`].
//! Unlike the header, all multi-byte fields in request / response payloads are
//! big-endian.

#![no_std]

pub use ledger_proto::{ApduError, ApduStatic};

pub mod address;
pub mod app_info;
pub mod frame;
pub mod path;
pub mod prelude;
pub mod status;
pub mod tx;

mod helpers;

pub use frame::{Command, FrameError};
pub use status::StatusWord;

/// TON APDU Class
pub const TON_APDU_CLA: u8 = 0xe0;

/// Default (interindustry) class, accepted in place of [`TON_APDU_CLA`]
pub const DEFAULT_APDU_CLA: u8 = 0x00;

/// TON APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application name and version
    GetAppInfo = 0x01,

    /// Derive a public key / address for confirmation
    GetAddress = 0x02,

    /// Load a transaction (chunked) for signing
    SignTx = 0x03,

    /// Present the loaded request for user confirmation
    Confirm = 0x04,

    /// Discard any request in progress
    Reset = 0x05,
}
