// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_ton_apdu::{ApduError, FrameError, StatusWord};

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Command frame length did not match the declared data length
    #[cfg_attr(feature = "thiserror", error("malformed command frame"))]
    MalformedFrame = 0x00,

    /// Command data could not be decoded
    #[cfg_attr(feature = "thiserror", error("invalid command data"))]
    InvalidData = 0x01,

    /// Unsupported P1 / P2 parameters
    #[cfg_attr(feature = "thiserror", error("unsupported command parameters"))]
    WrongP1P2 = 0x02,

    /// Unsupported instruction
    #[cfg_attr(feature = "thiserror", error("unsupported instruction"))]
    InsNotSupported = 0x03,

    /// Unsupported class
    #[cfg_attr(feature = "thiserror", error("unsupported class"))]
    ClaNotSupported = 0x04,

    /// Command not valid for the current request / state
    #[cfg_attr(feature = "thiserror", error("invalid engine state"))]
    BadState = 0x05,

    /// Address could not be rendered
    #[cfg_attr(feature = "thiserror", error("address rendering failed"))]
    DisplayAddressFailure = 0x06,

    /// Amount could not be rendered
    #[cfg_attr(feature = "thiserror", error("amount rendering failed"))]
    DisplayAmountFailure = 0x07,

    /// Transaction exceeds maximum length
    #[cfg_attr(feature = "thiserror", error("transaction too long"))]
    WrongTxLength = 0x08,

    /// Transaction decoding failed
    #[cfg_attr(feature = "thiserror", error("transaction parsing failed"))]
    TxParsingFailure = 0x09,

    /// Key derivation failed
    #[cfg_attr(feature = "thiserror", error("key derivation failed"))]
    DerivationFailure = 0x0a,

    /// Signing failed
    #[cfg_attr(feature = "thiserror", error("signing failed"))]
    SigningFailure = 0x0b,

    /// Response encoding failed
    #[cfg_attr(feature = "thiserror", error("response encoding failed"))]
    EncodingFailure = 0x0c,

    /// Request rejected by the user
    #[cfg_attr(feature = "thiserror", error("request rejected"))]
    Rejected = 0x0d,
}

impl Error {
    /// Map an error to the status word returned to the host
    pub fn status(&self) -> StatusWord {
        match self {
            Error::MalformedFrame | Error::InvalidData => StatusWord::MalformedFrame,
            Error::WrongP1P2 => StatusWord::WrongP1P2,
            Error::InsNotSupported => StatusWord::InsNotSupported,
            Error::ClaNotSupported => StatusWord::ClaNotSupported,
            Error::BadState => StatusWord::BadState,
            Error::DisplayAddressFailure => StatusWord::DisplayAddressFailure,
            Error::DisplayAmountFailure => StatusWord::DisplayAmountFailure,
            Error::WrongTxLength => StatusWord::WrongTxLength,
            Error::TxParsingFailure => StatusWord::TxParsingFailure,
            Error::DerivationFailure => StatusWord::DerivationFailure,
            Error::SigningFailure => StatusWord::SigningFailure,
            Error::EncodingFailure => StatusWord::EncodingFailure,
            Error::Rejected => StatusWord::Deny,
        }
    }
}

impl From<FrameError> for Error {
    fn from(_: FrameError) -> Self {
        Error::MalformedFrame
    }
}

/// Map command decoding errors, invalid parameter encodings are reported
/// as [`Error::WrongP1P2`] and all others as [`Error::InvalidData`]
impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        match e {
            ApduError::InvalidEncoding => Error::WrongP1P2,
            _ => Error::InvalidData,
        }
    }
}
