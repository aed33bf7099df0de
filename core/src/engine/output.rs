// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use ledger_proto::ApduError;
use ledger_ton_apdu::{
    address::{AddressResp, FRIENDLY_ADDRESS_LEN, PUBLIC_KEY_LEN},
    app_info::AppInfoResp,
    tx::{TxSignResp, DIGEST_LEN, SIGNATURE_LEN},
};

use super::review::Review;

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Success with no response data
    None,

    /// Application information
    AppInfo {
        version: &'static str,
        name: &'static str,
    },

    /// Review presented for confirmation, the response is deferred
    /// until a decision is provided
    Review(Review),

    /// Approved address
    Address {
        public_key: [u8; PUBLIC_KEY_LEN],
        address: [u8; FRIENDLY_ADDRESS_LEN],
    },

    /// Approved transaction signature
    TxSignature {
        signature: [u8; SIGNATURE_LEN],
        digest: [u8; DIGEST_LEN],
    },
}

impl Output {
    /// Check whether this output defers the response pending user decision
    pub fn is_deferred(&self) -> bool {
        matches!(self, Output::Review(_))
    }

    /// Encode an [`Output`] object to response APDU data
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None | Output::Review(_) => Ok(0),
            Output::AppInfo { version, name } => AppInfoResp::new(version, name).encode(buff),
            Output::Address {
                public_key,
                address,
            } => AddressResp::new(*public_key, *address).encode(buff),
            Output::TxSignature { signature, digest } => {
                TxSignResp::new(*signature, *digest).encode(buff)
            }
        }
    }
}
