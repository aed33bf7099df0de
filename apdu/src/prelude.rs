// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    address::{AddressFlags, AddressResp, GetAddressReq},
    app_info::{AppInfoReq, AppInfoResp},
    frame::{Command, FrameError},
    path::DerivationPath,
    status::StatusWord,
    tx::{SignTxReq, Transaction, TxSignResp},
    Instruction,
};
