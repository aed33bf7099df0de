// Copyright (c) 2022-2023 The MobileCoin Foundation

//! TON hardware wallet core
//!
//! This provides a common [Engine][engine] supporting address confirmation and
//! transaction signing for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and [Output][engine::Output]s,
//! see [ledger_ton_apdu] for APDU objects and wire encodings. The [App][app::App] wraps
//! an engine to handle raw command frames and assemble responses.
//!
//! ## Operations
//!
//! Prior to interacting with a hardware wallet the client may issue an
//! [`AppInfoReq`][ledger_ton_apdu::app_info::AppInfoReq] to fetch an
//! [`AppInfoResp`][ledger_ton_apdu::app_info::AppInfoResp] containing the
//! application name and version. This is answered in any state other than
//! while a review is presented.
//!
//! ### Confirming an address
//!
//! 1. Issue [`GetAddressReq`][ledger_ton_apdu::address::GetAddressReq] with the
//!    derivation path and display flags, the key is derived and the public key held
//!    for confirmation
//! 2. Issue a `Confirm` command to present the address for review, the response
//!    is deferred until the user decides
//! 3. On approval an [`AddressResp`][ledger_ton_apdu::address::AddressResp] is returned,
//!    on rejection the `Deny` status
//!
//! ### Signing a transaction
//!
//! 1. Issue [`SignTxReq`][ledger_ton_apdu::tx::SignTxReq] chunks, the first carrying
//!    the derivation path and following chunks the encoded
//!    [`Transaction`][ledger_ton_apdu::tx::Transaction]
//! 2. Issue a `Confirm` command to present the transaction for review
//! 3. On approval a [`TxSignResp`][ledger_ton_apdu::tx::TxSignResp] containing the
//!    signature and signed digest is returned, on rejection the `Deny` status
//!
//! Any command not valid for the current request / state discards the request
//! in progress and returns `BadState`.

#![cfg_attr(not(feature = "std"), no_std)]

pub use ledger_ton_apdu::{self as apdu};

pub mod app;

pub mod consts;

pub mod engine;

pub mod helpers;
