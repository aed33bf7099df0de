// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application constants

pub use ledger_ton_apdu::{path::MAX_PATH_LEN, tx::MAX_TX_LEN};

/// Application name, reported via `GetAppInfo`
pub const APP_NAME: &str = "TON";

/// Application version, reported via `GetAppInfo`
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nano-units per TON
pub const NANO_PER_TON: u64 = 1_000_000_000;

/// Decimal places in a TON amount
pub const TON_DECIMALS: usize = 9;

/// Ticker prefixed to displayed amounts
pub const TICKER: &str = "TON";
