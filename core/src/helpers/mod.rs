// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Display formatting helpers and the bundled SLIP-0010 driver

use core::str::from_utf8;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use crc::{Crc, CRC_16_XMODEM};
use emstr::{helpers::PadLeft, EncodeStr};
use sha2::{Digest, Sha256};

use ledger_ton_apdu::address::{AddressFlags, FRIENDLY_ADDRESS_LEN, PUBLIC_KEY_LEN};

use crate::{
    consts::{NANO_PER_TON, TICKER, TON_DECIMALS},
    engine::Error,
};

mod slip10;
pub use slip10::Slip10Driver;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Friendly address tag for bounceable addresses
const TAG_BOUNCEABLE: u8 = 0x11;
/// Friendly address tag for non-bounceable addresses
const TAG_NON_BOUNCEABLE: u8 = 0x51;
/// Friendly address tag flag for testnet-only addresses
const TAG_TESTNET: u8 = 0x80;

/// Raw (pre-encoding) friendly address length
const RAW_ADDRESS_LEN: usize = 36;

/// Compute the account hash displayed for a public key
///
/// This is `SHA-256(public_key)`, identifying the key for confirmation. It is
/// not the state-init hash of a deployed wallet contract, so the resulting
/// friendly address must not be used as a destination for funds.
pub fn account_hash(public_key: &[u8; PUBLIC_KEY_LEN]) -> [u8; 32] {
    Sha256::digest(public_key).into()
}

/// Select the workchain for the provided address flags
pub fn workchain(flags: AddressFlags) -> i8 {
    match flags.contains(AddressFlags::MASTERCHAIN) {
        true => -1,
        false => 0,
    }
}

/// Render a user-friendly (base64url, CRC16 checked) address
pub fn friendly_address<'a>(
    workchain: i8,
    hash: &[u8; 32],
    flags: AddressFlags,
    buff: &'a mut [u8; FRIENDLY_ADDRESS_LEN],
) -> Result<&'a str, Error> {
    let mut raw = [0u8; RAW_ADDRESS_LEN];

    raw[0] = match flags.contains(AddressFlags::NON_BOUNCEABLE) {
        true => TAG_NON_BOUNCEABLE,
        false => TAG_BOUNCEABLE,
    };
    if flags.contains(AddressFlags::TESTNET) {
        raw[0] |= TAG_TESTNET;
    }
    raw[1] = workchain as u8;
    raw[2..34].copy_from_slice(hash);

    let crc = CRC16.checksum(&raw[..34]);
    raw[34..].copy_from_slice(&crc.to_be_bytes());

    let n = URL_SAFE
        .encode_slice(raw, &mut buff[..])
        .map_err(|_| Error::DisplayAddressFailure)?;
    if n != FRIENDLY_ADDRESS_LEN {
        return Err(Error::DisplayAddressFailure);
    }

    from_utf8(&buff[..n]).map_err(|_| Error::DisplayAddressFailure)
}

/// Format a nano-denominated value for display (`TON 1.5`)
pub fn fmt_amount(value: u64, buff: &mut [u8]) -> Result<&str, Error> {
    let whole = value / NANO_PER_TON;
    let mut frac = value % NANO_PER_TON;

    // Trim trailing zeroes from the decimal part
    let mut width = TON_DECIMALS;
    while frac != 0 && frac % 10 == 0 {
        frac /= 10;
        width -= 1;
    }

    let len = TICKER.len() + 1 + whole.len() + if frac != 0 { 1 + width } else { 0 };
    if buff.len() < len {
        return Err(Error::DisplayAmountFailure);
    }

    let n = match frac {
        0 => emstr::write!(&mut buff[..], TICKER, ' ', whole),
        _ => emstr::write!(
            &mut buff[..],
            TICKER,
            ' ',
            whole,
            '.',
            PadLeft::new(frac, width, '0')
        ),
    }
    .map_err(|_| Error::DisplayAmountFailure)?;

    from_utf8(&buff[..n]).map_err(|_| Error::DisplayAmountFailure)
}

/// Format a payload hash for display (base64)
pub fn fmt_payload<'a>(hash: &[u8; 32], buff: &'a mut [u8; 44]) -> Result<&'a str, Error> {
    let n = STANDARD
        .encode_slice(hash, &mut buff[..])
        .map_err(|_| Error::EncodingFailure)?;

    from_utf8(&buff[..n]).map_err(|_| Error::EncodingFailure)
}

#[cfg(test)]
mod test {
    use super::*;

    const MAX_LINE_LEN: usize = 24;

    #[test]
    fn fmt_ton() {
        let tests = &[
            (1, "TON 0.000000001"),
            (10_000_000, "TON 0.01"),
            (1_500_000_000, "TON 1.5"),
            (0, "TON 0"),
            (400 * NANO_PER_TON, "TON 400"),
            (400 * NANO_PER_TON + 10_000, "TON 400.00001"),
        ];

        for (v, s) in tests {
            let mut buff = [0u8; 32];

            let e = fmt_amount(*v, &mut buff).unwrap();

            assert_eq!(&e, s);
            assert!(
                e.len() <= MAX_LINE_LEN,
                "length {} exceeds line limit {} for {}",
                e.len(),
                MAX_LINE_LEN,
                s
            );
        }
    }

    #[test]
    fn fmt_ton_full_range() {
        let mut buff = [0u8; 32];
        assert_eq!(
            fmt_amount(u64::MAX, &mut buff),
            Ok("TON 18446744073.709551615")
        );

        let mut buff = [0u8; 32];
        assert_eq!(
            fmt_amount(i64::MAX as u64 + 1, &mut buff),
            Ok("TON 9223372036.854775808")
        );
    }

    #[test]
    fn fmt_ton_short_buffer() {
        let mut buff = [0u8; 4];
        assert_eq!(
            fmt_amount(1_000, &mut buff),
            Err(Error::DisplayAmountFailure)
        );
    }

    #[test]
    fn friendly_addresses() {
        let hash = [0x42; 32];
        let tests = &[
            (
                0,
                AddressFlags::empty(),
                "EQBCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQmXi",
            ),
            (
                0,
                AddressFlags::NON_BOUNCEABLE,
                "UQBCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQjgn",
            ),
            (
                -1,
                AddressFlags::TESTNET | AddressFlags::MASTERCHAIN,
                "kf9CQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQiEg",
            ),
        ];

        for (wc, flags, s) in tests {
            let mut buff = [0u8; FRIENDLY_ADDRESS_LEN];
            let a = friendly_address(*wc, &hash, *flags, &mut buff).unwrap();
            assert_eq!(&a, s);
        }
    }

    #[test]
    fn workchain_flags() {
        assert_eq!(workchain(AddressFlags::empty()), 0);
        assert_eq!(workchain(AddressFlags::MASTERCHAIN), -1);
        assert_eq!(workchain(AddressFlags::TESTNET), 0);
    }

    #[test]
    fn crc16_check() {
        assert_eq!(CRC16.checksum(b"123456789"), 0x31c3);
    }
}
