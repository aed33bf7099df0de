// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_ton_apdu::{
    address::{AddressFlags, GetAddressReq},
    path::DerivationPath,
    tx::SignTxReq,
    Command, Instruction,
};

use super::Error;

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Event<'a> {
    /// Fetch application info
    GetAppInfo,

    /// Derive an address for confirmation
    GetAddress {
        path: DerivationPath,
        flags: AddressFlags,
    },

    /// Transaction chunk, the first (index 0) carries the derivation path
    TxChunk {
        index: u8,
        more: bool,
        data: &'a [u8],
    },

    /// Present the loaded request for confirmation
    Confirm,

    /// Discard any request in progress
    Reset,
}

impl<'a> Event<'a> {
    /// Decode an [`Event`] from a parsed command
    ///
    /// Class checks are the responsibility of the caller.
    pub fn parse(cmd: &Command<'a>) -> Result<Self, Error> {
        let ins = Instruction::try_from(cmd.ins).map_err(|_| Error::InsNotSupported)?;

        match ins {
            Instruction::GetAppInfo => no_params(cmd).map(|_| Event::GetAppInfo),
            Instruction::GetAddress => {
                if cmd.p1 != 0 {
                    return Err(Error::WrongP1P2);
                }

                let r = GetAddressReq::decode_command(cmd)?;
                Ok(Event::GetAddress {
                    path: r.path,
                    flags: r.flags,
                })
            }
            Instruction::SignTx => {
                let r = SignTxReq::decode_command(cmd)?;
                Ok(Event::TxChunk {
                    index: r.index,
                    more: r.more,
                    data: r.data,
                })
            }
            Instruction::Confirm => no_params(cmd).map(|_| Event::Confirm),
            Instruction::Reset => no_params(cmd).map(|_| Event::Reset),
        }
    }
}

/// Check a command carries no parameters, data is ignored
fn no_params(cmd: &Command) -> Result<(), Error> {
    match (cmd.p1, cmd.p2) {
        (0, 0) => Ok(()),
        _ => Err(Error::WrongP1P2),
    }
}

#[cfg(test)]
mod test {
    use ledger_ton_apdu::path::HARDENED;

    use super::*;

    fn parse(b: &[u8]) -> Result<Event, Error> {
        let cmd = Command::parse(b)?;
        Event::parse(&cmd)
    }

    #[test]
    fn parse_events() {
        assert_eq!(parse(&[0xe0, 0x01, 0, 0, 0]), Ok(Event::GetAppInfo));
        assert_eq!(parse(&[0xe0, 0x04, 0, 0, 0]), Ok(Event::Confirm));
        assert_eq!(parse(&[0xe0, 0x05, 0, 0, 0]), Ok(Event::Reset));

        assert_eq!(
            parse(&[0x00, 0x02, 0x00, 0x00, 0x00]),
            Ok(Event::GetAddress {
                path: DerivationPath::new(),
                flags: AddressFlags::empty()
            })
        );

        assert_eq!(
            parse(&[0xe0, 0x02, 0x00, 0x04, 0x05, 0x01, 0x80, 0x00, 0x00, 0x2c]),
            Ok(Event::GetAddress {
                path: DerivationPath::from_slice(&[44 | HARDENED]).unwrap(),
                flags: AddressFlags::MASTERCHAIN,
            })
        );

        assert_eq!(
            parse(&[0xe0, 0x03, 0x02, 0x80, 0x02, 0xaa, 0xbb]),
            Ok(Event::TxChunk {
                index: 2,
                more: true,
                data: &[0xaa, 0xbb],
            })
        );
    }

    #[test]
    fn parse_errors() {
        // Framing
        assert_eq!(parse(&[0xe0, 0x01, 0, 0]), Err(Error::MalformedFrame));
        assert_eq!(parse(&[0xe0, 0x01, 0, 0, 1]), Err(Error::MalformedFrame));

        // Unknown instruction
        assert_eq!(parse(&[0xe0, 0x10, 0, 0, 0]), Err(Error::InsNotSupported));

        // Unexpected parameters
        assert_eq!(parse(&[0xe0, 0x04, 1, 0, 0]), Err(Error::WrongP1P2));
        assert_eq!(parse(&[0xe0, 0x02, 1, 0, 0]), Err(Error::WrongP1P2));
        assert_eq!(parse(&[0xe0, 0x02, 0, 0x08, 0]), Err(Error::WrongP1P2));
        assert_eq!(parse(&[0xe0, 0x03, 0, 0x01, 1, 0]), Err(Error::WrongP1P2));

        // Invalid path / empty chunk
        assert_eq!(parse(&[0xe0, 0x02, 0, 0, 1, 0x0b]), Err(Error::InvalidData));
        assert_eq!(parse(&[0xe0, 0x03, 1, 0, 0]), Err(Error::InvalidData));
    }
}
