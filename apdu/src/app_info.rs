// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application Information APDUs

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, TON_APDU_CLA};
use crate::{frame::encode_command, helpers::lstr};

/// Fetch application info APDU, answered in any state
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct AppInfoReq {}

impl AppInfoReq {
    /// Encode a complete command frame for this request
    pub fn encode_frame(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        encode_command(Self::CLA, Self::INS, 0x00, 0x00, &[], buff)
    }
}

impl ApduStatic for AppInfoReq {
    const CLA: u8 = TON_APDU_CLA;
    const INS: u8 = Instruction::GetAppInfo as u8;
}

/// Application information response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  VERSION_LEN  |                 VERSION...                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   NAME_LEN    |                   NAME...                     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AppInfoResp<'a> {
    /// Application version
    pub version: &'a str,

    /// Application name
    pub name: &'a str,
}

impl<'a> AppInfoResp<'a> {
    /// Create a new application info APDU
    pub fn new(version: &'a str, name: &'a str) -> Self {
        Self { version, name }
    }
}

impl<'a> Encode for AppInfoResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(2 + self.version.len() + self.name.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += lstr::enc(self.version, &mut buff[index..])?;
        index += lstr::enc(self.name, &mut buff[index..])?;

        Ok(index)
    }
}

impl<'a> Decode<'a> for AppInfoResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (version, n) = lstr::dec(&buff[index..])?;
        index += n;

        let (name, n) = lstr::dec(&buff[index..])?;
        index += n;

        Ok((Self { version, name }, index))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{test::encode_decode_apdu, Command};

    #[test]
    fn app_info_req_frame() {
        let mut buff = [0u8; 8];
        let n = AppInfoReq::default().encode_frame(&mut buff).unwrap();

        assert_eq!(&buff[..n], &[0xe0, 0x01, 0x00, 0x00, 0x00]);
        assert!(Command::parse(&buff[..n]).is_ok());
    }

    #[test]
    fn app_info_resp_apdu() {
        let apdu = AppInfoResp::new("2.1.0", "TON");

        let mut buff = [0u8; 128];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(&buff[..n], b"\x052.1.0\x03TON");
    }

    #[test]
    fn app_info_resp_invalid() {
        // Truncated name
        assert!(AppInfoResp::decode(b"\x011\x05TO").is_err());

        // Invalid utf8
        assert!(AppInfoResp::decode(&[0x01, 0xff, 0x00]).is_err());
    }
}
