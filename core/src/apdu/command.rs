use crate::apdu::{ins, Error, CLA_DEFAULT, CLA_PROPRIETARY};

/// SELECT by DF name, first or only occurrence.
const SELECT_BY_NAME: [u8; 4] = [CLA_DEFAULT, ins::SELECT_FILE, 0x04, 0x00];
const READ_BINARY: [u8; 2] = [CLA_DEFAULT, ins::READ_BINARY];
const GET_UID: [u8; 2] = [CLA_PROPRIETARY, ins::GET_DATA];

/// A command issued by the reader, classified by its header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SELECT` by name. The AID that follows the header is not inspected.
    Select,

    /// `READ BINARY`. Offsets and Le are ignored; the whole payload is returned.
    ReadBinary,

    /// PC/SC pseudo-APDU `GET DATA` asking for the card identifier.
    GetUid,
}

impl Command {
    /// Classifies the frame by matching its header against the supported commands,
    /// in a fixed priority order.
    pub fn classify(frame: &[u8]) -> Result<Self, Error> {
        if frame.len() < 2 {
            return Err(Error::MalformedFrame(frame.len()));
        }

        if frame.starts_with(&SELECT_BY_NAME) {
            Ok(Self::Select)
        } else if frame.starts_with(&READ_BINARY) {
            Ok(Self::ReadBinary)
        } else if frame.starts_with(&GET_UID) {
            Ok(Self::GetUid)
        } else {
            Err(Error::UnrecognizedCommand {
                cla: frame[0],
                ins: frame[1],
            })
        }
    }
}

impl TryFrom<&[u8]> for Command {
    type Error = Error;

    fn try_from(frame: &[u8]) -> Result<Self, Self::Error> {
        Self::classify(frame)
    }
}
