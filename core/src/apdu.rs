//! APDU frames exchanged with a contactless reader, seen from the card side.

mod command;
mod handler;
mod response;

pub use command::Command;
pub use handler::Handler;
pub use response::{Response, StatusWord};

use crate::codec;

pub const CLA_DEFAULT: u8 = 0x00;
pub const CLA_PROPRIETARY: u8 = 0xFF;

/// Instruction bytes recognised by the responder.
pub mod ins {
    pub const SELECT_FILE: u8 = 0xA4;
    pub const READ_BINARY: u8 = 0xB0;
    pub const GET_DATA: u8 = 0xCA;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The frame is too short to be classified ({0} octets)")]
    MalformedFrame(usize),

    #[error("Unrecognised command (CLA={cla:#04X}, INS={ins:#04X})")]
    UnrecognizedCommand { cla: u8, ins: u8 },

    #[error("The stored identifier could not be decoded: {0}")]
    MalformedIdentifier(#[from] codec::Error),
}
