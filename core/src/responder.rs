//! Answers reader commands from the emulated card.

use std::sync::Arc;

use crate::apdu::{Command, Error, Handler, Response, StatusWord};
use crate::codec;
use crate::logging::{debug, warning};
use crate::session::{EmulationState, Session};

/// Builds the response to the frame from the state of the emulated card.
///
/// Fails when the frame cannot be classified, or when the stored identifier is not valid hex
/// text. Callers facing the reader should map failures to a status word, as
/// [`Responder::handle`] does.
pub fn respond(frame: &[u8], state: &EmulationState) -> Result<Response, Error> {
    let command = Command::classify(frame)?;
    debug!("{:?} command received", command);

    Ok(match command {
        Command::Select | Command::ReadBinary => Response::success(state.payload.clone()),
        Command::GetUid => Response::success(
            state
                .identifier
                .as_deref()
                .map(codec::decode)
                .transpose()?,
        ),
    })
}

/// A responder bound to the emulation session.
#[derive(Clone)]
pub struct Responder {
    session: Arc<Session>,
}

impl Responder {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

impl Handler for Responder {
    fn handle(&self, command: &[u8]) -> Vec<u8> {
        debug!("Received APDU: {}", hex::encode(command));

        let state = self.session.snapshot();
        let response = match respond(command, &state) {
            Ok(response) => response,
            Err(e @ Error::MalformedIdentifier(_)) => {
                warning!("{}", e);
                Response::status(StatusWord::UnknownCommand)
            }
            Err(e) => {
                debug!("{}", e);
                Response::status(StatusWord::UnknownCommand)
            }
        };

        response.into_bytes()
    }
}
