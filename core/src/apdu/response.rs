/// A status word, the trailer of every response.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusWord {
    Success,
    UnknownCommand,
    /// Defined for readers that expect it; the responder accepts any AID and never sends it.
    UnknownAid,
}

impl StatusWord {
    /// Returns SW1 and SW2.
    pub fn trailer(self) -> (u8, u8) {
        match self {
            Self::Success => (0x90, 0x00),
            Self::UnknownCommand => (0x6D, 0x00),
            Self::UnknownAid => (0x6A, 0x82),
        }
    }
}

impl From<StatusWord> for [u8; 2] {
    fn from(sw: StatusWord) -> Self {
        let (sw1, sw2) = sw.trailer();
        [sw1, sw2]
    }
}

/// A response to be sent back to the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    payload: Vec<u8>,
    status: StatusWord,
}

impl Response {
    /// Creates a response carrying the payload, followed by the status word.
    pub fn new(payload: Vec<u8>, status: StatusWord) -> Self {
        Self { payload, status }
    }

    /// Creates a response of the status word only.
    pub fn status(status: StatusWord) -> Self {
        Self::new(Vec::new(), status)
    }

    /// Creates a successful response, with the payload if any.
    pub fn success(payload: Option<Vec<u8>>) -> Self {
        Self::new(payload.unwrap_or_default(), StatusWord::Success)
    }

    pub fn status_word(&self) -> StatusWord {
        self.status
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Converts the response into octets.
    pub fn into_bytes(self) -> Vec<u8> {
        let Self {
            mut payload,
            status,
        } = self;

        payload.extend_from_slice(&<[u8; 2]>::from(status));
        payload
    }
}

impl From<Response> for Vec<u8> {
    fn from(response: Response) -> Self {
        response.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_bytes() {
        assert_eq!(
            vec![0xDE, 0xAD, 0x90, 0x00],
            Response::success(Some(vec![0xDE, 0xAD])).into_bytes()
        );
        assert_eq!(vec![0x90, 0x00], Vec::from(Response::success(None)));
        assert_eq!(
            vec![0x6D, 0x00],
            Response::status(StatusWord::UnknownCommand).into_bytes()
        );
        assert_eq!([0x6A, 0x82], <[u8; 2]>::from(StatusWord::UnknownAid));
    }
}
