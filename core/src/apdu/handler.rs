/// A handler to answer an APDU command received from the reader
pub trait Handler {
    /// Handles the command frame.
    /// Implementations must always answer with a complete response frame, at least the status
    /// word, since the contactless link has no channel to report errors otherwise.
    fn handle(&self, command: &[u8]) -> Vec<u8>;
}
