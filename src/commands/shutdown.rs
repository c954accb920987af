use crate::commands::executable::Executable;
use crate::commands::{CommandError, RequestParser};
use crate::frame::Frame;
use crate::store::Store;

/// Acknowledge with `OK` and nothing else. The connection session arms the
/// process shutdown latch only after this reply has been flushed, so the
/// client always observes the acknowledgment even though the process
/// terminates right after.
#[derive(Debug, PartialEq)]
pub struct Shutdown {}

impl Executable for Shutdown {
    fn exec(self, _store: Store) -> Frame {
        Frame::Simple("OK".to_string())
    }
}

impl TryFrom<&mut RequestParser> for Shutdown {
    type Error = CommandError;

    fn try_from(_parser: &mut RequestParser) -> Result<Self, Self::Error> {
        Ok(Self {})
    }
}
