use crate::commands::executable::Executable;
use crate::commands::{CommandError, RequestParser};
use crate::frame::Frame;
use crate::store::Store;

/// Introspection stub. Replies with the empty array, which is enough for
/// clients that probe command metadata on connect; subcommands such as
/// `COMMAND DOCS` are ignored.
#[derive(Debug, PartialEq)]
pub struct Command {}

impl Executable for Command {
    fn exec(self, _store: Store) -> Frame {
        Frame::Array(vec![])
    }
}

impl TryFrom<&mut RequestParser> for Command {
    type Error = CommandError;

    fn try_from(_parser: &mut RequestParser) -> Result<Self, Self::Error> {
        Ok(Self {})
    }
}
