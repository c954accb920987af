pub mod command;
pub mod del;
pub mod executable;
pub mod get;
pub mod set;
pub mod shutdown;

use bytes::Bytes;
use std::vec;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;

use command::Command as Command_;
use del::Del;
use get::Get;
use set::Set;
use shutdown::Shutdown;

#[derive(Debug, PartialEq)]
pub enum Command {
    Command(Command_),
    Del(Del),
    Get(Get),
    Set(Set),
    Shutdown(Shutdown),
}

impl Command {
    /// SHUTDOWN is acknowledged before the process latch is armed, so the
    /// session needs to know about it after the reply has been flushed.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Command::Shutdown(_))
    }
}

impl Executable for Command {
    fn exec(self, store: Store) -> Frame {
        match self {
            Command::Command(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
            Command::Shutdown(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands as non-empty RESP arrays whose elements are
        // bulk strings or nils; any other shape never reaches a handler.
        let frames = match frame {
            Frame::Array(frames) if !frames.is_empty() => frames,
            _ => return Err(CommandError::MalformedRequest),
        };

        let mut args = Vec::with_capacity(frames.len());
        for frame in frames {
            match frame {
                Frame::Bulk(bytes) => args.push(Some(bytes)),
                Frame::Null => args.push(None),
                _ => return Err(CommandError::MalformedRequest),
            }
        }

        let parser = &mut RequestParser {
            args: args.into_iter(),
        };

        // Command names match exactly and case-sensitively; a nil in the
        // name position matches nothing.
        let name = parser.next().flatten();
        match name.as_deref() {
            Some(b"COMMAND") => Command_::try_from(parser).map(Command::Command),
            Some(b"DEL") => Del::try_from(parser).map(Command::Del),
            Some(b"GET") => Get::try_from(parser).map(Command::Get),
            Some(b"SET") => Set::try_from(parser).map(Command::Set),
            Some(b"SHUTDOWN") => Shutdown::try_from(parser).map(Command::Shutdown),
            _ => Err(CommandError::Unsupported),
        }
    }
}

/// Walks the arguments of a validated request, past the command name.
pub(crate) struct RequestParser {
    args: vec::IntoIter<Option<Bytes>>,
}

impl RequestParser {
    /// The outer `None` means the request is exhausted; the inner `None` is
    /// a nil argument, which is distinct from an empty one.
    fn next(&mut self) -> Option<Option<Bytes>> {
        self.args.next()
    }

    fn rest(&mut self) -> Vec<Option<Bytes>> {
        self.args.by_ref().collect()
    }
}

/// Keys are decoded lossily so that a client sending non-UTF-8 key bytes
/// still addresses a deterministic entry instead of being rejected.
pub(crate) fn lossy_string(bytes: Bytes) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Every way a request can be rejected before touching the store. The
/// `Display` strings are the exact error messages sent to the client.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("ERR Client request must be an array of bulk strings.")]
    MalformedRequest,
    #[error("ERR Unsupported command")]
    Unsupported,
    #[error("ERR A GET command requires a key argument.")]
    GetRequiresKey,
    #[error("ERR A SET command requires key and value arguments.")]
    SetRequiresKeyAndValue,
    #[error("ERR A DEL command requires at least one key argument.")]
    DelRequiresKey,
    #[error("ERR A nil key is not allowed.")]
    NilKey,
    #[error("ERR A nil value is not allowed")]
    NilValue,
}
