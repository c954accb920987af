use crate::commands::executable::Executable;
use crate::commands::{lossy_string, CommandError, RequestParser};
use crate::frame::Frame;
use crate::store::Store;

/// Get the value of `key`. If the key does not exist the special value `nil` is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, store: Store) -> Frame {
        match store.get(&self.key) {
            Some(value) => Frame::Bulk(value),
            None => Frame::Null,
        }
    }
}

impl TryFrom<&mut RequestParser> for Get {
    type Error = CommandError;

    fn try_from(parser: &mut RequestParser) -> Result<Self, Self::Error> {
        // Arguments past the key are ignored.
        match parser.next() {
            None => Err(CommandError::GetRequiresKey),
            Some(None) => Err(CommandError::NilKey),
            Some(Some(key)) => Ok(Self {
                key: lossy_string(key),
            }),
        }
    }
}
