use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{lossy_string, CommandError, RequestParser};
use crate::frame::Frame;
use crate::store::Store;

/// Set `key` to `value`, overwriting any previous value. The reply is `OK`,
/// unless the literal `GET` modifier follows the value, in which case the
/// reply is the previous value (nil bulk when the key was absent).
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
    pub reply_previous: bool,
}

impl Executable for Set {
    fn exec(self, store: Store) -> Frame {
        let previous = store.put(self.key, self.value);

        if self.reply_previous {
            match previous {
                Some(value) => Frame::Bulk(value),
                None => Frame::Null,
            }
        } else {
            Frame::Simple("OK".to_string())
        }
    }
}

impl TryFrom<&mut RequestParser> for Set {
    type Error = CommandError;

    fn try_from(parser: &mut RequestParser) -> Result<Self, Self::Error> {
        let key = match parser.next() {
            None => return Err(CommandError::SetRequiresKeyAndValue),
            Some(None) => return Err(CommandError::NilKey),
            Some(Some(key)) => lossy_string(key),
        };

        let value = match parser.next() {
            None => return Err(CommandError::SetRequiresKeyAndValue),
            Some(None) => return Err(CommandError::NilValue),
            Some(Some(value)) => value,
        };

        // Only the literal `GET` in the position right after the value
        // switches the reply mode; any other token there, and everything
        // beyond it, is ignored.
        let reply_previous =
            matches!(parser.next(), Some(Some(ref flag)) if flag.as_ref() == b"GET");

        Ok(Self {
            key,
            value,
            reply_previous,
        })
    }
}
