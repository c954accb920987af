use crate::commands::executable::Executable;
use crate::commands::{lossy_string, CommandError, RequestParser};
use crate::frame::Frame;
use crate::store::Store;

/// Remove one or more keys, replying with the number of keys that were
/// actually removed. Nil keys are skipped and not counted; a request naming
/// only absent or nil keys replies `0`, not an error.
///
/// Ref: <https://redis.io/docs/latest/commands/del/>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<Option<String>>,
}

impl Executable for Del {
    fn exec(self, store: Store) -> Frame {
        let mut count = 0;

        // Each removal is an independent atomic step; there is no multi-key
        // transaction here.
        for key in self.keys.into_iter().flatten() {
            if store.remove(&key) {
                count += 1;
            }
        }

        Frame::Integer(count)
    }
}

impl TryFrom<&mut RequestParser> for Del {
    type Error = CommandError;

    fn try_from(parser: &mut RequestParser) -> Result<Self, Self::Error> {
        let keys: Vec<Option<String>> = parser
            .rest()
            .into_iter()
            .map(|key| key.map(lossy_string))
            .collect();

        if keys.is_empty() {
            return Err(CommandError::DelRequiresKey);
        }

        Ok(Self { keys })
    }
}
