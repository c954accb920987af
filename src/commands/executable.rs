use crate::frame::Frame;
use crate::store::Store;

/// Commands execute against the shared store and always produce exactly one
/// reply frame. Error conditions are caught at parse time, so execution is
/// infallible.
pub trait Executable {
    fn exec(self, store: Store) -> Frame;
}
