//! Stack elements, derived from branch names, and the ordering queries over them.

pub mod identifier;
pub use identifier::StackElement;

mod index;
pub use index::StackIndex;

mod fmt;
pub(crate) use fmt::{DisplayBranch, LogLine, ReviewLine};
