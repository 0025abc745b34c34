//! Subcommands pertaining to stack management.

mod new;
pub use new::NewCmd;

mod delete;
pub use delete::DeleteCmd;

mod renumber;
pub use renumber::RenumberCmd;

mod restack;
pub use restack::{RebaseAllCmd, RebaseCmd};

mod fixup;
pub use fixup::FixupCmd;
