//! Subcommands pertaining to remote stack management.

mod submit;
pub use submit::SubmitCmd;

mod push;
pub use push::PushCmd;

mod update_base;
pub use update_base::UpdateBaseCmd;

mod land;
pub use land::LandCmd;

mod review;
pub use review::ReviewCmd;
