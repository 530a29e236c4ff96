//! Command handlers.

mod entries;
mod init;
mod misc;
mod session;

pub use entries::{handle_add, handle_delete, handle_edit, handle_list, handle_show};
pub use init::handle_init;
pub use misc::handle_completions;
pub use session::{
    handle_login, handle_logout, handle_passwd, handle_reset, handle_status, handle_unlock,
};
