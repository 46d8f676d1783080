//! Editor command protocol
//!
//! Every message the editor posts on an active session is a
//! [`CommandRequest`](crate::shared::CommandRequest). The
//! [`CommandRegistry`] hands it to the first handler that claims it.
//!
//! - `auth` - verify the editor's token and join the document
//! - `isSaveLock` - ask whether another session is saving
//! - `saveChanges` - persist a batch of changes under the save lock

pub mod auth;
pub mod handler;
pub mod registry;
pub mod save_changes;
pub mod save_lock;

pub use auth::{AuthCommand, Participant, Participants};
pub use handler::CommandHandler;
pub use registry::CommandRegistry;
pub use save_changes::SaveChangesCommand;
pub use save_lock::IsSaveLock;
