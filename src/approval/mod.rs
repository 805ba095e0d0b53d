//! Staff approval sessions: view, edit and print one request's document.

pub mod handlers;
pub mod session;
pub mod store;

pub use session::{ApprovalError, ApprovalSession, EditView};
pub use store::{ApprovalSessionStore, SharedApprovalSession};
