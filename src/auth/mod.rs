//! Authentication against the MediaWiki login API.
//!
//! [`login`] runs the [`LoginState`] machine to completion and returns the
//! [`AuthSession`] every later request of the run borrows.

mod credentials;
mod session;

pub use credentials::Credentials;
pub use session::{AuthSession, LoginState, login};
