//! Client identity, bearer credentials, and the token exchange that links them.
//!
//! `credentials` turns the long-lived client id + secret into the Basic authorization value,
//! `scope` carries the fixed capability list sent on every exchange, and `exchange`
//! performs the `auth.token` call that yields a short-lived [`Credential`].

pub mod credentials;
pub mod exchange;
pub mod scope;
pub mod secret;

pub use credentials::*;
pub use exchange::*;
pub use scope::*;
pub use secret::*;
