//! Client-local persistence
//!
//! The stage keeps two values between runs: the signed-in identity and whether
//! the example rant has already been shown. Both live in a [`LocalStore`].

pub mod local_store;

pub use local_store::*;
