//! Users, the synthetic audience and nickname sign-in
//!
//! # Overview
//!
//! - **User**: a signed-in user or a synthetic audience member
//! - **UserGenerator**: creates the fake connected users of the simulated audience
//! - **identity**: nickname sign-in, restore and sign-out through the local store
//!
//! # Usage Example
//!
//! ```rust
//! use soapbox_stage::storage::LocalStore;
//! use soapbox_stage::user::*;
//!
//! let mut store = LocalStore::in_memory();
//! let me = identity::sign_in(&mut store, "RantMaster", chrono::Utc::now()).unwrap();
//!
//! let mut generator = UserGenerator::with_seed(42);
//! let audience = generator.generate_audience(5, 12, chrono::Utc::now());
//! assert!(audience.iter().all(|u| u.id != me.id));
//! ```

#[allow(clippy::module_inception)]
pub mod user;
pub mod generator;
pub mod identity;

// Re-export all public types for convenience
pub use user::{User, EXAMPLE_SPEAKER_NICKNAME};
pub use generator::{UserGenerator, AUDIENCE_NICKNAMES};
