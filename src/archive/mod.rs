//! Hall of Howls archive
//!
//! This module contains the archived rant record and the searchable,
//! sortable archive of past rants.
//!
//! # Usage Example
//!
//! ```rust
//! use soapbox_stage::archive::HallOfHowls;
//! use soapbox_stage::types::RantSort;
//!
//! let hall = HallOfHowls::with_examples().unwrap();
//! let top = hall.query(Some("pizza"), RantSort::Controversial);
//! assert!(!top.is_empty());
//! ```

pub mod hall;
pub mod rant;

pub use hall::{sort_rants, HallOfHowls, SEARCH_SUGGESTIONS};
pub use rant::Rant;
