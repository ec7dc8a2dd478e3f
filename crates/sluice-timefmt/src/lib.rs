//! # sluice-timefmt
//!
//! Date-format token layouts shared by the Sluice SQL polling engine.
//!
//! Users describe date/time columns with token strings such as
//! `YYYY-MM-dd HH:mm:ssSSS`. This crate turns such a string into a
//! [`Layout`] that can parse column literals into instants and render
//! instants back into the exact literal form the column expects.
//!
//! ```rust
//! use sluice_timefmt::{parse_token, render_token};
//!
//! let t = parse_token("2008-10-25 14:56:59.123", "YYYY-MM-dd HH:mm:ssSSS").unwrap();
//! assert_eq!(
//!     render_token(&t, "YYYY-MM-dd HH:mm:ssSSS").unwrap(),
//!     "2008-10-25 14:56:59.123"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod layout;

pub use error::{Error, Result};
pub use layout::{parse_token, render_token, Layout, Token};
