#![forbid(unsafe_code)]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    rust_2018_idioms
)]
#![allow(clippy::too_many_arguments)]
#![doc(html_root_url = "https://docs.rs/ibc-refresher/0.1.0")]

//! Keeps the light clients of a pair of IBC chains fresh.
//!
//! For each direction of a configured path, a [`director::Director`] watches
//! the light client hosted on one chain, and submits an update-client
//! transaction with a fresh header of the other chain every time the
//! configured refresh interval has elapsed since the client's latest trusted
//! header.

extern crate alloc;

pub mod broadcast;
pub mod chain;
pub mod config;
pub mod director;
pub mod error;
pub mod header_sync;
pub mod schedule;
pub mod spawn;
pub mod supervisor;
pub mod util;
pub mod worker;
