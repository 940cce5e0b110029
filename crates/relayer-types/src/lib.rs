#![forbid(unsafe_code)]
#![deny(trivial_numeric_casts, unused_import_braces, rust_2018_idioms)]
#![allow(clippy::derive_partial_eq_without_eq)]

//! Domain types shared by the IBC light-client refresher: chain and IBC
//! identifiers, heights, timestamps, client states, headers, path ends,
//! update-client messages and transaction envelopes.

pub mod client_state;
pub mod error;
pub mod header;
pub mod height;
pub mod identifier;
pub mod msgs;
pub mod path;
pub mod signer;
pub mod timestamp;
pub mod tx;
pub mod validate;
