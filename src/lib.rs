#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

//! Analysis of raw voltage data from a charging RC circuit.
//!
//! Measured voltages are converted to currents and compared against the
//! theoretical exponential-decay model, with measurement uncertainty
//! propagated through every step. Uncertainties combine by first-order
//! linearization, with independent contributions added in quadrature; see
//! [`uncertain`] for the exact rules.

pub mod config;
pub mod current;
pub mod error;
pub mod ingest;
pub mod model;
pub mod series;
pub mod uncertain;

pub use error::Error;

pub type Result<T> = ::std::result::Result<T, Error>;
