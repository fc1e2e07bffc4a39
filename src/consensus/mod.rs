// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! Consensus-parameter configuration.

pub mod params;

pub use params::{Network, Params};
