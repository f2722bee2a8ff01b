//! The two filters.
//!
//! Both follow the same shape: bind the real function, load the policy, classify,
//! then either delegate or synthesize a result. They share no state.

pub mod access;
pub mod visibility;
