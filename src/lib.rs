//! River Sweep game library crate.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg_attr(coverage_nightly, coverage(off))]
pub mod app;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod input;

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod game;
pub mod systems;
