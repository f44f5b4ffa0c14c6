//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `system`: Wall clock and channel-fed line input for hosted targets (requires `std` feature)

pub mod mock;

#[cfg(feature = "std")]
pub mod system;

pub use mock::*;

#[cfg(feature = "std")]
pub use system::*;
