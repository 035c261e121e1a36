//! Platform abstraction layer for the monotonic clock.
//!
//! Switches between the real clock (backed by [`std::time::Instant`]) and a fake clock
//! that tests control directly and that counts how often it was read.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
pub(crate) use real::RealPlatform;
