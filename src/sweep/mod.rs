//! The sweep-line engine.
//!
//! The main entry point is [`Sweeper`], which runs a degeneracy-robust
//! Bentley–Ottmann sweep over a set of x-monotone curves. Each event is
//! handled in five phases:
//!
//! 1. vertical-curve bottom ends (discover crossings along a vertical span),
//! 2. vertical curves carried over from earlier events at the same x,
//! 3. curves ending at or crossing the event (where most output is produced),
//! 4. vertical-curve top ends (where vertical output is produced),
//! 5. curves extending right of the event (where new intersections are
//!    discovered).

mod event;
mod queue;
mod status;
mod subcurve;
mod sweeper;

pub use sweeper::Sweeper;
