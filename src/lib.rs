#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Primality helpers used to pick table capacities.
///
/// Quadratic probing only covers a useful fraction of the slot array when
/// the capacity is prime, so every capacity the table ever adopts comes from
/// [`prime::next_prime`].
pub mod prime;

pub mod table;

pub use table::InsertError;
pub use table::ProbeTable;
pub use table::RemoveError;
pub use table::Slot;
