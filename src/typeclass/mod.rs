//! Type class traits shared by the containers in this crate.
//!
//! - [`TypeConstructor`]: generic-associated-type view of a container as a
//!   constructor applied to an element type
//! - [`Foldable`]: ordered reduction of a container's elements

mod foldable;
mod higher;

pub use foldable::Foldable;
pub use higher::TypeConstructor;
