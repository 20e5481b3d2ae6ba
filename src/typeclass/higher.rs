//! Type constructors expressed with generic associated types.
//!
//! Rust cannot name `OrderedMap<K, _, M>` as a thing of its own, so a
//! container instead reports the element type it is applied to and how to
//! re-apply itself to another element type.
//!
//! # Example
//!
//! ```rust
//! use seqmap::persistent::OrderedMap;
//! use seqmap::typeclass::TypeConstructor;
//!
//! fn emptied<T: TypeConstructor>(_: &T) -> T::WithType<String>
//! where
//!     T::WithType<String>: Default,
//! {
//!     Default::default()
//! }
//!
//! let counts = OrderedMap::new().assoc("a", 1);
//! let labels: OrderedMap<&str, String> = emptied(&counts);
//! assert!(labels.is_empty());
//! ```

/// A container viewed as a type constructor applied to [`Inner`](Self::Inner).
///
/// `<T as TypeConstructor>::WithType<T::Inner>` is expected to be `T` itself.
pub trait TypeConstructor {
    /// The element type the constructor is applied to.
    type Inner;

    /// The same constructor applied to `B`.
    type WithType<B>: TypeConstructor<Inner = B>;
}

impl<A> TypeConstructor for Option<A> {
    type Inner = A;
    type WithType<B> = Option<B>;
}

impl<T> TypeConstructor for Vec<T> {
    type Inner = T;
    type WithType<B> = Vec<B>;
}
