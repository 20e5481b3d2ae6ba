//! Folding a container down to a single value.
//!
//! [`Foldable`] collapses the elements of a [`TypeConstructor`] in a fixed
//! order. For [`OrderedMap`](crate::persistent::OrderedMap) that order is
//! insertion order; for `Vec` it is index order.
//!
//! # Examples
//!
//! ```rust
//! use seqmap::ordered_map;
//! use seqmap::typeclass::Foldable;
//!
//! let stock = ordered_map! { "apples" => 3, "pears" => 5 };
//! assert_eq!(stock.clone().fold_left(0, |total, count| total + count), 8);
//! assert_eq!(stock.to_list(), vec![3, 5]);
//! ```

use super::TypeConstructor;

/// Containers whose elements can be folded in a defined order.
///
/// `fold_right` must visit elements in exactly the reverse of the order
/// `fold_left` does.
pub trait Foldable: TypeConstructor {
    /// Folds from the first element to the last.
    ///
    /// ```rust
    /// use seqmap::typeclass::Foldable;
    ///
    /// let digits = vec![1, 2, 3];
    /// assert_eq!(digits.fold_left(0, |number, digit| number * 10 + digit), 123);
    /// ```
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, Self::Inner) -> B;

    /// Folds from the last element to the first.
    ///
    /// ```rust
    /// use seqmap::typeclass::Foldable;
    ///
    /// let digits = vec![1, 2, 3];
    /// assert_eq!(digits.fold_right(0, |digit, number| number * 10 + digit), 321);
    /// ```
    fn fold_right<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(Self::Inner, B) -> B;

    /// Number of elements.
    fn length(&self) -> usize;

    /// Returns `true` when there is nothing to fold.
    fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Collects the elements in fold order.
    fn to_list(self) -> Vec<Self::Inner>
    where
        Self: Sized,
    {
        let mut elements = Vec::with_capacity(self.length());
        self.fold_left((), |(), element| elements.push(element));
        elements
    }

    /// Returns the first element, in fold order, that satisfies `predicate`.
    fn find<P>(self, mut predicate: P) -> Option<Self::Inner>
    where
        P: FnMut(&Self::Inner) -> bool,
        Self: Sized,
    {
        self.fold_left(None, |found, element| {
            found.or_else(|| predicate(&element).then_some(element))
        })
    }
}

impl<A> Foldable for Option<A> {
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, A) -> B,
    {
        match self {
            Some(element) => function(init, element),
            None => init,
        }
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(A, B) -> B,
    {
        match self {
            Some(element) => function(element, init),
            None => init,
        }
    }

    fn length(&self) -> usize {
        usize::from(self.is_some())
    }
}

impl<T> Foldable for Vec<T> {
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        self.into_iter().fold(init, function)
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(T, B) -> B,
    {
        self.into_iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn to_list(self) -> Self {
        self
    }
}
