use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::sequence::{Acid, Symbol};

/// Number of preceding symbols the model conditions on.
///
/// Valid orders are `0..=ContextOrder::MAX`; an order of `k` yields `4^k`
/// distinct contexts (plus the reserved start context).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ContextOrder(u8);

impl ContextOrder {
    /// The highest supported order. `4^12` tables of 20 bytes each is already
    /// more than 300MiB of model state.
    pub const MAX: ContextOrder = ContextOrder(12);

    /// Creates a new `ContextOrder`, or returns `None` if the value exceeds
    /// [`ContextOrder::MAX`].
    ///
    /// # Examples
    /// ```
    /// use dnacomp::context::ContextOrder;
    ///
    /// assert_eq!(ContextOrder::new(3).unwrap().get(), 3);
    /// assert!(ContextOrder::new(13).is_none());
    /// ```
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Number of real (non-start) contexts, i.e. `4^k`.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::context::ContextOrder;
    ///
    /// assert_eq!(ContextOrder::new(0).unwrap().context_num(), 1);
    /// assert_eq!(ContextOrder::new(2).unwrap().context_num(), 16);
    /// ```
    #[inline]
    #[must_use]
    pub const fn context_num(&self) -> u32 {
        1 << (2 * self.0 as u32)
    }

    /// The reserved context used before any symbol has been seen.
    #[inline]
    #[must_use]
    pub const fn start_context(&self) -> Context {
        Context(self.context_num())
    }

    /// Iterates over all orders from 0 up to and including `self`.
    pub fn up_to(self) -> impl Iterator<Item = ContextOrder> {
        (0..=self.0).map(ContextOrder)
    }
}

impl Default for ContextOrder {
    fn default() -> Self {
        Self(10)
    }
}

impl Display for ContextOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context key, as a single number.
///
/// The key encodes the last `k` symbols in base 4, the most recent symbol
/// being the least significant digit. `Context` values are only meaningful
/// together with the [`ContextOrder`] they were produced for.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Context(u32);

impl Context {
    /// Constructs new `Context`.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::context::Context;
    ///
    /// let ctx = Context::new(123);
    /// assert_eq!(ctx.get(), 123);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_start(&self, order: ContextOrder) -> bool {
        self.0 == order.context_num()
    }

    /// Returns the context following `self` after `acid` has been observed.
    ///
    /// The start context behaves like a context of all `A`s (zero padding).
    ///
    /// # Examples
    /// ```
    /// use dnacomp::context::{Context, ContextOrder};
    /// use dnacomp::sequence::Acid;
    ///
    /// let order = ContextOrder::new(2).unwrap();
    /// let ctx = order.start_context();
    /// let ctx = ctx.advance(order, Acid::C);
    /// assert_eq!(ctx, Context::new(1));
    /// let ctx = ctx.advance(order, Acid::G);
    /// assert_eq!(ctx, Context::new(4 + 2));
    /// let ctx = ctx.advance(order, Acid::T);
    /// assert_eq!(ctx, Context::new(2 * 4 + 3));
    /// ```
    #[inline]
    #[must_use]
    pub fn advance(self, order: ContextOrder, acid: Acid) -> Self {
        let context_num = order.context_num();
        let prev = if self.0 >= context_num { 0 } else { self.0 };

        Self((prev * Acid::SIZE as u32 + acid.code() as u32) % context_num)
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}
