use crate::errors::Result;

/// Largest region covered by both operands.
///
/// Implementations decide what "no overlap" means; [crate::Window] fails
/// with an empty-intersection error rather than returning a zero-sized
/// value.
pub trait Intersection<Rhs = Self> {
    type Output;
    fn intersection(&self, rhs: &Rhs) -> Result<Self::Output>;
}

/// Smallest region covering both operands.
pub trait Union<Rhs = Self> {
    type Output;
    fn union(&self, rhs: &Rhs) -> Self::Output;
}
