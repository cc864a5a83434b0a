//! The injected stencil policy: offsets plus a pure combining function.
//!
//! Concrete derivative formulas live outside the core; the engine only sees
//! a fixed offset pattern and a combiner, and derives the halo width it must
//! exchange from the largest absolute offset component.

use crate::index::shape::Position;

/// An externally supplied stencil operation.
///
/// `combine` receives one value per offset, in `offsets()` order, and must be
/// pure: the engine may evaluate it in any order, possibly in parallel.
pub trait StencilOp<T> {
    /// The fixed, statically-known set of relative offsets read per cell.
    fn offsets(&self) -> &[Position];

    /// Fold the gathered neighbour values into the output value.
    fn combine(&self, values: &[T]) -> T;

    /// Required halo width: the maximum absolute offset component.
    fn padding(&self) -> usize {
        self.offsets()
            .iter()
            .flat_map(|o| o.iter())
            .map(|c| c.unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widths(Vec<Position>);

    impl StencilOp<f64> for Widths {
        fn offsets(&self) -> &[Position] {
            &self.0
        }
        fn combine(&self, values: &[f64]) -> f64 {
            values.iter().sum()
        }
    }

    #[test]
    fn padding_is_max_abs_component() {
        let op = Widths(vec![
            Position::new(vec![0, 0]),
            Position::new(vec![-2, 1]),
            Position::new(vec![1, 1]),
        ]);
        assert_eq!(op.padding(), 2);
    }

    #[test]
    fn center_only_stencil_needs_no_padding() {
        let op = Widths(vec![Position::new(vec![0, 0])]);
        assert_eq!(op.padding(), 0);
    }
}
