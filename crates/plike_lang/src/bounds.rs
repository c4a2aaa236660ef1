//! Array bounds model: one [`DimensionBounds`] per array dimension, each
//! either a constant or a variable-named bound, and either a single size or
//! a `start..end` range.
//!
//! Bounds are cloned at every ownership crossing (parser scratch → symbol,
//! symbol → function's global-scope copy, type → inheriting variable) per
//! the bounds lifecycle; [`DimensionBounds`] and [`ArrayBoundsData`] are
//! plain owned, deep-`Clone`-able values so every crossing is just a move
//! or a `.clone()`.

use crate::config::ArrayIndexing;

/// One endpoint of a dimension bound: a literal value known at parse time,
/// or the name of a variable whose value is only known at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Constant(i64),
    Variable(String),
}

impl Bound {
    pub fn is_constant(&self) -> bool {
        matches!(self, Bound::Constant(_))
    }

    pub fn as_constant(&self) -> Option<i64> {
        match self {
            Bound::Constant(v) => Some(*v),
            Bound::Variable(_) => None,
        }
    }
}

/// Bounds for a single array dimension.
///
/// When `using_range` is `false`, the dimension was declared with a single
/// size `n` rather than a range; by convention `start` holds that size and
/// `end` mirrors it, so downstream code can treat both forms uniformly when
/// it only needs "the declared extent" rather than genuine range math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionBounds {
    pub using_range: bool,
    pub start: Bound,
    pub end: Bound,
}

impl DimensionBounds {
    /// A dimension declared as a bare size, e.g. `[n]`.
    pub fn sized(size: Bound) -> Self {
        DimensionBounds {
            using_range: false,
            start: size.clone(),
            end: size,
        }
    }

    /// A dimension declared as a range, e.g. `[a..b]`.
    pub fn ranged(start: Bound, end: Bound) -> Self {
        DimensionBounds { using_range: true, start, end }
    }

    /// Both endpoints are compile-time constants.
    pub fn is_fully_constant(&self) -> bool {
        self.start.is_constant() && self.end.is_constant()
    }

    /// The C source expression for this dimension's declared array extent
    /// (spec §4.4's dimension-size lowering table).
    pub fn extent_expr(&self, indexing: ArrayIndexing) -> String {
        let one_based = matches!(indexing, ArrayIndexing::One);
        if !self.using_range {
            return match (&self.start, one_based) {
                (Bound::Constant(n), false) => n.to_string(),
                (Bound::Constant(n), true) => (n + 1).to_string(),
                (Bound::Variable(v), _) => v.clone(),
            };
        }
        match (&self.start, &self.end) {
            (Bound::Constant(a), Bound::Constant(b)) if one_based => (b - a + 1).to_string(),
            (Bound::Constant(a), Bound::Constant(b)) => (b - a).to_string(),
            (a, b) if one_based => format!("({}) - ({}) + 1", bound_expr(b), bound_expr(a)),
            (a, b) => format!("({}) - ({})", bound_expr(b), bound_expr(a)),
        }
    }

    /// The value of `name_offset_k` emitted for a range-based dimension
    /// (spec §4.4): `lower - (1 if one-based else 0)`, expressed as a C
    /// source fragment since `lower` may itself be a variable name.
    pub fn offset_expr(&self, indexing: ArrayIndexing) -> String {
        let adjust = match indexing {
            ArrayIndexing::One => 1,
            ArrayIndexing::Zero => 0,
        };
        match &self.start {
            Bound::Constant(n) => (n - adjust).to_string(),
            Bound::Variable(v) => {
                if adjust == 0 {
                    v.clone()
                } else {
                    format!("{v} - {adjust}")
                }
            }
        }
    }
}

fn bound_expr(bound: &Bound) -> String {
    match bound {
        Bound::Constant(n) => n.to_string(),
        Bound::Variable(v) => v.clone(),
    }
}

/// Per-array bounds: one [`DimensionBounds`] per dimension.
///
/// Invariant: `dimensions == bounds.len()` and `dimensions >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayBoundsData {
    pub dimensions: usize,
    pub bounds: Vec<DimensionBounds>,
}

impl ArrayBoundsData {
    pub fn new(bounds: Vec<DimensionBounds>) -> Self {
        debug_assert!(!bounds.is_empty(), "array bounds must have at least one dimension");
        ArrayBoundsData {
            dimensions: bounds.len(),
            bounds,
        }
    }

    pub fn dimension(&self, k: usize) -> Option<&DimensionBounds> {
        self.bounds.get(k)
    }

    /// `true` if declared dimension count matches the stored bounds count,
    /// the invariant every `ArrayDecl`/array symbol must uphold.
    pub fn is_consistent(&self) -> bool {
        self.dimensions == self.bounds.len() && self.dimensions >= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_dimension_mirrors_start_into_end() {
        let d = DimensionBounds::sized(Bound::Constant(10));
        assert!(!d.using_range);
        assert_eq!(d.start, d.end);
    }

    #[test]
    fn extent_expr_constant_size_zero_based() {
        let d = DimensionBounds::sized(Bound::Constant(10));
        assert_eq!(d.extent_expr(ArrayIndexing::Zero), "10");
    }

    #[test]
    fn extent_expr_constant_size_one_based_adds_one() {
        let d = DimensionBounds::sized(Bound::Constant(10));
        assert_eq!(d.extent_expr(ArrayIndexing::One), "11");
    }

    #[test]
    fn extent_expr_constant_range_zero_based() {
        let d = DimensionBounds::ranged(Bound::Constant(1), Bound::Constant(10));
        assert_eq!(d.extent_expr(ArrayIndexing::Zero), "9");
    }

    #[test]
    fn extent_expr_constant_range_one_based() {
        let d = DimensionBounds::ranged(Bound::Constant(1), Bound::Constant(10));
        assert_eq!(d.extent_expr(ArrayIndexing::One), "10");
    }

    #[test]
    fn extent_expr_variable_range_one_based() {
        let d = DimensionBounds::ranged(Bound::Constant(1), Bound::Variable("n".into()));
        assert_eq!(d.extent_expr(ArrayIndexing::One), "(n) - (1) + 1");
    }

    #[test]
    fn offset_expr_constant_one_based() {
        let d = DimensionBounds::ranged(Bound::Constant(1), Bound::Constant(10));
        assert_eq!(d.offset_expr(ArrayIndexing::One), "0");
    }

    #[test]
    fn offset_expr_constant_zero_based() {
        let d = DimensionBounds::ranged(Bound::Constant(5), Bound::Constant(10));
        assert_eq!(d.offset_expr(ArrayIndexing::Zero), "5");
    }

    #[test]
    fn bounds_data_consistency() {
        let data = ArrayBoundsData::new(vec![
            DimensionBounds::sized(Bound::Constant(4)),
            DimensionBounds::ranged(Bound::Constant(1), Bound::Constant(8)),
        ]);
        assert!(data.is_consistent());
        assert_eq!(data.dimensions, 2);
    }
}
