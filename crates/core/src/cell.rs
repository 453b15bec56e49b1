#![forbid(unsafe_code)]

/// Display-neutral cell content. Formatting is left to the display layer.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Count(usize),
    Rank(u32),
    Cost(f32),
    /// Known failure; shown as "∞".
    Infinite,
    /// Nothing to show yet (e.g. a pending cost).
    Empty,
}

impl CellValue {
    pub fn from_cost(cost: f32) -> Self {
        if cost.is_nan() {
            Self::Empty
        } else if cost.is_infinite() && cost > 0.0 {
            Self::Infinite
        } else {
            Self::Cost(cost)
        }
    }
}
