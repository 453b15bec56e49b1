#![forbid(unsafe_code)]

use super::Candidate;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Creation order.
    #[default]
    None,
    /// Descending puts the best-ranked candidates first.
    Quality,
    Name,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "creation" => Some(Self::None),
            "quality" => Some(Self::Quality),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// `order` applies to the key only; ties always fall back to ascending creation rank.
pub(super) fn compare(
    left: &Candidate,
    right: &Candidate,
    key: SortKey,
    order: SortOrder,
) -> Ordering {
    let primary = match key {
        SortKey::None => Ordering::Equal,
        // a smaller rank is a better quality
        SortKey::Quality => right.quality_rank.cmp(&left.quality_rank),
        SortKey::Name => left.name.cmp(&right.name),
    };
    let primary = match order {
        SortOrder::Ascending => primary,
        SortOrder::Descending => primary.reverse(),
    };
    primary.then(left.creation_rank.cmp(&right.creation_rank))
}
