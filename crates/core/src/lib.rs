#![forbid(unsafe_code)]

pub mod cache;
pub mod cell;
pub mod error;
pub mod events;
pub mod handles;
pub mod identity;
pub mod messages;
pub mod solutions;
pub mod task;
pub mod tree;

pub use cache::{FIRST_REAL_STAGE, Solution, SolutionCache, SolutionFetcher, SolutionSegment};
pub use cell::CellValue;
pub use error::{FetchError, ProtocolError};
pub use events::{CellRange, ListEvent, ModelObserver, RowRemap, TreeEvent};
pub use handles::{HandleRegistry, RowHandle};
pub use identity::IdentityIndex;
pub use messages::{
    StageDescription, StageStatistics, SolutionMessage, SubSolution, SubTrajectory,
};
pub use solutions::{Candidate, SolutionColumn, SolutionList, SortKey, SortOrder};
pub use task::RemoteTask;
pub use tree::{ApplyReport, StageNode, StageTree, TreeColumn};

pub mod ids {
    use serde::{Deserialize, Serialize};

    /// Identifier of a stage in the remote hierarchy. `0` is the virtual root.
    #[derive(
        Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct StageId(u32);

    impl StageId {
        pub const ROOT: StageId = StageId(0);

        pub const fn new(value: u32) -> Self {
            Self(value)
        }

        pub fn get(self) -> u32 {
            self.0
        }
    }

    impl std::fmt::Display for StageId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    /// Global solution identifier. The remote side assigns them in discovery order;
    /// `0` never names a solution.
    #[derive(
        Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct SolutionId(u32);

    impl SolutionId {
        pub const INVALID: SolutionId = SolutionId(0);

        pub const fn new(value: u32) -> Self {
            Self(value)
        }

        pub fn get(self) -> u32 {
            self.0
        }

        pub fn is_valid(self) -> bool {
            self.0 != 0
        }
    }

    impl std::fmt::Display for SolutionId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
}

pub mod flags {
    use serde::{Deserialize, Serialize};

    /// Which ends of its neighbours a stage reads from or writes to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InterfaceFlags(u32);

    impl InterfaceFlags {
        pub const READS_START: InterfaceFlags = InterfaceFlags(0x01);
        pub const READS_END: InterfaceFlags = InterfaceFlags(0x02);
        pub const WRITES_NEXT_START: InterfaceFlags = InterfaceFlags(0x04);
        pub const WRITES_PREV_END: InterfaceFlags = InterfaceFlags(0x08);

        const ALL: u32 = 0x0f;

        pub const fn empty() -> Self {
            Self(0)
        }

        /// Keeps the four known capability bits of a wire value and drops the rest.
        pub fn from_wire(bits: u32) -> Self {
            Self(bits & Self::ALL)
        }

        pub fn bits(self) -> u32 {
            self.0
        }

        pub fn contains(self, other: InterfaceFlags) -> bool {
            self.0 & other.0 == other.0
        }

        pub fn is_empty(self) -> bool {
            self.0 == 0
        }

        pub fn names(self) -> Vec<&'static str> {
            [
                (Self::READS_START, "reads_start"),
                (Self::READS_END, "reads_end"),
                (Self::WRITES_NEXT_START, "writes_next_start"),
                (Self::WRITES_PREV_END, "writes_prev_end"),
            ]
            .into_iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
            .collect()
        }
    }

    impl std::ops::BitOr for InterfaceFlags {
        type Output = InterfaceFlags;

        fn bitor(self, rhs: Self) -> Self::Output {
            InterfaceFlags(self.0 | rhs.0)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wire_bits_outside_the_interface_are_dropped() {
            let flags = InterfaceFlags::from_wire(0xf3);
            assert_eq!(flags, InterfaceFlags::READS_START | InterfaceFlags::READS_END);
            assert_eq!(flags.bits(), 0x3);
            assert_eq!(flags.names(), vec!["reads_start", "reads_end"]);
            assert!(InterfaceFlags::from_wire(0x10).is_empty());
        }
    }
}
