use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison flags, `00000LGE`. Zero until the first `CMP`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flags(u8);

impl Flags {
    pub const EQUAL: u8 = 0b0000_0001;
    pub const GREATER: u8 = 0b0000_0010;
    pub const LESS: u8 = 0b0000_0100;

    pub fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Equal => Flags(Self::EQUAL),
            Ordering::Greater => Flags(Self::GREATER),
            Ordering::Less => Flags(Self::LESS),
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn equal(self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn greater(self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub fn less(self) -> bool {
        self.0 & Self::LESS != 0
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            bit(self.less(), 'L'),
            bit(self.greater(), 'G'),
            bit(self.equal(), 'E')
        )
    }
}
