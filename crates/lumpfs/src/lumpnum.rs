//! Logical lump numbers
//!
//! One flat address space covers two indexes. Numbers below
//! [`AUXILIARY_BASE`] address the primary index; numbers at or above it
//! address the auxiliary index after subtracting the base.

use std::fmt;

/// First logical number of the auxiliary index
pub const AUXILIARY_BASE: u32 = 100_000_000;

/// Which index a logical number resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexSelector {
    /// Normal game data
    Primary,
    /// Temporarily opened auxiliary container
    Auxiliary,
}

/// Logical lump number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LumpNum(u32);

impl LumpNum {
    /// First number of the auxiliary range
    pub const AUXILIARY_START: Self = Self(AUXILIARY_BASE);

    /// Wrap a raw logical number
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Number for a position in the primary index
    pub fn primary(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .filter(|&index| index < AUXILIARY_BASE)
            .map(Self)
    }

    /// Number for a position in the auxiliary index
    pub fn auxiliary(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|index| index.checked_add(AUXILIARY_BASE))
            .map(Self)
    }

    /// Raw logical number
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Check if the number falls in the auxiliary range
    pub const fn is_auxiliary(self) -> bool {
        self.0 >= AUXILIARY_BASE
    }

    /// Split into the index to consult and the position within it
    pub fn select(self) -> (IndexSelector, usize) {
        if self.is_auxiliary() {
            (IndexSelector::Auxiliary, (self.0 - AUXILIARY_BASE) as usize)
        } else {
            (IndexSelector::Primary, self.0 as usize)
        }
    }
}

impl fmt::Display for LumpNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_range() {
        let num = LumpNum::primary(42).unwrap();
        assert_eq!(num.get(), 42);
        assert!(!num.is_auxiliary());
        assert_eq!(num.select(), (IndexSelector::Primary, 42));

        assert!(LumpNum::primary(AUXILIARY_BASE as usize).is_none());
    }

    #[test]
    fn test_auxiliary_range() {
        let num = LumpNum::auxiliary(5).unwrap();
        assert_eq!(num.get(), AUXILIARY_BASE + 5);
        assert!(num.is_auxiliary());
        assert_eq!(num.select(), (IndexSelector::Auxiliary, 5));
        assert_eq!(LumpNum::auxiliary(0), Some(LumpNum::AUXILIARY_START));

        assert!(LumpNum::auxiliary(u32::MAX as usize).is_none());
    }
}
