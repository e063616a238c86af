//! Lump name size qualifiers
//!
//! A lump query may end in `==N`, `>=N` or `<=N` to pick among same-named
//! lumps by size, e.g. `TEXTURE1==4096`.

/// Size comparison attached to a lump query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCondition {
    /// `==N`
    Equal(usize),
    /// `>=N`
    AtLeast(usize),
    /// `<=N`
    AtMost(usize),
}

impl SizeCondition {
    /// Check a lump size against the condition
    pub fn matches(self, size: usize) -> bool {
        match self {
            Self::Equal(n) => size == n,
            Self::AtLeast(n) => size >= n,
            Self::AtMost(n) => size <= n,
        }
    }
}

/// Split a query into the lump name and an optional size condition.
///
/// A suffix whose number does not parse is treated as part of the name.
pub fn split_size_qualifier(query: &str) -> (&str, Option<SizeCondition>) {
    let operators: [(&str, fn(usize) -> SizeCondition); 3] = [
        ("==", SizeCondition::Equal),
        (">=", SizeCondition::AtLeast),
        ("<=", SizeCondition::AtMost),
    ];

    let found = operators
        .iter()
        .filter_map(|(op, make)| query.rfind(op).map(|at| (at, op.len(), make)))
        .max_by_key(|(at, _, _)| *at);

    let Some((at, op_len, make)) = found else {
        return (query, None);
    };

    match query[at + op_len..].trim().parse::<usize>() {
        Ok(size) => (query[..at].trim_end(), Some(make(size))),
        Err(_) => (query, None),
    }
}
