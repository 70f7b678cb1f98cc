// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::query::QueryError;
use crate::{Point, Store};

/// Marker for a street name component which should match everything.
pub const WILDCARD: &str = "*";

/// Maximum number of matches returned by [locate];
/// more matches result in [AddressError::TooManyMatches].
pub const MAX_ADDRESS_MATCHES: usize = 10;

/// Outcomes of [locate] which don't produce any matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("too many matches")]
    TooManyMatches,

    #[error("address not found")]
    NotFound,
}

/// Segment on which a searched address lies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMatch {
    pub segment: usize,

    /// The searched house number; 0 if any segment of the street was requested.
    pub house_number: i32,

    /// Human-readable name of the matched street.
    pub street: String,

    /// Start point of the matched segment.
    pub location: Point,
}

/// Parsed address query: `<house number>,<prefix>,<name>,<type>,<suffix>`,
/// e.g. `4202,E,Fowler,Ave,*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressQuery<'a> {
    pub house_number: i32,
    pub prefix: &'a str,
    pub name: &'a str,
    pub type_: &'a str,
    pub suffix: &'a str,
}

impl<'a> AddressQuery<'a> {
    pub fn parse(s: &'a str) -> Result<Self, QueryError> {
        let mut fields = s.split(',');
        let mut next = || fields.next().ok_or(QueryError::InvalidAddress);

        let house_number = next()?
            .trim()
            .parse::<i32>()
            .map_err(|_| QueryError::InvalidAddress)?;
        let prefix = next()?;
        let name = next()?;
        let type_ = next()?;
        let suffix = next()?;

        if fields.next().is_some() {
            return Err(QueryError::InvalidAddress);
        }

        Ok(Self {
            house_number,
            prefix,
            name,
            type_,
            suffix,
        })
    }

    /// Runs [locate] with this query.
    pub fn locate(&self, store: &Store) -> Result<Vec<AddressMatch>, AddressError> {
        locate(
            store,
            self.house_number,
            self.prefix,
            self.name,
            self.type_,
            self.suffix,
        )
    }
}

/// Finds segments with the provided address.
///
/// Street name components are matched by prefix, so "Fow" matches "Fowler".
/// Empty components, or components starting with [WILDCARD], match every street.
/// If `house_number` is zero, all segments of matching streets are returned;
/// otherwise only segments whose left or right address range contains the number.
///
/// Requires a walk over all streets, and over all segments for every matching street.
pub fn locate(
    store: &Store,
    house_number: i32,
    prefix: &str,
    name: &str,
    type_: &str,
    suffix: &str,
) -> Result<Vec<AddressMatch>, AddressError> {
    let (prefix, name, type_, suffix) = (
        unwildcard(prefix),
        unwildcard(name),
        unwildcard(type_),
        unwildcard(suffix),
    );

    let mut matches = Vec::default();

    for (street_idx, street) in store.street_names().iter().enumerate() {
        if !street.matches(prefix, name, type_, suffix) {
            continue;
        }

        let candidates = store
            .segments()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.street as usize == street_idx)
            .filter(|(_, s)| house_number == 0 || s.contains_address(house_number));

        for (segment_idx, segment) in candidates {
            matches.push(AddressMatch {
                segment: segment_idx,
                house_number,
                street: street.to_string(),
                location: segment.start,
            });

            if matches.len() > MAX_ADDRESS_MATCHES {
                log::debug!("more than {} matches, aborting search", MAX_ADDRESS_MATCHES);
                return Err(AddressError::TooManyMatches);
            }
        }
    }

    if matches.is_empty() {
        Err(AddressError::NotFound)
    } else {
        Ok(matches)
    }
}

#[inline]
fn unwildcard(s: &str) -> &str {
    if s.starts_with(WILDCARD) {
        ""
    } else {
        s
    }
}
