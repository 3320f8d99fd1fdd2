//! Byte range requests and their resolution against an object size

use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// A single byte range requested from the store
///
/// `length: None` means "from `offset` to the end of the object".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// First byte to return
    pub offset: u64,
    /// Number of bytes to return
    pub length: Option<u64>,
}

impl ByteRange {
    /// Range covering `offset..` to the end of the object
    pub fn from_offset(offset: u64) -> Self {
        Self { offset, length: None }
    }

    /// Range of exactly `length` bytes starting at `offset`
    pub fn with_length(offset: u64, length: u64) -> Self {
        Self {
            offset,
            length: Some(length),
        }
    }

    /// Range for the inclusive span `start..=end`, `None` when `end < start`
    pub fn inclusive(start: u64, end: u64) -> Option<Self> {
        let length = end.checked_sub(start)?.checked_add(1)?;
        Some(Self::with_length(start, length))
    }

    /// Clamp this range to an object of `size` bytes.
    ///
    /// A length running past the end is shortened. An offset at or past the
    /// end cannot be served.
    pub fn resolve(&self, size: u64) -> Result<ServedRange> {
        if self.offset >= size {
            return Err(StoreError::RangeNotSatisfiable {
                offset: self.offset,
                size,
            });
        }

        let available = size - self.offset;
        let length = match self.length {
            Some(len) => len.min(available),
            None => available,
        };

        Ok(ServedRange {
            offset: self.offset,
            length,
        })
    }
}

/// The range a store actually returned
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServedRange {
    pub offset: u64,
    pub length: u64,
}

impl ServedRange {
    /// Inclusive index of the last byte served
    pub fn end(&self) -> u64 {
        (self.offset + self.length).saturating_sub(1)
    }

    /// `Content-Range` value for an object of `size` bytes
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.offset, self.end(), size)
    }
}

/// Options accepted by [`crate::ObjectStore::get`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub range: Option<ByteRange>,
}

impl GetOptions {
    /// Options requesting the given range
    pub fn range(range: ByteRange) -> Self {
        Self { range: Some(range) }
    }
}

impl From<Option<ByteRange>> for GetOptions {
    fn from(range: Option<ByteRange>) -> Self {
        Self { range }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(ByteRange::with_length(10, 10), 100, 10, 10)]
    #[case(ByteRange::from_offset(10), 100, 10, 90)]
    #[case(ByteRange::with_length(5, 1000), 100, 5, 95)]
    #[case(ByteRange::with_length(0, 1), 1, 0, 1)]
    #[case(ByteRange::from_offset(99), 100, 99, 1)]
    fn test_resolve(
        #[case] range: ByteRange,
        #[case] size: u64,
        #[case] offset: u64,
        #[case] length: u64,
    ) {
        let served = range.resolve(size).unwrap();
        assert_eq!(served, ServedRange { offset, length });
    }

    #[rstest]
    #[case(ByteRange::from_offset(100), 100)]
    #[case(ByteRange::with_length(150, 10), 100)]
    #[case(ByteRange::from_offset(0), 0)]
    fn test_resolve_unsatisfiable(#[case] range: ByteRange, #[case] size: u64) {
        let result = range.resolve(size);
        assert!(matches!(
            result,
            Err(StoreError::RangeNotSatisfiable { size: s, .. }) if s == size
        ));
    }

    #[test]
    fn test_inclusive() {
        assert_eq!(ByteRange::inclusive(10, 19), Some(ByteRange::with_length(10, 10)));
        assert_eq!(ByteRange::inclusive(7, 7), Some(ByteRange::with_length(7, 1)));
        assert_eq!(ByteRange::inclusive(8, 7), None);
        assert_eq!(ByteRange::inclusive(0, u64::MAX), None);
    }

    #[test]
    fn test_content_range() {
        let served = ServedRange { offset: 10, length: 10 };
        assert_eq!(served.content_range(100), "bytes 10-19/100");
        assert_eq!(served.end(), 19);
    }

    proptest! {
        #[test]
        fn resolved_range_stays_inside_object(
            size in 1u64..1_000_000,
            offset in 0u64..1_000_000,
            length in proptest::option::of(1u64..2_000_000),
        ) {
            let range = ByteRange { offset, length };
            match range.resolve(size) {
                Ok(served) => {
                    prop_assert!(offset < size);
                    prop_assert_eq!(served.offset, offset);
                    prop_assert!(served.length >= 1);
                    prop_assert!(served.end() < size);
                    if let Some(len) = length {
                        prop_assert!(served.length <= len);
                    }
                }
                Err(_) => prop_assert!(offset >= size),
            }
        }
    }
}
