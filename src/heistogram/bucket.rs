// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::error::Error;

/// Number of bits of linear resolution inside each power-of-two range.
///
/// Each range `[2^p, 2^(p+1))` above the exact region is split into `2^GROUPING_POWER` buckets.
pub const GROUPING_POWER: u32 = 7;

/// Values below this limit get a bucket of their own.
const EXACT_LIMIT: u64 = 1 << (GROUPING_POWER + 1);

const OFFSET_MASK: u16 = (1 << GROUPING_POWER) - 1;

/// Number of distinct bucket ids; every id produced by [`bucket_of`] is below this.
pub const MAX_BUCKETS: usize = bucket_of(u64::MAX) as usize + 1;

/// Upper bound of `bucket width / bucket lower bound` over all buckets.
pub const RELATIVE_ERROR: f64 = 1.0 / (1u64 << GROUPING_POWER) as f64;

/// Returns the id of the bucket holding `value`.
///
/// The mapping is total and monotonic: `a <= b` implies `bucket_of(a) <= bucket_of(b)`.
///
/// # Examples
///
/// ```
/// # use heistogram::heistogram::bucket_of;
/// assert_eq!(bucket_of(0), 0);
/// assert_eq!(bucket_of(255), 255);
/// assert_eq!(bucket_of(256), bucket_of(257));
/// assert!(bucket_of(1_000) < bucket_of(1_000_000));
/// ```
pub const fn bucket_of(value: u64) -> u16 {
    if value < EXACT_LIMIT {
        return value as u16;
    }
    let power = 63 - value.leading_zeros();
    let shift = power - GROUPING_POWER;
    let offset = (value - (1 << power)) >> shift;
    (((shift + 1) << GROUPING_POWER) as u64 + offset) as u16
}

/// Returns the range of values represented by `bucket_id`.
///
/// Fails with [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) when the id is
/// outside the bucket id space.
pub fn bucket_range(bucket_id: u16) -> Result<BucketRange, Error> {
    if bucket_id as usize >= MAX_BUCKETS {
        return Err(Error::invalid_argument(format!(
            "bucket id must be below {MAX_BUCKETS}, got {bucket_id}"
        )));
    }
    Ok(BucketRange::of(bucket_id))
}

/// Inclusive value bounds of a bucket.
///
/// A bucket covers the half-open range `[lower, upper + 1)`; bounds are kept inclusive so the
/// topmost bucket, which ends at `u64::MAX`, stays representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRange {
    lower: u64,
    upper: u64,
}

impl BucketRange {
    /// Caller guarantees `bucket_id < MAX_BUCKETS`.
    pub(crate) fn of(bucket_id: u16) -> BucketRange {
        debug_assert!((bucket_id as usize) < MAX_BUCKETS);
        let id = bucket_id as u64;
        if id < EXACT_LIMIT {
            return BucketRange {
                lower: id,
                upper: id,
            };
        }
        let shift = (bucket_id >> GROUPING_POWER) as u32 - 1;
        let offset = (bucket_id & OFFSET_MASK) as u64;
        let lower = (1u64 << (shift + GROUPING_POWER)) + (offset << shift);
        BucketRange {
            lower,
            upper: lower + ((1u64 << shift) - 1),
        }
    }

    /// Smallest value in the bucket.
    pub fn lower(&self) -> u64 {
        self.lower
    }

    /// Largest value in the bucket.
    pub fn upper(&self) -> u64 {
        self.upper
    }

    /// Number of distinct values in the bucket.
    pub fn width(&self) -> u64 {
        self.upper - self.lower + 1
    }

    /// Returns true if `value` falls in this bucket.
    pub fn contains(&self, value: u64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_region() {
        for value in 0..EXACT_LIMIT {
            let id = bucket_of(value);
            assert_eq!(id as u64, value);
            let range = BucketRange::of(id);
            assert_eq!(range.lower(), value);
            assert_eq!(range.width(), 1);
        }
    }

    #[test]
    fn test_first_log_buckets() {
        assert_eq!(bucket_of(256), 256);
        assert_eq!(bucket_of(257), 256);
        assert_eq!(bucket_of(258), 257);
        assert_eq!(bucket_of(511), 383);
        assert_eq!(bucket_of(512), 384);
        let range = BucketRange::of(384);
        assert_eq!((range.lower(), range.upper()), (512, 515));
    }

    #[test]
    fn test_top_bucket() {
        assert_eq!(MAX_BUCKETS, 7424);
        let top = BucketRange::of((MAX_BUCKETS - 1) as u16);
        assert_eq!(top.upper(), u64::MAX);
        assert_eq!(top.width(), 1 << 56);
        assert!(top.contains(u64::MAX));
        assert_eq!(bucket_of(1 << 63), (MAX_BUCKETS - 128) as u16);
    }

    #[test]
    fn test_ranges_are_contiguous() {
        let mut expected_lower = 0u64;
        for id in 0..MAX_BUCKETS as u16 {
            let range = BucketRange::of(id);
            assert_eq!(range.lower(), expected_lower, "gap before bucket {id}");
            assert_eq!(bucket_of(range.lower()), id);
            assert_eq!(bucket_of(range.upper()), id);
            expected_lower = range.upper().wrapping_add(1);
        }
        assert_eq!(expected_lower, 0);
    }

    #[test]
    fn test_relative_width_bounded() {
        for id in EXACT_LIMIT as u16..MAX_BUCKETS as u16 {
            let range = BucketRange::of(id);
            let relative = range.width() as f64 / range.lower() as f64;
            assert!(relative <= RELATIVE_ERROR, "bucket {id} too wide: {relative}");
        }
    }

    #[test]
    fn test_bucket_range_rejects_unknown_ids() {
        assert!(bucket_range((MAX_BUCKETS - 1) as u16).is_ok());
        let err = bucket_range(MAX_BUCKETS as u16).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }
}
