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

use super::bucket::MAX_BUCKETS;
use super::bucket::bucket_of;
use crate::error::Error;

/// Log-linear histogram sketch over `u64` values.
///
/// See the [heistogram module level documentation](crate::heistogram) for more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heistogram {
    pub(super) total_count: u64,
    pub(super) min: u64,
    pub(super) max: u64,
    pub(super) min_bucket_id: u16,
    /// Index `i` holds the count of bucket `min_bucket_id + i`.
    pub(super) counts: Vec<u64>,
}

impl Default for Heistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Heistogram {
    /// Creates an empty sketch.
    ///
    /// # Examples
    ///
    /// ```
    /// # use heistogram::heistogram::Heistogram;
    /// let sketch = Heistogram::new();
    /// assert!(sketch.is_empty());
    /// assert_eq!(sketch.bucket_count(), 0);
    /// assert_eq!(sketch.min_value(), None);
    /// ```
    pub fn new() -> Self {
        Heistogram {
            total_count: 0,
            min: u64::MAX,
            max: u64::MIN,
            min_bucket_id: 0,
            counts: Vec::new(),
        }
    }

    /// Creates a sketch holding every value of `values`.
    pub fn from_values<I>(values: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut sketch = Self::new();
        for value in values {
            sketch.add(value)?;
        }
        Ok(sketch)
    }

    /// Returns the number of insertions currently represented.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Returns true if the sketch represents no insertion.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Returns the number of allocated buckets.
    pub fn bucket_count(&self) -> u16 {
        self.counts.len() as u16
    }

    /// Returns the id of the lowest allocated bucket.
    pub fn min_bucket_id(&self) -> u16 {
        self.min_bucket_id
    }

    /// Returns the smallest value ever inserted, or `None` if nothing was ever inserted.
    ///
    /// Removal does not retract this value.
    pub fn min_value(&self) -> Option<u64> {
        self.has_observed().then_some(self.min)
    }

    /// Returns the largest value ever inserted, or `None` if nothing was ever inserted.
    ///
    /// Removal does not retract this value.
    pub fn max_value(&self) -> Option<u64> {
        self.has_observed().then_some(self.max)
    }

    /// Returns the count held by `bucket_id`, zero for buckets outside the allocated range.
    pub fn count_of(&self, bucket_id: u16) -> u64 {
        self.index_of(bucket_id).map_or(0, |index| self.counts[index])
    }

    /// Iterates `(bucket_id, count)` over the allocated buckets in ascending id order.
    pub fn buckets(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        let min_bucket_id = self.min_bucket_id;
        self.counts
            .iter()
            .enumerate()
            .map(move |(index, count)| (min_bucket_id + index as u16, *count))
    }

    /// Records one occurrence of `value`.
    ///
    /// The bucket range grows at either end when `value` falls outside of it. On failure the
    /// sketch is left unchanged.
    pub fn add(&mut self, value: u64) -> Result<(), Error> {
        let total_count = self
            .total_count
            .checked_add(1)
            .ok_or_else(|| Error::capacity_exceeded("total count overflows 64 bits"))?;
        let bucket_id = bucket_of(value);
        self.grow_to_include(bucket_id, bucket_id)?;

        let index = (bucket_id - self.min_bucket_id) as usize;
        self.counts[index] += 1;
        self.total_count = total_count;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        Ok(())
    }

    /// Removes one occurrence from the bucket holding `value`.
    ///
    /// Removal is bucket-granular: any value sharing the bucket is indistinguishable. Removing
    /// from an empty or unallocated bucket does nothing. The recorded minimum and maximum are
    /// kept as they are, even if the removed value was one of them.
    pub fn remove(&mut self, value: u64) {
        let Some(index) = self.index_of(bucket_of(value)) else {
            return;
        };
        let count = &mut self.counts[index];
        if *count > 0 {
            *count -= 1;
            self.total_count -= 1;
        }
    }

    pub(super) fn has_observed(&self) -> bool {
        self.min <= self.max
    }

    fn index_of(&self, bucket_id: u16) -> Option<usize> {
        let index = bucket_id.checked_sub(self.min_bucket_id)? as usize;
        (index < self.counts.len()).then_some(index)
    }

    /// Extends the allocated range with zeroed buckets so it covers `[low, high]`.
    ///
    /// Either succeeds or leaves the sketch untouched.
    pub(super) fn grow_to_include(&mut self, low: u16, high: u16) -> Result<(), Error> {
        debug_assert!(low <= high && (high as usize) < MAX_BUCKETS);

        let len = self.counts.len();
        let (new_low, new_high) = if len == 0 {
            (low, high)
        } else {
            let cur_high = self.min_bucket_id + (len - 1) as u16;
            if low >= self.min_bucket_id && high <= cur_high {
                return Ok(());
            }
            (self.min_bucket_id.min(low), cur_high.max(high))
        };

        let new_len = (new_high - new_low) as usize + 1;
        if new_len > u16::MAX as usize {
            return Err(Error::capacity_exceeded(format!(
                "bucket count would grow to {new_len}, above the limit of {}",
                u16::MAX
            )));
        }
        self.counts
            .try_reserve(new_len - len)
            .map_err(|err| Error::allocation_failure("buckets", err))?;

        let prepend = if len == 0 {
            0
        } else {
            (self.min_bucket_id - new_low) as usize
        };
        self.counts.resize(new_len, 0);
        self.counts.rotate_right(prepend);
        self.min_bucket_id = new_low;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_appends_and_prepends() {
        let mut sketch = Heistogram::new();
        sketch.grow_to_include(10, 10).unwrap();
        assert_eq!(sketch.min_bucket_id, 10);
        assert_eq!(sketch.counts, vec![0]);

        sketch.counts[0] = 3;
        sketch.grow_to_include(12, 12).unwrap();
        assert_eq!(sketch.counts, vec![3, 0, 0]);

        sketch.grow_to_include(7, 8).unwrap();
        assert_eq!(sketch.min_bucket_id, 7);
        assert_eq!(sketch.counts, vec![0, 0, 0, 3, 0, 0]);

        sketch.grow_to_include(9, 11).unwrap();
        assert_eq!(sketch.counts.len(), 6);
    }

    #[test]
    fn test_add_failure_leaves_sketch_unchanged() {
        let mut sketch = Heistogram::from_values([3]).unwrap();
        sketch.total_count = u64::MAX;
        sketch.counts[0] = u64::MAX;
        let before = sketch.clone();

        let err = sketch.add(1_000_000).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CapacityExceeded);
        assert_eq!(sketch, before);
    }
}
