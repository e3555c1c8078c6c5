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

use super::serialization::EncodedHeistogram;
use super::sketch::Heistogram;
use crate::error::Error;

impl Heistogram {
    /// Merges another sketch into this one.
    ///
    /// Bucket counts are added exactly, so merging is commutative and associative and the empty
    /// sketch is its identity. On failure this sketch is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use heistogram::heistogram::Heistogram;
    /// let mut a = Heistogram::from_values(1..=50).unwrap();
    /// let b = Heistogram::from_values(51..=100).unwrap();
    /// a.merge(&b).unwrap();
    /// assert_eq!(a.total_count(), 100);
    /// assert_eq!(a.min_value(), Some(1));
    /// assert_eq!(a.max_value(), Some(100));
    /// ```
    pub fn merge(&mut self, other: &Heistogram) -> Result<(), Error> {
        let span = other
            .counts
            .len()
            .checked_sub(1)
            .map(|last| (other.min_bucket_id, other.min_bucket_id + last as u16));
        self.merge_buckets(
            other.total_count,
            other.min,
            other.max,
            span,
            other.buckets(),
        )
    }

    /// Merges an encoded sketch into this one without decoding it into a [`Heistogram`].
    ///
    /// The buffer is fully validated before this sketch is touched; a malformed buffer fails
    /// with [`CorruptEncoding`](crate::error::ErrorKind::CorruptEncoding) and leaves this
    /// sketch unchanged.
    pub fn merge_serialized(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let encoded = EncodedHeistogram::new(bytes)?;
        encoded.validate_counts()?;

        let header = encoded.header();
        let span = (header.bucket_count() as usize).checked_sub(1).map(|last| {
            let low = header.min_bucket_id();
            (low, low + last as u16)
        });
        self.merge_buckets(
            header.total_count(),
            header.raw_min(),
            header.raw_max(),
            span,
            encoded.buckets(),
        )
    }

    /// `span` is the inclusive id range of `buckets`, `None` when there are no buckets.
    fn merge_buckets<I>(
        &mut self,
        total_count: u64,
        min: u64,
        max: u64,
        span: Option<(u16, u16)>,
        buckets: I,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = (u16, u64)>,
    {
        let total_count = self
            .total_count
            .checked_add(total_count)
            .ok_or_else(|| Error::capacity_exceeded("total count overflows 64 bits"))?;

        if let Some((low, high)) = span {
            self.grow_to_include(low, high)?;
            let offset = (low - self.min_bucket_id) as usize;
            for (slot, (_, count)) in self.counts[offset..].iter_mut().zip(buckets) {
                // cannot overflow: each slot is bounded by the checked total
                *slot += count;
            }
        }

        self.total_count = total_count;
        self.min = self.min.min(min);
        self.max = self.max.max(max);
        Ok(())
    }
}
