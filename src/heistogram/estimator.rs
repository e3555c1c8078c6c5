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

use super::bucket::BucketRange;
use super::serialization::EncodedHeistogram;
use super::sketch::Heistogram;
use crate::error::Error;

impl Heistogram {
    /// Returns the approximate value at percentile `p`, with `p` in `[0, 100]`.
    ///
    /// `p == 0` and `p == 100` return the recorded minimum and maximum exactly. Other
    /// percentiles locate the bucket holding rank `ceil(p / 100 * total_count)` and interpolate
    /// linearly inside it, assuming values are spread uniformly across the bucket.
    ///
    /// # Errors
    ///
    /// - [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if `p` is outside
    ///   `[0, 100]` or NaN.
    /// - [`EmptySketch`](crate::error::ErrorKind::EmptySketch) if the sketch holds no values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use heistogram::heistogram::Heistogram;
    /// let sketch = Heistogram::from_values(1..=100).unwrap();
    /// assert_eq!(sketch.percentile(50.0).unwrap(), 50.0);
    /// assert_eq!(sketch.percentile(100.0).unwrap(), 100.0);
    /// assert!(Heistogram::new().percentile(50.0).is_err());
    /// ```
    pub fn percentile(&self, p: f64) -> Result<f64, Error> {
        estimate(p, self.total_count, self.min, self.max, self.buckets())
    }

    /// Same as [`Heistogram::percentile`], evaluated directly on an encoded sketch.
    ///
    /// Only the header and a linear scan of the bucket counts are read; no sketch is built.
    pub fn percentile_serialized(bytes: &[u8], p: f64) -> Result<f64, Error> {
        let encoded = EncodedHeistogram::new(bytes)?;
        let header = encoded.header();
        estimate(
            p,
            header.total_count(),
            header.raw_min(),
            header.raw_max(),
            encoded.buckets(),
        )
    }
}

fn estimate<I>(p: f64, total_count: u64, min: u64, max: u64, buckets: I) -> Result<f64, Error>
where
    I: IntoIterator<Item = (u16, u64)>,
{
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::invalid_argument(format!(
            "percentile must be in [0, 100], got {p}"
        )));
    }
    if total_count == 0 {
        return Err(Error::empty_sketch("cannot compute a percentile of an empty sketch"));
    }
    if p == 0.0 {
        return Ok(min as f64);
    }
    if p == 100.0 {
        return Ok(max as f64);
    }

    let rank = ((p * total_count as f64 / 100.0).ceil() as u64).clamp(1, total_count);
    let mut cumulative = 0u64;
    for (bucket_id, count) in buckets {
        if count == 0 {
            continue;
        }
        // cumulative <= total_count holds, so the subtraction cannot underflow
        if count > total_count - cumulative {
            return Err(Error::corrupt("bucket counts exceed total count")
                .with_context("bucket_id", bucket_id)
                .with_context("total_count", total_count));
        }
        if cumulative + count >= rank {
            let rank_in_bucket = rank - cumulative;
            let value = interpolate(BucketRange::of(bucket_id), rank_in_bucket, count);
            return Ok(if min <= max {
                value.clamp(min as f64, max as f64)
            } else {
                value
            });
        }
        cumulative += count;
    }

    Err(Error::corrupt("bucket counts do not reach the requested rank")
        .with_context("rank", rank)
        .with_context("total_count", total_count))
}

/// Places the `rank`-th of `count` values at the middle of its share of the bucket.
///
/// This refines plain linear interpolation at `rank / count` of the bucket: taking the
/// midpoint `(rank - 0.5) / count` keeps every estimate strictly inside `[lower, upper]` and
/// spreads the `count` values evenly, instead of pinning the last one to the bucket's upper end.
fn interpolate(range: BucketRange, rank: u64, count: u64) -> f64 {
    let lower = range.lower() as f64;
    if range.width() == 1 {
        return lower;
    }
    let fraction = (rank as f64 - 0.5) / count as f64;
    lower + (range.upper() - range.lower()) as f64 * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_within_bucket() {
        let range = BucketRange::of(384);
        assert_eq!((range.lower(), range.upper()), (512, 515));
        assert_eq!(interpolate(range, 1, 1), 513.5);
        assert_eq!(interpolate(range, 1, 2), 512.75);
        assert_eq!(interpolate(range, 2, 2), 514.25);
        assert_eq!(interpolate(BucketRange::of(42), 3, 7), 42.0);
    }

    #[test]
    fn test_estimate_detects_short_counts() {
        let err = estimate(50.0, 10, 1, 3, [(1, 2), (3, 2)]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptEncoding);
    }

    #[test]
    fn test_estimate_rejects_counts_above_total() {
        let err = estimate(50.0, 100, 1, 2, [(1, 5), (2, u64::MAX)]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptEncoding);

        // a bucket reaching the rank is still checked against the total
        let err = estimate(10.0, 10, 1, 2, [(1, 11)]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptEncoding);
    }
}
