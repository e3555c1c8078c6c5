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

use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::ge;
use googletest::prelude::le;
use googletest::prelude::near;
use heistogram::error::ErrorKind;
use heistogram::heistogram::Heistogram;
use heistogram::heistogram::RELATIVE_ERROR;
use heistogram::heistogram::bucket_of;
use heistogram::heistogram::bucket_range;
use heistogram::heistogram::decode_header;

#[test]
fn test_empty() {
    let sketch = Heistogram::new();
    assert!(sketch.is_empty());
    assert_eq!(sketch.total_count(), 0);
    assert_eq!(sketch.bucket_count(), 0);
    assert_eq!(sketch.min_bucket_id(), 0);
    assert_eq!(sketch.min_value(), None);
    assert_eq!(sketch.max_value(), None);
    assert_eq!(sketch.buckets().count(), 0);
    assert_eq!(sketch, Heistogram::default());

    let err = sketch.percentile(50.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptySketch);
}

#[test]
fn test_one_value() {
    let mut sketch = Heistogram::new();
    sketch.add(1000).unwrap();
    assert_eq!(sketch.total_count(), 1);
    assert_eq!(sketch.bucket_count(), 1);
    assert_eq!(sketch.min_bucket_id(), bucket_of(1000));
    assert_eq!(sketch.min_value(), Some(1000));
    assert_eq!(sketch.max_value(), Some(1000));
    assert_eq!(sketch.count_of(bucket_of(1000)), 1);
    assert_eq!(sketch.percentile(0.0).unwrap(), 1000.0);
    assert_eq!(sketch.percentile(37.5).unwrap(), 1000.0);
    assert_eq!(sketch.percentile(100.0).unwrap(), 1000.0);
}

#[test]
fn test_zero_is_a_value() {
    let sketch = Heistogram::from_values([0, 0]).unwrap();
    assert_eq!(sketch.min_value(), Some(0));
    assert_eq!(sketch.max_value(), Some(0));
    assert_eq!(sketch.percentile(50.0).unwrap(), 0.0);
}

#[test]
fn test_extreme_values() {
    let sketch = Heistogram::from_values([0, u64::MAX]).unwrap();
    assert_eq!(sketch.min_bucket_id(), 0);
    assert_eq!(sketch.bucket_count() as usize, heistogram::heistogram::MAX_BUCKETS);
    assert_eq!(sketch.percentile(100.0).unwrap(), u64::MAX as f64);
    assert_eq!(sketch.percentile(50.0).unwrap(), 0.0);
}

#[test]
fn test_count_tracks_additions() {
    let mut sketch = Heistogram::new();
    for (i, value) in (0..5000u64).map(|v| v * 7919 % 100_003).enumerate() {
        sketch.add(value).unwrap();
        assert_eq!(sketch.total_count(), i as u64 + 1);
    }
    let sum: u64 = sketch.buckets().map(|(_, count)| count).sum();
    assert_eq!(sum, 5000);

    let header = decode_header(&sketch.serialize()).unwrap();
    assert_eq!(header.total_count(), 5000);
    assert_eq!(header.bucket_count(), sketch.bucket_count());
}

#[test]
fn test_buckets_are_contiguous_and_ordered() {
    let sketch = Heistogram::from_values([300, 5, 70_000, 5]).unwrap();
    let ids: Vec<u16> = sketch.buckets().map(|(id, _)| id).collect();
    assert_eq!(ids.first().copied(), Some(bucket_of(5)));
    assert_eq!(ids.last().copied(), Some(bucket_of(70_000)));
    assert!(ids.windows(2).all(|pair| pair[1] == pair[0] + 1));
    assert_eq!(sketch.count_of(bucket_of(5)), 2);
    assert_eq!(sketch.count_of(bucket_of(300)), 1);
    assert_eq!(sketch.count_of(bucket_of(1_000_000)), 0);
}

// Scenario: {1, 5, 100, 1000, 100000}
#[test]
fn test_sparse_values() {
    let sketch = Heistogram::from_values([1, 5, 100, 1000, 100_000]).unwrap();
    assert_eq!(sketch.total_count(), 5);
    assert_eq!(sketch.min_value(), Some(1));
    assert_eq!(sketch.max_value(), Some(100_000));

    let median = sketch.percentile(50.0).unwrap();
    let range = bucket_range(bucket_of(100)).unwrap();
    assert_that!(median, ge(range.lower() as f64));
    assert_that!(median, le(range.upper() as f64));

    assert_eq!(sketch.percentile(0.0).unwrap(), 1.0);
    assert_eq!(sketch.percentile(100.0).unwrap(), 100_000.0);
}

#[test]
fn test_percentile_bounds() {
    let sketch = Heistogram::from_values((1..=10_000).map(|v| v * 13)).unwrap();
    assert_eq!(sketch.percentile(0.0).unwrap(), 13.0);
    assert_eq!(sketch.percentile(100.0).unwrap(), 130_000.0);

    for p in [1.0, 10.0, 25.0, 50.0, 75.0, 90.0, 99.0, 99.9] {
        let expected = (p / 100.0 * 10_000.0_f64).ceil() * 13.0;
        let actual = sketch.percentile(p).unwrap();
        assert_that!(actual, near(expected, expected * RELATIVE_ERROR));
    }
}

#[test]
fn test_percentile_is_monotonic() {
    let sketch = Heistogram::from_values((0..2000).map(|v| v * v)).unwrap();
    let mut previous = 0.0;
    for i in 0..=1000 {
        let value = sketch.percentile(i as f64 / 10.0).unwrap();
        assert_that!(value, ge(previous));
        previous = value;
    }
}

#[test]
fn test_percentile_out_of_range() {
    let sketch = Heistogram::from_values([1, 2, 3]).unwrap();
    for p in [-0.1, 100.1, f64::NAN, f64::INFINITY] {
        let err = sketch.percentile(p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_that!(err.message(), contains_substring("percentile must be in [0, 100]"));
    }
}

// Scenario: add then remove of the same value
#[test]
fn test_add_then_remove_restores_count() {
    let mut sketch = Heistogram::from_values([10, 20, 30]).unwrap();
    let before = sketch.clone();

    sketch.add(123_456).unwrap();
    assert_eq!(sketch.total_count(), 4);
    sketch.remove(123_456);
    assert_eq!(sketch.total_count(), before.total_count());
    for (id, count) in before.buckets() {
        assert_eq!(sketch.count_of(id), count);
    }
    // the range grew and the maximum is not retracted
    assert_eq!(sketch.max_value(), Some(123_456));
    assert_eq!(sketch.count_of(bucket_of(123_456)), 0);
}

#[test]
fn test_remove_is_bucket_granular() {
    let mut sketch = Heistogram::from_values([256]).unwrap();
    assert_eq!(bucket_of(256), bucket_of(257));
    sketch.remove(257);
    assert!(sketch.is_empty());
    assert_eq!(sketch.min_value(), Some(256));
}

#[test]
fn test_remove_never_goes_negative() {
    let mut sketch = Heistogram::from_values([5]).unwrap();
    sketch.remove(5);
    sketch.remove(5);
    sketch.remove(1_000_000);
    assert_eq!(sketch.total_count(), 0);
    assert_eq!(sketch.count_of(bucket_of(5)), 0);

    let mut empty = Heistogram::new();
    empty.remove(42);
    assert_eq!(empty, Heistogram::new());

    let err = sketch.percentile(50.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptySketch);
}

#[test]
fn test_percentile_after_removing_extremes() {
    let mut sketch = Heistogram::from_values([1, 50, 100]).unwrap();
    sketch.remove(100);
    // max is stale, but estimates stay within the recorded extremes
    assert_eq!(sketch.percentile(100.0).unwrap(), 100.0);
    assert_eq!(sketch.percentile(99.0).unwrap(), 50.0);
}
