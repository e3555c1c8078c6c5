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

//! Log-linear histogram sketch over `u64` values.
//!
//! A [`Heistogram`] keeps one 64-bit counter per bucket over a contiguous range of bucket ids.
//! Bucket ids come from a fixed log-linear bucketing function (see [`bucket_of`]): every value
//! below 256 has its own bucket, and every power-of-two range above it is split into 128
//! equal-width buckets. The relative width of any bucket is therefore at most
//! [`RELATIVE_ERROR`], which bounds the error of percentile estimates regardless of magnitude.
//!
//! Sketches are mergeable with exact integer arithmetic, and can be queried either live or
//! directly from their binary encoding (see [`Heistogram::percentile_serialized`] and
//! [`decode_header`]).
//!
//! # Usage
//!
//! ```rust
//! # use heistogram::heistogram::Heistogram;
//! let mut sketch = Heistogram::from_values([1, 5, 100, 1000, 100000]).unwrap();
//! sketch.add(42).unwrap();
//! assert_eq!(sketch.total_count(), 6);
//! assert_eq!(sketch.percentile(0.0).unwrap(), 1.0);
//! assert_eq!(sketch.percentile(100.0).unwrap(), 100000.0);
//!
//! let bytes = sketch.serialize();
//! let header = heistogram::heistogram::decode_header(&bytes).unwrap();
//! assert_eq!(header.total_count(), 6);
//! ```

mod bucket;
mod estimator;
mod merge;
mod serialization;
mod sketch;

pub use self::bucket::BucketRange;
pub use self::bucket::GROUPING_POWER;
pub use self::bucket::MAX_BUCKETS;
pub use self::bucket::RELATIVE_ERROR;
pub use self::bucket::bucket_of;
pub use self::bucket::bucket_range;
pub use self::serialization::HEADER_SIZE;
pub use self::serialization::Header;
pub use self::serialization::decode_header;
pub use self::sketch::Heistogram;
