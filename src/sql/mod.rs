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

//! Function layer for database hosts.
//!
//! A host that stores sketches as blobs passes immutable buffers in and takes new buffers out,
//! so every function here decodes its input, works on a sketch owned by the call, and encodes
//! the result. Input buffers are never modified.
//!
//! `None` stands for SQL `NULL` and follows these rules:
//!
//! - [`add`] and [`remove`] return `None` for a null sketch and the input unchanged for a null
//!   value.
//! - [`merge`] returns the other operand unchanged when one operand is null, and `None` when
//!   both are.
//! - [`percentile`] and the header accessors propagate null.
//!
//! Grouped aggregation goes through [`Accumulator`], and [`FunctionRegistry`] maps the SQL
//! function names onto these operations.
//!
//! # Usage
//!
//! ```rust
//! # use heistogram::sql;
//! let sketch = sql::create([Some(10), None, Some(20)]).unwrap();
//! let sketch = sql::add(Some(&sketch), Some(30)).unwrap().unwrap();
//! assert_eq!(sql::count(Some(&sketch)).unwrap(), Some(3));
//! assert_eq!(sql::percentile(Some(&sketch), Some(100.0)).unwrap(), Some(30.0));
//! assert_eq!(sql::add(None, Some(30)).unwrap(), None);
//! ```

mod aggregate;
mod registry;
mod value;

pub use self::aggregate::Accumulator;
pub use self::aggregate::AggregateMode;
pub use self::registry::AggregateFactory;
pub use self::registry::AggregateFunction;
pub use self::registry::Arity;
pub use self::registry::FunctionDef;
pub use self::registry::FunctionKind;
pub use self::registry::FunctionRegistry;
pub use self::registry::ScalarFn;
pub use self::value::Value;
use crate::error::Error;
use crate::heistogram::Header;
use crate::heistogram::Heistogram;
use crate::heistogram::decode_header;

/// Encodes a new sketch holding every non-null value.
pub fn create<I>(values: I) -> Result<Vec<u8>, Error>
where
    I: IntoIterator<Item = Option<u64>>,
{
    Heistogram::from_values(values.into_iter().flatten())?.try_serialize()
}

/// Adds `value` to an encoded sketch.
pub fn add(sketch: Option<&[u8]>, value: Option<u64>) -> Result<Option<Vec<u8>>, Error> {
    update(sketch, value, |sketch, value| sketch.add(value))
}

/// Removes `value` from an encoded sketch.
///
/// Removal is bucket-granular and leaves the recorded minimum and maximum untouched.
pub fn remove(sketch: Option<&[u8]>, value: Option<u64>) -> Result<Option<Vec<u8>>, Error> {
    update(sketch, value, |sketch, value| {
        sketch.remove(value);
        Ok(())
    })
}

fn update<F>(sketch: Option<&[u8]>, value: Option<u64>, op: F) -> Result<Option<Vec<u8>>, Error>
where
    F: FnOnce(&mut Heistogram, u64) -> Result<(), Error>,
{
    let Some(bytes) = sketch else {
        return Ok(None);
    };
    let Some(value) = value else {
        return Ok(Some(bytes.to_vec()));
    };
    let mut sketch = Heistogram::deserialize(bytes)?;
    op(&mut sketch, value)?;
    sketch.try_serialize().map(Some)
}

/// Merges two encoded sketches.
pub fn merge(a: Option<&[u8]>, b: Option<&[u8]>) -> Result<Option<Vec<u8>>, Error> {
    match (a, b) {
        (None, None) => Ok(None),
        (Some(bytes), None) | (None, Some(bytes)) => Ok(Some(bytes.to_vec())),
        (Some(a), Some(b)) => {
            let mut sketch = Heistogram::deserialize(a)?;
            sketch.merge_serialized(b)?;
            sketch.try_serialize().map(Some)
        }
    }
}

/// Estimates percentile `p` (in `[0, 100]`) of an encoded sketch.
pub fn percentile(sketch: Option<&[u8]>, p: Option<f64>) -> Result<Option<f64>, Error> {
    match (sketch, p) {
        (Some(bytes), Some(p)) => Heistogram::percentile_serialized(bytes, p).map(Some),
        _ => Ok(None),
    }
}

/// Decodes the header of an encoded sketch.
pub fn header(sketch: Option<&[u8]>) -> Result<Option<Header>, Error> {
    sketch.map(decode_header).transpose()
}

/// Returns the total count of an encoded sketch.
pub fn count(sketch: Option<&[u8]>) -> Result<Option<u64>, Error> {
    Ok(header(sketch)?.map(|header| header.total_count()))
}

/// Returns the smallest value ever inserted, or `None` if there is none.
pub fn min(sketch: Option<&[u8]>) -> Result<Option<u64>, Error> {
    Ok(header(sketch)?.and_then(|header| header.min_value()))
}

/// Returns the largest value ever inserted, or `None` if there is none.
pub fn max(sketch: Option<&[u8]>) -> Result<Option<u64>, Error> {
    Ok(header(sketch)?.and_then(|header| header.max_value()))
}

/// Returns the number of allocated buckets of an encoded sketch.
pub fn bucket_count(sketch: Option<&[u8]>) -> Result<Option<u64>, Error> {
    Ok(header(sketch)?.map(|header| header.bucket_count() as u64))
}

/// Returns the lowest allocated bucket id of an encoded sketch.
pub fn min_bucket(sketch: Option<&[u8]>) -> Result<Option<u64>, Error> {
    Ok(header(sketch)?.map(|header| header.min_bucket_id() as u64))
}
