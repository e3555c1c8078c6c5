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

//! Binary encoding of a [`Heistogram`].
//!
//! Every field is little-endian. The layout is a fixed 28-byte header followed by one 64-bit
//! count per allocated bucket, in ascending bucket id order:
//!
//! ```text
//! offset  size  field
//! 0       2     bucket_count   (u16)
//! 2       8     total_count    (u64)
//! 10      8     min            (u64)
//! 18      8     max            (u64)
//! 26      2     min_bucket_id  (u16)
//! 28      8*n   count_0 .. count_{n-1} (u64)
//! ```

use byteorder::ByteOrder;
use byteorder::LE;

use super::bucket::MAX_BUCKETS;
use super::sketch::Heistogram;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 28;

const COUNT_SIZE: usize = 8;

/// Summary fields of an encoded sketch, read without touching the bucket payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    bucket_count: u16,
    total_count: u64,
    min: u64,
    max: u64,
    min_bucket_id: u16,
}

impl Header {
    /// Returns the number of allocated buckets.
    pub fn bucket_count(&self) -> u16 {
        self.bucket_count
    }

    /// Returns the number of insertions represented.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Returns the id of the lowest allocated bucket.
    pub fn min_bucket_id(&self) -> u16 {
        self.min_bucket_id
    }

    /// Returns the smallest value ever inserted, or `None` if nothing was ever inserted.
    pub fn min_value(&self) -> Option<u64> {
        (self.min <= self.max).then_some(self.min)
    }

    /// Returns the largest value ever inserted, or `None` if nothing was ever inserted.
    pub fn max_value(&self) -> Option<u64> {
        (self.min <= self.max).then_some(self.max)
    }

    /// Returns the raw `min` field, `u64::MAX` for a sketch that never saw a value.
    pub fn raw_min(&self) -> u64 {
        self.min
    }

    /// Returns the raw `max` field, `0` for a sketch that never saw a value.
    pub fn raw_max(&self) -> u64 {
        self.max
    }

    /// Size in bytes of the whole encoding this header describes.
    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE + self.bucket_count as usize * COUNT_SIZE
    }

    fn read(cursor: &mut SketchSlice<'_>) -> Result<Header, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let bucket_count = cursor.read_u16_le().map_err(make_error("bucket_count"))?;
        let total_count = cursor.read_u64_le().map_err(make_error("total_count"))?;
        let min = cursor.read_u64_le().map_err(make_error("min"))?;
        let max = cursor.read_u64_le().map_err(make_error("max"))?;
        let min_bucket_id = cursor.read_u16_le().map_err(make_error("min_bucket_id"))?;

        let header = Header {
            bucket_count,
            total_count,
            min,
            max,
            min_bucket_id,
        };
        if min_bucket_id as usize + bucket_count as usize > MAX_BUCKETS {
            return Err(Error::corrupt("bucket range exceeds the bucket id space")
                .with_context("min_bucket_id", min_bucket_id)
                .with_context("bucket_count", bucket_count));
        }
        if bucket_count == 0 && total_count != 0 {
            return Err(Error::corrupt("non-zero total count without buckets")
                .with_context("total_count", total_count));
        }
        Ok(header)
    }
}

/// Decodes the header of an encoded sketch in constant time.
///
/// The buffer length is checked against the bucket count, so a truncated or padded buffer fails
/// with [`CorruptEncoding`](crate::error::ErrorKind::CorruptEncoding) instead of yielding
/// partially valid fields.
///
/// # Examples
///
/// ```
/// # use heistogram::heistogram::{decode_header, Heistogram};
/// let bytes = Heistogram::from_values([3, 7, 11]).unwrap().serialize();
/// let header = decode_header(&bytes).unwrap();
/// assert_eq!(header.total_count(), 3);
/// assert_eq!(header.min_value(), Some(3));
/// assert_eq!(header.max_value(), Some(11));
///
/// assert!(decode_header(&bytes[..bytes.len() - 1]).is_err());
/// ```
pub fn decode_header(bytes: &[u8]) -> Result<Header, Error> {
    let mut cursor = SketchSlice::new(bytes);
    let header = Header::read(&mut cursor)?;
    let expected = header.serialized_size();
    if bytes.len() != expected {
        return Err(Error::length_mismatch(expected, bytes.len()));
    }
    Ok(header)
}

/// A validated encoded sketch whose bucket counts are read in place.
pub(super) struct EncodedHeistogram<'a> {
    header: Header,
    payload: &'a [u8],
}

impl<'a> EncodedHeistogram<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, Error> {
        let header = decode_header(bytes)?;
        Ok(EncodedHeistogram {
            header,
            payload: &bytes[HEADER_SIZE..],
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Iterates `(bucket_id, count)` in ascending id order.
    pub fn buckets(&self) -> impl Iterator<Item = (u16, u64)> + 'a {
        let min_bucket_id = self.header.min_bucket_id;
        self.payload
            .chunks_exact(COUNT_SIZE)
            .enumerate()
            .map(move |(index, chunk)| (min_bucket_id + index as u16, LE::read_u64(chunk)))
    }

    /// Checks that the bucket counts add up to the header's total count.
    pub fn validate_counts(&self) -> Result<(), Error> {
        let mut sum = 0u64;
        for (_, count) in self.buckets() {
            sum = add_count(sum, count)?;
        }
        check_total(&self.header, sum)
    }
}

fn add_count(sum: u64, count: u64) -> Result<u64, Error> {
    sum.checked_add(count)
        .ok_or_else(|| Error::corrupt("bucket counts overflow 64 bits"))
}

fn check_total(header: &Header, sum: u64) -> Result<(), Error> {
    if sum != header.total_count {
        return Err(Error::corrupt("bucket counts do not add up to total count")
            .with_context("total_count", header.total_count)
            .with_context("sum", sum));
    }
    Ok(())
}

impl Heistogram {
    /// Returns the size in bytes of the encoding of this sketch.
    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE + self.counts.len() * COUNT_SIZE
    }

    /// Serializes the sketch to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = SketchBytes::with_capacity(self.serialized_size());
        self.write(&mut bytes);
        bytes.into_bytes()
    }

    /// Serializes the sketch to bytes, reporting a failure to allocate the output buffer as
    /// [`AllocationFailure`](crate::error::ErrorKind::AllocationFailure).
    pub fn try_serialize(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = SketchBytes::try_with_capacity(self.serialized_size())
            .map_err(|err| Error::allocation_failure("encoding", err))?;
        self.write(&mut bytes);
        Ok(bytes.into_bytes())
    }

    fn write(&self, bytes: &mut SketchBytes) {
        bytes.write_u16_le(self.bucket_count());
        bytes.write_u64_le(self.total_count);
        bytes.write_u64_le(self.min);
        bytes.write_u64_le(self.max);
        bytes.write_u16_le(self.min_bucket_id);
        for count in &self.counts {
            bytes.write_u64_le(*count);
        }
    }

    /// Deserializes a sketch from bytes.
    ///
    /// Fails with [`CorruptEncoding`](crate::error::ErrorKind::CorruptEncoding) if the buffer is
    /// truncated, has trailing bytes, describes buckets outside the id space, or its bucket
    /// counts do not add up to its total count.
    pub fn deserialize(bytes: &[u8]) -> Result<Heistogram, Error> {
        let mut cursor = SketchSlice::new(bytes);
        let header = Header::read(&mut cursor)?;
        let expected = header.serialized_size();
        if bytes.len() != expected {
            return Err(Error::length_mismatch(expected, bytes.len()));
        }

        let mut counts = Vec::new();
        counts
            .try_reserve_exact(header.bucket_count as usize)
            .map_err(|err| Error::allocation_failure("buckets", err))?;
        let mut sum = 0u64;
        while cursor.remaining() > 0 {
            let count = cursor
                .read_u64_le()
                .map_err(|_| Error::insufficient_data("counts"))?;
            sum = add_count(sum, count)?;
            counts.push(count);
        }
        check_total(&header, sum)?;

        Ok(Heistogram {
            total_count: header.total_count,
            min: header.min,
            max: header.max,
            min_bucket_id: header.min_bucket_id,
            counts,
        })
    }
}
