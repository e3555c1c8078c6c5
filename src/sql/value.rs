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

/// A value exchanged with the database host.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// A signed 64-bit integer.
    Integer(i64),
    /// A 64-bit float.
    Real(f64),
    /// An opaque byte buffer, used for encoded sketches.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Reads a sketch argument.
    pub(crate) fn as_blob(&self, arg: usize) -> Result<Option<&[u8]>, Error> {
        match self {
            Value::Null => Ok(None),
            Value::Blob(bytes) => Ok(Some(bytes.as_slice())),
            other => Err(mismatch("blob", other, arg)),
        }
    }

    /// Reads a sketch value argument.
    ///
    /// Hosts only have signed integers, so the bits are taken as-is: `-1` is `u64::MAX`.
    pub(crate) fn as_u64(&self, arg: usize) -> Result<Option<u64>, Error> {
        match self {
            Value::Null => Ok(None),
            Value::Integer(n) => Ok(Some(*n as u64)),
            other => Err(mismatch("integer", other, arg)),
        }
    }

    pub(crate) fn as_f64(&self, arg: usize) -> Result<Option<f64>, Error> {
        match self {
            Value::Null => Ok(None),
            Value::Real(x) => Ok(Some(*x)),
            Value::Integer(n) => Ok(Some(*n as f64)),
            other => Err(mismatch("real", other, arg)),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Blob(_) => "blob",
        }
    }
}

fn mismatch(expected: &'static str, actual: &Value, arg: usize) -> Error {
    Error::invalid_argument(format!(
        "expected {expected} argument, got {}",
        actual.type_name()
    ))
    .with_context("argument", arg)
}

impl From<Option<Vec<u8>>> for Value {
    fn from(value: Option<Vec<u8>>) -> Self {
        value.map_or(Value::Null, Value::Blob)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Null, Value::Real)
    }
}

/// Integers go back to the host bit-for-bit, mirroring [`Value::as_u64`].
impl From<Option<u64>> for Value {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Value::Null, |n| Value::Integer(n as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_integers_keep_their_bits() {
        assert_eq!(Value::Integer(-1).as_u64(0).unwrap(), Some(u64::MAX));
        assert_eq!(Value::from(Some(u64::MAX)), Value::Integer(-1));
        assert_eq!(Value::Null.as_u64(0).unwrap(), None);
    }

    #[test]
    fn test_type_mismatch() {
        let err = Value::Real(1.5).as_blob(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "InvalidArgument, context: { argument: 1 } => expected blob argument, got real"
        );
        assert!(Value::Blob(vec![]).as_u64(0).is_err());
        assert_eq!(Value::Integer(3).as_f64(1).unwrap(), Some(3.0));
    }
}
