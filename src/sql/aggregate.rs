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

use tracing::debug;

use crate::error::Error;
use crate::heistogram::Heistogram;

/// What an aggregation group does with each contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    /// Each contribution is a value to add.
    Add,
    /// Each contribution is a value to remove.
    Remove,
    /// Each contribution is an encoded partial sketch to merge.
    Merge,
}

/// State of one aggregation group.
///
/// The sketch is created on the first non-null contribution and handed out once by
/// [`Accumulator::finalize`]. Null contributions are skipped.
///
/// # Examples
///
/// ```
/// # use heistogram::sql::{Accumulator, AggregateMode};
/// let mut group = Accumulator::new(AggregateMode::Add);
/// for value in [Some(4), None, Some(8)] {
///     group.step_value(value).unwrap();
/// }
/// let bytes = group.finalize().unwrap();
/// assert_eq!(heistogram::sql::count(Some(&bytes)).unwrap(), Some(2));
///
/// assert!(Accumulator::new(AggregateMode::Add).finalize().is_err());
/// ```
#[derive(Debug)]
pub struct Accumulator {
    mode: AggregateMode,
    sketch: Option<Heistogram>,
}

impl Accumulator {
    /// Creates the state of a new aggregation group.
    pub fn new(mode: AggregateMode) -> Self {
        Accumulator { mode, sketch: None }
    }

    /// Returns the mode of this group.
    pub fn mode(&self) -> AggregateMode {
        self.mode
    }

    /// Returns true once a non-null contribution has been accepted.
    pub fn has_contributions(&self) -> bool {
        self.sketch.is_some()
    }

    /// Contributes a value to an [`Add`](AggregateMode::Add) or
    /// [`Remove`](AggregateMode::Remove) group.
    pub fn step_value(&mut self, value: Option<u64>) -> Result<(), Error> {
        let Some(value) = value else {
            return Ok(());
        };
        match self.mode {
            AggregateMode::Add => self.contribute(|sketch| sketch.add(value)),
            AggregateMode::Remove => self.contribute(|sketch| {
                sketch.remove(value);
                Ok(())
            }),
            AggregateMode::Merge => Err(Error::invalid_argument(
                "merge aggregation expects encoded sketches, not values",
            )),
        }
    }

    /// Contributes an encoded partial sketch to a [`Merge`](AggregateMode::Merge) group.
    pub fn step_sketch(&mut self, bytes: Option<&[u8]>) -> Result<(), Error> {
        let Some(bytes) = bytes else {
            return Ok(());
        };
        match self.mode {
            AggregateMode::Merge => self.contribute(|sketch| sketch.merge_serialized(bytes)),
            mode => Err(Error::invalid_argument(format!(
                "{mode:?} aggregation expects values, not encoded sketches"
            ))),
        }
    }

    /// Encodes the accumulated sketch and releases the group state.
    ///
    /// Fails with [`EmptySketch`](crate::error::ErrorKind::EmptySketch) if the group never
    /// received a non-null contribution.
    pub fn finalize(self) -> Result<Vec<u8>, Error> {
        match self.sketch {
            Some(sketch) => sketch.try_serialize(),
            None => {
                debug!(mode = ?self.mode, "finalizing aggregation group without contributions");
                Err(Error::empty_sketch("no sketch was accumulated by this group"))
            }
        }
    }

    /// Applies `op` to the group sketch; a sketch created for a failing first contribution is
    /// dropped so the group stays without contributions.
    fn contribute<F>(&mut self, op: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Heistogram) -> Result<(), Error>,
    {
        match self.sketch.as_mut() {
            Some(sketch) => op(sketch),
            None => {
                let mut sketch = Heistogram::new();
                op(&mut sketch)?;
                self.sketch = Some(sketch);
                Ok(())
            }
        }
    }
}
