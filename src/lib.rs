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

//! # Heistogram
//!
//! A compact, mergeable histogram sketch for approximate order statistics (count, minimum,
//! maximum and percentiles) over unsigned 64-bit values. Sketches are designed to live as opaque
//! binary blobs inside a relational store and to be manipulated through pure functions.
//!
//! This library is divided into modules that constitute distinct groups of functionality:
//!
//! - [`heistogram`]: the sketch itself, its bucketing function, estimator and binary encoding.
//! - [`sql`]: the function layer a database host binds to, with null handling, aggregate
//!   accumulation and a function registry.
//! - [`error`]: the error type shared by every operation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod codec;

pub mod error;
pub mod heistogram;
pub mod sql;
