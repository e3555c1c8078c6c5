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

use std::collections::BTreeMap;

use tracing::debug;

use super::Value;
use super::aggregate::Accumulator;
use super::aggregate::AggregateMode;
use crate::error::Error;

/// Signature of a scalar function.
pub type ScalarFn = fn(&[Value]) -> Result<Value, Error>;

/// Creates the state of a new aggregation group.
pub type AggregateFactory = fn() -> Box<dyn AggregateFunction>;

/// Per-group state of an aggregate function.
pub trait AggregateFunction {
    /// Feeds one row into the group.
    fn step(&mut self, args: &[Value]) -> Result<(), Error>;

    /// Produces the group result and releases the state.
    fn finalize(self: Box<Self>) -> Result<Value, Error>;
}

impl AggregateFunction for Accumulator {
    fn step(&mut self, args: &[Value]) -> Result<(), Error> {
        let [arg] = fixed_args::<1>(args)?;
        match self.mode() {
            AggregateMode::Merge => self.step_sketch(arg.as_blob(0)?),
            AggregateMode::Add | AggregateMode::Remove => self.step_value(arg.as_u64(0)?),
        }
    }

    fn finalize(self: Box<Self>) -> Result<Value, Error> {
        Accumulator::finalize(*self).map(Value::Blob)
    }
}

/// Number of arguments a function takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(u8),
    /// Any number of arguments.
    Variadic,
}

impl Arity {
    /// Arity in the convention of hosts such as SQLite, where `-1` means variadic.
    pub fn to_host(self) -> i32 {
        match self {
            Arity::Exact(n) => n as i32,
            Arity::Variadic => -1,
        }
    }
}

/// How a function is evaluated.
#[derive(Debug, Clone, Copy)]
pub enum FunctionKind {
    /// Evaluated once per call.
    Scalar(ScalarFn),
    /// Evaluated over an aggregation group.
    Aggregate(AggregateFactory),
}

/// A function exposed to the host.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    name: &'static str,
    arity: Arity,
    kind: FunctionKind,
}

impl FunctionDef {
    const fn scalar(name: &'static str, arity: Arity, f: ScalarFn) -> Self {
        FunctionDef {
            name,
            arity,
            kind: FunctionKind::Scalar(f),
        }
    }

    const fn aggregate(name: &'static str, factory: AggregateFactory) -> Self {
        FunctionDef {
            name,
            arity: Arity::Exact(1),
            kind: FunctionKind::Aggregate(factory),
        }
    }

    /// Returns the SQL name of the function.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of arguments the function takes.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Returns how the function is evaluated.
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }
}

/// Table of every function the host registers, built once at startup.
///
/// # Examples
///
/// ```
/// # use heistogram::sql::{FunctionRegistry, Value};
/// let registry = FunctionRegistry::new();
/// let sketch = registry
///     .call_scalar("heist_create", &[Value::Integer(3), Value::Null, Value::Integer(9)])
///     .unwrap();
/// let count = registry.call_scalar("heist_count", &[sketch]).unwrap();
/// assert_eq!(count, Value::Integer(2));
///
/// let mut group = registry.new_aggregate("heist_group_add").unwrap();
/// group.step(&[Value::Integer(7)]).unwrap();
/// assert!(matches!(group.finalize().unwrap(), Value::Blob(_)));
/// ```
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<&'static str, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Builds the registry of all heistogram functions.
    pub fn new() -> Self {
        let defs = [
            FunctionDef::scalar("heist_create", Arity::Variadic, heist_create),
            FunctionDef::scalar("heist_add", Arity::Exact(2), heist_add),
            FunctionDef::scalar("heist_remove", Arity::Exact(2), heist_remove),
            FunctionDef::scalar("heist_merge", Arity::Exact(2), heist_merge),
            FunctionDef::scalar("heist_percentile", Arity::Exact(2), heist_percentile),
            FunctionDef::scalar("heist_count", Arity::Exact(1), heist_count),
            FunctionDef::scalar("heist_min", Arity::Exact(1), heist_min),
            FunctionDef::scalar("heist_max", Arity::Exact(1), heist_max),
            FunctionDef::scalar("heist_bucket_count", Arity::Exact(1), heist_bucket_count),
            FunctionDef::scalar("heist_min_bucket", Arity::Exact(1), heist_min_bucket),
            FunctionDef::aggregate("heist_group_create", || group(AggregateMode::Add)),
            FunctionDef::aggregate("heist_group_add", || group(AggregateMode::Add)),
            FunctionDef::aggregate("heist_group_remove", || group(AggregateMode::Remove)),
            FunctionDef::aggregate("heist_group_merge", || group(AggregateMode::Merge)),
        ];
        let functions: BTreeMap<_, _> = defs.into_iter().map(|def| (def.name, def)).collect();
        debug!(functions = functions.len(), "built heistogram function registry");
        FunctionRegistry { functions }
    }

    /// Looks up a function by name.
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Iterates over all functions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    /// Calls the scalar function `name`.
    pub fn call_scalar(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        match self.lookup(name)?.kind {
            FunctionKind::Scalar(f) => f(args).map_err(|err| err.with_context("function", name)),
            FunctionKind::Aggregate(_) => Err(Error::invalid_argument(format!(
                "{name} is an aggregate function"
            ))),
        }
    }

    /// Creates the state of a new aggregation group for the aggregate function `name`.
    pub fn new_aggregate(&self, name: &str) -> Result<Box<dyn AggregateFunction>, Error> {
        match self.lookup(name)?.kind {
            FunctionKind::Aggregate(factory) => Ok(factory()),
            FunctionKind::Scalar(_) => Err(Error::invalid_argument(format!(
                "{name} is a scalar function"
            ))),
        }
    }

    fn lookup(&self, name: &str) -> Result<&FunctionDef, Error> {
        self.get(name).ok_or_else(|| {
            debug!(function = name, "call to unknown heistogram function");
            Error::invalid_argument(format!("unknown function {name}"))
        })
    }
}

fn group(mode: AggregateMode) -> Box<dyn AggregateFunction> {
    Box::new(Accumulator::new(mode))
}

fn fixed_args<const N: usize>(args: &[Value]) -> Result<&[Value; N], Error> {
    args.try_into().map_err(|_| {
        Error::invalid_argument(format!("expected {N} arguments, got {}", args.len()))
    })
}

fn heist_create(args: &[Value]) -> Result<Value, Error> {
    let values = args
        .iter()
        .enumerate()
        .map(|(index, arg)| arg.as_u64(index))
        .collect::<Result<Vec<_>, _>>()?;
    super::create(values).map(Value::Blob)
}

fn heist_add(args: &[Value]) -> Result<Value, Error> {
    let [sketch, value] = fixed_args::<2>(args)?;
    super::add(sketch.as_blob(0)?, value.as_u64(1)?).map(Value::from)
}

fn heist_remove(args: &[Value]) -> Result<Value, Error> {
    let [sketch, value] = fixed_args::<2>(args)?;
    super::remove(sketch.as_blob(0)?, value.as_u64(1)?).map(Value::from)
}

fn heist_merge(args: &[Value]) -> Result<Value, Error> {
    let [a, b] = fixed_args::<2>(args)?;
    super::merge(a.as_blob(0)?, b.as_blob(1)?).map(Value::from)
}

fn heist_percentile(args: &[Value]) -> Result<Value, Error> {
    let [sketch, p] = fixed_args::<2>(args)?;
    super::percentile(sketch.as_blob(0)?, p.as_f64(1)?).map(Value::from)
}

fn heist_count(args: &[Value]) -> Result<Value, Error> {
    let [sketch] = fixed_args::<1>(args)?;
    super::count(sketch.as_blob(0)?).map(Value::from)
}

fn heist_min(args: &[Value]) -> Result<Value, Error> {
    let [sketch] = fixed_args::<1>(args)?;
    super::min(sketch.as_blob(0)?).map(Value::from)
}

fn heist_max(args: &[Value]) -> Result<Value, Error> {
    let [sketch] = fixed_args::<1>(args)?;
    super::max(sketch.as_blob(0)?).map(Value::from)
}

fn heist_bucket_count(args: &[Value]) -> Result<Value, Error> {
    let [sketch] = fixed_args::<1>(args)?;
    super::bucket_count(sketch.as_blob(0)?).map(Value::from)
}

fn heist_min_bucket(args: &[Value]) -> Result<Value, Error> {
    let [sketch] = fixed_args::<1>(args)?;
    super::min_bucket(sketch.as_blob(0)?).map(Value::from)
}
