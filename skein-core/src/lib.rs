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

//! # Skein Core
//!
//! Binary codecs for arrays and the object graphs they live in.
//!
//! ## Architecture
//!
//! - **`skein`**: entry point owning the configuration and type registry
//! - **`buffer`**: little-endian [`Writer`](buffer::Writer) and bounds-checked
//!   [`Reader`](buffer::Reader)
//! - **`serializer`**: codec traits, array codecs and polymorphic value dispatch
//! - **`resolver`**: type registry, reference tables and per-call contexts
//! - **`types`**: wire type ids, reference flags and element kinds
//! - **`config`**: reference tracking and depth limits
//! - **`error`**: error type and early-return macros
//!
//! ## Array encodings
//!
//! Every array starts with one varuint32 token: `0` for an absent array,
//! `len + 1` otherwise.
//!
//! Fixed-element arrays (`Vec<u8>`, `Vec<i32>`, `Vec<f64>`,
//! `Vec<Option<String>>`, ...) follow with their elements back to back.
//!
//! Object arrays follow with their elements either through the component
//! type's serializer (final components, or a codec configured with
//! `elements_are_same_type`) or through full polymorphic dispatch that
//! writes each element's concrete type id. Both modes preserve shared and
//! cyclic references unless the codec drops the per-element marker with
//! `elements_can_be_null(false)`.
//!
//! ```rust
//! use skein_core::skein::Skein;
//!
//! let skein = Skein::default();
//! let bytes = skein.serialize_array(Some(&[1i32, -2, 3][..])).unwrap();
//! assert_eq!(bytes, vec![4, 2, 3, 6]);
//! let array: Option<Vec<i32>> = skein.deserialize_array(&bytes).unwrap();
//! assert_eq!(array, Some(vec![1, -2, 3]));
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod resolver;
pub mod serializer;
pub mod skein;
pub mod types;

pub use crate::error::Error;
pub use crate::skein::Skein;
