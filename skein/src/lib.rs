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

//! # Skein
//!
//! Skein is a compact binary serializer for arrays and the object graphs
//! they belong to.
//!
//! ## Key Features
//!
//! - **Fixed-element arrays**: bytes, shorts, chars, ints, longs, floats,
//!   doubles, booleans and strings, each with a dedicated layout
//! - **Object arrays**: per-array choice between one shared element
//!   serializer and polymorphic per-element dispatch
//! - **Reference tracking**: shared and cyclic references survive a round
//!   trip, including an array that contains itself
//! - **Shallow copy** of any registered value
//!
//! ## Fixed-element arrays
//!
//! Absent and empty arrays are distinct on the wire:
//!
//! ```rust
//! use skein::Skein;
//!
//! let skein = Skein::default();
//! assert_eq!(skein.serialize_array::<i64>(None).unwrap(), vec![0]);
//! assert_eq!(skein.serialize_array::<i64>(Some(&[])).unwrap(), vec![1]);
//!
//! let bytes = skein.serialize_array(Some(&[1.5f64, -0.25][..])).unwrap();
//! let doubles: Option<Vec<f64>> = skein.deserialize_array(&bytes).unwrap();
//! assert_eq!(doubles, Some(vec![1.5, -0.25]));
//! ```
//!
//! ## Object arrays
//!
//! An array declared over the abstract `OBJECT` type records each
//! element's concrete type:
//!
//! ```rust
//! use skein::{types, Object, ObjectArray, Skein};
//! use std::rc::Rc;
//!
//! let skein = Skein::default();
//! let array = skein
//!     .new_object_array(
//!         types::OBJECT,
//!         vec![Some(Rc::new(1i32) as Object), None, Some(Rc::new(vec![1u8, 2]) as Object)],
//!     )
//!     .unwrap();
//! let bytes = skein
//!     .serialize_object_array(types::OBJECT_ARRAY, Some(&array))
//!     .unwrap();
//! let decoded = skein
//!     .deserialize_object_array(types::OBJECT_ARRAY, &bytes)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(decoded.len(), 3);
//! assert_eq!(decoded.get(0).unwrap().downcast_ref::<i32>(), Some(&1));
//! assert!(decoded.get(1).is_none());
//! ```
//!
//! Arrays of a registered component type can skip the per-element type id
//! and, when nulls are ruled out, the presence marker too:
//!
//! ```rust
//! use skein::{types, Object, ObjectArraySerializer, Skein};
//! use std::rc::Rc;
//!
//! let mut skein = Skein::default();
//! skein
//!     .register_object_array(
//!         100,
//!         types::STRING,
//!         ObjectArraySerializer::new().elements_can_be_null(false),
//!     )
//!     .unwrap();
//! let array = skein
//!     .new_object_array(types::STRING, vec![Some(Rc::new("a".to_string()) as Object)])
//!     .unwrap();
//! let bytes = skein.serialize_object_array(100, Some(&array)).unwrap();
//! // length token, string header, one Latin-1 byte
//! assert_eq!(bytes, vec![2, 1 << 2, b'a']);
//! ```

pub use skein_core::{
    error::Error,
    serializer::object_array::{ObjectArray, ObjectArraySerializer},
    serializer::primitive_array::ArrayElement,
    serializer::{Object, Serializer, SkeinObject},
    skein::Skein,
    types,
};
