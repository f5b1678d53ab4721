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

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum RefFlag {
    Null = -3,
    // Ref indicates that object is a not-null value.
    // We don't use another byte to indicate REF, so that we can save one byte.
    Ref = -2,
    // NotNullValueFlag indicates that the object is a non-null value.
    NotNullValue = -1,
    // RefValueFlag indicates that the object is a referencable and first read.
    RefValue = 0,
}

/// Wire identifiers of the built-in types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum TypeId {
    BOOL = 1,
    INT8 = 2,
    INT16 = 3,
    CHAR = 4,
    INT32 = 5,
    INT64 = 6,
    FLOAT32 = 7,
    FLOAT64 = 8,
    STRING = 9,
    BINARY = 10,
    BOOL_ARRAY = 11,
    INT8_ARRAY = 12,
    INT16_ARRAY = 13,
    CHAR_ARRAY = 14,
    INT32_ARRAY = 15,
    INT64_ARRAY = 16,
    FLOAT32_ARRAY = 17,
    FLOAT64_ARRAY = 18,
    STRING_ARRAY = 19,
    // Abstract root of every reference type, it has no serializer.
    OBJECT = 20,
    OBJECT_ARRAY = 21,
}

pub const BOOL: u32 = TypeId::BOOL as u32;
pub const INT8: u32 = TypeId::INT8 as u32;
pub const INT16: u32 = TypeId::INT16 as u32;
pub const CHAR: u32 = TypeId::CHAR as u32;
pub const INT32: u32 = TypeId::INT32 as u32;
pub const INT64: u32 = TypeId::INT64 as u32;
pub const FLOAT32: u32 = TypeId::FLOAT32 as u32;
pub const FLOAT64: u32 = TypeId::FLOAT64 as u32;
pub const STRING: u32 = TypeId::STRING as u32;
pub const BINARY: u32 = TypeId::BINARY as u32;
pub const BOOL_ARRAY: u32 = TypeId::BOOL_ARRAY as u32;
pub const INT8_ARRAY: u32 = TypeId::INT8_ARRAY as u32;
pub const INT16_ARRAY: u32 = TypeId::INT16_ARRAY as u32;
pub const CHAR_ARRAY: u32 = TypeId::CHAR_ARRAY as u32;
pub const INT32_ARRAY: u32 = TypeId::INT32_ARRAY as u32;
pub const INT64_ARRAY: u32 = TypeId::INT64_ARRAY as u32;
pub const FLOAT32_ARRAY: u32 = TypeId::FLOAT32_ARRAY as u32;
pub const FLOAT64_ARRAY: u32 = TypeId::FLOAT64_ARRAY as u32;
pub const STRING_ARRAY: u32 = TypeId::STRING_ARRAY as u32;
pub const OBJECT: u32 = TypeId::OBJECT as u32;
pub const OBJECT_ARRAY: u32 = TypeId::OBJECT_ARRAY as u32;

/// Ids below this value are reserved for built-in types.
pub const USER_TYPE_ID_START: u32 = 64;

/// Tag selecting which encoding routine the elements of an array use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    Int16,
    Char,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
}

impl ElementKind {
    /// Smallest number of bytes one element of this kind occupies on the wire.
    pub fn min_wire_size(self) -> usize {
        match self {
            ElementKind::Int16 | ElementKind::Char => 2,
            ElementKind::Float32 => 4,
            ElementKind::Float64 => 8,
            _ => 1,
        }
    }
}
