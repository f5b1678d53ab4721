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

//! Codecs for arrays of a fixed element kind.
//!
//! Layout: the length token from [`length`](crate::serializer::length),
//! followed by the elements back to back with no per-element marker.
//!
//! | element | encoding per element |
//! |---------|----------------------|
//! | `u8`, `i8`, `bool` | 1 byte |
//! | `i16`, `u16` (char) | 2 bytes little endian |
//! | `i32`, `i64` | zigzag varint |
//! | `f32`, `f64` | IEEE 754 bits, little endian |
//! | `String`, `Option<String>` | string header + payload |

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeInfo;
use crate::serializer::length::{read_length, write_length};
use crate::serializer::string::{read_nullable_string, read_string, write_nullable_str, write_str};
use crate::serializer::{Object, Serializer};
use crate::types::{ElementKind, TypeId};
use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

/// Element type of a fixed-kind array.
pub trait ArrayElement: Clone + 'static {
    const KIND: ElementKind;
    /// Wire id of `Vec<Self>` when it appears as a graph node.
    const ARRAY_TYPE_ID: TypeId;

    fn write_element(&self, writer: &mut Writer) -> Result<(), Error>;

    fn read_element(reader: &mut Reader) -> Result<Self, Error>;

    #[inline]
    fn write_elements(elements: &[Self], writer: &mut Writer) -> Result<(), Error> {
        for element in elements {
            element.write_element(writer)?;
        }
        Ok(())
    }

    fn read_elements(reader: &mut Reader, len: usize) -> Result<Vec<Self>, Error> {
        let mut elements = allocate(len)?;
        for _ in 0..len {
            elements.push(Self::read_element(reader)?);
        }
        Ok(elements)
    }
}

#[inline]
fn allocate<K>(len: usize) -> Result<Vec<K>, Error> {
    let mut elements = Vec::new();
    elements.try_reserve_exact(len).map_err(|e| {
        Error::invalid_data(format!("Cannot allocate array of length {}: {}", len, e))
    })?;
    Ok(elements)
}

macro_rules! impl_array_element {
    ($ty:ty, $kind:ident, $type_id:ident, $writer:ident, $reader:ident) => {
        paste::paste! {
            impl ArrayElement for $ty {
                const KIND: ElementKind = ElementKind::$kind;
                const ARRAY_TYPE_ID: TypeId = TypeId::[<$type_id _ARRAY>];

                #[inline(always)]
                fn write_element(&self, writer: &mut Writer) -> Result<(), Error> {
                    writer.$writer(*self);
                    Ok(())
                }

                #[inline(always)]
                fn read_element(reader: &mut Reader) -> Result<Self, Error> {
                    reader.$reader()
                }
            }
        }
    };
}

impl_array_element!(bool, Bool, BOOL, write_bool, read_bool);
impl_array_element!(i8, Int8, INT8, write_i8, read_i8);
impl_array_element!(i16, Int16, INT16, write_i16, read_i16);
impl_array_element!(u16, Char, CHAR, write_u16, read_u16);
impl_array_element!(i32, Int32, INT32, write_varint32, read_varint32);
impl_array_element!(i64, Int64, INT64, write_varint64, read_varint64);
impl_array_element!(f32, Float32, FLOAT32, write_f32, read_f32);
impl_array_element!(f64, Float64, FLOAT64, write_f64, read_f64);

// Byte arrays are copied as one block.
impl ArrayElement for u8 {
    const KIND: ElementKind = ElementKind::Int8;
    const ARRAY_TYPE_ID: TypeId = TypeId::BINARY;

    #[inline(always)]
    fn write_element(&self, writer: &mut Writer) -> Result<(), Error> {
        writer.write_u8(*self);
        Ok(())
    }

    #[inline(always)]
    fn read_element(reader: &mut Reader) -> Result<Self, Error> {
        reader.read_u8()
    }

    #[inline]
    fn write_elements(elements: &[Self], writer: &mut Writer) -> Result<(), Error> {
        writer.write_bytes(elements);
        Ok(())
    }

    fn read_elements(reader: &mut Reader, len: usize) -> Result<Vec<Self>, Error> {
        let mut elements = allocate(len)?;
        elements.extend_from_slice(reader.read_bytes(len)?);
        Ok(elements)
    }
}

impl ArrayElement for Option<String> {
    const KIND: ElementKind = ElementKind::String;
    const ARRAY_TYPE_ID: TypeId = TypeId::STRING_ARRAY;

    #[inline]
    fn write_element(&self, writer: &mut Writer) -> Result<(), Error> {
        write_nullable_str(writer, self.as_deref())
    }

    #[inline]
    fn read_element(reader: &mut Reader) -> Result<Self, Error> {
        read_nullable_string(reader)
    }
}

/// Same wire layout as `Option<String>`; a null element fails to decode.
impl ArrayElement for String {
    const KIND: ElementKind = ElementKind::String;
    const ARRAY_TYPE_ID: TypeId = TypeId::STRING_ARRAY;

    #[inline]
    fn write_element(&self, writer: &mut Writer) -> Result<(), Error> {
        write_str(writer, self)
    }

    #[inline]
    fn read_element(reader: &mut Reader) -> Result<Self, Error> {
        read_string(reader)
    }
}

pub fn write_array<K: ArrayElement>(writer: &mut Writer, array: Option<&[K]>) -> Result<(), Error> {
    let Some(array) = array else {
        return write_length(writer, None);
    };
    write_length(writer, Some(array.len()))?;
    K::write_elements(array, writer)
}

pub fn read_array<K: ArrayElement>(reader: &mut Reader) -> Result<Option<Vec<K>>, Error> {
    let Some(len) = read_length(reader)? else {
        return Ok(None);
    };
    let min_size = len.saturating_mul(K::KIND.min_wire_size());
    if min_size > reader.remaining() {
        return Err(Error::invalid_data(format!(
            "Array of {} {:?} elements needs at least {} bytes, {} remaining",
            len,
            K::KIND,
            min_size,
            reader.remaining()
        )));
    }
    K::read_elements(reader, len).map(Some)
}

/// Independent array with equal contents.
#[inline]
pub fn copy_array<K: ArrayElement>(array: &[K]) -> Vec<K> {
    array.to_vec()
}

/// Registry entry for `Vec<K>` graph nodes.
pub struct PrimitiveArraySerializer<K> {
    _marker: PhantomData<fn() -> K>,
}

impl<K> Default for PrimitiveArraySerializer<K> {
    fn default() -> Self {
        PrimitiveArraySerializer {
            _marker: PhantomData,
        }
    }
}

impl<K: ArrayElement> PrimitiveArraySerializer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn downcast(value: &dyn Any) -> Result<&Vec<K>, Error> {
        value.downcast_ref::<Vec<K>>().ok_or_else(|| {
            Error::enhance_type_error::<Vec<K>>(Error::type_error(
                "Value does not match the array serializer's element kind",
            ))
        })
    }
}

impl<K: ArrayElement> Serializer for PrimitiveArraySerializer<K> {
    fn write(&self, context: &mut WriteContext, value: &dyn Any) -> Result<(), Error> {
        write_array(&mut context.writer, Some(Self::downcast(value)?.as_slice()))
    }

    fn write_null(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_array::<K>(&mut context.writer, None)
    }

    fn create(
        &self,
        context: &mut ReadContext,
        _type_info: &Arc<TypeInfo>,
    ) -> Result<Option<Object>, Error> {
        Ok(read_array::<K>(&mut context.reader)?.map(|array| Rc::new(array) as Object))
    }

    fn copy(&self, value: &Object) -> Result<Object, Error> {
        Ok(Rc::new(copy_array(Self::downcast(value.as_ref())?)))
    }
}
