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

//! Reading and writing graph nodes whose concrete type is only known at runtime.
//!
//! Layout of one node:
//!
//! ```text
//! Null                      absent
//! Ref        varuint32 id   node already seen in this stream
//! RefValue   type id, data  first occurrence, gets the next reference id
//! NotNullValue type id, data  node written without reference tracking
//! ```

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::{TypeInfo, TypeResolver};
use crate::serializer::{Object, Serializer};
use crate::types::RefFlag;
use std::sync::Arc;

pub fn write_any(context: &mut WriteContext, value: Option<&Object>) -> Result<(), Error> {
    let Some(value) = value else {
        context.writer.write_i8(RefFlag::Null as i8);
        return Ok(());
    };
    if write_value_flag(context, value) {
        return Ok(());
    }
    let type_info = context
        .get_type_resolver()
        .get_type_info_of(value.as_ref())?;
    context.writer.write_varuint32(type_info.get_type_id());
    write_with(type_info.get_serializer()?.as_ref(), context, value)
}

/// Writes the flag of a present value. Returns `true` when the value was
/// written before and a back reference now stands in its place.
pub fn write_value_flag(context: &mut WriteContext, value: &Object) -> bool {
    if context.is_track_ref() {
        context.ref_writer.try_write_ref(&mut context.writer, value)
    } else {
        context.writer.write_i8(RefFlag::NotNullValue as i8);
        false
    }
}

/// Writes a present value's data with a known serializer.
#[inline]
pub fn write_with(
    serializer: &dyn Serializer,
    context: &mut WriteContext,
    value: &Object,
) -> Result<(), Error> {
    context.inc_depth()?;
    serializer.write(context, value.as_ref())?;
    context.dec_depth();
    Ok(())
}

pub fn read_any(context: &mut ReadContext) -> Result<Option<Object>, Error> {
    let ref_flag = context.ref_reader.read_ref_flag(&mut context.reader)?;
    match ref_flag {
        RefFlag::Null => Ok(None),
        RefFlag::Ref => {
            let ref_id = context.ref_reader.read_ref_id(&mut context.reader)?;
            context.ref_reader.get_ref(ref_id).map(Some)
        }
        RefFlag::NotNullValue | RefFlag::RefValue => {
            // Reserved before the type id so ids follow the writer's order.
            let ref_id =
                (ref_flag == RefFlag::RefValue).then(|| context.ref_reader.reserve_ref_id());
            let type_id = context.reader.read_varuint32()?;
            let type_info = context.get_type_resolver().get_type_info_by_id(type_id)?;
            let serializer = type_info.get_serializer()?;
            read_value(serializer.as_ref(), context, &type_info, ref_id).map(Some)
        }
    }
}

/// Reads a present value in two phases. The allocated shell is stored under
/// `ref_id` before its contents are read.
pub fn read_value(
    serializer: &dyn Serializer,
    context: &mut ReadContext,
    type_info: &Arc<TypeInfo>,
    ref_id: Option<u32>,
) -> Result<Object, Error> {
    context.inc_depth()?;
    let Some(value) = serializer.create(context, type_info)? else {
        return Err(Error::invalid_data(format!(
            "Null value of type {} after a non-null flag",
            type_info.get_name()
        )));
    };
    if let Some(ref_id) = ref_id {
        context.ref_reader.set_ref(ref_id, value.clone());
    }
    serializer.read(context, &value)?;
    context.dec_depth();
    Ok(value)
}

/// Reads one value with a known serializer, without a reference flag.
#[inline]
pub fn read_with(
    serializer: &dyn Serializer,
    context: &mut ReadContext,
    type_info: &Arc<TypeInfo>,
) -> Result<Option<Object>, Error> {
    context.inc_depth()?;
    let value = serializer.create(context, type_info)?;
    if let Some(value) = &value {
        serializer.read(context, value)?;
    }
    context.dec_depth();
    Ok(value)
}

/// Shallow copy through the value's registered serializer.
pub fn copy(type_resolver: &TypeResolver, value: &Object) -> Result<Object, Error> {
    let type_info = type_resolver.get_type_info_of(value.as_ref())?;
    type_info.get_serializer()?.copy(value)
}

pub fn copy_or_null(
    type_resolver: &TypeResolver,
    value: Option<&Object>,
) -> Result<Option<Object>, Error> {
    value.map(|value| copy(type_resolver, value)).transpose()
}
