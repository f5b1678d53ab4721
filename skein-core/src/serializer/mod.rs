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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeInfo;
use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

pub mod any;
pub mod length;
mod number;
pub mod object_array;
pub mod primitive_array;
pub mod string;

/// A node of a deserialized object graph.
///
/// Identity is the `Rc` allocation, which is what reference tracking keys on.
pub type Object = Rc<dyn Any>;

/// Codec for one registered type, looked up through the type resolver.
///
/// Implementations hold configuration only; all per-call state lives in the
/// contexts, so one instance may serve concurrent calls on separate streams.
///
/// Decoding happens in two steps. [`Serializer::create`] reads enough to
/// allocate the value and returns it; the caller may then publish the value's
/// identity to the reference table before [`Serializer::read`] fills it in.
/// Codecs whose values cannot refer back to themselves do all the work in
/// `create` and keep the default no-op `read`.
pub trait Serializer: Send + Sync + 'static {
    /// Write a present value.
    fn write(&self, context: &mut WriteContext, value: &dyn Any) -> Result<(), Error>;

    /// Write an absent value. Only codecs with an in-band null encoding support this.
    fn write_null(&self, _context: &mut WriteContext) -> Result<(), Error> {
        Err(Error::not_allowed(
            "Serializer has no encoding for an absent value",
        ))
    }

    /// Read enough to allocate the value. `None` means the stream holds an absent value.
    fn create(
        &self,
        context: &mut ReadContext,
        type_info: &Arc<TypeInfo>,
    ) -> Result<Option<Object>, Error>;

    /// Populate a value returned by [`Serializer::create`].
    fn read(&self, _context: &mut ReadContext, _value: &Object) -> Result<(), Error> {
        Ok(())
    }

    /// Shallow duplicate of a present value.
    fn copy(&self, value: &Object) -> Result<Object, Error>;
}

/// Static serialization hooks for a concrete value type.
///
/// Register an implementing type with
/// [`Skein::register`](crate::skein::Skein::register) to make it usable as a
/// graph node and as an object-array component type.
pub trait SkeinObject: Clone + 'static {
    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error>;

    fn read_data(context: &mut ReadContext) -> Result<Self, Error>;
}

/// Adapts a [`SkeinObject`] type to the dynamic [`Serializer`] interface.
pub struct TypedSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for TypedSerializer<T> {
    fn default() -> Self {
        TypedSerializer {
            _marker: PhantomData,
        }
    }
}

impl<T: SkeinObject> TypedSerializer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn downcast(value: &dyn Any) -> Result<&T, Error> {
        value.downcast_ref::<T>().ok_or_else(|| {
            Error::enhance_type_error::<T>(Error::type_error(
                "Value does not match the serializer's type",
            ))
        })
    }
}

impl<T: SkeinObject> Serializer for TypedSerializer<T> {
    fn write(&self, context: &mut WriteContext, value: &dyn Any) -> Result<(), Error> {
        Self::downcast(value)?.write_data(context)
    }

    fn create(
        &self,
        context: &mut ReadContext,
        _type_info: &Arc<TypeInfo>,
    ) -> Result<Option<Object>, Error> {
        Ok(Some(Rc::new(T::read_data(context)?)))
    }

    fn copy(&self, value: &Object) -> Result<Object, Error> {
        Ok(Rc::new(Self::downcast(value.as_ref())?.clone()))
    }
}
