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

//! Arrays of references to a declared component type.
//!
//! After the length token every element is written in one of two modes,
//! chosen per array from the codec flags and the component type:
//!
//! * Single codec: the component type is final, or the codec was told that
//!   all elements share the component type. The component's serializer is
//!   resolved once and writes each element without a type id. With
//!   `elements_can_be_null` each element is preceded by a one byte
//!   [`RefFlag`]: `Null`, `Ref` followed by the id of an object already
//!   written, or `RefValue` (`NotNullValue` without reference tracking)
//!   followed by the value. Without the flag there is no marker, every
//!   element is written in full and must encode to at least one byte.
//! * Polymorphic: each element goes through [`write_any`], which writes a
//!   reference flag, then the concrete type id and the value.
//!
//! Decoding allocates the array before any element is read, so an element
//! may refer back to the array that contains it.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeInfo;
use crate::serializer::any::{
    read_any, read_value, read_with, write_any, write_value_flag, write_with,
};
use crate::serializer::length::{read_length, write_length};
use crate::serializer::{Object, Serializer};
use crate::types::RefFlag;
use std::any::Any;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

/// Array of optional graph nodes with a declared component type.
pub struct ObjectArray {
    component: Arc<TypeInfo>,
    elements: RefCell<Vec<Option<Object>>>,
}

impl ObjectArray {
    pub fn new(component: Arc<TypeInfo>, elements: Vec<Option<Object>>) -> Rc<ObjectArray> {
        Rc::new(ObjectArray {
            component,
            elements: RefCell::new(elements),
        })
    }

    /// Array of `len` null elements.
    pub fn with_len(component: Arc<TypeInfo>, len: usize) -> Result<Rc<ObjectArray>, Error> {
        let mut elements = Vec::new();
        elements.try_reserve_exact(len).map_err(|e| {
            Error::invalid_data(format!("Cannot allocate array of length {}: {}", len, e))
        })?;
        elements.resize(len, None);
        Ok(Self::new(component, elements))
    }

    #[inline(always)]
    pub fn component_type(&self) -> &Arc<TypeInfo> {
        &self.component
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Element at `index`; `None` for a null element or an index out of range.
    pub fn get(&self, index: usize) -> Option<Object> {
        self.elements.borrow().get(index).cloned().flatten()
    }

    /// Replaces the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set(&self, index: usize, value: Option<Object>) {
        self.elements.borrow_mut()[index] = value;
    }

    pub fn elements(&self) -> Ref<'_, Vec<Option<Object>>> {
        self.elements.borrow()
    }

    /// Nulls every element, breaking reference cycles through this array.
    pub fn clear(&self) {
        for element in self.elements.borrow_mut().iter_mut() {
            *element = None;
        }
    }
}

impl std::fmt::Debug for ObjectArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // elements may contain this array
        f.debug_struct("ObjectArray")
            .field("component", &self.component.get_name())
            .field("len", &self.len())
            .finish()
    }
}

/// Codec for [`ObjectArray`].
///
/// ```rust
/// use skein_core::serializer::object_array::ObjectArraySerializer;
///
/// let serializer = ObjectArraySerializer::new()
///     .elements_are_same_type(true)
///     .elements_can_be_null(false);
/// assert!(serializer.are_elements_same_type());
/// assert!(!serializer.can_elements_be_null());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ObjectArraySerializer {
    elements_are_same_type: bool,
    elements_can_be_null: bool,
}

impl Default for ObjectArraySerializer {
    fn default() -> Self {
        ObjectArraySerializer {
            elements_are_same_type: false,
            elements_can_be_null: true,
        }
    }
}

impl ObjectArraySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promise that every element is exactly of the component type.
    ///
    /// Writing an element of another type fails instead of silently losing
    /// its concrete type.
    pub fn elements_are_same_type(mut self, value: bool) -> Self {
        self.elements_are_same_type = value;
        self
    }

    /// With `false`, the single-codec mode omits the presence marker.
    pub fn elements_can_be_null(mut self, value: bool) -> Self {
        self.elements_can_be_null = value;
        self
    }

    #[inline(always)]
    pub fn are_elements_same_type(&self) -> bool {
        self.elements_are_same_type
    }

    #[inline(always)]
    pub fn can_elements_be_null(&self) -> bool {
        self.elements_can_be_null
    }

    /// The shared element serializer, or `None` for polymorphic dispatch.
    #[inline]
    fn element_serializer<'t>(
        &self,
        component: &'t TypeInfo,
    ) -> Result<Option<&'t Arc<dyn Serializer>>, Error> {
        if self.elements_are_same_type || component.is_final() {
            let serializer = component.get_serializer().map_err(|e| {
                Error::type_error(format!(
                    "Elements of {}[] cannot share one serializer: {}",
                    component.get_name(),
                    e
                ))
            })?;
            Ok(Some(serializer))
        } else {
            Ok(None)
        }
    }

    pub fn write_array(
        &self,
        context: &mut WriteContext,
        array: Option<&ObjectArray>,
    ) -> Result<(), Error> {
        let Some(array) = array else {
            return write_length(&mut context.writer, None);
        };
        let elements = array.elements();
        write_length(&mut context.writer, Some(elements.len()))?;
        let component = array.component_type();
        match self.element_serializer(component)? {
            Some(serializer) => {
                trace!(
                    component = component.get_name(),
                    len = elements.len(),
                    with_marker = self.elements_can_be_null,
                    "writing object array with single serializer"
                );
                for element in elements.iter() {
                    match element {
                        Some(value) if self.elements_can_be_null => {
                            if !write_value_flag(context, value) {
                                write_with(serializer.as_ref(), context, value)?;
                            }
                        }
                        Some(value) => {
                            let start = context.writer.len();
                            write_with(serializer.as_ref(), context, value)?;
                            if context.writer.len() == start {
                                return Err(Error::not_allowed(format!(
                                    "{}[] elements encode to no bytes and need a marker",
                                    component.get_name()
                                )));
                            }
                        }
                        None if self.elements_can_be_null => {
                            context.writer.write_i8(RefFlag::Null as i8);
                        }
                        None => serializer.write_null(context)?,
                    }
                }
            }
            None => {
                trace!(
                    component = component.get_name(),
                    len = elements.len(),
                    "writing polymorphic object array"
                );
                for element in elements.iter() {
                    write_any(context, element.as_ref())?;
                }
            }
        }
        Ok(())
    }

    /// Reads the length token and allocates an array of null elements.
    pub fn create_shell(
        &self,
        context: &mut ReadContext,
        type_info: &Arc<TypeInfo>,
    ) -> Result<Option<Rc<ObjectArray>>, Error> {
        let Some(len) = read_length(&mut context.reader)? else {
            return Ok(None);
        };
        let component = type_info.get_component().ok_or_else(|| {
            Error::type_error(format!(
                "Type {} is not an object array type",
                type_info.get_name()
            ))
        })?;
        // every element occupies at least one byte
        if len > context.reader.remaining() {
            return Err(Error::invalid_data(format!(
                "Array of {} elements exceeds the {} remaining bytes",
                len,
                context.reader.remaining()
            )));
        }
        ObjectArray::with_len(component.clone(), len).map(Some)
    }

    /// Reads the elements into an array returned by [`Self::create_shell`].
    pub fn populate(&self, context: &mut ReadContext, array: &ObjectArray) -> Result<(), Error> {
        let component = array.component_type().clone();
        let len = array.len();
        match self.element_serializer(&component)? {
            Some(serializer) => {
                for index in 0..len {
                    let value = if self.elements_can_be_null {
                        Self::read_marked(serializer.as_ref(), context, &component)?
                    } else {
                        read_with(serializer.as_ref(), context, &component)?
                    };
                    array.set(index, value);
                }
            }
            None => {
                for index in 0..len {
                    let value = read_any(context)?;
                    array.set(index, value);
                }
            }
        }
        Ok(())
    }

    fn read_marked(
        serializer: &dyn Serializer,
        context: &mut ReadContext,
        component: &Arc<TypeInfo>,
    ) -> Result<Option<Object>, Error> {
        match context.ref_reader.read_ref_flag(&mut context.reader)? {
            RefFlag::Null => Ok(None),
            RefFlag::Ref => {
                let ref_id = context.ref_reader.read_ref_id(&mut context.reader)?;
                context.ref_reader.get_ref(ref_id).map(Some)
            }
            RefFlag::NotNullValue => read_value(serializer, context, component, None).map(Some),
            RefFlag::RefValue => {
                let ref_id = context.ref_reader.reserve_ref_id();
                read_value(serializer, context, component, Some(ref_id)).map(Some)
            }
        }
    }

    fn downcast(value: &dyn Any) -> Result<&ObjectArray, Error> {
        value
            .downcast_ref::<ObjectArray>()
            .ok_or_else(|| Error::type_error("Value is not an object array"))
    }
}

impl Serializer for ObjectArraySerializer {
    fn write(&self, context: &mut WriteContext, value: &dyn Any) -> Result<(), Error> {
        self.write_array(context, Some(Self::downcast(value)?))
    }

    fn write_null(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.write_array(context, None)
    }

    fn create(
        &self,
        context: &mut ReadContext,
        type_info: &Arc<TypeInfo>,
    ) -> Result<Option<Object>, Error> {
        Ok(self
            .create_shell(context, type_info)?
            .map(|array| array as Object))
    }

    fn read(&self, context: &mut ReadContext, value: &Object) -> Result<(), Error> {
        self.populate(context, Self::downcast(value.as_ref())?)
    }

    /// New array holding the same element references.
    fn copy(&self, value: &Object) -> Result<Object, Error> {
        let array = Self::downcast(value.as_ref())?;
        let elements = array.elements().clone();
        Ok(ObjectArray::new(array.component_type().clone(), elements))
    }
}
