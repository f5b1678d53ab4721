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

use crate::buffer::Reader;
use crate::config::Config;
use crate::ensure;
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::{TypeInfo, TypeResolver};
use crate::serializer::any::{self, read_any, write_any};
use crate::serializer::object_array::{ObjectArray, ObjectArraySerializer};
use crate::serializer::primitive_array::{read_array, write_array, ArrayElement};
use crate::serializer::{Object, Serializer, SkeinObject};
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;

/// Entry point holding the configuration and the type registry.
///
/// Registration takes `&mut self`, every other operation takes `&self` and
/// builds its own per-call context, so a configured `Skein` can be shared
/// between threads behind an `Arc`.
///
/// # Examples
///
/// ```rust
/// use skein_core::serializer::Object;
/// use skein_core::skein::Skein;
/// use std::rc::Rc;
///
/// let skein = Skein::default();
/// let array = skein
///     .new_object_array(
///         skein_core::types::OBJECT,
///         vec![Some(Rc::new(7i32) as Object), None, Some(Rc::new("x".to_string()) as Object)],
///     )
///     .unwrap();
/// let bytes = skein.serialize(Some(&(array as Object))).unwrap();
/// let value = skein.deserialize(&bytes).unwrap().unwrap();
/// assert!(value.downcast_ref::<skein_core::serializer::object_array::ObjectArray>().is_some());
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use skein_core::skein::Skein;
///
/// let skein = Skein::default().track_ref(false).max_dyn_depth(16);
/// assert!(!skein.get_config().is_track_ref());
/// ```
#[derive(Default)]
pub struct Skein {
    config: Config,
    type_resolver: TypeResolver,
}

impl Skein {
    /// Enables or disables reference tracking for graph values.
    ///
    /// Without it, shared values are written once per occurrence and a
    /// cyclic graph fails with [`Error::DepthExceed`].
    pub fn track_ref(mut self, track_ref: bool) -> Self {
        self.config.track_ref = track_ref;
        self
    }

    /// Sets the maximum nesting depth of graph values, default 5.
    pub fn max_dyn_depth(mut self, max_dyn_depth: u32) -> Self {
        self.config.max_dyn_depth = max_dyn_depth;
        self
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Registers a final type under a user id (`>= 64`).
    ///
    /// ```rust
    /// use skein_core::error::Error;
    /// use skein_core::resolver::context::{ReadContext, WriteContext};
    /// use skein_core::serializer::SkeinObject;
    /// use skein_core::skein::Skein;
    ///
    /// #[derive(Clone)]
    /// struct Point { x: i32, y: i32 }
    ///
    /// impl SkeinObject for Point {
    ///     fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
    ///         context.writer.write_varint32(self.x);
    ///         context.writer.write_varint32(self.y);
    ///         Ok(())
    ///     }
    ///
    ///     fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
    ///         Ok(Point { x: context.reader.read_varint32()?, y: context.reader.read_varint32()? })
    ///     }
    /// }
    ///
    /// let mut skein = Skein::default();
    /// skein.register::<Point>(100).unwrap();
    /// ```
    pub fn register<T: SkeinObject>(&mut self, id: u32) -> Result<(), Error> {
        self.type_resolver.register::<T>(id)
    }

    pub fn register_non_final<T: SkeinObject>(&mut self, id: u32) -> Result<(), Error> {
        self.type_resolver.register_non_final::<T>(id)
    }

    pub fn register_abstract(&mut self, id: u32, name: &str) -> Result<(), Error> {
        self.type_resolver.register_abstract(id, name)
    }

    pub fn register_serializer<T: 'static, S: Serializer>(
        &mut self,
        id: u32,
        serializer: S,
        is_final: bool,
    ) -> Result<(), Error> {
        self.type_resolver
            .register_serializer::<T>(id, Arc::new(serializer), is_final)
    }

    pub fn register_object_array(
        &mut self,
        array_id: u32,
        component_id: u32,
        serializer: ObjectArraySerializer,
    ) -> Result<(), Error> {
        self.type_resolver
            .register_object_array(array_id, component_id, serializer)
    }

    pub fn get_type_info(&self, id: u32) -> Result<Arc<TypeInfo>, Error> {
        self.type_resolver.get_type_info_by_id(id)
    }

    /// Creates an array whose declared component type is `component_id`.
    pub fn new_object_array(
        &self,
        component_id: u32,
        elements: Vec<Option<Object>>,
    ) -> Result<Rc<ObjectArray>, Error> {
        let component = self.type_resolver.get_type_info_by_id(component_id)?;
        // the array must be writable later
        self.type_resolver.get_array_type_info(component_id)?;
        Ok(ObjectArray::new(component, elements))
    }

    /// Serializes a graph value, writing its concrete type id.
    pub fn serialize(&self, value: Option<&Object>) -> Result<Vec<u8>, Error> {
        let mut context = WriteContext::new(&self.type_resolver, &self.config);
        write_any(&mut context, value)?;
        Ok(context.into_bytes())
    }

    /// Serializes into `sink`. I/O failures surface as [`Error::Io`].
    pub fn serialize_to<W: Write>(
        &self,
        value: Option<&Object>,
        sink: &mut W,
    ) -> Result<(), Error> {
        let bytes = self.serialize(value)?;
        sink.write_all(&bytes)?;
        Ok(())
    }

    pub fn deserialize(&self, bf: &[u8]) -> Result<Option<Object>, Error> {
        let mut context = ReadContext::new(&self.type_resolver, &self.config, Reader::new(bf));
        let value = read_any(&mut context)?;
        check_consumed(&context)?;
        Ok(value)
    }

    /// Deserializes a graph value and downcasts it to `T`.
    pub fn deserialize_as<T: 'static>(&self, bf: &[u8]) -> Result<Option<Rc<T>>, Error> {
        match self.deserialize(bf)? {
            None => Ok(None),
            Some(value) => value.downcast::<T>().map(Some).map_err(|_| {
                Error::enhance_type_error::<T>(Error::type_error(
                    "Deserialized value has another type",
                ))
            }),
        }
    }

    /// Serializes a fixed-element array without a type id.
    pub fn serialize_array<K: ArrayElement>(&self, array: Option<&[K]>) -> Result<Vec<u8>, Error> {
        let mut context = WriteContext::new(&self.type_resolver, &self.config);
        write_array(&mut context.writer, array)?;
        Ok(context.into_bytes())
    }

    pub fn deserialize_array<K: ArrayElement>(&self, bf: &[u8]) -> Result<Option<Vec<K>>, Error> {
        let mut context = ReadContext::new(&self.type_resolver, &self.config, Reader::new(bf));
        let array = read_array::<K>(&mut context.reader)?;
        check_consumed(&context)?;
        Ok(array)
    }

    /// Serializes an object array of the registered array type `array_type_id`
    /// without writing its type id.
    pub fn serialize_object_array(
        &self,
        array_type_id: u32,
        array: Option<&Rc<ObjectArray>>,
    ) -> Result<Vec<u8>, Error> {
        let type_info = self.type_resolver.get_type_info_by_id(array_type_id)?;
        let serializer = type_info.get_serializer()?;
        let mut context = WriteContext::new(&self.type_resolver, &self.config);
        match array {
            None => serializer.write_null(&mut context)?,
            Some(array) => {
                check_component(&type_info, array)?;
                if context.is_track_ref() {
                    let root: Object = array.clone();
                    context.ref_writer.register(&root);
                }
                serializer.write(&mut context, &**array)?;
            }
        }
        Ok(context.into_bytes())
    }

    pub fn deserialize_object_array(
        &self,
        array_type_id: u32,
        bf: &[u8],
    ) -> Result<Option<Rc<ObjectArray>>, Error> {
        let type_info = self.type_resolver.get_type_info_by_id(array_type_id)?;
        ensure!(
            type_info.get_component().is_some(),
            Error::type_error(format!(
                "Type {} is not an object array type",
                type_info.get_name()
            ))
        );
        let serializer = type_info.get_serializer()?;
        let mut context = ReadContext::new(&self.type_resolver, &self.config, Reader::new(bf));
        let Some(shell) = serializer.create(&mut context, &type_info)? else {
            check_consumed(&context)?;
            return Ok(None);
        };
        if context.is_track_ref() {
            context.ref_reader.store_ref(shell.clone());
        }
        serializer.read(&mut context, &shell)?;
        check_consumed(&context)?;
        shell
            .downcast::<ObjectArray>()
            .map(Some)
            .map_err(|_| Error::type_error("Array serializer produced a non-array value"))
    }

    /// Shallow copy: a new container holding the same element references.
    pub fn copy(&self, value: &Object) -> Result<Object, Error> {
        any::copy(&self.type_resolver, value)
    }

    pub fn copy_or_null(&self, value: Option<&Object>) -> Result<Option<Object>, Error> {
        any::copy_or_null(&self.type_resolver, value)
    }
}

fn check_component(type_info: &TypeInfo, array: &ObjectArray) -> Result<(), Error> {
    let expected = type_info.get_component().map(|c| c.get_type_id());
    let actual = array.component_type().get_type_id();
    ensure!(
        expected == Some(actual),
        Error::type_mismatch(expected.unwrap_or(type_info.get_type_id()), actual)
    );
    Ok(())
}

fn check_consumed(context: &ReadContext) -> Result<(), Error> {
    let remaining = context.reader.remaining();
    ensure!(
        remaining == 0,
        Error::invalid_data(format!("{} trailing bytes after value", remaining))
    );
    Ok(())
}
