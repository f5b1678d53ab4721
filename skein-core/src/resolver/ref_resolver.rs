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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::serializer::Object;
use crate::types::RefFlag;
use std::collections::HashMap;
use std::rc::Rc;

/// Reference writer for tracking shared references during serialization.
///
/// RefWriter maintains a mapping from object pointer addresses to reference IDs,
/// allowing the serialization system to detect when the same object is encountered
/// multiple times and write a reference instead of serializing the object again.
/// This is what lets an array contain itself.
///
/// # Examples
///
/// ```rust
/// use skein_core::buffer::Writer;
/// use skein_core::resolver::ref_resolver::RefWriter;
/// use skein_core::serializer::Object;
/// use std::rc::Rc;
///
/// let mut ref_writer = RefWriter::new();
/// let mut writer = Writer::default();
/// let value: Object = Rc::new(42i32);
///
/// // First encounter - returns false, indicating object should be serialized
/// assert!(!ref_writer.try_write_ref(&mut writer, &value));
///
/// // Second encounter - returns true, indicating reference was written
/// assert!(ref_writer.try_write_ref(&mut writer, &value.clone()));
/// ```
#[derive(Default)]
pub struct RefWriter {
    /// Maps pointer addresses to reference IDs
    refs: HashMap<usize, u32>,
    /// Next reference ID to assign
    next_ref_id: u32,
}

#[inline(always)]
fn address_of(value: &Object) -> usize {
    Rc::as_ptr(value) as *const () as usize
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `Ref` + id for an object seen before and returns `true`.
    /// Otherwise registers it, writes `RefValue` and returns `false`.
    pub fn try_write_ref(&mut self, writer: &mut Writer, value: &Object) -> bool {
        if let Some(&ref_id) = self.refs.get(&address_of(value)) {
            writer.write_i8(RefFlag::Ref as i8);
            writer.write_varuint32(ref_id);
            true
        } else {
            self.register(value);
            writer.write_i8(RefFlag::RefValue as i8);
            false
        }
    }

    /// Registers an object without writing a flag and returns its reference ID.
    ///
    /// Used for a root whose identity both peers agree on out of band.
    pub fn register(&mut self, value: &Object) -> u32 {
        let ref_id = self.next_ref_id;
        self.next_ref_id += 1;
        self.refs.insert(address_of(value), ref_id);
        ref_id
    }

    /// Clear all stored references.
    pub fn clear(&mut self) {
        self.refs.clear();
        self.next_ref_id = 0;
    }
}

/// Reference reader for resolving shared references during deserialization.
///
/// Slots are reserved in the order the writer assigned IDs. A slot is filled
/// as soon as the object's identity exists, which for two-phase codecs is the
/// allocated shell, before any of its elements are read.
///
/// # Examples
///
/// ```rust
/// use skein_core::resolver::ref_resolver::RefReader;
/// use skein_core::serializer::Object;
/// use std::rc::Rc;
///
/// let mut ref_reader = RefReader::new();
/// let ref_id = ref_reader.reserve_ref_id();
/// let value: Object = Rc::new(String::from("shell"));
/// ref_reader.set_ref(ref_id, value.clone());
///
/// let retrieved = ref_reader.get_ref(ref_id).unwrap();
/// assert!(Rc::ptr_eq(&value, &retrieved));
/// ```
#[derive(Default)]
pub struct RefReader {
    refs: Vec<Option<Object>>,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve_ref_id(&mut self) -> u32 {
        let ref_id = self.refs.len() as u32;
        self.refs.push(None);
        ref_id
    }

    pub fn set_ref(&mut self, ref_id: u32, value: Object) {
        if let Some(slot) = self.refs.get_mut(ref_id as usize) {
            *slot = Some(value);
        }
    }

    /// Reserves a new ID and fills it immediately.
    pub fn store_ref(&mut self, value: Object) -> u32 {
        let ref_id = self.refs.len() as u32;
        self.refs.push(Some(value));
        ref_id
    }

    pub fn get_ref(&self, ref_id: u32) -> Result<Object, Error> {
        match self.refs.get(ref_id as usize) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(Error::invalid_ref(format!(
                "Reference {} is not resolvable yet",
                ref_id
            ))),
            None => Err(Error::invalid_ref(format!(
                "Reference {} not found, {} references known",
                ref_id,
                self.refs.len()
            ))),
        }
    }

    pub fn read_ref_flag(&self, reader: &mut Reader) -> Result<RefFlag, Error> {
        let flag_value = reader.read_i8()?;
        RefFlag::try_from(flag_value)
            .map_err(|_| Error::invalid_data(format!("Unknown ref flag: {}", flag_value)))
    }

    pub fn read_ref_id(&self, reader: &mut Reader) -> Result<u32, Error> {
        reader.read_varuint32()
    }

    pub fn clear(&mut self) {
        self.refs.clear();
    }
}
