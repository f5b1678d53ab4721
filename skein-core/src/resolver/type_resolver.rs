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
use crate::not_allowed;
use crate::serializer::object_array::{ObjectArray, ObjectArraySerializer};
use crate::serializer::primitive_array::{ArrayElement, PrimitiveArraySerializer};
use crate::serializer::{Serializer, SkeinObject, TypedSerializer};
use crate::types::{self, TypeId, USER_TYPE_ID_START};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registered metadata of one wire type.
pub struct TypeInfo {
    type_id: u32,
    name: String,
    is_final: bool,
    rs_type_id: Option<std::any::TypeId>,
    component: Option<Arc<TypeInfo>>,
    serializer: Option<Arc<dyn Serializer>>,
}

impl TypeInfo {
    #[inline(always)]
    pub fn get_type_id(&self) -> u32 {
        self.type_id
    }

    #[inline(always)]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// A final type admits no subtypes, so one codec covers every instance.
    #[inline(always)]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    #[inline(always)]
    pub fn is_abstract(&self) -> bool {
        self.serializer.is_none()
    }

    /// Component type when this is an object array type.
    #[inline(always)]
    pub fn get_component(&self) -> Option<&Arc<TypeInfo>> {
        self.component.as_ref()
    }

    #[inline]
    pub fn get_serializer(&self) -> Result<&Arc<dyn Serializer>, Error> {
        self.serializer.as_ref().ok_or_else(|| {
            Error::type_error(format!(
                "Type {} (id {}) is abstract and has no serializer",
                self.name, self.type_id
            ))
        })
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .field("is_final", &self.is_final)
            .field("component", &self.component.as_ref().map(|c| c.type_id))
            .finish()
    }
}

/// Registry mapping wire ids, Rust types and array component types to codecs.
///
/// Populated during setup and read-only afterwards.
pub struct TypeResolver {
    type_info_map_by_id: HashMap<u32, Arc<TypeInfo>>,
    type_info_map: HashMap<std::any::TypeId, Arc<TypeInfo>>,
    // component type id -> object array type
    array_type_map: HashMap<u32, Arc<TypeInfo>>,
}

impl Default for TypeResolver {
    fn default() -> Self {
        let mut resolver = TypeResolver {
            type_info_map_by_id: HashMap::new(),
            type_info_map: HashMap::new(),
            array_type_map: HashMap::new(),
        };
        resolver.register_builtin_types();
        resolver
    }
}

impl TypeResolver {
    fn register_builtin_types(&mut self) {
        self.register_internal::<bool>(TypeId::BOOL, Arc::new(TypedSerializer::<bool>::new()));
        self.register_internal::<i8>(TypeId::INT8, Arc::new(TypedSerializer::<i8>::new()));
        self.register_internal::<i16>(TypeId::INT16, Arc::new(TypedSerializer::<i16>::new()));
        self.register_internal::<u16>(TypeId::CHAR, Arc::new(TypedSerializer::<u16>::new()));
        self.register_internal::<i32>(TypeId::INT32, Arc::new(TypedSerializer::<i32>::new()));
        self.register_internal::<i64>(TypeId::INT64, Arc::new(TypedSerializer::<i64>::new()));
        self.register_internal::<f32>(TypeId::FLOAT32, Arc::new(TypedSerializer::<f32>::new()));
        self.register_internal::<f64>(TypeId::FLOAT64, Arc::new(TypedSerializer::<f64>::new()));
        self.register_internal::<String>(
            TypeId::STRING,
            Arc::new(TypedSerializer::<String>::new()),
        );

        self.register_internal_array::<u8>();
        self.register_internal_array::<bool>();
        self.register_internal_array::<i8>();
        self.register_internal_array::<i16>();
        self.register_internal_array::<u16>();
        self.register_internal_array::<i32>();
        self.register_internal_array::<i64>();
        self.register_internal_array::<f32>();
        self.register_internal_array::<f64>();
        self.register_internal_array::<Option<String>>();
        // encode only, decodes as Vec<Option<String>>
        self.type_info_map.insert(
            std::any::TypeId::of::<Vec<String>>(),
            Arc::new(TypeInfo {
                type_id: types::STRING_ARRAY,
                name: format!("{:?}", TypeId::STRING_ARRAY),
                is_final: true,
                rs_type_id: Some(std::any::TypeId::of::<Vec<String>>()),
                component: None,
                serializer: Some(Arc::new(PrimitiveArraySerializer::<String>::new())),
            }),
        );

        let object = Arc::new(TypeInfo {
            type_id: types::OBJECT,
            name: "Object".to_string(),
            is_final: false,
            rs_type_id: None,
            component: None,
            serializer: None,
        });
        self.type_info_map_by_id.insert(types::OBJECT, object.clone());
        let object_array = Arc::new(TypeInfo {
            type_id: types::OBJECT_ARRAY,
            name: "Object[]".to_string(),
            is_final: true,
            rs_type_id: None,
            component: Some(object),
            serializer: Some(Arc::new(ObjectArraySerializer::new())),
        });
        self.type_info_map_by_id
            .insert(types::OBJECT_ARRAY, object_array.clone());
        self.array_type_map.insert(types::OBJECT, object_array);
    }

    fn register_internal<T: 'static>(&mut self, type_id: TypeId, serializer: Arc<dyn Serializer>) {
        let type_info = Arc::new(TypeInfo {
            type_id: type_id as u32,
            name: format!("{:?}", type_id),
            is_final: true,
            rs_type_id: Some(std::any::TypeId::of::<T>()),
            component: None,
            serializer: Some(serializer),
        });
        self.type_info_map_by_id
            .insert(type_id as u32, type_info.clone());
        self.type_info_map
            .insert(std::any::TypeId::of::<T>(), type_info);
    }

    fn register_internal_array<K: ArrayElement>(&mut self) {
        self.register_internal::<Vec<K>>(
            K::ARRAY_TYPE_ID,
            Arc::new(PrimitiveArraySerializer::<K>::new()),
        );
    }

    fn check_user_id(&self, id: u32) -> Result<(), Error> {
        if id < USER_TYPE_ID_START {
            not_allowed!(
                "Type id {} is reserved, user type ids start at {}",
                id,
                USER_TYPE_ID_START
            );
        }
        if let Some(existing) = self.type_info_map_by_id.get(&id) {
            not_allowed!("Type id {} is already registered for {}", id, existing.name);
        }
        Ok(())
    }

    fn insert(&mut self, type_info: TypeInfo) -> Result<Arc<TypeInfo>, Error> {
        if let Some(rs_type_id) = type_info.rs_type_id {
            if self.type_info_map.contains_key(&rs_type_id) {
                return Err(Error::not_allowed(format!(
                    "Rust type {} is already registered",
                    type_info.name
                )));
            }
        }
        debug!(
            type_id = type_info.type_id,
            name = %type_info.name,
            is_final = type_info.is_final,
            "registered type"
        );
        let type_info = Arc::new(type_info);
        self.type_info_map_by_id
            .insert(type_info.type_id, type_info.clone());
        if let Some(rs_type_id) = type_info.rs_type_id {
            self.type_info_map.insert(rs_type_id, type_info.clone());
        }
        Ok(type_info)
    }

    /// Registers a final type.
    pub fn register<T: SkeinObject>(&mut self, id: u32) -> Result<(), Error> {
        self.register_serializer::<T>(id, Arc::new(TypedSerializer::<T>::new()), true)
    }

    /// Registers a type that other registered types stand in for.
    ///
    /// Arrays of a non-final component type are written polymorphically
    /// unless their codec is told the elements share one type.
    pub fn register_non_final<T: SkeinObject>(&mut self, id: u32) -> Result<(), Error> {
        self.register_serializer::<T>(id, Arc::new(TypedSerializer::<T>::new()), false)
    }

    pub fn register_serializer<T: 'static>(
        &mut self,
        id: u32,
        serializer: Arc<dyn Serializer>,
        is_final: bool,
    ) -> Result<(), Error> {
        self.check_user_id(id)?;
        self.insert(TypeInfo {
            type_id: id,
            name: std::any::type_name::<T>().to_string(),
            is_final,
            rs_type_id: Some(std::any::TypeId::of::<T>()),
            component: None,
            serializer: Some(serializer),
        })?;
        Ok(())
    }

    /// Registers a type that has no instances of its own, only subtypes.
    pub fn register_abstract(&mut self, id: u32, name: &str) -> Result<(), Error> {
        self.check_user_id(id)?;
        self.insert(TypeInfo {
            type_id: id,
            name: name.to_string(),
            is_final: false,
            rs_type_id: None,
            component: None,
            serializer: None,
        })?;
        Ok(())
    }

    /// Registers the array type whose elements are of `component_id`.
    pub fn register_object_array(
        &mut self,
        array_id: u32,
        component_id: u32,
        serializer: ObjectArraySerializer,
    ) -> Result<(), Error> {
        self.check_user_id(array_id)?;
        let component = self.get_type_info_by_id(component_id)?;
        if let Some(existing) = self.array_type_map.get(&component_id) {
            return Err(Error::not_allowed(format!(
                "Component type {} already has array type {}",
                component.name, existing.type_id
            )));
        }
        debug!(
            array_id,
            component = %component.name,
            elements_are_same_type = serializer.are_elements_same_type(),
            elements_can_be_null = serializer.can_elements_be_null(),
            "registered object array"
        );
        let type_info = self.insert(TypeInfo {
            type_id: array_id,
            name: format!("{}[]", component.name),
            is_final: true,
            rs_type_id: None,
            component: Some(component),
            serializer: Some(Arc::new(serializer)),
        })?;
        self.array_type_map.insert(component_id, type_info);
        Ok(())
    }

    pub fn get_type_info_by_id(&self, id: u32) -> Result<Arc<TypeInfo>, Error> {
        self.type_info_map_by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::type_error(format!("Type id {} is not registered", id)))
    }

    pub fn get_type_info<T: 'static>(&self) -> Result<Arc<TypeInfo>, Error> {
        self.type_info_map
            .get(&std::any::TypeId::of::<T>())
            .cloned()
            .ok_or_else(|| {
                Error::type_error(format!(
                    "Type {} is not registered",
                    std::any::type_name::<T>()
                ))
            })
    }

    /// Type of a graph node, resolved from its concrete runtime type.
    pub fn get_type_info_of(&self, value: &dyn Any) -> Result<Arc<TypeInfo>, Error> {
        if let Some(array) = value.downcast_ref::<ObjectArray>() {
            return self.get_array_type_info(array.component_type().get_type_id());
        }
        self.type_info_map
            .get(&value.type_id())
            .cloned()
            .ok_or_else(|| Error::type_error("Value of an unregistered type in object graph"))
    }

    pub fn get_array_type_info(&self, component_id: u32) -> Result<Arc<TypeInfo>, Error> {
        self.array_type_map.get(&component_id).cloned().ok_or_else(|| {
            Error::type_error(format!(
                "No array type registered for component type id {}",
                component_id
            ))
        })
    }
}
