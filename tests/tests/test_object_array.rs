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

use skein::{types, Object, ObjectArray, ObjectArraySerializer, Skein, SkeinObject};
use skein_core::error::Error;
use skein_core::resolver::context::{ReadContext, WriteContext};
use std::rc::Rc;

const POINT: u32 = 100;
const SHAPE: u32 = 101;
const CIRCLE: u32 = 102;
const FIGURE: u32 = 103;
const POINT_ARRAY: u32 = 110;
const SHAPE_ARRAY: u32 = 111;
const FIGURE_ARRAY: u32 = 113;
const INT_ARRAY_ARRAY: u32 = 120;

#[derive(Clone, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl SkeinObject for Point {
    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_varint32(self.x);
        context.writer.write_varint32(self.y);
        Ok(())
    }

    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Point {
            x: context.reader.read_varint32()?,
            y: context.reader.read_varint32()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Shape {
    name: String,
}

impl SkeinObject for Shape {
    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.name.write_data(context)
    }

    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Shape {
            name: String::read_data(context)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Circle {
    radius: f64,
}

impl SkeinObject for Circle {
    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_f64(self.radius);
        Ok(())
    }

    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(Circle {
            radius: context.reader.read_f64()?,
        })
    }
}

fn skein_with(serializer: ObjectArraySerializer) -> Skein {
    let mut skein = Skein::default();
    skein.register::<Point>(POINT).unwrap();
    skein.register_non_final::<Shape>(SHAPE).unwrap();
    skein.register::<Circle>(CIRCLE).unwrap();
    skein.register_abstract(FIGURE, "Figure").unwrap();
    skein
        .register_object_array(POINT_ARRAY, POINT, serializer)
        .unwrap();
    skein
        .register_object_array(SHAPE_ARRAY, SHAPE, serializer)
        .unwrap();
    skein
        .register_object_array(FIGURE_ARRAY, FIGURE, serializer)
        .unwrap();
    skein
        .register_object_array(INT_ARRAY_ARRAY, types::INT32_ARRAY, serializer)
        .unwrap();
    skein
}

fn point(x: i32, y: i32) -> Option<Object> {
    Some(Rc::new(Point { x, y }))
}

fn shape(name: &str) -> Option<Object> {
    Some(Rc::new(Shape {
        name: name.to_string(),
    }))
}

fn roundtrip(skein: &Skein, array_type_id: u32, array: &Rc<ObjectArray>) -> Rc<ObjectArray> {
    let bytes = skein
        .serialize_object_array(array_type_id, Some(array))
        .unwrap();
    skein
        .deserialize_object_array(array_type_id, &bytes)
        .unwrap()
        .unwrap()
}

#[test]
fn test_null_and_empty_arrays() {
    let skein = skein_with(ObjectArraySerializer::new());
    let null = skein.serialize_object_array(POINT_ARRAY, None).unwrap();
    assert_eq!(null, vec![0]);
    assert!(skein
        .deserialize_object_array(POINT_ARRAY, &null)
        .unwrap()
        .is_none());

    let empty = skein.new_object_array(POINT, vec![]).unwrap();
    let bytes = skein
        .serialize_object_array(POINT_ARRAY, Some(&empty))
        .unwrap();
    assert_eq!(bytes, vec![1]);
    let decoded = skein
        .deserialize_object_array(POINT_ARRAY, &bytes)
        .unwrap()
        .unwrap();
    assert!(decoded.is_empty());
    assert_eq!(decoded.component_type().get_type_id(), POINT);
}

#[test]
fn test_final_component_single_codec_layout() {
    let skein = skein_with(ObjectArraySerializer::new());
    let array = skein.new_object_array(POINT, vec![point(1, 2), None]).unwrap();
    let bytes = skein
        .serialize_object_array(POINT_ARRAY, Some(&array))
        .unwrap();
    // no type ids: token, RefValue marker + x, y, Null marker
    assert_eq!(bytes, vec![3, 0, 2, 4, 0xFD]);

    let decoded = skein
        .deserialize_object_array(POINT_ARRAY, &bytes)
        .unwrap()
        .unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(
        decoded.get(0).unwrap().downcast_ref::<Point>(),
        Some(&Point { x: 1, y: 2 })
    );
    assert!(decoded.get(1).is_none());
}

#[test]
fn test_non_null_flag_saves_one_byte_per_element() {
    let nullable = skein_with(ObjectArraySerializer::new());
    let non_null = skein_with(ObjectArraySerializer::new().elements_can_be_null(false));
    let elements: Vec<Option<Object>> = (0..10).map(|i| point(i, -i)).collect();

    let a = nullable.new_object_array(POINT, elements.clone()).unwrap();
    let b = non_null.new_object_array(POINT, elements).unwrap();
    let with_marker = nullable
        .serialize_object_array(POINT_ARRAY, Some(&a))
        .unwrap();
    let without_marker = non_null
        .serialize_object_array(POINT_ARRAY, Some(&b))
        .unwrap();
    assert_eq!(with_marker.len(), without_marker.len() + 10);

    let decoded = roundtrip(&non_null, POINT_ARRAY, &b);
    for i in 0..10 {
        assert_eq!(
            decoded.get(i as usize).unwrap().downcast_ref::<Point>(),
            Some(&Point { x: i, y: -i })
        );
    }
}

#[test]
fn test_null_element_without_null_support() {
    if skein_core::error::should_panic_on_error() {
        return;
    }
    let skein = skein_with(ObjectArraySerializer::new().elements_can_be_null(false));
    let array = skein.new_object_array(POINT, vec![point(1, 1), None]).unwrap();
    let err = skein
        .serialize_object_array(POINT_ARRAY, Some(&array))
        .unwrap_err();
    assert!(matches!(err, Error::NotAllowed(_)));
}

#[test]
fn test_null_inner_array_without_marker() {
    let skein = skein_with(ObjectArraySerializer::new().elements_can_be_null(false));
    let array = skein
        .new_object_array(
            types::INT32_ARRAY,
            vec![Some(Rc::new(vec![1i32, 2])), None, Some(Rc::new(Vec::<i32>::new()))],
        )
        .unwrap();
    let bytes = skein
        .serialize_object_array(INT_ARRAY_ARRAY, Some(&array))
        .unwrap();
    // the inner length token carries the null
    assert_eq!(bytes, vec![4, 3, 2, 4, 0, 1]);

    let decoded = skein
        .deserialize_object_array(INT_ARRAY_ARRAY, &bytes)
        .unwrap()
        .unwrap();
    assert_eq!(
        decoded.get(0).unwrap().downcast_ref::<Vec<i32>>(),
        Some(&vec![1, 2])
    );
    assert!(decoded.get(1).is_none());
    assert_eq!(
        decoded.get(2).unwrap().downcast_ref::<Vec<i32>>(),
        Some(&vec![])
    );
}

#[test]
fn test_polymorphic_object_array() {
    let skein = skein_with(ObjectArraySerializer::new());
    let elements: Vec<Option<Object>> = vec![
        Some(Rc::new(7i32)),
        Some(Rc::new("seven".to_string())),
        None,
        point(3, 4),
        Some(Rc::new(vec![1u8, 2, 3])),
        Some(Rc::new(vec![Some("x".to_string()), None])),
    ];
    let array = skein.new_object_array(types::OBJECT, elements).unwrap();
    let decoded = roundtrip(&skein, types::OBJECT_ARRAY, &array);
    assert_eq!(decoded.len(), 6);
    assert_eq!(decoded.get(0).unwrap().downcast_ref::<i32>(), Some(&7));
    assert_eq!(
        decoded.get(1).unwrap().downcast_ref::<String>().map(String::as_str),
        Some("seven")
    );
    assert!(decoded.get(2).is_none());
    assert_eq!(
        decoded.get(3).unwrap().downcast_ref::<Point>(),
        Some(&Point { x: 3, y: 4 })
    );
    assert_eq!(
        decoded.get(4).unwrap().downcast_ref::<Vec<u8>>(),
        Some(&vec![1, 2, 3])
    );
    assert_eq!(
        decoded.get(5).unwrap().downcast_ref::<Vec<Option<String>>>(),
        Some(&vec![Some("x".to_string()), None])
    );
}

#[test]
fn test_polymorphic_element_layout() {
    let tracked = Skein::default();
    let untracked = Skein::default().track_ref(false);
    let array = tracked
        .new_object_array(types::OBJECT, vec![Some(Rc::new(7i32)), None])
        .unwrap();
    // token, RefValue, INT32, zigzag 7, Null
    assert_eq!(
        tracked
            .serialize_object_array(types::OBJECT_ARRAY, Some(&array))
            .unwrap(),
        vec![3, 0, types::INT32 as u8, 14, 0xFD]
    );
    assert_eq!(
        untracked
            .serialize_object_array(types::OBJECT_ARRAY, Some(&array))
            .unwrap(),
        vec![3, 0xFF, types::INT32 as u8, 14, 0xFD]
    );
}

#[test]
fn test_non_final_component_keeps_concrete_types() {
    let skein = skein_with(ObjectArraySerializer::new());
    let array = skein
        .new_object_array(
            SHAPE,
            vec![shape("square"), Some(Rc::new(Circle { radius: 2.0 })), None],
        )
        .unwrap();
    let decoded = roundtrip(&skein, SHAPE_ARRAY, &array);
    assert_eq!(
        decoded.get(0).unwrap().downcast_ref::<Shape>(),
        Some(&Shape {
            name: "square".to_string()
        })
    );
    assert_eq!(
        decoded.get(1).unwrap().downcast_ref::<Circle>(),
        Some(&Circle { radius: 2.0 })
    );
    assert!(decoded.get(2).is_none());
}

#[test]
fn test_same_type_flag_drops_type_ids() {
    let polymorphic = skein_with(ObjectArraySerializer::new());
    let same_type = skein_with(ObjectArraySerializer::new().elements_are_same_type(true));
    let elements = vec![shape("a"), shape("b"), shape("c")];

    let a = polymorphic.new_object_array(SHAPE, elements.clone()).unwrap();
    let b = same_type.new_object_array(SHAPE, elements).unwrap();
    let polymorphic_bytes = polymorphic
        .serialize_object_array(SHAPE_ARRAY, Some(&a))
        .unwrap();
    let same_type_bytes = same_type
        .serialize_object_array(SHAPE_ARRAY, Some(&b))
        .unwrap();
    // one type id byte per element
    assert_eq!(polymorphic_bytes.len(), same_type_bytes.len() + 3);

    let decoded = roundtrip(&same_type, SHAPE_ARRAY, &b);
    assert_eq!(
        decoded.get(2).unwrap().downcast_ref::<Shape>(),
        Some(&Shape {
            name: "c".to_string()
        })
    );
}

#[test]
fn test_same_type_rejects_other_type() {
    if skein_core::error::should_panic_on_error() {
        return;
    }
    let skein = skein_with(ObjectArraySerializer::new().elements_are_same_type(true));
    let array = skein
        .new_object_array(SHAPE, vec![shape("a"), Some(Rc::new(Circle { radius: 1.0 }))])
        .unwrap();
    let err = skein
        .serialize_object_array(SHAPE_ARRAY, Some(&array))
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));
}

#[test]
fn test_same_type_with_abstract_component() {
    if skein_core::error::should_panic_on_error() {
        return;
    }
    let skein = skein_with(ObjectArraySerializer::new().elements_are_same_type(true));
    let array = skein
        .new_object_array(FIGURE, vec![Some(Rc::new(Circle { radius: 1.0 }))])
        .unwrap();
    let err = skein
        .serialize_object_array(FIGURE_ARRAY, Some(&array))
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));

    // polymorphic dispatch works for the same abstract component
    let skein = skein_with(ObjectArraySerializer::new());
    let array = skein
        .new_object_array(FIGURE, vec![Some(Rc::new(Circle { radius: 1.0 }))])
        .unwrap();
    let decoded = roundtrip(&skein, FIGURE_ARRAY, &array);
    assert_eq!(
        decoded.get(0).unwrap().downcast_ref::<Circle>(),
        Some(&Circle { radius: 1.0 })
    );
}

#[test]
fn test_nested_object_arrays() {
    let skein = Skein::default();
    let inner = skein
        .new_object_array(types::OBJECT, vec![Some(Rc::new(1i64)), None])
        .unwrap();
    let outer = skein
        .new_object_array(types::OBJECT, vec![Some(inner), Some(Rc::new(true))])
        .unwrap();
    let decoded = roundtrip(&skein, types::OBJECT_ARRAY, &outer);
    let inner = decoded.get(0).unwrap().downcast::<ObjectArray>().unwrap();
    assert_eq!(inner.len(), 2);
    assert_eq!(inner.get(0).unwrap().downcast_ref::<i64>(), Some(&1));
    assert_eq!(decoded.get(1).unwrap().downcast_ref::<bool>(), Some(&true));
}

#[test]
fn test_component_mismatch() {
    if skein_core::error::should_panic_on_error() {
        return;
    }
    let skein = skein_with(ObjectArraySerializer::new());
    let shapes = skein.new_object_array(SHAPE, vec![shape("a")]).unwrap();
    let err = skein
        .serialize_object_array(POINT_ARRAY, Some(&shapes))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(POINT, SHAPE)));
}

#[test]
fn test_shallow_copy() {
    let skein = skein_with(ObjectArraySerializer::new());
    let shared: Object = Rc::new(Point { x: 5, y: 6 });
    let array = skein
        .new_object_array(POINT, vec![Some(shared.clone()), None])
        .unwrap();
    let original: Object = array.clone();
    let copy = skein.copy(&original).unwrap();
    assert!(!Rc::ptr_eq(&copy, &original));

    let copy = copy.downcast::<ObjectArray>().unwrap();
    assert_eq!(copy.len(), 2);
    assert_eq!(copy.component_type().get_type_id(), POINT);
    assert!(Rc::ptr_eq(&copy.get(0).unwrap(), &shared));
    assert!(copy.get(1).is_none());

    copy.set(1, point(0, 0));
    assert!(array.get(1).is_none());
    assert!(skein.copy_or_null(None).unwrap().is_none());
}

#[test]
fn test_copy_of_polymorphic_array_keeps_element_identity() {
    let skein = Skein::default();
    let text: Object = Rc::new("t".to_string());
    let array: Object = skein
        .new_object_array(types::OBJECT, vec![Some(text.clone()), Some(text.clone())])
        .unwrap();
    let copy = skein.copy_or_null(Some(&array)).unwrap().unwrap();
    let copy = copy.downcast_ref::<ObjectArray>().unwrap();
    assert!(Rc::ptr_eq(&copy.get(0).unwrap(), &text));
    assert!(Rc::ptr_eq(&copy.get(1).unwrap(), &text));
}

#[test]
fn test_object_array_as_graph_value() {
    let skein = skein_with(ObjectArraySerializer::new());
    let array: Object = skein
        .new_object_array(POINT, vec![point(1, 1)])
        .unwrap();
    let bytes = skein.serialize(Some(&array)).unwrap();
    // RefValue followed by the array type id
    assert_eq!(&bytes[..2], &[0, POINT_ARRAY as u8]);
    let decoded = skein.deserialize_as::<ObjectArray>(&bytes).unwrap().unwrap();
    assert_eq!(decoded.component_type().get_type_id(), POINT);
    assert_eq!(
        decoded.get(0).unwrap().downcast_ref::<Point>(),
        Some(&Point { x: 1, y: 1 })
    );
}
