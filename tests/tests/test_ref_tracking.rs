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

use skein::{types, Object, ObjectArray, ObjectArraySerializer, Skein};
use skein_core::error::Error;
use std::rc::Rc;

fn same_object(a: &Object, b: &Object) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

fn self_containing(skein: &Skein) -> Rc<ObjectArray> {
    let array = skein
        .new_object_array(types::OBJECT, vec![None, Some(Rc::new(7i32))])
        .unwrap();
    array.set(0, Some(array.clone()));
    array
}

#[test]
fn test_array_containing_itself() {
    let skein = Skein::default();
    let array = self_containing(&skein);
    let bytes = skein
        .serialize_object_array(types::OBJECT_ARRAY, Some(&array))
        .unwrap();
    // token, Ref to the root, then RefValue INT32 7
    assert_eq!(bytes, vec![3, 0xFE, 0, 0, types::INT32 as u8, 14]);

    let decoded = skein
        .deserialize_object_array(types::OBJECT_ARRAY, &bytes)
        .unwrap()
        .unwrap();
    let root: Object = decoded.clone();
    assert!(same_object(&decoded.get(0).unwrap(), &root));
    assert_eq!(decoded.get(1).unwrap().downcast_ref::<i32>(), Some(&7));

    array.clear();
    decoded.clear();
}

#[test]
fn test_cycle_through_graph_entry_point() {
    let skein = Skein::default();
    let array = self_containing(&skein);
    let value: Object = array.clone();
    let bytes = skein.serialize(Some(&value)).unwrap();
    let decoded = skein.deserialize(&bytes).unwrap().unwrap();
    let decoded_array = decoded.downcast_ref::<ObjectArray>().unwrap();
    assert!(same_object(&decoded_array.get(0).unwrap(), &decoded));

    array.clear();
    decoded_array.clear();
}

#[test]
fn test_mutual_cycle() {
    let skein = Skein::default();
    let a = skein.new_object_array(types::OBJECT, vec![None]).unwrap();
    let b = skein
        .new_object_array(types::OBJECT, vec![Some(a.clone())])
        .unwrap();
    a.set(0, Some(b.clone()));

    let bytes = skein
        .serialize_object_array(types::OBJECT_ARRAY, Some(&a))
        .unwrap();
    let decoded_a = skein
        .deserialize_object_array(types::OBJECT_ARRAY, &bytes)
        .unwrap()
        .unwrap();
    let decoded_b = decoded_a.get(0).unwrap();
    let back = decoded_b
        .downcast_ref::<ObjectArray>()
        .unwrap()
        .get(0)
        .unwrap();
    let root: Object = decoded_a.clone();
    assert!(same_object(&back, &root));

    a.clear();
    decoded_a.clear();
}

#[test]
fn test_shared_element_written_once() {
    let skein = Skein::default();
    let text: Object = Rc::new("shared".to_string());
    let array = skein
        .new_object_array(types::OBJECT, vec![Some(text.clone()), Some(text.clone())])
        .unwrap();
    let bytes = skein
        .serialize_object_array(types::OBJECT_ARRAY, Some(&array))
        .unwrap();
    // second occurrence is Ref + id 1 (the root holds id 0)
    assert_eq!(&bytes[bytes.len() - 2..], &[0xFE, 1]);

    let decoded = skein
        .deserialize_object_array(types::OBJECT_ARRAY, &bytes)
        .unwrap()
        .unwrap();
    assert!(same_object(
        &decoded.get(0).unwrap(),
        &decoded.get(1).unwrap()
    ));
}

#[test]
fn test_shared_across_nested_arrays() {
    let skein = Skein::default();
    let shared: Object = Rc::new(vec![1i64, 2]);
    let inner = skein
        .new_object_array(types::OBJECT, vec![Some(shared.clone())])
        .unwrap();
    let outer = skein
        .new_object_array(types::OBJECT, vec![Some(inner), Some(shared)])
        .unwrap();
    let bytes = skein
        .serialize_object_array(types::OBJECT_ARRAY, Some(&outer))
        .unwrap();
    let decoded = skein
        .deserialize_object_array(types::OBJECT_ARRAY, &bytes)
        .unwrap()
        .unwrap();
    let inner = decoded.get(0).unwrap();
    let from_inner = inner.downcast_ref::<ObjectArray>().unwrap().get(0).unwrap();
    assert!(same_object(&from_inner, &decoded.get(1).unwrap()));
}

#[test]
fn test_untracked_shared_elements_are_duplicated() {
    let skein = Skein::default().track_ref(false);
    let text: Object = Rc::new("dup".to_string());
    let array = skein
        .new_object_array(types::OBJECT, vec![Some(text.clone()), Some(text)])
        .unwrap();
    let decoded = skein
        .deserialize_object_array(
            types::OBJECT_ARRAY,
            &skein
                .serialize_object_array(types::OBJECT_ARRAY, Some(&array))
                .unwrap(),
        )
        .unwrap()
        .unwrap();
    let first = decoded.get(0).unwrap();
    let second = decoded.get(1).unwrap();
    assert!(!same_object(&first, &second));
    assert_eq!(first.downcast_ref::<String>(), second.downcast_ref::<String>());
}

#[test]
fn test_untracked_cycle_exceeds_depth() {
    if skein_core::error::should_panic_on_error() {
        return;
    }
    let skein = Skein::default().track_ref(false);
    let array = self_containing(&skein);
    let err = skein
        .serialize_object_array(types::OBJECT_ARRAY, Some(&array))
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)));
    array.clear();
}

#[test]
fn test_single_codec_shared_element() {
    let mut skein = Skein::default();
    skein
        .register_object_array(100, types::STRING, ObjectArraySerializer::new())
        .unwrap();
    let text: Object = Rc::new("same".to_string());
    let array = skein
        .new_object_array(types::STRING, vec![Some(text.clone()), Some(text)])
        .unwrap();
    let bytes = skein.serialize_object_array(100, Some(&array)).unwrap();
    // RefValue marker + "same", then Ref to id 1
    assert_eq!(bytes, vec![3, 0, 4 << 2, b's', b'a', b'm', b'e', 0xFE, 1]);

    let decoded = skein.deserialize_object_array(100, &bytes).unwrap().unwrap();
    let first = decoded.get(0).unwrap();
    assert!(same_object(&first, &decoded.get(1).unwrap()));
    assert_eq!(first.downcast_ref::<String>(), Some(&"same".to_string()));
}

#[test]
fn test_single_codec_array_containing_itself() {
    let mut skein = Skein::default();
    skein
        .register_object_array(100, types::OBJECT_ARRAY, ObjectArraySerializer::new())
        .unwrap();
    let array = skein.new_object_array(types::OBJECT_ARRAY, vec![None, None]).unwrap();
    array.set(0, Some(array.clone()));
    let bytes = skein.serialize_object_array(100, Some(&array)).unwrap();
    // Ref to the root, then a Null marker
    assert_eq!(bytes, vec![3, 0xFE, 0, 0xFD]);

    let decoded = skein.deserialize_object_array(100, &bytes).unwrap().unwrap();
    let root: Object = decoded.clone();
    assert!(same_object(&decoded.get(0).unwrap(), &root));
    assert!(decoded.get(1).is_none());

    array.clear();
    decoded.clear();
}

#[test]
fn test_single_codec_cycle_through_nested_array() {
    let mut skein = Skein::default();
    skein
        .register_object_array(100, types::OBJECT_ARRAY, ObjectArraySerializer::new())
        .unwrap();
    let outer = skein.new_object_array(types::OBJECT_ARRAY, vec![None]).unwrap();
    let inner = skein.new_object_array(types::OBJECT, vec![None]).unwrap();
    inner.set(0, Some(outer.clone()));
    outer.set(0, Some(inner.clone()));

    let bytes = skein.serialize_object_array(100, Some(&outer)).unwrap();
    // RefValue marker for the inner array, its token, then Ref to the root
    assert_eq!(bytes, vec![2, 0, 2, 0xFE, 0]);

    let decoded = skein.deserialize_object_array(100, &bytes).unwrap().unwrap();
    let decoded_inner = decoded.get(0).unwrap();
    let back = decoded_inner
        .downcast_ref::<ObjectArray>()
        .unwrap()
        .get(0)
        .unwrap();
    let root: Object = decoded.clone();
    assert!(same_object(&back, &root));

    outer.clear();
    decoded.clear();
}

#[test]
fn test_single_codec_untracked_marker() {
    let mut skein = Skein::default().track_ref(false);
    skein
        .register_object_array(100, types::STRING, ObjectArraySerializer::new())
        .unwrap();
    let text: Object = Rc::new("ab".to_string());
    let array = skein
        .new_object_array(types::STRING, vec![Some(text.clone()), Some(text)])
        .unwrap();
    let bytes = skein.serialize_object_array(100, Some(&array)).unwrap();
    assert_eq!(bytes, vec![3, 0xFF, 2 << 2, b'a', b'b', 0xFF, 2 << 2, b'a', b'b']);

    let decoded = skein.deserialize_object_array(100, &bytes).unwrap().unwrap();
    assert!(!same_object(&decoded.get(0).unwrap(), &decoded.get(1).unwrap()));
}

#[test]
fn test_single_codec_without_marker_writes_every_element() {
    let mut skein = Skein::default();
    skein
        .register_object_array(
            100,
            types::STRING,
            ObjectArraySerializer::new().elements_can_be_null(false),
        )
        .unwrap();
    let text: Object = Rc::new("same".to_string());
    let array = skein
        .new_object_array(types::STRING, vec![Some(text.clone()), Some(text)])
        .unwrap();
    let bytes = skein.serialize_object_array(100, Some(&array)).unwrap();
    assert_eq!(
        bytes,
        vec![3, 4 << 2, b's', b'a', b'm', b'e', 4 << 2, b's', b'a', b'm', b'e']
    );
    let decoded = skein.deserialize_object_array(100, &bytes).unwrap().unwrap();
    assert_eq!(
        decoded.get(0).unwrap().downcast_ref::<String>(),
        decoded.get(1).unwrap().downcast_ref::<String>()
    );
}

#[test]
fn test_max_dyn_depth() {
    if skein_core::error::should_panic_on_error() {
        return;
    }
    let build = |skein: &Skein| {
        let mut current = skein
            .new_object_array(types::OBJECT, vec![Some(Rc::new(1i32))])
            .unwrap();
        for _ in 0..3 {
            current = skein
                .new_object_array(types::OBJECT, vec![Some(current)])
                .unwrap();
        }
        current
    };

    let skein = Skein::default();
    let nested = build(&skein);
    let bytes = skein
        .serialize_object_array(types::OBJECT_ARRAY, Some(&nested))
        .unwrap();
    assert!(skein
        .deserialize_object_array(types::OBJECT_ARRAY, &bytes)
        .is_ok());

    let shallow = Skein::default().max_dyn_depth(2);
    let err = shallow
        .serialize_object_array(types::OBJECT_ARRAY, Some(&nested))
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)));
    let err = shallow
        .deserialize_object_array(types::OBJECT_ARRAY, &bytes)
        .unwrap_err();
    assert!(format!("{}", err).contains("Maximum dynamic object nesting depth"));
}

#[test]
fn test_unknown_reference() {
    if skein_core::error::should_panic_on_error() {
        return;
    }
    let skein = Skein::default();
    let err = skein
        .deserialize_object_array(types::OBJECT_ARRAY, &[2, 0xFE, 5])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRef(_)));
    assert!(err.is_format_error());
}
