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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::SkeinObject;

macro_rules! impl_scalar_object {
    ($ty:ty, $writer:expr, $reader:expr) => {
        impl SkeinObject for $ty {
            #[inline(always)]
            fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                $writer(&mut context.writer, *self);
                Ok(())
            }

            #[inline(always)]
            fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
                $reader(&mut context.reader)
            }
        }
    };
}

impl_scalar_object!(bool, Writer::write_bool, Reader::read_bool);
impl_scalar_object!(i8, Writer::write_i8, Reader::read_i8);
impl_scalar_object!(i16, Writer::write_i16, Reader::read_i16);
// UTF-16 code unit
impl_scalar_object!(u16, Writer::write_u16, Reader::read_u16);
impl_scalar_object!(i32, Writer::write_varint32, Reader::read_varint32);
impl_scalar_object!(i64, Writer::write_varint64, Reader::read_varint64);
impl_scalar_object!(f32, Writer::write_f32, Reader::read_f32);
impl_scalar_object!(f64, Writer::write_f64, Reader::read_f64);
