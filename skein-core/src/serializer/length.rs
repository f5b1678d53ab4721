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

//! Null/length token shared by every array codec.
//!
//! One varuint32 carries both facts: `0` is an absent array, any other value
//! `v` is a present array of `v - 1` elements. A generic reader can therefore
//! take the null decision before it knows the element kind.

use crate::buffer::{Reader, Writer};
use crate::error::Error;

pub const NULL_LENGTH: u32 = 0;

/// Largest element count an array may carry.
pub const MAX_ARRAY_LENGTH: usize = i32::MAX as usize;

#[inline]
pub fn write_length(writer: &mut Writer, len: Option<usize>) -> Result<(), Error> {
    match len {
        None => writer.write_varuint32(NULL_LENGTH),
        Some(len) => {
            if len > MAX_ARRAY_LENGTH {
                return Err(Error::invalid_data(format!(
                    "Array length {} exceeds the maximum of {}",
                    len, MAX_ARRAY_LENGTH
                )));
            }
            writer.write_varuint32(len as u32 + 1);
        }
    }
    Ok(())
}

#[inline]
pub fn read_length(reader: &mut Reader) -> Result<Option<usize>, Error> {
    let token = reader.read_varuint32()?;
    if token == NULL_LENGTH {
        return Ok(None);
    }
    let len = (token - 1) as usize;
    if len > MAX_ARRAY_LENGTH {
        return Err(Error::invalid_data(format!(
            "Array length token {} exceeds the maximum length",
            token
        )));
    }
    Ok(Some(len))
}
