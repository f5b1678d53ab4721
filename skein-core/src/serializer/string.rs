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

//! String encoding shared by the `String` codec and string arrays.
//!
//! Each string starts with a varuint36 header `byte_len << 2 | encoding`.
//! An absent string is the header `STR_NULL` with no payload, so nullable
//! strings need no separate presence marker.

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::SkeinObject;

const STR_LATIN1: u64 = 0;
const STR_UTF8: u64 = 2;
const STR_NULL: u64 = 3;

#[inline]
fn latin1_len(s: &str) -> Option<usize> {
    // Every char below U+0100 occupies one Latin-1 byte.
    let mut len = 0;
    for c in s.chars() {
        if c as u32 > 0xFF {
            return None;
        }
        len += 1;
    }
    Some(len)
}

/// The header must fit in 36 bits, so a string is shorter than 16 GiB.
#[inline]
fn header(len: usize, encoding: u64) -> Result<u64, Error> {
    if (len as u64) >= 1 << 34 {
        return Err(Error::encoding_error(format!(
            "String of {} bytes is too long to encode",
            len
        )));
    }
    Ok((len as u64) << 2 | encoding)
}

pub fn write_str(writer: &mut Writer, s: &str) -> Result<(), Error> {
    match latin1_len(s) {
        Some(len) => {
            writer.write_varuint36_small(header(len, STR_LATIN1)?);
            writer.write_latin1_string(s);
        }
        None => {
            writer.write_varuint36_small(header(s.len(), STR_UTF8)?);
            writer.write_utf8_string(s);
        }
    }
    Ok(())
}

#[inline]
pub fn write_nullable_str(writer: &mut Writer, s: Option<&str>) -> Result<(), Error> {
    match s {
        Some(s) => write_str(writer, s),
        None => {
            writer.write_varuint36_small(STR_NULL);
            Ok(())
        }
    }
}

pub fn read_nullable_string(reader: &mut Reader) -> Result<Option<String>, Error> {
    let header = reader.read_varuint36small()?;
    let len = (header >> 2) as usize;
    match header & 0b11 {
        STR_LATIN1 => reader.read_latin1_string(len).map(Some),
        STR_UTF8 => reader.read_utf8_string(len).map(Some),
        STR_NULL if len == 0 => Ok(None),
        encoding => Err(Error::encoding_error(format!(
            "Invalid string header: encoding {}, length {}",
            encoding, len
        ))),
    }
}

pub fn read_string(reader: &mut Reader) -> Result<String, Error> {
    read_nullable_string(reader)?
        .ok_or_else(|| Error::invalid_data("Unexpected null string"))
}

impl SkeinObject for String {
    #[inline]
    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_str(&mut context.writer, self)
    }

    #[inline]
    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_string(&mut context.reader)
    }
}
