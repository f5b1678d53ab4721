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
use crate::config::Config;
use crate::error::Error;
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::type_resolver::TypeResolver;

/// Per-call serialization state.
///
/// A context is created for one top-level call and dropped afterwards; it
/// is the only mutable state touched by the codecs, so one `Skein` can serve
/// many threads as long as each call has its own context.
pub struct WriteContext<'a> {
    pub writer: Writer,
    type_resolver: &'a TypeResolver,
    config: &'a Config,
    pub ref_writer: RefWriter,
    current_depth: u32,
}

impl<'a> WriteContext<'a> {
    pub fn new(type_resolver: &'a TypeResolver, config: &'a Config) -> WriteContext<'a> {
        WriteContext {
            writer: Writer::default(),
            type_resolver,
            config,
            ref_writer: RefWriter::new(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &'a TypeResolver {
        self.type_resolver
    }

    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.config.track_ref
    }

    #[inline]
    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        check_depth(self.current_depth, self.config.max_dyn_depth)
    }

    #[inline]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

pub struct ReadContext<'a, 'bf> {
    pub reader: Reader<'bf>,
    type_resolver: &'a TypeResolver,
    config: &'a Config,
    pub ref_reader: RefReader,
    current_depth: u32,
}

impl<'a, 'bf> ReadContext<'a, 'bf> {
    pub fn new(
        type_resolver: &'a TypeResolver,
        config: &'a Config,
        reader: Reader<'bf>,
    ) -> ReadContext<'a, 'bf> {
        ReadContext {
            reader,
            type_resolver,
            config,
            ref_reader: RefReader::new(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &'a TypeResolver {
        self.type_resolver
    }

    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.config.track_ref
    }

    #[inline]
    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        check_depth(self.current_depth, self.config.max_dyn_depth)
    }

    #[inline]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}

#[inline(always)]
fn check_depth(current_depth: u32, max_dyn_depth: u32) -> Result<(), Error> {
    if current_depth > max_dyn_depth {
        return Err(Error::depth_exceed(format!(
            "Maximum dynamic object nesting depth ({}) exceeded. Current depth: {}. \
            This may indicate a circular reference or overly deep object graph. \
            Consider increasing max_dyn_depth if this is expected.",
            max_dyn_depth, current_depth
        )));
    }
    Ok(())
}
