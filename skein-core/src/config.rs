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

/// Configuration for skein serialization.
///
/// Fixed when the owning [`Skein`](crate::skein::Skein) is built and shared
/// read-only by every `WriteContext`/`ReadContext` created for a call.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether reference tracking is enabled.
    /// When enabled, shared references and circular references are tracked
    /// and preserved during serialization/deserialization.
    pub track_ref: bool,
    /// Maximum depth for nested dynamic object serialization.
    pub max_dyn_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            track_ref: true,
            max_dyn_depth: 5,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.track_ref
    }

    #[inline(always)]
    pub fn max_dyn_depth(&self) -> u32 {
        self.max_dyn_depth
    }
}
