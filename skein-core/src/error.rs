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

//! # PERFORMANCE CRITICAL MODULE
//!
//! Error constructors are reachable from every buffer read and every type
//! check. They are kept `#[cold]` so that LLVM lays out the successful paths
//! of the codecs as the fall-through branch. Changing the attributes on the
//! constructors below has a measurable effect on array decoding throughput.

use std::borrow::Cow;

use thiserror::Error;

/// Set `SKEIN_PANIC_ON_ERROR=1` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("SKEIN_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for skein serialization and deserialization operations.
///
/// Do not construct variants directly, use the static constructor functions
/// ([`Error::invalid_data`], [`Error::type_error`], ...) so that
/// `SKEIN_PANIC_ON_ERROR` can point at the exact creation site:
///
/// ```bash
/// RUST_BACKTRACE=1 SKEIN_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// ## Classification
///
/// - Malformed input (`BufferOutOfBound`, `InvalidData`, `TypeError`,
///   `TypeMismatch`, `EncodingError`, `InvalidRef`) is fatal for the current
///   decode call and is never retried.
/// - `Io` carries a failure of the output sink and is passed through as is.
/// - `DepthExceed` and `NotAllowed` report graphs or values the current
///   configuration cannot encode.
///
/// ```rust
/// use skein_core::error::Error;
///
/// let err = Error::invalid_data(format!("Invalid length token {}", 7));
/// assert!(err.is_format_error());
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Type mismatch between the expected and the actual type id.
    ///
    /// Do not construct this variant directly; use [`Error::type_mismatch`] instead.
    #[error("Type mismatch: type_a = {0}, type_b = {1}")]
    TypeMismatch(u32, u32),

    /// Buffer boundary violation during a read.
    ///
    /// Do not construct this variant directly; use [`Error::buffer_out_of_bound`] instead.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Invalid or corrupted data encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_data`] instead.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// Invalid reference ID encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_ref`] instead.
    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    /// General type-related error, e.g. an unknown or abstract type.
    ///
    /// Do not construct this variant directly; use [`Error::type_error`] instead.
    #[error("{0}")]
    TypeError(Cow<'static, str>),

    /// Error in string encoding or conversion.
    ///
    /// Do not construct this variant directly; use [`Error::encoding_error`] instead.
    #[error("{0}")]
    EncodingError(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Operation not allowed in current configuration.
    ///
    /// Do not construct this variant directly; use [`Error::not_allowed`] instead.
    #[error("{0}")]
    NotAllowed(Cow<'static, str>),

    /// Generic unknown error.
    ///
    /// Do not construct this variant directly; use [`Error::unknown`] instead.
    #[error("{0}")]
    Unknown(Cow<'static, str>),

    /// Failure of the output sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch(type_a: u32, type_b: u32) -> Self {
        let err = Error::TypeMismatch(type_a, type_b);
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidData(s.into());
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_ref<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidRef(s.into());
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::TypeError(s.into());
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn encoding_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::EncodingError(s.into());
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn not_allowed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::NotAllowed(s.into());
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unknown(s.into());
        if PANIC_ON_ERROR {
            panic!("SKEIN_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Whether this error reports malformed or truncated input.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::TypeMismatch(..)
                | Error::BufferOutOfBound(..)
                | Error::InvalidData(_)
                | Error::InvalidRef(_)
                | Error::TypeError(_)
                | Error::EncodingError(_)
        )
    }

    /// Appends the Rust type name to a [`Error::TypeError`], leaves other errors untouched.
    #[inline(never)]
    pub fn enhance_type_error<T: ?Sized + 'static>(err: Error) -> Error {
        if let Error::TypeError(s) = err {
            let mut msg = s.to_string();
            msg.push_str(" (type: ");
            msg.push_str(std::any::type_name::<T>());
            msg.push(')');
            Error::type_error(msg)
        } else {
            err
        }
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use skein_core::ensure;
/// use skein_core::error::Error;
///
/// fn check_value(n: i32) -> Result<(), Error> {
///     ensure!(n > 0, "value must be positive");
///     ensure!(n < 10, Error::invalid_data(format!("value {} too large", n)));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with a [`Error::NotAllowed`].
#[macro_export]
macro_rules! not_allowed {
    ($err:expr) => {
        return Err($crate::error::Error::not_allowed($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::not_allowed(format!($fmt, $($arg)*)))
    };
}
