//! Index types for mesh elements.
//!
//! This module provides type-safe index wrappers for vertices, half-edges, and faces.
//! Each wrapper is a `u32` with `u32::MAX` reserved as the "none" sentinel, which
//! marks isolated vertices, boundary twins, and missing faces. In serialized
//! documents the sentinel is written as `-1`.

use std::fmt::{self, Debug};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SENTINEL: u32 = u32::MAX;

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(u32);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < SENTINEL as usize, "index {} too large for u32", index);
                Self(index as u32)
            }

            /// Create an invalid/none index.
            #[inline]
            pub const fn invalid() -> Self {
                Self(SENTINEL)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw `u32` value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            /// Check if this is a valid (non-none) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != SENTINEL
            }

            /// The index as `Some(usize)`, or `None` for the sentinel.
            #[inline]
            pub fn get(self) -> Option<usize> {
                self.is_valid().then(|| self.index())
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(NONE)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                if self.is_valid() {
                    serializer.serialize_u32(self.0)
                } else {
                    serializer.serialize_i64(-1)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                match i64::deserialize(deserializer)? {
                    -1 => Ok(Self::invalid()),
                    raw if raw >= 0 && raw < SENTINEL as i64 => Ok(Self(raw as u32)),
                    raw => Err(D::Error::custom(format!(
                        "{} index out of range: {}",
                        $display, raw
                    ))),
                }
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
