//! Embedding element types and their binary layout.
//!
//! Payloads are the elements concatenated in input order, each in native
//! byte order. `FLOAT16` is not IEEE half precision: every number is
//! truncated toward zero and wrapped into an unsigned 16-bit integer
//! (non-finite values become 0). Stored data depends on that layout, so it
//! must stay bit-exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::{RagError, RagResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DType {
    Float32,
    Float16,
    Float64,
}

impl DType {
    pub const ALL: [DType; 3] = [DType::Float32, DType::Float16, DType::Float64];

    /// Tag understood by the backing store's `TYPE` vector attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "FLOAT32",
            Self::Float16 => "FLOAT16",
            Self::Float64 => "FLOAT64",
        }
    }

    /// Bytes per element
    pub fn element_width(&self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Float16 => 2,
            Self::Float64 => 8,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = RagError;

    /// Exact, case-sensitive match on the tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .into_iter()
            .find(|dtype| dtype.as_str() == s)
            .ok_or_else(|| RagError::UnsupportedDtype(s.to_string()))
    }
}

/// Encode `values` as a `dtype` payload of `values.len() * element_width` bytes.
pub fn encode(values: &[f64], dtype: DType) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * dtype.element_width());

    match dtype {
        DType::Float32 => {
            for v in values {
                out.extend_from_slice(&(*v as f32).to_ne_bytes());
            }
        }
        DType::Float16 => {
            for v in values {
                out.extend_from_slice(&wrap_u16(*v).to_ne_bytes());
            }
        }
        DType::Float64 => {
            for v in values {
                out.extend_from_slice(&v.to_ne_bytes());
            }
        }
    }

    out
}

/// [`encode`] for a dtype tag that has not been parsed yet.
pub fn encode_tagged(values: &[f64], tag: &str) -> RagResult<Vec<u8>> {
    Ok(encode(values, tag.parse()?))
}

/// Inverse of [`encode`]. `FLOAT16` elements come back as their integer value.
pub fn decode(bytes: &[u8], dtype: DType) -> RagResult<Vec<f64>> {
    let width = dtype.element_width();
    if bytes.len() % width != 0 {
        return Err(RagError::InvalidPayload {
            len: bytes.len(),
            dtype,
        });
    }

    let values = bytes
        .chunks_exact(width)
        .map(|chunk| match dtype {
            DType::Float32 => f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64,
            DType::Float16 => u16::from_ne_bytes([chunk[0], chunk[1]]) as f64,
            DType::Float64 => f64::from_ne_bytes([
                chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
            ]),
        })
        .collect();

    Ok(values)
}

fn wrap_u16(value: f64) -> u16 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(65536.0) as u16
}
