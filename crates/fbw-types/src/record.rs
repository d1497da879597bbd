//! Fixed-layout host records.
//!
//! A record is an ordered list of [`FieldSpec`]s registered with the host
//! under one definition ID.  Field position determines binary offset, so the
//! order in which a record declares its fields is the order in which they are
//! registered, encoded and decoded.
//!
//! Records are declared with the crate-internal `record!` macro, which
//! generates the struct, its [`Record::FIELDS`] table and the per-field codec
//! from one list:
//!
//! ```ignore
//! record! {
//!     pub struct SimOutputEtaTrim {
//!         eta_trim_deg: f64 => ("ELEVATOR TRIM POSITION", "DEGREE"),
//!     }
//! }
//! ```
//!
//! # Wire format
//!
//! All values are little-endian.  An *untagged* block carries every field in
//! declaration order.  A *tagged* block carries `(u32 datum index, value)`
//! pairs for a subset of fields and is merged field by field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::BridgeError;

// ─────────────────────────────────────────────────────────────────────────────
// Data types
// ─────────────────────────────────────────────────────────────────────────────

/// Binary datatype of one record field, numbered as the host numbers them.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Invalid = 0,
    Int32 = 1,
    Int64 = 2,
    Float32 = 3,
    Float64 = 4,
    String8 = 5,
    String32 = 6,
    String64 = 7,
    String128 = 8,
    String256 = 9,
    String260 = 10,
    StringV = 11,
    InitPosition = 12,
    MarkerState = 13,
    Waypoint = 14,
    LatLonAlt = 15,
    Xyz = 16,
}

impl DataType {
    /// `true` for composite datatypes that the host registers without a
    /// physical unit.
    ///
    /// This is the single place that decides which registration path a field
    /// takes; new composite types are added here.
    pub fn is_struct(self) -> bool {
        matches!(
            self,
            DataType::InitPosition
                | DataType::MarkerState
                | DataType::Waypoint
                | DataType::LatLonAlt
                | DataType::Xyz
        )
    }

    /// Encoded size in bytes, or `None` for variable-length and invalid types.
    pub fn size(self) -> Option<usize> {
        match self {
            DataType::Invalid | DataType::StringV => None,
            DataType::Int32 | DataType::Float32 => Some(4),
            DataType::Int64 | DataType::Float64 => Some(8),
            DataType::String8 => Some(8),
            DataType::String32 => Some(32),
            DataType::String64 => Some(64),
            DataType::String128 => Some(128),
            DataType::String256 => Some(256),
            DataType::String260 => Some(260),
            DataType::InitPosition => Some(56),
            DataType::MarkerState => Some(68),
            DataType::Waypoint => Some(44),
            DataType::LatLonAlt | DataType::Xyz => Some(24),
        }
    }
}

/// One named, unit-tagged field of a record.
///
/// `name` and `unit` are the wire contract with the host and must match its
/// schema exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub unit: &'static str,
    pub data_type: DataType,
}

impl FieldSpec {
    /// The unit to register, or `None` for composite fields.
    pub fn registration_unit(&self) -> Option<&'static str> {
        if self.data_type.is_struct() {
            None
        } else {
            Some(self.unit)
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.unit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Composite values
// ─────────────────────────────────────────────────────────────────────────────

/// Three-component body-axis vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Geographic position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLonAlt {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Datum codec
// ─────────────────────────────────────────────────────────────────────────────

/// A Rust type that can occupy one record slot.
pub trait Datum: Sized {
    const DATA_TYPE: DataType;
    const SIZE: usize;

    fn encode(&self, out: &mut Vec<u8>);

    /// Decode from the first [`Self::SIZE`] bytes of `bytes`.
    fn decode(bytes: &[u8]) -> Option<Self>;
}

fn take<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

impl Datum for f64 {
    const DATA_TYPE: DataType = DataType::Float64;
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        take(bytes).map(f64::from_le_bytes)
    }
}

impl Datum for f32 {
    const DATA_TYPE: DataType = DataType::Float32;
    const SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        take(bytes).map(f32::from_le_bytes)
    }
}

impl Datum for i32 {
    const DATA_TYPE: DataType = DataType::Int32;
    const SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        take(bytes).map(i32::from_le_bytes)
    }
}

impl Datum for i64 {
    const DATA_TYPE: DataType = DataType::Int64;
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        take(bytes).map(i64::from_le_bytes)
    }
}

impl Datum for Xyz {
    const DATA_TYPE: DataType = DataType::Xyz;
    const SIZE: usize = 24;

    fn encode(&self, out: &mut Vec<u8>) {
        self.x.encode(out);
        self.y.encode(out);
        self.z.encode(out);
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            x: f64::decode(bytes)?,
            y: f64::decode(bytes.get(8..)?)?,
            z: f64::decode(bytes.get(16..)?)?,
        })
    }
}

impl Datum for LatLonAlt {
    const DATA_TYPE: DataType = DataType::LatLonAlt;
    const SIZE: usize = 24;

    fn encode(&self, out: &mut Vec<u8>) {
        self.latitude.encode(out);
        self.longitude.encode(out);
        self.altitude.encode(out);
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            latitude: f64::decode(bytes)?,
            longitude: f64::decode(bytes.get(8..)?)?,
            altitude: f64::decode(bytes.get(16..)?)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// A fixed-layout record exchanged with the host under one definition ID.
pub trait Record: Copy + Default + fmt::Debug {
    /// Human-readable record name used in logs and errors.
    const NAME: &'static str;

    /// Fields in registration (and therefore binary) order.
    const FIELDS: &'static [FieldSpec];

    /// Append the encoding of field `index` to `out`.  Out-of-range indices
    /// append nothing.
    fn write_datum(&self, index: usize, out: &mut Vec<u8>);

    /// Decode field `index` from the front of `bytes`, returning the number of
    /// bytes consumed.  `None` for an unknown index or a short buffer; the
    /// field is left untouched in that case.
    fn read_datum(&mut self, index: usize, bytes: &[u8]) -> Option<usize>;

    /// Total size of an untagged block.
    fn size() -> usize {
        Self::FIELDS
            .iter()
            .map(|f| f.data_type.size().unwrap_or(0))
            .sum()
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::size());
        for index in 0..Self::FIELDS.len() {
            self.write_datum(index, &mut out);
        }
        out
    }

    /// Overwrite every field from an untagged block.  The record is left
    /// unchanged when the block size does not match the layout.
    fn merge_untagged(&mut self, bytes: &[u8]) -> Result<(), BridgeError> {
        let expected = Self::size();
        if bytes.len() != expected {
            return Err(BridgeError::Layout {
                record: Self::NAME,
                expected,
                actual: bytes.len(),
            });
        }
        let mut decoded = *self;
        let mut offset = 0;
        for index in 0..Self::FIELDS.len() {
            offset += decoded
                .read_datum(index, &bytes[offset..])
                .ok_or(BridgeError::Layout {
                    record: Self::NAME,
                    expected,
                    actual: bytes.len(),
                })?;
        }
        *self = decoded;
        Ok(())
    }

    /// Merge a tagged block field by field, last write wins.  Returns the
    /// number of fields applied.  On a malformed tail, the fields applied
    /// before it are kept and a layout error is returned.
    fn merge_tagged(&mut self, bytes: &[u8]) -> Result<usize, BridgeError> {
        let malformed = || BridgeError::Layout {
            record: Self::NAME,
            expected: Self::size(),
            actual: bytes.len(),
        };
        let mut offset = 0;
        let mut applied = 0;
        while offset < bytes.len() {
            let tag: [u8; 4] = take(&bytes[offset..]).ok_or_else(malformed)?;
            offset += 4;
            let index = u32::from_le_bytes(tag) as usize;
            offset += self
                .read_datum(index, &bytes[offset..])
                .ok_or_else(malformed)?;
            applied += 1;
        }
        Ok(applied)
    }

    fn decode(bytes: &[u8]) -> Result<Self, BridgeError> {
        let mut record = Self::default();
        record.merge_untagged(bytes)?;
        Ok(record)
    }
}

/// Declare a [`Record`] struct from a list of `field: Type => (name, unit)`.
macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty => ($simvar:literal, $unit:literal)
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $crate::record::Record for $name {
            const NAME: &'static str = stringify!($name);

            const FIELDS: &'static [$crate::record::FieldSpec] = &[
                $(
                    $crate::record::FieldSpec {
                        name: $simvar,
                        unit: $unit,
                        data_type: <$ty as $crate::record::Datum>::DATA_TYPE,
                    },
                )*
            ];

            fn write_datum(&self, index: usize, out: &mut Vec<u8>) {
                let mut slot = 0usize;
                $(
                    if slot == index {
                        $crate::record::Datum::encode(&self.$field, out);
                        return;
                    }
                    slot += 1;
                )*
                let _ = slot;
            }

            fn read_datum(&mut self, index: usize, bytes: &[u8]) -> Option<usize> {
                let mut slot = 0usize;
                $(
                    if slot == index {
                        self.$field = <$ty as $crate::record::Datum>::decode(bytes)?;
                        return Some(<$ty as $crate::record::Datum>::SIZE);
                    }
                    slot += 1;
                )*
                let _ = slot;
                None
            }
        }
    };
}

pub(crate) use record;
