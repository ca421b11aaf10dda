// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary trace container.
//!
//! All integers are little-endian. Layout:
//!
//! ```text
//! header   "FLKR" | version: u16 | kind: u8 (0 layers, 1 windows)
//! entry    TAG_ENTRY | timestamp: i64 | record_count: u32 | record*
//! record   TAG_LAYER | TAG_WINDOW | id: i32 | parent_id: i32 | name | payload
//! name     len: u32 | utf-8 bytes
//! layer    hidden: u8 | color_fill: u8 | has_buffer: u8 | alpha: f32 | z: i32
//!          | bounds: 4 x f64 | rect_count: u32 | rect_count x (4 x i32)
//! window   role: u8 | kind: u8 | visible: u8 | frame: 4 x i32
//! ```
//!
//! [`decode`] is all-or-nothing: truncation, an unknown tag, or a record of
//! the wrong kind fails the whole buffer. [`TraceWriter`] produces the same
//! format.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::diag::{Diagnostics, EntryDecodedEvent};
use crate::error::DecodeError;
use crate::node::{LayerRecord, Record, RecordData, WindowKind, WindowRecord, WindowRole};
use crate::region::{RectRegion, Region};

/// Leading bytes of every container.
pub const MAGIC: [u8; 4] = *b"FLKR";
/// Container version written and accepted.
pub const VERSION: u16 = 1;

const TAG_ENTRY: u8 = 0x01;
const TAG_LAYER: u8 = 0x10;
const TAG_WINDOW: u8 = 0x11;

/// Which capture facility produced a trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TraceKind {
    /// Compositor layer captures.
    #[default]
    Layers,
    /// Window-manager captures.
    Windows,
}

impl TraceKind {
    const fn to_byte(self) -> u8 {
        match self {
            Self::Layers => 0,
            Self::Windows => 1,
        }
    }

    const fn record_tag(self) -> u8 {
        match self {
            Self::Layers => TAG_LAYER,
            Self::Windows => TAG_WINDOW,
        }
    }

    /// Lowercase label used in reports and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layers => "layers",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded, still flat, container entry.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedEntry {
    /// Capture timestamp.
    pub timestamp: i64,
    /// Records in container order.
    pub records: Vec<Record>,
}

/// A fully decoded container.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTrace {
    /// Trace kind from the header.
    pub kind: TraceKind,
    /// Entries in container order.
    pub entries: Vec<DecodedEntry>,
}

/// Decodes a container buffer.
pub fn decode(bytes: &[u8]) -> Result<DecodedTrace, DecodeError> {
    decode_with(bytes, &mut Diagnostics::none())
}

/// Decodes a container buffer, reporting each entry to `diag`.
pub fn decode_with(bytes: &[u8], diag: &mut Diagnostics<'_>) -> Result<DecodedTrace, DecodeError> {
    let mut reader = Reader { data: bytes, pos: 0 };

    let magic = reader.take(MAGIC.len()).map_err(|_| DecodeError::BadMagic)?;
    if magic != MAGIC.as_slice() {
        return Err(DecodeError::BadMagic);
    }
    let version = reader.read_u16()?;
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let kind = match reader.read_u8()? {
        0 => TraceKind::Layers,
        1 => TraceKind::Windows,
        other => return Err(DecodeError::UnknownKind(other)),
    };

    let mut entries = Vec::new();
    while !reader.is_at_end() {
        let offset = reader.pos;
        let tag = reader.read_u8()?;
        if tag != TAG_ENTRY {
            return Err(DecodeError::UnknownTag { tag, offset });
        }
        let timestamp = reader.read_i64()?;
        let count = reader.read_len()?;
        let mut records = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            records.push(reader.read_record(kind)?);
        }
        diag.entry_decoded(&EntryDecodedEvent {
            timestamp,
            record_count: records.len(),
        });
        entries.push(DecodedEntry { timestamp, records });
    }

    Ok(DecodedTrace { kind, entries })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated { offset: self.pos });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let offset = self.pos;
        self.take(N)?
            .try_into()
            .map_err(|_| DecodeError::Truncated { offset })
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.array().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.array().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.array().map(i32::from_le_bytes)
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        self.array().map(i64::from_le_bytes)
    }

    fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.array().map(f32::from_le_bytes)
    }

    fn read_f64(&mut self) -> Result<f64, DecodeError> {
        self.array().map(f64::from_le_bytes)
    }

    fn read_len(&mut self) -> Result<usize, DecodeError> {
        let offset = self.pos;
        let len = self.read_u32()?;
        usize::try_from(len).map_err(|_| DecodeError::Truncated { offset })
    }

    fn read_rect(&mut self) -> Result<RectRegion, DecodeError> {
        Ok(RectRegion::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    fn read_name(&mut self) -> Result<String, DecodeError> {
        let len = self.read_len()?;
        let offset = self.pos;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| DecodeError::InvalidName { offset })
    }

    fn read_record(&mut self, kind: TraceKind) -> Result<Record, DecodeError> {
        let offset = self.pos;
        let tag = self.read_u8()?;
        if tag != TAG_LAYER && tag != TAG_WINDOW {
            return Err(DecodeError::UnknownTag { tag, offset });
        }
        if tag != kind.record_tag() {
            return Err(DecodeError::KindMismatch { offset });
        }
        let id = self.read_i32()?;
        let parent_id = self.read_i32()?;
        let name = self.read_name()?;
        let data = if tag == TAG_LAYER {
            RecordData::Layer(self.read_layer()?)
        } else {
            RecordData::Window(self.read_window()?)
        };
        Ok(Record {
            id,
            parent_id,
            name,
            data,
        })
    }

    fn read_layer(&mut self) -> Result<LayerRecord, DecodeError> {
        let hidden = self.read_bool()?;
        let color_fill = self.read_bool()?;
        let has_buffer = self.read_bool()?;
        let alpha = self.read_f32()?;
        let z = self.read_i32()?;
        let bounds = Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        );
        let rect_count = self.read_len()?;
        let mut visible_region = Region::new();
        for _ in 0..rect_count {
            visible_region.push(self.read_rect()?);
        }
        Ok(LayerRecord {
            hidden,
            color_fill,
            has_buffer,
            alpha,
            z,
            visible_region,
            bounds,
        })
    }

    fn read_window(&mut self) -> Result<WindowRecord, DecodeError> {
        let offset = self.pos;
        let role = match self.read_u8()? {
            0 => WindowRole::Container,
            1 => WindowRole::Task,
            2 => WindowRole::Activity,
            3 => WindowRole::Token,
            4 => WindowRole::Window,
            tag => return Err(DecodeError::UnknownTag { tag, offset }),
        };
        let offset = self.pos;
        let kind = match self.read_u8()? {
            0 => WindowKind::AboveApp,
            1 => WindowKind::App,
            2 => WindowKind::BelowApp,
            3 => WindowKind::Ime,
            4 => WindowKind::Other,
            tag => return Err(DecodeError::UnknownTag { tag, offset }),
        };
        let visible = self.read_bool()?;
        let frame = self.read_rect()?;
        Ok(WindowRecord {
            role,
            kind,
            visible,
            frame,
        })
    }
}

/// Encodes records into the container format.
///
/// The header is written on construction; each [`push_entry`](Self::push_entry)
/// appends one timestamped entry.
#[derive(Debug)]
pub struct TraceWriter {
    buf: Vec<u8>,
}

impl TraceWriter {
    /// Starts a container of the given kind.
    #[must_use]
    pub fn new(kind: TraceKind) -> Self {
        let mut writer = Self { buf: Vec::new() };
        writer.buf.extend_from_slice(&MAGIC);
        writer.buf.extend_from_slice(&VERSION.to_le_bytes());
        writer.write_u8(kind.to_byte());
        writer
    }

    /// Appends one entry.
    ///
    /// Records are written as given; mixing layer and window records
    /// produces a container that [`decode`] rejects.
    pub fn push_entry<'r>(
        &mut self,
        timestamp: i64,
        records: impl IntoIterator<Item = &'r Record, IntoIter: ExactSizeIterator>,
    ) {
        let records = records.into_iter();
        self.write_u8(TAG_ENTRY);
        self.buf.extend_from_slice(&timestamp.to_le_bytes());
        self.write_len(records.len());
        for record in records {
            self.write_record(record);
        }
    }

    /// Returns a view of the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer and returns the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_len(&mut self, len: usize) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "entries, names and regions are far below u32::MAX"
        )]
        let len = len as u32;
        self.buf.extend_from_slice(&len.to_le_bytes());
    }

    fn write_rect(&mut self, r: RectRegion) {
        self.write_i32(r.left);
        self.write_i32(r.top);
        self.write_i32(r.right);
        self.write_i32(r.bottom);
    }

    fn write_record(&mut self, record: &Record) {
        self.write_u8(match record.data {
            RecordData::Layer(_) => TAG_LAYER,
            RecordData::Window(_) => TAG_WINDOW,
        });
        self.write_i32(record.id);
        self.write_i32(record.parent_id);
        self.write_len(record.name.len());
        self.buf.extend_from_slice(record.name.as_bytes());
        match &record.data {
            RecordData::Layer(layer) => self.write_layer(layer),
            RecordData::Window(window) => self.write_window(window),
        }
    }

    fn write_layer(&mut self, layer: &LayerRecord) {
        self.write_u8(u8::from(layer.hidden));
        self.write_u8(u8::from(layer.color_fill));
        self.write_u8(u8::from(layer.has_buffer));
        self.buf.extend_from_slice(&layer.alpha.to_le_bytes());
        self.write_i32(layer.z);
        let b = layer.bounds;
        for v in [b.x0, b.y0, b.x1, b.y1] {
            self.buf.extend_from_slice(&v.to_le_bytes());
        }
        let rects = layer.visible_region.rects();
        self.write_len(rects.len());
        for &r in rects {
            self.write_rect(r);
        }
    }

    fn write_window(&mut self, window: &WindowRecord) {
        self.write_u8(match window.role {
            WindowRole::Container => 0,
            WindowRole::Task => 1,
            WindowRole::Activity => 2,
            WindowRole::Token => 3,
            WindowRole::Window => 4,
        });
        self.write_u8(match window.kind {
            WindowKind::AboveApp => 0,
            WindowKind::App => 1,
            WindowKind::BelowApp => 2,
            WindowKind::Ime => 3,
            WindowKind::Other => 4,
        });
        self.write_u8(u8::from(window.visible));
        self.write_rect(window.frame);
    }
}
