//! Walks report descriptor bytes back into the fields a host would see.
//!
//! Only what this device emits is understood: short items, one usage per main
//! item, no push/pop, no usage ranges.

use core::fmt;

use arrayvec::ArrayVec;

use super::item::{data_len, global_tag, local_tag, main_tag, ItemType, LONG_ITEM_PREFIX};
use crate::report::ReportType;

pub const MAX_FIELDS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Truncated { offset: usize },
    LongItem { offset: usize },
    TooManyFields,
    UnbalancedCollection { offset: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Truncated { offset } => write!(f, "item at {} runs past the end", offset),
            ParseError::LongItem { offset } => write!(f, "long item at {}", offset),
            ParseError::TooManyFields => write!(f, "more than {} main items", MAX_FIELDS),
            ParseError::UnbalancedCollection { offset } => {
                write!(f, "unbalanced collection at {}", offset)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a> {
    pub offset: usize,
    pub kind: ItemType,
    pub tag: u8,
    pub data: &'a [u8],
}

impl Item<'_> {
    pub fn unsigned(&self) -> u32 {
        let mut bytes = [0u8; 4];
        bytes[..self.data.len()].copy_from_slice(self.data);
        u32::from_le_bytes(bytes)
    }

    pub fn signed(&self) -> i32 {
        match *self.data {
            [] => 0,
            [b] => i32::from(b as i8),
            [lo, hi] => i32::from(i16::from_le_bytes([lo, hi])),
            _ => self.unsigned() as i32,
        }
    }
}

pub struct Items<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Items<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Items { bytes, offset: 0 }
    }
}

impl<'a> Iterator for Items<'a> {
    type Item = Result<Item<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let prefix = *self.bytes.get(offset)?;
        if prefix == LONG_ITEM_PREFIX {
            self.offset = self.bytes.len();
            return Some(Err(ParseError::LongItem { offset }));
        }
        let end = offset + 1 + data_len(prefix);
        let Some(data) = self.bytes.get(offset + 1..end) else {
            self.offset = self.bytes.len();
            return Some(Err(ParseError::Truncated { offset }));
        };
        self.offset = end;
        Some(Ok(Item {
            offset,
            kind: ItemType::from_prefix(prefix),
            tag: prefix >> 4,
            data,
        }))
    }
}

/// One Input, Output or Feature main item with the state it was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainField {
    pub report_id: u8,
    pub kind: ReportType,
    pub flags: u8,
    pub page: u16,
    pub usage: Option<u16>,
    pub string_index: Option<u8>,
    pub size: u32,
    pub count: u32,
    pub logical_min: i32,
    pub logical_max: i32,
    pub unit: u32,
    pub exponent: i8,
}

impl MainField {
    pub fn bits(&self) -> u32 {
        self.size * self.count
    }

    pub fn constant(&self) -> bool {
        self.flags & 0x01 != 0
    }
}

#[derive(Debug, Default)]
pub struct Layout {
    fields: ArrayVec<MainField, MAX_FIELDS>,
    collection_usages: ArrayVec<u16, 16>,
}

impl Layout {
    pub fn fields(&self) -> &[MainField] {
        &self.fields
    }

    /// Total bits declared for one report, padding included.
    pub fn report_bits(&self, id: u8, kind: ReportType) -> u32 {
        self.fields
            .iter()
            .filter(|field| field.report_id == id && field.kind == kind)
            .map(MainField::bits)
            .sum()
    }

    /// Fields of one report, in declaration order.
    pub fn report(&self, id: u8, kind: ReportType) -> impl Iterator<Item = &MainField> {
        self.fields
            .iter()
            .filter(move |field| field.report_id == id && field.kind == kind)
    }

    /// Usages attached to collections, outermost first.
    pub fn collection_usages(&self) -> &[u16] {
        &self.collection_usages
    }
}

#[derive(Default)]
struct State {
    page: u16,
    report_id: u8,
    size: u32,
    count: u32,
    logical_min: i32,
    logical_max: i32,
    unit: u32,
    exponent: i8,
    usage: Option<u16>,
    string_index: Option<u8>,
}

fn exponent(nibble: u32) -> i8 {
    let n = (nibble & 0x0F) as i8;
    if n > 7 {
        n - 16
    } else {
        n
    }
}

pub fn parse(bytes: &[u8]) -> Result<Layout, ParseError> {
    let mut layout = Layout::default();
    let mut state = State::default();
    let mut depth = 0usize;

    for item in Items::new(bytes) {
        let item = item?;
        match item.kind {
            ItemType::Global => match item.tag {
                global_tag::USAGE_PAGE => state.page = item.unsigned() as u16,
                global_tag::LOGICAL_MINIMUM => state.logical_min = item.signed(),
                global_tag::LOGICAL_MAXIMUM => state.logical_max = item.signed(),
                global_tag::UNIT => state.unit = item.unsigned(),
                global_tag::UNIT_EXPONENT => state.exponent = exponent(item.unsigned()),
                global_tag::REPORT_SIZE => state.size = item.unsigned(),
                global_tag::REPORT_ID => state.report_id = item.unsigned() as u8,
                global_tag::REPORT_COUNT => state.count = item.unsigned(),
                _ => {}
            },
            ItemType::Local => match item.tag {
                local_tag::USAGE if state.usage.is_none() => {
                    state.usage = Some(item.unsigned() as u16)
                }
                local_tag::STRING_INDEX => state.string_index = Some(item.unsigned() as u8),
                _ => {}
            },
            ItemType::Main => {
                let kind = match item.tag {
                    main_tag::INPUT => Some(ReportType::Input),
                    main_tag::OUTPUT => Some(ReportType::Output),
                    main_tag::FEATURE => Some(ReportType::Feature),
                    main_tag::COLLECTION => {
                        depth += 1;
                        if let Some(usage) = state.usage {
                            layout
                                .collection_usages
                                .try_push(usage)
                                .map_err(|_| ParseError::TooManyFields)?;
                        }
                        None
                    }
                    main_tag::END_COLLECTION => {
                        depth = depth
                            .checked_sub(1)
                            .ok_or(ParseError::UnbalancedCollection { offset: item.offset })?;
                        None
                    }
                    _ => None,
                };
                if let Some(kind) = kind {
                    layout
                        .fields
                        .try_push(MainField {
                            report_id: state.report_id,
                            kind,
                            flags: item.unsigned() as u8,
                            page: state.page,
                            usage: state.usage,
                            string_index: state.string_index,
                            size: state.size,
                            count: state.count,
                            logical_min: state.logical_min,
                            logical_max: state.logical_max,
                            unit: state.unit,
                            exponent: state.exponent,
                        })
                        .map_err(|_| ParseError::TooManyFields)?;
                }
                state.usage = None;
                state.string_index = None;
            }
            ItemType::Reserved => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::UnbalancedCollection { offset: bytes.len() });
    }
    Ok(layout)
}
