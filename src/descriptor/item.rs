//! HID short items (HID 1.11, 6.2.2.2).
//!
//! ```text
//! prefix: | tag (4) | type (2) | size (2) |
//! size 0, 1, 2 bytes; size code 3 means 4 bytes
//! ```

use arrayvec::ArrayVec;

use crate::usage::{Unit, UsagePage};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Main = 0,
    Global = 1,
    Local = 2,
    Reserved = 3,
}

impl ItemType {
    pub const fn from_prefix(prefix: u8) -> Self {
        match (prefix >> 2) & 0x03 {
            0 => ItemType::Main,
            1 => ItemType::Global,
            2 => ItemType::Local,
            _ => ItemType::Reserved,
        }
    }
}

pub mod main_tag {
    pub const INPUT: u8 = 0x8;
    pub const OUTPUT: u8 = 0x9;
    pub const COLLECTION: u8 = 0xA;
    pub const FEATURE: u8 = 0xB;
    pub const END_COLLECTION: u8 = 0xC;
}

pub mod global_tag {
    pub const USAGE_PAGE: u8 = 0x0;
    pub const LOGICAL_MINIMUM: u8 = 0x1;
    pub const LOGICAL_MAXIMUM: u8 = 0x2;
    pub const UNIT_EXPONENT: u8 = 0x5;
    pub const UNIT: u8 = 0x6;
    pub const REPORT_SIZE: u8 = 0x7;
    pub const REPORT_ID: u8 = 0x8;
    pub const REPORT_COUNT: u8 = 0x9;
}

pub mod local_tag {
    pub const USAGE: u8 = 0x0;
    pub const STRING_INDEX: u8 = 0x7;
}

pub const COLLECTION_APPLICATION: u8 = 0x01;
pub const COLLECTION_LOGICAL: u8 = 0x02;

/// Constant array, used for padding bits.
pub const MAIN_PADDING: u8 = 0x01;

pub const LONG_ITEM_PREFIX: u8 = 0xFE;

pub const fn prefix(tag: u8, kind: ItemType, len: usize) -> u8 {
    let size = match len {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    };
    (tag << 4) | ((kind as u8) << 2) | size
}

/// Number of data bytes following `prefix`.
pub const fn data_len(prefix: u8) -> usize {
    match prefix & 0x03 {
        3 => 4,
        n => n as usize,
    }
}

/// Smallest little-endian two's complement encoding of `value`.
pub fn signed_bytes(value: i32) -> ([u8; 4], usize) {
    let len = if i8::try_from(value).is_ok() {
        1
    } else if i16::try_from(value).is_ok() {
        2
    } else {
        4
    };
    (value.to_le_bytes(), len)
}

pub fn unsigned_bytes(value: u32) -> ([u8; 4], usize) {
    let len = if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else {
        4
    };
    (value.to_le_bytes(), len)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorOverflow;

/// Global item state, so each global is only written when it changes.
struct Globals {
    usage_page: Option<u8>,
    logical_min: Option<i32>,
    logical_max: Option<i32>,
    unit: Option<u32>,
    exponent: Option<i8>,
    report_size: Option<u16>,
    report_count: Option<u16>,
    report_id: Option<u8>,
}

impl Globals {
    /// Unit and exponent start at zero in every HID parser.
    const fn initial() -> Self {
        Globals {
            usage_page: None,
            logical_min: None,
            logical_max: None,
            unit: Some(0),
            exponent: Some(0),
            report_size: None,
            report_count: None,
            report_id: None,
        }
    }
}

pub struct ItemWriter<const N: usize> {
    bytes: ArrayVec<u8, N>,
    globals: Globals,
}

impl<const N: usize> Default for ItemWriter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ItemWriter<N> {
    pub fn new() -> Self {
        ItemWriter {
            bytes: ArrayVec::new(),
            globals: Globals::initial(),
        }
    }

    pub fn finish(self) -> ArrayVec<u8, N> {
        self.bytes
    }

    fn item(&mut self, tag: u8, kind: ItemType, data: &[u8]) -> Result<(), DescriptorOverflow> {
        self.bytes
            .try_push(prefix(tag, kind, data.len()))
            .map_err(|_| DescriptorOverflow)?;
        self.bytes
            .try_extend_from_slice(data)
            .map_err(|_| DescriptorOverflow)
    }

    fn global_unsigned(&mut self, tag: u8, value: u32) -> Result<(), DescriptorOverflow> {
        let (bytes, len) = unsigned_bytes(value);
        self.item(tag, ItemType::Global, &bytes[..len])
    }

    fn global_signed(&mut self, tag: u8, value: i32) -> Result<(), DescriptorOverflow> {
        let (bytes, len) = signed_bytes(value);
        self.item(tag, ItemType::Global, &bytes[..len])
    }

    pub fn usage_page(&mut self, page: UsagePage) -> Result<(), DescriptorOverflow> {
        if self.globals.usage_page.replace(page.code()) == Some(page.code()) {
            return Ok(());
        }
        self.global_unsigned(global_tag::USAGE_PAGE, u32::from(page.code()))
    }

    pub fn logical_range(&mut self, min: i32, max: i32) -> Result<(), DescriptorOverflow> {
        if self.globals.logical_min.replace(min) != Some(min) {
            self.global_signed(global_tag::LOGICAL_MINIMUM, min)?;
        }
        if self.globals.logical_max.replace(max) != Some(max) {
            self.global_signed(global_tag::LOGICAL_MAXIMUM, max)?;
        }
        Ok(())
    }

    pub fn unit(&mut self, unit: Unit, exponent: i8) -> Result<(), DescriptorOverflow> {
        let code = unit.code();
        if self.globals.unit.replace(code) != Some(code) {
            self.global_unsigned(global_tag::UNIT, code)?;
        }
        if self.globals.exponent.replace(exponent) != Some(exponent) {
            let nibble = (exponent as u8) & 0x0F;
            self.item(global_tag::UNIT_EXPONENT, ItemType::Global, &[nibble])?;
        }
        Ok(())
    }

    pub fn report_size(&mut self, bits: u16) -> Result<(), DescriptorOverflow> {
        if self.globals.report_size.replace(bits) == Some(bits) {
            return Ok(());
        }
        self.global_unsigned(global_tag::REPORT_SIZE, u32::from(bits))
    }

    pub fn report_count(&mut self, count: u16) -> Result<(), DescriptorOverflow> {
        if self.globals.report_count.replace(count) == Some(count) {
            return Ok(());
        }
        self.global_unsigned(global_tag::REPORT_COUNT, u32::from(count))
    }

    pub fn report_id(&mut self, id: u8) -> Result<(), DescriptorOverflow> {
        if self.globals.report_id.replace(id) == Some(id) {
            return Ok(());
        }
        self.item(global_tag::REPORT_ID, ItemType::Global, &[id])
    }

    pub fn usage(&mut self, usage: u16) -> Result<(), DescriptorOverflow> {
        let (bytes, len) = unsigned_bytes(u32::from(usage));
        self.item(local_tag::USAGE, ItemType::Local, &bytes[..len])
    }

    pub fn string_index(&mut self, index: u8) -> Result<(), DescriptorOverflow> {
        self.item(local_tag::STRING_INDEX, ItemType::Local, &[index])
    }

    pub fn collection(&mut self, kind: u8) -> Result<(), DescriptorOverflow> {
        self.item(main_tag::COLLECTION, ItemType::Main, &[kind])
    }

    pub fn end_collection(&mut self) -> Result<(), DescriptorOverflow> {
        self.item(main_tag::END_COLLECTION, ItemType::Main, &[])
    }

    pub fn input(&mut self, flags: u8) -> Result<(), DescriptorOverflow> {
        self.item(main_tag::INPUT, ItemType::Main, &[flags])
    }

    pub fn feature(&mut self, flags: u8) -> Result<(), DescriptorOverflow> {
        self.item(main_tag::FEATURE, ItemType::Main, &[flags])
    }
}
