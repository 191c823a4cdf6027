//! Report descriptor generation.
//!
//! Bytes usage, per field of the report map:
//! REPORT_ID, USAGE_PAGE, REPORT_SIZE, LOGICAL_MINIMUM/MAXIMUM, UNIT and
//! UNIT_EXPONENT (each only when it changed), then USAGE + INPUT for input
//! capable fields and USAGE (+ STRING_INDEX) + FEATURE for all of them.
//! PresentStatus closes the map as its own logical collection of one bit
//! fields, mirrored in Input and Feature.

pub mod item;
pub mod parse;

use arrayvec::ArrayVec;

use crate::layout::{main_flags, Access, Field, ReportSpec};
use crate::profile::HostProfile;
use crate::status::StatusFlag;
use crate::usage::{self, Unit, UsagePage};

use item::{
    DescriptorOverflow, ItemWriter, COLLECTION_APPLICATION, COLLECTION_LOGICAL, MAIN_PADDING,
};

pub const MAX_DESCRIPTOR_LEN: usize = 768;

pub type ReportDescriptor = ArrayVec<u8, MAX_DESCRIPTOR_LEN>;

type Writer = ItemWriter<MAX_DESCRIPTOR_LEN>;

pub fn build(profile: HostProfile) -> Result<ReportDescriptor, DescriptorOverflow> {
    let mut w = Writer::new();

    w.usage_page(UsagePage::PowerDevice)?;
    w.usage(usage::PD_UPS)?;
    w.collection(COLLECTION_APPLICATION)?;
    if profile.power_summary_usage() {
        w.usage(usage::PD_POWER_SUMMARY)?;
    }
    w.collection(COLLECTION_LOGICAL)?;
    w.report_count(1)?;

    for spec in profile.reports() {
        if spec.field == Field::PresentStatus {
            continue;
        }
        write_field(&mut w, &spec)?;
    }
    write_present_status(&mut w, &profile.spec(Field::PresentStatus))?;

    w.end_collection()?;
    w.end_collection()?;
    Ok(w.finish())
}

fn write_field(w: &mut Writer, spec: &ReportSpec) -> Result<(), DescriptorOverflow> {
    w.report_id(spec.id)?;
    w.usage_page(spec.page)?;
    w.report_size(spec.bits)?;
    w.report_count(1)?;
    w.logical_range(spec.logical_min, spec.logical_max)?;
    w.unit(spec.unit, spec.exponent)?;

    let flags = spec.main_flags();
    if spec.access == Access::InputFeature {
        w.usage(spec.usage)?;
        w.input(flags)?;
    }
    w.usage(spec.usage)?;
    if let Some(index) = spec.string_index {
        w.string_index(index)?;
    }
    w.feature(flags)
}

fn write_present_status(w: &mut Writer, spec: &ReportSpec) -> Result<(), DescriptorOverflow> {
    w.usage_page(UsagePage::PowerDevice)?;
    w.usage(spec.usage)?;
    w.collection(COLLECTION_LOGICAL)?;
    w.report_id(spec.id)?;
    w.report_size(1)?;
    w.report_count(1)?;
    w.logical_range(0, 1)?;
    w.unit(Unit::None, 0)?;

    for flag in StatusFlag::ALL {
        let flags = main_flags(flag.host_writable(), true);
        w.usage_page(flag.page())?;
        w.usage(flag.usage())?;
        w.input(flags)?;
        w.usage(flag.usage())?;
        w.feature(flags)?;
    }

    w.report_count(u16::from(StatusFlag::PADDING_BITS))?;
    w.input(MAIN_PADDING)?;
    w.feature(MAIN_PADDING)?;
    w.end_collection()
}
