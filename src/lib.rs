//! psdsnoop walks the structure of Photoshop data and writes down everything it finds. It reads PSD files and the bare runs of "8BIM" image resource blocks that JPEG files carry in their APP13 segment, and produces an indented, human-readable trace of every field: the file header, the color mode data, each image resource (with dedicated parsers for about 25 of them, IPTC-NAA and Photoshop's private JPEG quality block included), the layer records with their masks and additional layer info, the OSType descriptors nested inside all of that, and the merged image data. It never writes anything.
//!
//! psdsnoop is for looking at files, not for rendering them. Unknown resources and unknown additional layer info keys are shown as hex dumps instead of being skipped, structures whose self-declared length doesn't match what was parsed are reported and stepped over, and the trace keeps going past anything it can resync from. Pixel decoding only goes as far as filling an RGBA preview raster with the raw or PackBits channel data of one layer or of the merged image, with no color management.
//!
//! Trace lines go to a [LogSink]. A `Vec<LogLine>` collects them; [TracingSink] hands them to `tracing`.
//!
//! You want [DecodeRequest].
//!
//! Example:
//!
//!```no_run
//!use psdsnoop::{DecodeRequest, DecodeOptions, PaintTarget, RgbaRaster, LogLine, Unstoppable};
//!
//!let data = std::fs::read("data/test.psd").expect("Failed to open test.psd");
//!
//!let info = DecodeRequest::new(&data).probe()?;
//!let mut raster = RgbaRaster::new(info.width, info.height);
//!let options = DecodeOptions { paint : PaintTarget::Merged, ..DecodeOptions::default() };
//!let mut log : Vec<LogLine> = vec!();
//!
//!let summary = DecodeRequest::new(&data)
//!    .with_options(&options)
//!    .decode(&mut log, Some(&mut raster), &Unstoppable)?;
//!for line in &log
//!{
//!    println!("{}", line.text);
//!}
//!println!("success: {}", summary.success);
//!# Ok::<(), psdsnoop::DecodeError>(())
//!```

#![allow(clippy::vec_init_then_push)] // wrong problem domain. more readable this way
#![allow(clippy::manual_range_contains)] // bad idiom

#![cfg_attr(not(any(test, feature = "std", feature = "serde_support")), no_std)]
extern crate alloc;

mod cursor;
mod decode;
mod descriptor;
mod error;
mod iptc;
mod layers;
mod pixels;
mod report;
mod resources;
mod source;
mod tables;

pub use cursor::{fourcc_str, FourCc};
pub use decode::{DecodeOptions, DecodeRequest, ImageInfo, PaintTarget, PsdSummary};
pub use enough::{Stop, Unstoppable};
pub use error::DecodeError;
pub use pixels::{row_bytes, unpack_bits, Compression, RgbaRaster};
pub use report::{LogLine, LogSink, Severity, TracingSink};
pub use source::ByteSource;
pub use tables::{
    find_iptc_field, find_resource_record, lookup_enum, EnumFamily, IptcField, IptcKind, ResourceKind,
    ResourceRecord,
};
