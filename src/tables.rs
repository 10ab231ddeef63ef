//! Constant lookup tables: image resource IDs, IPTC datasets and enumerated field codes.

use alloc::format;
use alloc::string::String;

/// Which handler parses an image resource payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind
{
    /// Listed but of unknown layout; dumped like an unlisted ID.
    Unknown,
    Hex,
    AsciiString,
    /// ASCII text that gets its own line (XMP packets).
    AsciiStringLong,
    UnicodeString,
    Thumbnail,
    Slices,
    /// 4-byte descriptor version followed by an OSType descriptor.
    Descriptor,
    VersionInfo,
    PrintScale,
    PixelAspectRatio,
    DocSpecificSeed,
    ResolutionInfo,
    GridGuides,
    GlobalAngle,
    GlobalAltitude,
    PrintFlags,
    PrintFlagsInfo,
    CopyrightFlag,
    LayerStateInfo,
    LayerGroupInfo,
    LayerGroupsEnabled,
    LayerSelectIds,
    JpegQuality,
    IptcNaa,
}

/// One entry of the image resource table. A non-zero `code_end` makes the entry answer for the
/// whole inclusive range `code..=code_end`.
#[derive(Clone, Copy, Debug)]
pub struct ResourceRecord
{
    pub code : u16,
    pub code_end : u16,
    pub kind : ResourceKind,
    pub name : &'static str,
}

const fn res(code : u16, code_end : u16, kind : ResourceKind, name : &'static str) -> ResourceRecord
{
    ResourceRecord { code, code_end, kind, name }
}

use ResourceKind as R;

pub static RESOURCE_RECORDS : &[ResourceRecord] = &[
    res(0x03E8, 0, R::Unknown, "-"),
    res(0x03E9, 0, R::Hex, "Macintosh print manager print info record"),
    res(0x03EB, 0, R::Hex, "Indexed color table"),
    res(0x03ED, 0, R::ResolutionInfo, "ResolutionInfo structure"),
    res(0x03EE, 0, R::Hex, "Names of alpha channels"),
    res(0x03EF, 0, R::Hex, "DisplayInfo structure"),
    res(0x03F0, 0, R::Hex, "Caption"),
    res(0x03F1, 0, R::Hex, "Border information"),
    res(0x03F2, 0, R::Hex, "Background color"),
    res(0x03F3, 0, R::PrintFlags, "Print flags"),
    res(0x03F4, 0, R::Hex, "Grayscale and multichannel halftoning information"),
    res(0x03F5, 0, R::Hex, "Color halftoning information"),
    res(0x03F6, 0, R::Hex, "Duotone halftoning information"),
    res(0x03F7, 0, R::Hex, "Grayscale and multichannel transfer function"),
    res(0x03F8, 0, R::Hex, "Color transfer functions"),
    res(0x03F9, 0, R::Hex, "Duotone transfer functions"),
    res(0x03FA, 0, R::Hex, "Duotone image information"),
    res(0x03FC, 0, R::Hex, "-"),
    res(0x03FD, 0, R::Hex, "EPS options"),
    res(0x03FE, 0, R::Hex, "Quick Mask information"),
    res(0x03FF, 0, R::Hex, "-"),
    res(0x0400, 0, R::LayerStateInfo, "Layer state information"),
    res(0x0401, 0, R::Hex, "Working path"),
    res(0x0402, 0, R::LayerGroupInfo, "Layers group information"),
    res(0x0403, 0, R::Hex, "-"),
    res(0x0404, 0, R::IptcNaa, "IPTC-NAA record"),
    res(0x0405, 0, R::Hex, "Image mode (raw format files)"),
    res(0x0406, 0, R::JpegQuality, "JPEG quality"),
    res(0x0408, 0, R::GridGuides, "Grid and guides information"),
    res(0x0409, 0, R::Hex, "Thumbnail resource (PS 4.0)"),
    res(0x040A, 0, R::CopyrightFlag, "Copyright flag"),
    res(0x040B, 0, R::AsciiString, "URL"),
    res(0x040C, 0, R::Thumbnail, "Thumbnail resources"),
    res(0x040D, 0, R::GlobalAngle, "Global Angle"),
    res(0x040E, 0, R::Hex, "Color samplers resource"),
    res(0x040F, 0, R::Hex, "ICC Profile"),
    res(0x0410, 0, R::Hex, "Watermark"),
    res(0x0411, 0, R::Hex, "ICC Untagged Profile"),
    res(0x0412, 0, R::Hex, "Effects visible"),
    res(0x0413, 0, R::Hex, "Spot Halftone"),
    res(0x0414, 0, R::DocSpecificSeed, "Document-specific IDs seed number"),
    res(0x0415, 0, R::UnicodeString, "Unicode Alpha Names"),
    res(0x0416, 0, R::Hex, "Indexed Color Table Count"),
    res(0x0417, 0, R::Hex, "Transparency Index"),
    res(0x0419, 0, R::GlobalAltitude, "Global Altitude"),
    res(0x041A, 0, R::Slices, "Slices"),
    res(0x041B, 0, R::UnicodeString, "Workflow URL"),
    res(0x041C, 0, R::Hex, "Jump to XPEP"),
    res(0x041D, 0, R::Hex, "Alpha Identifiers"),
    res(0x041E, 0, R::Hex, "URL List"),
    res(0x0421, 0, R::VersionInfo, "Version Info"),
    res(0x0422, 0, R::Hex, "Exif data 1"),
    res(0x0423, 0, R::Hex, "Exif data 3"),
    res(0x0424, 0, R::AsciiStringLong, "XMP metadata"),
    res(0x0425, 0, R::Hex, "Caption digest"),
    res(0x0426, 0, R::PrintScale, "Print scale"),
    res(0x0428, 0, R::PixelAspectRatio, "Pixel Aspect Ratio"),
    res(0x0429, 0, R::Descriptor, "Layer Comps"),
    res(0x042A, 0, R::Hex, "Alternate Duotone Colors"),
    res(0x042B, 0, R::Hex, "Alternate Spot Colors"),
    res(0x042D, 0, R::LayerSelectIds, "Layer Selection IDs"),
    res(0x042E, 0, R::Hex, "HDR Toning information"),
    res(0x042F, 0, R::Hex, "Print info"),
    res(0x0430, 0, R::LayerGroupsEnabled, "Layer Groups Enabled ID"),
    res(0x0431, 0, R::Hex, "Color samplers resource"),
    res(0x0432, 0, R::Descriptor, "Measurement Scale"),
    res(0x0433, 0, R::Descriptor, "Timeline Information"),
    res(0x0434, 0, R::Descriptor, "Sheet Disclosure"),
    res(0x0435, 0, R::Hex, "DisplayInfo structure (FloatPt colors)"),
    res(0x0436, 0, R::Descriptor, "Onion Skins"),
    res(0x0438, 0, R::Descriptor, "Count Information"),
    res(0x043A, 0, R::Descriptor, "Print Information"),
    res(0x043B, 0, R::Descriptor, "Print Style"),
    res(0x043C, 0, R::Hex, "Macintosh NSPrintInfo"),
    res(0x043D, 0, R::Hex, "Windows DEVMODE"),
    res(0x043E, 0, R::UnicodeString, "Auto Save File Path"),
    res(0x043F, 0, R::UnicodeString, "Auto Save Format"),
    res(0x0440, 0, R::Descriptor, "Path Selection State"),
    res(0x07D0, 0x0BB6, R::Hex, "Path Information (saved paths)"),
    res(0x0BB7, 0, R::Hex, "Name of clipping path"),
    res(0x0BB8, 0, R::Hex, "Origin Path Info"),
    res(0x0FA0, 0x1387, R::Hex, "Plug-In resources"),
    res(0x1B58, 0, R::Hex, "Image Ready variables"),
    res(0x1B59, 0, R::Hex, "Image Ready data sets"),
    res(0x1F40, 0, R::Hex, "Lightroom workflow"),
    res(0x2710, 0, R::PrintFlagsInfo, "Print flags information"),
];

/// First table entry whose ID (or ID range) covers `id`.
pub fn find_resource_record(id : u16) -> Option<&'static ResourceRecord>
{
    RESOURCE_RECORDS.iter().find(|r|
    {
        if r.code_end == 0
        {
            r.code == id
        }
        else
        {
            r.code <= id && id <= r.code_end
        }
    })
}

/// How an IPTC dataset value is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IptcKind
{
    /// Big-endian unsigned integer as wide as the field.
    Numeric,
    Hex,
    Text,
    Unknown,
}

#[derive(Clone, Copy, Debug)]
pub struct IptcField
{
    pub record : u8,
    pub dataset : u8,
    pub kind : IptcKind,
    pub name : &'static str,
}

const fn iptc(record : u8, dataset : u8, kind : IptcKind, name : &'static str) -> IptcField
{
    IptcField { record, dataset, kind, name }
}

use IptcKind as I;

/// IPTC-NAA Information Interchange Model v4 datasets.
pub static IPTC_FIELDS : &[IptcField] = &[
    iptc(1, 0, I::Numeric, "Model Version"),
    iptc(1, 5, I::Text, "Destination"),
    iptc(1, 20, I::Numeric, "File Format"),
    iptc(1, 22, I::Numeric, "File Format Version"),
    iptc(1, 30, I::Text, "Service Identifier"),
    iptc(1, 40, I::Text, "Envelope Number"),
    iptc(1, 50, I::Text, "Product I.D."),
    iptc(1, 60, I::Text, "Envelope Priority"),
    iptc(1, 70, I::Text, "Date Sent"),
    iptc(1, 80, I::Text, "Time Sent"),
    iptc(1, 90, I::Hex, "Coded Character Set"),
    iptc(1, 100, I::Text, "UNO"),
    iptc(1, 120, I::Numeric, "ARM Identifier"),
    iptc(1, 122, I::Numeric, "ARM Version"),
    iptc(2, 0, I::Numeric, "Record Version"),
    iptc(2, 3, I::Text, "Object Type Reference"),
    iptc(2, 4, I::Text, "Object Attrib Reference"),
    iptc(2, 5, I::Text, "Object Name"),
    iptc(2, 7, I::Text, "Edit Status"),
    iptc(2, 8, I::Text, "Editorial Update"),
    iptc(2, 10, I::Text, "Urgency"),
    iptc(2, 12, I::Text, "Subject Reference"),
    iptc(2, 15, I::Text, "Category"),
    iptc(2, 20, I::Text, "Supplemental Category"),
    iptc(2, 22, I::Text, "Fixture Identifier"),
    iptc(2, 25, I::Text, "Keywords"),
    iptc(2, 26, I::Text, "Content Location Code"),
    iptc(2, 27, I::Text, "Content Location Name"),
    iptc(2, 30, I::Text, "Release Date"),
    iptc(2, 35, I::Text, "Release Time"),
    iptc(2, 37, I::Text, "Expiration Date"),
    iptc(2, 38, I::Text, "Expiration Time"),
    iptc(2, 40, I::Text, "Special Instructions"),
    iptc(2, 42, I::Text, "Action Advised"),
    iptc(2, 45, I::Unknown, "Reference Service"),
    iptc(2, 47, I::Unknown, "Reference Date"),
    iptc(2, 50, I::Unknown, "Reference Number"),
    iptc(2, 55, I::Text, "Date Created"),
    iptc(2, 60, I::Text, "Time Created"),
    iptc(2, 62, I::Text, "Digital Creation Date"),
    iptc(2, 63, I::Text, "Digital Creation Time"),
    iptc(2, 65, I::Text, "Originating Program"),
    iptc(2, 70, I::Text, "Program Version"),
    iptc(2, 75, I::Text, "Object Cycle"),
    iptc(2, 80, I::Text, "By-line"),
    iptc(2, 85, I::Text, "By-line Title"),
    iptc(2, 90, I::Text, "City"),
    iptc(2, 92, I::Text, "Sub-location"),
    iptc(2, 95, I::Text, "Province/State"),
    iptc(2, 100, I::Text, "Country/Primary Location Code"),
    iptc(2, 101, I::Text, "Country/Primary Location Name"),
    iptc(2, 103, I::Text, "Original Transmission Reference"),
    iptc(2, 105, I::Text, "Headline"),
    iptc(2, 110, I::Text, "Credit"),
    iptc(2, 115, I::Text, "Source"),
    iptc(2, 116, I::Text, "Copyright Notice"),
    iptc(2, 118, I::Text, "Contact"),
    iptc(2, 120, I::Text, "Caption/Abstract"),
    iptc(2, 122, I::Text, "Writer/Editor"),
    iptc(2, 125, I::Unknown, "Rasterized Caption"),
    iptc(2, 130, I::Text, "Image Type"),
    iptc(2, 131, I::Text, "Image Orientation"),
    iptc(2, 135, I::Text, "Language Identifier"),
    iptc(2, 150, I::Text, "Audio Type"),
    iptc(2, 151, I::Text, "Audio Sampling Rate"),
    iptc(2, 152, I::Text, "Audio Sampling Resolution"),
    iptc(2, 153, I::Text, "Audio Duration"),
    iptc(2, 154, I::Text, "Audio Outcue"),
    iptc(2, 200, I::Numeric, "ObjectData Preview File Format"),
    iptc(2, 201, I::Numeric, "ObjectData Preview File Format Version"),
    iptc(2, 202, I::Unknown, "ObjectData Preview Data"),
    iptc(7, 10, I::Numeric, "Size Mode"),
    iptc(7, 20, I::Numeric, "Max Subfile Size"),
    iptc(7, 90, I::Numeric, "ObjectData Size Announced"),
    iptc(7, 95, I::Numeric, "Maximum ObjectData Size"),
    iptc(8, 10, I::Unknown, "Subfile"),
    iptc(9, 10, I::Numeric, "Confirmed ObjectData Size"),
];

pub fn find_iptc_field(record : u8, dataset : u8) -> Option<&'static IptcField>
{
    IPTC_FIELDS.iter().find(|f| f.record == record && f.dataset == dataset)
}

/// Enumeration families. The same numeric code means different things in different families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumFamily
{
    ColorMode,
    ResolutionUnit,
    DimensionUnit,
    PrintScaleStyle,
    GuideDirection,
    BlendMode,
    Compression,
    Clipping,
    SectionDivider,
    SheetColor,
}

#[derive(Clone, Copy, Debug)]
pub struct EnumRecord
{
    pub family : EnumFamily,
    pub code : u32,
    pub name : &'static str,
}

const fn en(family : EnumFamily, code : u32, name : &'static str) -> EnumRecord
{
    EnumRecord { family, code, name }
}

const fn key(code : &[u8; 4]) -> u32
{
    u32::from_be_bytes(*code)
}

use EnumFamily as E;

pub static ENUM_RECORDS : &[EnumRecord] = &[
    en(E::ColorMode, 0, "Bitmap"),
    en(E::ColorMode, 1, "Grayscale"),
    en(E::ColorMode, 2, "Indexed"),
    en(E::ColorMode, 3, "RGB"),
    en(E::ColorMode, 4, "CMYK"),
    en(E::ColorMode, 7, "Multichannel"),
    en(E::ColorMode, 8, "Duotone"),
    en(E::ColorMode, 9, "Lab"),
    en(E::ResolutionUnit, 1, "pixels per inch"),
    en(E::ResolutionUnit, 2, "pixels per cm"),
    en(E::DimensionUnit, 1, "inch"),
    en(E::DimensionUnit, 2, "cm"),
    en(E::DimensionUnit, 3, "picas"),
    en(E::DimensionUnit, 4, "columns"),
    en(E::PrintScaleStyle, 0, "centered"),
    en(E::PrintScaleStyle, 1, "size to fit"),
    en(E::PrintScaleStyle, 2, "user defined"),
    en(E::GuideDirection, 0, "vertical"),
    en(E::GuideDirection, 1, "horizontal"),
    en(E::BlendMode, key(b"pass"), "pass through"),
    en(E::BlendMode, key(b"norm"), "normal"),
    en(E::BlendMode, key(b"diss"), "dissolve"),
    en(E::BlendMode, key(b"dark"), "darken"),
    en(E::BlendMode, key(b"mul "), "multiply"),
    en(E::BlendMode, key(b"idiv"), "color burn"),
    en(E::BlendMode, key(b"lbrn"), "linear burn"),
    en(E::BlendMode, key(b"dkCl"), "darker color"),
    en(E::BlendMode, key(b"lite"), "lighten"),
    en(E::BlendMode, key(b"scrn"), "screen"),
    en(E::BlendMode, key(b"div "), "color dodge"),
    en(E::BlendMode, key(b"lddg"), "linear dodge"),
    en(E::BlendMode, key(b"lgCl"), "lighter color"),
    en(E::BlendMode, key(b"over"), "overlay"),
    en(E::BlendMode, key(b"sLit"), "soft light"),
    en(E::BlendMode, key(b"hLit"), "hard light"),
    en(E::BlendMode, key(b"vLit"), "vivid light"),
    en(E::BlendMode, key(b"lLit"), "linear light"),
    en(E::BlendMode, key(b"pLit"), "pin light"),
    en(E::BlendMode, key(b"hMix"), "hard mix"),
    en(E::BlendMode, key(b"diff"), "difference"),
    en(E::BlendMode, key(b"smud"), "exclusion"),
    en(E::BlendMode, key(b"fsub"), "subtract"),
    en(E::BlendMode, key(b"fdiv"), "divide"),
    en(E::BlendMode, key(b"hue "), "hue"),
    en(E::BlendMode, key(b"sat "), "saturation"),
    en(E::BlendMode, key(b"colr"), "color"),
    en(E::BlendMode, key(b"lum "), "luminosity"),
    en(E::Compression, 0, "Raw"),
    en(E::Compression, 1, "RLE"),
    en(E::Compression, 2, "ZIP"),
    en(E::Compression, 3, "ZIP with prediction"),
    en(E::Clipping, 0, "base"),
    en(E::Clipping, 1, "non-base"),
    en(E::SectionDivider, 0, "any other type of layer"),
    en(E::SectionDivider, 1, "open folder"),
    en(E::SectionDivider, 2, "closed folder"),
    en(E::SectionDivider, 3, "bounding section divider"),
    en(E::SheetColor, 0, "none"),
    en(E::SheetColor, 1, "red"),
    en(E::SheetColor, 2, "orange"),
    en(E::SheetColor, 3, "yellow"),
    en(E::SheetColor, 4, "green"),
    en(E::SheetColor, 5, "blue"),
    en(E::SheetColor, 6, "violet"),
    en(E::SheetColor, 7, "gray"),
];

/// `0xHH HH HH HH  | cccc`: the four bytes of `val` in hex, then as printable ASCII.
pub fn hex_word(val : u32) -> String
{
    let mut hex = String::new();
    let mut asc = String::new();
    for b in val.to_be_bytes()
    {
        hex.push_str(&format!("{:02X} ", b));
        asc.push(printable(b));
    }
    format!("0x{} | {}", hex, asc)
}

pub(crate) fn printable(b : u8) -> char
{
    if b == b' ' || b.is_ascii_graphic() { b as char } else { '.' }
}

/// Display name of `code` within `family`. Never fails: a miss yields `? [<hex word>]`.
pub fn lookup_enum(family : EnumFamily, code : u32) -> String
{
    match ENUM_RECORDS.iter().find(|e| e.family == family && e.code == code)
    {
        Some(e) => e.name.into(),
        None => format!("? [{}]", hex_word(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_ranges_and_singles()
    {
        assert_eq!(find_resource_record(0x0404).unwrap().kind, ResourceKind::IptcNaa);
        assert_eq!(find_resource_record(0x0406).unwrap().name, "JPEG quality");
        assert_eq!(find_resource_record(0x07D0).unwrap().name, "Path Information (saved paths)");
        assert_eq!(find_resource_record(0x0900).unwrap().name, "Path Information (saved paths)");
        assert_eq!(find_resource_record(0x0BB6).unwrap().name, "Path Information (saved paths)");
        assert_eq!(find_resource_record(0x0BB7).unwrap().name, "Name of clipping path");
        assert_eq!(find_resource_record(0x1000).unwrap().name, "Plug-In resources");
        assert!(find_resource_record(0x0407).is_none());
        assert!(find_resource_record(0xABCD).is_none());
    }

    #[test]
    fn iptc_lookup_is_an_exact_pair_match()
    {
        assert_eq!(find_iptc_field(2, 25).unwrap().name, "Keywords");
        assert_eq!(find_iptc_field(1, 0).unwrap().kind, IptcKind::Numeric);
        assert!(find_iptc_field(2, 26).is_some());
        assert!(find_iptc_field(3, 25).is_none());
    }

    #[test]
    fn enum_lookup_is_scoped_by_family()
    {
        assert_eq!(lookup_enum(EnumFamily::ColorMode, 3), "RGB");
        assert_eq!(lookup_enum(EnumFamily::ResolutionUnit, 1), "pixels per inch");
        assert_eq!(lookup_enum(EnumFamily::DimensionUnit, 1), "inch");
        assert_eq!(lookup_enum(EnumFamily::BlendMode, u32::from_be_bytes(*b"norm")), "normal");
    }

    #[test]
    fn enum_miss_falls_back_to_hex()
    {
        assert_eq!(lookup_enum(EnumFamily::ColorMode, 5), "? [0x00 00 00 05  | ....]");
        assert_eq!(lookup_enum(EnumFamily::BlendMode, u32::from_be_bytes(*b"wxyz")), "? [0x77 78 79 7A  | wxyz]");
    }
}
