//! Formatting of decoded fields into indented trace lines, and the sinks those lines go to.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::decode::DecodeOptions;
use crate::tables::{lookup_enum, printable, EnumFamily};

const LABEL_WIDTH : usize = 50;
const HEX_ROW : usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Severity
{
    /// Section banners.
    Header,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct LogLine
{
    pub severity : Severity,
    pub text : String,
}

/// Append-only destination for trace lines.
pub trait LogSink
{
    fn add_line(&mut self, severity : Severity, text : &str);
}

impl LogSink for Vec<LogLine>
{
    fn add_line(&mut self, severity : Severity, text : &str)
    {
        self.push(LogLine { severity, text : text.into() });
    }
}

/// Forwards every line to `tracing`: warnings and errors at their own level, everything else at info.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink
{
    fn add_line(&mut self, severity : Severity, text : &str)
    {
        match severity
        {
            Severity::Header | Severity::Info => tracing::info!("{}", text),
            Severity::Warning => tracing::warn!("{}", text),
            Severity::Error => tracing::error!("{}", text),
        }
    }
}

/// Turns typed values into `<indent><label padded to 50> = <value> <units>` lines.
pub(crate) struct Reporter<'s>
{
    sink : &'s mut dyn LogSink,
    base_indent : usize,
    hex_inline_max : usize,
    hex_max_total : usize,
}

impl<'s> Reporter<'s>
{
    pub fn new(sink : &'s mut dyn LogSink, opts : &DecodeOptions) -> Self
    {
        Self
        {
            sink,
            base_indent : opts.base_indent,
            hex_inline_max : opts.hex_inline_max,
            hex_max_total : opts.hex_max_total,
        }
    }

    pub fn hex_max_total(&self) -> usize { self.hex_max_total }

    fn pad(&self, ind : usize) -> String
    {
        "  ".repeat(self.base_indent + ind)
    }

    fn emit(&mut self, severity : Severity, line : &str)
    {
        self.sink.add_line(severity, line);
    }

    pub fn header(&mut self, text : &str)
    {
        let line = format!("{}{}", self.pad(0), text);
        self.emit(Severity::Header, &line);
    }

    pub fn blank(&mut self)
    {
        self.emit(Severity::Info, "");
    }

    pub fn note(&mut self, ind : usize, text : &str)
    {
        let line = format!("{}{}", self.pad(ind), text);
        self.emit(Severity::Info, &line);
    }

    pub fn warn(&mut self, ind : usize, text : &str)
    {
        let line = format!("{}{}", self.pad(ind), text);
        self.emit(Severity::Warning, &line);
    }

    pub fn error(&mut self, ind : usize, text : &str)
    {
        let line = format!("{}{}", self.pad(ind), text);
        self.emit(Severity::Error, &line);
    }

    /// `label = value units`, dropping the trailing space when there are no units.
    pub fn field(&mut self, ind : usize, label : &str, value : impl core::fmt::Display, units : &str)
    {
        let mut line = format!("{}{:<w$} = {}", self.pad(ind), label, value, w = LABEL_WIDTH);
        if !units.is_empty()
        {
            line.push(' ');
            line.push_str(units);
        }
        self.emit(Severity::Info, &line);
    }

    pub fn num(&mut self, ind : usize, label : &str, value : impl Into<i64>, units : &str)
    {
        self.field(ind, label, value.into(), units);
    }

    pub fn boolean(&mut self, ind : usize, label : &str, value : bool)
    {
        self.field(ind, label, if value { "true" } else { "false" }, "");
    }

    pub fn enumerated(&mut self, ind : usize, label : &str, family : EnumFamily, code : u32)
    {
        self.field(ind, label, lookup_enum(family, code), "");
    }

    pub fn string(&mut self, ind : usize, label : &str, value : &str)
    {
        self.field(ind, label, format!("\"{}\"", value), "");
    }

    /// 16.16 fixed point.
    pub fn fixed(&mut self, ind : usize, label : &str, raw : u32, units : &str)
    {
        self.field(ind, label, format!("{:.0}", raw as f64 / 65536.0), units);
    }

    pub fn float(&mut self, ind : usize, label : &str, bits : u32, units : &str)
    {
        self.field(ind, label, format!("{:.5}", f32::from_bits(bits)), units);
    }

    pub fn double(&mut self, ind : usize, label : &str, bits : u64, units : &str)
    {
        self.field(ind, label, format!("{:.5}", f64::from_bits(bits)), units);
    }

    pub fn offset(&mut self, ind : usize, label : &str, pos : u64)
    {
        let line = format!("{}{:<w$} @ 0x{:08X}", self.pad(ind), label, pos, w = LABEL_WIDTH);
        self.emit(Severity::Info, &line);
    }

    /// Hex and ASCII dump of `bytes`, which are the first bytes of a `full_len`-byte field.
    ///
    /// Short fields stay on the label line. Longer ones get 16-byte rows under the label, and a
    /// `...` row when `full_len` exceeds what was shown.
    pub fn hex(&mut self, ind : usize, label : &str, bytes : &[u8], full_len : u64)
    {
        let pad = self.pad(ind);
        if full_len == 0
        {
            let line = format!("{}{:<w$} =", pad, label, w = LABEL_WIDTH);
            self.emit(Severity::Info, &line);
            return;
        }
        if full_len <= self.hex_inline_max as u64 && bytes.len() as u64 == full_len
        {
            let line = format!("{}{:<w$} = {}", pad, label, hex_row(bytes, bytes.len()), w = LABEL_WIDTH);
            self.emit(Severity::Info, &line);
            return;
        }
        let line = format!("{}{:<w$} =", pad, label, w = LABEL_WIDTH);
        self.emit(Severity::Info, &line);
        let shown = &bytes[..bytes.len().min(self.hex_max_total)];
        for chunk in shown.chunks(HEX_ROW)
        {
            let line = format!("{}  {}", pad, hex_row(chunk, HEX_ROW));
            self.emit(Severity::Info, &line);
        }
        if (shown.len() as u64) < full_len
        {
            let line = format!("{}  ...", pad);
            self.emit(Severity::Info, &line);
        }
    }
}

/// `0xHH HH .. | ascii`, padded out to `width` byte slots.
fn hex_row(bytes : &[u8], width : usize) -> String
{
    let mut hex = String::new();
    let mut asc = String::new();
    for i in 0..width
    {
        match bytes.get(i)
        {
            Some(&b) =>
            {
                hex.push_str(&format!("{:02X} ", b));
                asc.push(printable(b));
            }
            None =>
            {
                hex.push_str("   ");
                asc.push(' ');
            }
        }
    }
    format!("0x{}| {}", hex, asc.trim_end())
}
