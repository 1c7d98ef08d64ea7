use std::io;

use serde_json::ser::{Formatter, PrettyFormatter};

const INDENT: &[u8] = b"  ";

/// Pretty printer matching Xcode's `.xcstrings` output: two-space indent, a
/// space on both sides of the key separator, and empty dictionaries written
/// as `{`, a blank line, then `}` at the dictionary's own indent.
pub struct XcodeFormatter {
    inner: PrettyFormatter<'static>,
    depth: usize,
    /// One entry per open object: whether it has written a key yet.
    populated: Vec<bool>,
}

impl XcodeFormatter {
    pub fn new() -> Self {
        XcodeFormatter {
            inner: PrettyFormatter::with_indent(INDENT),
            depth: 0,
            populated: Vec::new(),
        }
    }
}

impl Default for XcodeFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for XcodeFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.populated.push(false);
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        if self.populated.pop() == Some(false) {
            writer.write_all(b"\n\n")?;
            for _ in 0..self.depth {
                writer.write_all(INDENT)?;
            }
        }
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if let Some(populated) = self.populated.last_mut() {
            *populated = true;
        }
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}
