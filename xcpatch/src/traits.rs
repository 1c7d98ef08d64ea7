//! Whole-file load and save, shared by the manifest and the string catalog.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::error::Error;

/// A file that is read completely into memory, edited, and then written back
/// over itself. There is no locking and no partial write.
///
/// ```rust,no_run
/// use xcpatch::{Manifest, traits::Document};
/// let manifest = Manifest::read_from("App.xcodeproj/project.pbxproj")?;
/// manifest.write_to("App.xcodeproj/project.pbxproj")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Document: Sized {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>;

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Truncates `path` and writes the whole document.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn parse(text: &str) -> Result<Self, Error> {
        Self::from_reader(Cursor::new(text))
    }

    /// The exact bytes [`Document::write_to`] would produce.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.to_writer(&mut out)?;
        Ok(out)
    }
}
