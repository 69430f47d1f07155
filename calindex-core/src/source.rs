//! Calendar sources: one calendar file each.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CalIndexError, CalIndexResult};
use crate::event::Event;
use crate::ics::{self, Document};

/// Display colors, handed out in load order.
pub const PALETTE: [&str; 6] = ["#3584e4", "#33d17a", "#f6d32d", "#ff7800", "#e01b24", "#9141ac"];

/// Color reported for names that match no source.
pub const DEFAULT_COLOR: &str = PALETTE[0];

/// A calendar file and its decoded contents.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub path: PathBuf,
    pub document: Document,
    pub color: &'static str,
}

impl Source {
    /// Read and decode a calendar file. `load_index` counts the files loaded
    /// before this one and picks the color.
    pub fn load(path: &Path, load_index: usize) -> CalIndexResult<Self> {
        let document = Self::read_document(path)?;
        let name = Self::name_for(&document, path);

        Ok(Source {
            name,
            path: path.to_path_buf(),
            document,
            color: color_for(load_index),
        })
    }

    /// Decode a file fresh from disk.
    pub fn read_document(path: &Path) -> CalIndexResult<Document> {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8(bytes).map_err(|_| {
            CalIndexError::IcsParse(format!("{} is not valid UTF-8", path.display()))
        })?;
        Document::parse(&content)
    }

    /// `X-WR-CALNAME`, falling back to the file name.
    pub fn name_for(document: &Document, path: &Path) -> String {
        document.calendar_name().unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        })
    }

    /// All decodable events in this calendar.
    pub fn events(&self) -> Vec<Event> {
        ics::decode_events(&self.document, &self.name)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Palette color for the n-th loaded file. Reordering files changes colors.
pub fn color_for(load_index: usize) -> &'static str {
    PALETTE[load_index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_cycle_through_palette() {
        assert_eq!(color_for(0), "#3584e4");
        assert_eq!(color_for(5), "#9141ac");
        assert_eq!(color_for(6), "#3584e4");
        assert_eq!(color_for(7), "#33d17a");
    }

    #[test]
    fn name_falls_back_to_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("family.ics");
        std::fs::write(&path, "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n").unwrap();

        let source = Source::load(&path, 1).unwrap();
        assert_eq!(source.name, "family.ics");
        assert_eq!(source.color, "#33d17a");
    }

    #[test]
    fn name_from_calendar_property() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal.ics");
        std::fs::write(
            &path,
            "BEGIN:VCALENDAR\r\nX-WR-CALNAME:Work\r\nBEGIN:VEVENT\r\nUID:a\r\nSUMMARY:Sync\r\nDTSTART:20240115T090000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
        )
        .unwrap();

        let source = Source::load(&path, 0).unwrap();
        assert_eq!(source.name, "Work");

        let events = source.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].calendar_name, "Work");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ics");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(Source::load(&path, 0).is_err());
    }
}
