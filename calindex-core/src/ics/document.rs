//! Raw-preserving iCalendar document.
//!
//! A document is kept as the exact text it was read from, split into
//! calendar-level properties and top-level components. Only event components
//! are ever added or removed; everything else is written back untouched.

use std::fmt;

use tracing::warn;

use crate::error::{CalIndexError, CalIndexResult};

/// A decoded calendar file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Text before `BEGIN:VCALENDAR`
    prelude: String,
    open: String,
    nodes: Vec<Node>,
    /// `END:VCALENDAR` line, empty if the file never closed the calendar
    close: String,
    trailer: String,
    line_ending: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Property(String),
    Component(Component),
}

/// A top-level component inside `VCALENDAR`.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Event(EventComponent),
    Opaque(OpaqueComponent),
}

/// A `VEVENT` block, kept as raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct EventComponent {
    uid: String,
    raw: String,
}

/// Any other component (`VTIMEZONE`, `VTODO`, ...), kept as raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueComponent {
    name: String,
    raw: String,
}

impl EventComponent {
    pub(crate) fn from_raw(raw: String) -> Self {
        let uid = property_value(&raw, "UID").unwrap_or_default();
        EventComponent { uid, raw }
    }

    /// UID of the event, empty if the component has none.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl OpaqueComponent {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Component {
    fn raw(&self) -> &str {
        match self {
            Component::Event(c) => &c.raw,
            Component::Opaque(c) => &c.raw,
        }
    }

    fn raw_mut(&mut self) -> &mut String {
        match self {
            Component::Event(c) => &mut c.raw,
            Component::Opaque(c) => &mut c.raw,
        }
    }
}

/// One content line with its folded continuation lines and terminators.
struct ContentLine<'a> {
    raw: &'a str,
}

impl ContentLine<'_> {
    /// First physical line without its terminator.
    fn head(&self) -> &str {
        let first = self.raw.split('\n').next().unwrap_or_default();
        first.trim_end_matches('\r')
    }

    fn begin(&self) -> Option<String> {
        keyword(self.head(), "BEGIN:")
    }

    fn end(&self) -> Option<String> {
        keyword(self.head(), "END:")
    }
}

fn keyword(line: &str, prefix: &str) -> Option<String> {
    let line = line.trim();
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim().to_ascii_uppercase())
    } else {
        None
    }
}

/// Split text into content lines, keeping continuation lines attached.
fn content_lines(content: &str) -> Vec<ContentLine<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for physical in content.split_inclusive('\n') {
        let is_continuation = physical.starts_with([' ', '\t']);
        if !is_continuation && offset > start {
            lines.push(ContentLine {
                raw: &content[start..offset],
            });
            start = offset;
        }
        offset += physical.len();
    }
    if offset > start {
        lines.push(ContentLine {
            raw: &content[start..offset],
        });
    }

    lines
}

impl Document {
    /// Parse calendar text.
    ///
    /// Fails only when there is no `BEGIN:VCALENDAR` line. Unterminated
    /// components are kept as opaque text and logged.
    pub fn parse(content: &str) -> CalIndexResult<Self> {
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let lines = content_lines(content);
        let mut iter = lines.iter();

        let mut prelude = String::new();
        let open = loop {
            match iter.next() {
                Some(line) if line.begin().as_deref() == Some("VCALENDAR") => {
                    break line.raw.to_string();
                }
                Some(line) => prelude.push_str(line.raw),
                None => {
                    return Err(CalIndexError::IcsParse(
                        "missing BEGIN:VCALENDAR".to_string(),
                    ));
                }
            }
        };

        let mut nodes = Vec::new();
        let mut close = String::new();

        while let Some(line) = iter.next() {
            if line.end().as_deref() == Some("VCALENDAR") {
                close = line.raw.to_string();
                break;
            }

            let Some(name) = line.begin() else {
                nodes.push(Node::Property(line.raw.to_string()));
                continue;
            };

            let mut raw = line.raw.to_string();
            let mut depth = 1usize;
            for inner in iter.by_ref() {
                raw.push_str(inner.raw);
                if inner.begin().is_some() {
                    depth += 1;
                } else if inner.end().is_some() {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }

            if depth > 0 {
                warn!(component = %name, "Unterminated component, keeping it verbatim");
                nodes.push(Node::Component(Component::Opaque(OpaqueComponent { name, raw })));
            } else if name == "VEVENT" {
                nodes.push(Node::Component(Component::Event(EventComponent::from_raw(raw))));
            } else {
                nodes.push(Node::Component(Component::Opaque(OpaqueComponent { name, raw })));
            }
        }

        if close.is_empty() {
            warn!("Calendar is missing END:VCALENDAR");
        }

        let trailer: String = iter.map(|line| line.raw).collect();

        Ok(Document {
            prelude,
            open,
            nodes,
            close,
            trailer,
            line_ending,
        })
    }

    /// Serialize back to calendar text.
    pub fn to_ics(&self) -> String {
        let mut out = String::with_capacity(
            self.prelude.len() + self.open.len() + self.close.len() + self.trailer.len(),
        );
        out.push_str(&self.prelude);
        out.push_str(&self.open);
        for node in &self.nodes {
            match node {
                Node::Property(raw) => out.push_str(raw),
                Node::Component(component) => out.push_str(component.raw()),
            }
        }
        out.push_str(&self.close);
        out.push_str(&self.trailer);
        out
    }

    /// Line terminator used by this document.
    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    /// The `X-WR-CALNAME` calendar property, if present.
    pub fn calendar_name(&self) -> Option<String> {
        self.nodes.iter().find_map(|node| match node {
            Node::Property(raw) => property_value(raw, "X-WR-CALNAME"),
            Node::Component(_) => None,
        })
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Component(component) => Some(component),
            Node::Property(_) => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &EventComponent> {
        self.components().filter_map(|component| match component {
            Component::Event(event) => Some(event),
            Component::Opaque(_) => None,
        })
    }

    /// Append an event after the last component, before `END:VCALENDAR`.
    pub fn push_event(&mut self, event: EventComponent) {
        let line_ending = self.line_ending;
        let last = match self.nodes.last_mut() {
            Some(Node::Property(raw)) => raw,
            Some(Node::Component(component)) => component.raw_mut(),
            None => &mut self.open,
        };
        if !last.ends_with('\n') {
            last.push_str(line_ending);
        }
        self.nodes.push(Node::Component(Component::Event(event)));
    }

    /// Drop every event whose uid equals `uid`. Returns how many were removed.
    pub fn remove_events_by_uid(&mut self, uid: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| {
            !matches!(node, Node::Component(Component::Event(event)) if event.uid == uid)
        });
        before - self.nodes.len()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_ics())
    }
}

/// Value of the first top-level property `name` in `raw`, unfolded and
/// unescaped. Properties of nested components are not considered.
pub(crate) fn property_value(raw: &str, name: &str) -> Option<String> {
    let mut depth = 0usize;

    for line in content_lines(raw) {
        if line.begin().is_some() {
            depth += 1;
            continue;
        }
        if line.end().is_some() {
            depth = depth.saturating_sub(1);
            continue;
        }
        // Inside a VEVENT block the event itself is depth 1
        if depth > 1 {
            continue;
        }

        let unfolded = unfold_line(line.raw);
        let Some(split) = unfolded.find([':', ';']) else {
            continue;
        };
        if !unfolded[..split].eq_ignore_ascii_case(name) {
            continue;
        }
        let value_start = value_offset(&unfolded)?;
        return Some(unescape_text(&unfolded[value_start..]));
    }

    None
}

/// Byte offset just after the `:` separating name/parameters from the value,
/// skipping colons inside quoted parameter values.
fn value_offset(line: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ':' if !quoted => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn unfold_line(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, physical) in raw.split('\n').enumerate() {
        let physical = physical.trim_end_matches('\r');
        if i == 0 {
            out.push_str(physical);
        } else if let Some(rest) = physical.strip_prefix([' ', '\t']) {
            out.push_str(rest);
        }
    }
    out
}

/// Undo RFC 5545 TEXT escaping.
pub(crate) fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//EN\r\n\
X-WR-CALNAME:Personal\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Europe/Berlin\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19701025T030000\r\n\
TZOFFSETFROM:+0200\r\n\
TZOFFSETTO:+0100\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:event-1\r\n\
SUMMARY:Dentist\r\n\
DTSTART:20240115T090000Z\r\n\
BEGIN:VALARM\r\n\
UID:alarm-uid\r\n\
ACTION:DISPLAY\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
UID:todo-1\r\n\
SUMMARY:Taxes\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn roundtrip_is_byte_identical() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.to_ics(), SAMPLE);
    }

    #[test]
    fn splits_components_by_kind() {
        let doc = Document::parse(SAMPLE).unwrap();
        let names: Vec<&str> = doc
            .components()
            .map(|c| match c {
                Component::Event(_) => "VEVENT",
                Component::Opaque(o) => o.name(),
            })
            .collect();
        assert_eq!(names, vec!["VTIMEZONE", "VEVENT", "VTODO"]);
    }

    #[test]
    fn event_uid_ignores_nested_alarm_uid() {
        let doc = Document::parse(SAMPLE).unwrap();
        let uids: Vec<&str> = doc.events().map(|e| e.uid()).collect();
        assert_eq!(uids, vec!["event-1"]);
    }

    #[test]
    fn reads_calendar_name() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.calendar_name().as_deref(), Some("Personal"));
        assert_eq!(doc.line_ending(), "\r\n");
    }

    #[test]
    fn folded_and_escaped_calendar_name() {
        let ics = "BEGIN:VCALENDAR\nX-WR-CALNAME:Work\\, Team\n  Calendar\nEND:VCALENDAR\n";
        let doc = Document::parse(ics).unwrap();
        assert_eq!(doc.calendar_name().as_deref(), Some("Work, Team Calendar"));
        assert_eq!(doc.line_ending(), "\n");
    }

    #[test]
    fn remove_keeps_everything_else() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.remove_events_by_uid("event-1"), 1);
        assert_eq!(doc.events().count(), 0);

        let text = doc.to_ics();
        assert!(text.contains("BEGIN:VTODO\r\nUID:todo-1"));
        assert!(text.contains("TZID:Europe/Berlin"));
        assert!(!text.contains("Dentist"));
    }

    #[test]
    fn remove_unknown_uid_is_noop() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.remove_events_by_uid("todo-1"), 0);
        assert_eq!(doc.to_ics(), SAMPLE);
    }

    #[test]
    fn push_event_lands_before_end() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let raw = "BEGIN:VEVENT\r\nUID:event-2\r\nEND:VEVENT\r\n".to_string();
        doc.push_event(EventComponent::from_raw(raw));

        let text = doc.to_ics();
        assert!(text.ends_with("UID:event-2\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"));
        assert!(text.starts_with(SAMPLE.trim_end_matches("END:VCALENDAR\r\n")));
    }

    #[test]
    fn push_into_empty_calendar_without_trailing_newline() {
        let mut doc = Document::parse("BEGIN:VCALENDAR\nVERSION:2.0").unwrap();
        doc.push_event(EventComponent::from_raw("BEGIN:VEVENT\nUID:x\nEND:VEVENT\n".into()));
        assert_eq!(
            doc.to_ics(),
            "BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VEVENT\nUID:x\nEND:VEVENT\n"
        );
    }

    #[test]
    fn unterminated_component_is_kept() {
        let ics = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:broken\nSUMMARY:Never closed\n";
        let doc = Document::parse(ics).unwrap();
        assert_eq!(doc.events().count(), 0);
        assert_eq!(doc.components().count(), 1);
        assert_eq!(doc.to_ics(), ics);
    }

    #[test]
    fn missing_vcalendar_is_an_error() {
        assert!(Document::parse("BEGIN:VEVENT\nEND:VEVENT\n").is_err());
        assert!(Document::parse("").is_err());
    }

    #[test]
    fn unescape_handles_common_sequences() {
        assert_eq!(unescape_text(r"a\, b\; c\nd\\e"), "a, b; c\nd\\e");
    }
}
