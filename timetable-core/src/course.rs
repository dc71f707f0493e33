//! Course code and name extraction from free-text event descriptions.
//!
//! University timetable exports put the course identifier on the first line
//! of DESCRIPTION (`CS101-A, Section 2`) and the course title on the second.
//! Everything about that layout lives here so a feed format change only
//! touches this module.

/// Course fields derived from an event description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Course {
    pub code: String,
    pub name: Option<String>,
}

/// Derive the course code and name from a description.
///
/// - code: first line, cut at the first `,`, then at the first `-`, trimmed.
/// - name: the second line as is, `None` when there is no second line.
pub fn derive_course(description: &str) -> Course {
    let mut lines = description.split('\n').map(|l| l.trim_end_matches('\r'));

    let code = lines
        .next()
        .and_then(|first| first.split(',').next())
        .and_then(|first| first.split('-').next())
        .unwrap_or_default()
        .trim()
        .to_string();

    let name = lines.next().map(str::to_string);

    Course { code, name }
}
