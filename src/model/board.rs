use serde::{Deserialize, Serialize};

/// Tag that joins a column to the stack of the column before it
pub const STACK_TAG: &str = "stack";
/// Tag that makes a column eligible for sticky offsets
pub const STICKY_TAG: &str = "sticky";

/// A single card in a column. Only count and emptiness matter to layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// `<column-id>/<index>`
    pub id: String,
    pub title: String,
    pub checked: bool,
    /// Source lines of this task (the `- [ ]` line plus indented body)
    #[serde(skip)]
    pub source_lines: Vec<String>,
}

/// One line-level item inside a column body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnNode {
    /// A line kept verbatim (blank lines, prose)
    Literal(String),
    /// Index into `Column::tasks`
    Task(usize),
}

/// A board column, introduced by a `## Title #tags` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: String,
    /// Title text without trailing tags
    pub title: String,
    /// Tags in source order, without the leading `#`
    pub tags: Vec<String>,
    pub tasks: Vec<Task>,
    /// The original header line (`## ...`)
    pub header_line: String,
    /// Body content in source order
    pub nodes: Vec<ColumnNode>,
    /// Set when tags changed and the header must be regenerated
    pub dirty: bool,
}

impl Column {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether the title carries the stack-membership directive
    pub fn is_stacked(&self) -> bool {
        self.has_tag(STACK_TAG)
    }

    /// Whether the column takes part in sticky offsetting
    pub fn is_sticky(&self) -> bool {
        self.has_tag(STICKY_TAG)
    }

    /// Board row from a `#rowN` tag (rows are 1-based, default 1)
    pub fn row(&self) -> usize {
        self.tags
            .iter()
            .filter_map(|t| {
                let lower = t.to_ascii_lowercase();
                lower.strip_prefix("row").and_then(|n| n.parse::<usize>().ok())
            })
            .find(|n| *n > 0)
            .unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Add or remove a tag. Returns true if the tag set changed.
    pub fn set_tag(&mut self, tag: &str, present: bool) -> bool {
        let has = self.has_tag(tag);
        if present && !has {
            self.tags.push(tag.to_string());
        } else if !present && has {
            self.tags.retain(|t| !t.eq_ignore_ascii_case(tag));
        } else {
            return false;
        }
        self.dirty = true;
        true
    }
}

/// A parsed board file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    /// Lines before the first column (front matter, notes)
    pub preamble: Vec<String>,
    pub columns: Vec<Column>,
    /// Whether the source ended with a newline
    pub trailing_newline: bool,
}

impl Board {
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(tags: &[&str]) -> Column {
        Column {
            id: "todo".into(),
            title: "Todo".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            tasks: Vec::new(),
            header_line: "## Todo".into(),
            nodes: Vec::new(),
            dirty: false,
        }
    }

    #[test]
    fn tag_flags() {
        let c = column(&["Stack", "sticky", "ui"]);
        assert!(c.is_stacked());
        assert!(c.is_sticky());
        assert!(column(&["ui"]).has_tag("UI"));
        assert!(!column(&[]).is_stacked());
    }

    #[test]
    fn row_from_tag() {
        assert_eq!(column(&[]).row(), 1);
        assert_eq!(column(&["row2"]).row(), 2);
        assert_eq!(column(&["ROW3", "stack"]).row(), 3);
        // row0 is not a valid row
        assert_eq!(column(&["row0"]).row(), 1);
        assert_eq!(column(&["rowx"]).row(), 1);
    }

    #[test]
    fn set_tag_marks_dirty_only_on_change() {
        let mut c = column(&["ui"]);
        assert!(!c.set_tag("ui", true));
        assert!(!c.dirty);
        assert!(c.set_tag("stack", true));
        assert!(c.dirty);
        assert_eq!(c.tags, vec!["ui", "stack"]);
        assert!(c.set_tag("STACK", false));
        assert_eq!(c.tags, vec!["ui"]);
    }
}
