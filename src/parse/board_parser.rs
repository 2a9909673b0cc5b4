use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::board::{Board, Column, ColumnNode, Task};

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Parse a markdown board from its source text.
///
/// Columns start at `## ` headers; `- [ ]` / `- [x]` lines are tasks and
/// indented lines directly below a task belong to it. Everything else is
/// kept literally so the board serializes back unchanged.
pub fn parse_board(source: &str) -> Board {
    let lines: Vec<&str> = source.lines().collect();
    let mut board = Board {
        trailing_newline: source.ends_with('\n'),
        ..Default::default()
    };
    let mut used_ids: HashSet<String> = HashSet::new();
    let mut idx = 0;

    // Front matter is preamble even if it happens to contain a `## ` line
    if lines.first().map(|l| l.trim()) == Some("---") {
        board.preamble.push(lines[0].to_string());
        idx = 1;
        while idx < lines.len() {
            board.preamble.push(lines[idx].to_string());
            idx += 1;
            if lines[idx - 1].trim() == "---" {
                break;
            }
        }
    }

    while idx < lines.len() {
        let line = lines[idx];
        if let Some(header) = column_header(line) {
            let (title, tags) = parse_title_and_tags(header);
            let id = unique_id(&slugify(&title), &mut used_ids);
            board.columns.push(Column {
                id,
                title,
                tags,
                tasks: Vec::new(),
                header_line: line.to_string(),
                nodes: Vec::new(),
                dirty: false,
            });
        } else if let Some(column) = board.columns.last_mut() {
            push_body_line(column, line);
        } else {
            board.preamble.push(line.to_string());
        }
        idx += 1;
    }

    board
}

fn column_header(line: &str) -> Option<&str> {
    line.strip_prefix("## ")
}

fn push_body_line(column: &mut Column, line: &str) {
    if let Some((checked, title)) = task_line(line) {
        let index = column.tasks.len();
        column.tasks.push(Task {
            id: format!("{}/{}", column.id, index),
            title: title.to_string(),
            checked,
            source_lines: vec![line.to_string()],
        });
        column.nodes.push(ColumnNode::Task(index));
        return;
    }

    let continues_task = line.starts_with([' ', '\t']) && !line.trim().is_empty();
    if continues_task
        && let Some(ColumnNode::Task(index)) = column.nodes.last()
    {
        column.tasks[*index].source_lines.push(line.to_string());
        return;
    }
    column.nodes.push(ColumnNode::Literal(line.to_string()));
}

/// Recognize `- [ ] title` / `- [x] title`. Returns (checked, title).
fn task_line(line: &str) -> Option<(bool, &str)> {
    let rest = line.strip_prefix("- [")?;
    let mut chars = rest.chars();
    let mark = chars.next()?;
    let rest = chars.as_str().strip_prefix(']')?;
    let checked = match mark {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    Some((checked, rest.trim()))
}

/// Split a header into title text and trailing `#tags`.
///
/// Only the trailing run of `#word` tokens counts as tags; a `#` inside the
/// title stays part of the title.
pub fn parse_title_and_tags(s: &str) -> (String, Vec<String>) {
    let words: Vec<&str> = s.split_whitespace().collect();
    let tag_start = words
        .iter()
        .rposition(|w| !is_tag_word(w))
        .map_or(0, |i| i + 1);

    let tags = words[tag_start..]
        .iter()
        .map(|w| w[1..].to_string())
        .collect();
    (words[..tag_start].join(" "), tags)
}

fn is_tag_word(word: &str) -> bool {
    word.strip_prefix('#')
        .is_some_and(|tag| !tag.is_empty() && !tag.contains('#'))
}

/// Lowercase slug of a column title, `column` when nothing usable remains
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = SLUG_SEPARATORS.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "column".to_string()
    } else {
        slug.to_string()
    }
}

fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}
