use crate::model::board::{Board, Column, ColumnNode};

/// Serialize a board back to markdown.
///
/// Untouched columns reproduce their source lines exactly; a column whose
/// tags changed gets its header regenerated from title and tags.
pub fn serialize_board(board: &Board) -> String {
    let mut lines: Vec<String> = board.preamble.clone();

    for column in &board.columns {
        lines.push(header_line(column));
        for node in &column.nodes {
            match node {
                ColumnNode::Literal(line) => lines.push(line.clone()),
                ColumnNode::Task(index) => {
                    if let Some(task) = column.tasks.get(*index) {
                        if task.source_lines.is_empty() {
                            let mark = if task.checked { 'x' } else { ' ' };
                            lines.push(format!("- [{}] {}", mark, task.title));
                        } else {
                            lines.extend(task.source_lines.iter().cloned());
                        }
                    }
                }
            }
        }
    }

    let mut out = lines.join("\n");
    if board.trailing_newline && !out.is_empty() {
        out.push('\n');
    }
    out
}

fn header_line(column: &Column) -> String {
    if !column.dirty {
        return column.header_line.clone();
    }
    let mut parts = Vec::new();
    if !column.title.is_empty() {
        parts.push(column.title.clone());
    }
    parts.extend(column.tags.iter().map(|t| format!("#{}", t)));
    format!("## {}", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::board_parser::parse_board;
    use pretty_assertions::assert_eq;

    #[test]
    fn unchanged_board_round_trips() {
        let source = "\
---
kanban-plugin: board
---

## Backlog   #sticky
- [ ] Write parser
  with a note

  - [x] stray indented line
- [X] Upper-case check

## Done
";
        assert_eq!(serialize_board(&parse_board(source)), source);
    }

    #[test]
    fn no_trailing_newline_is_preserved() {
        let source = "## A\n- [ ] one";
        assert_eq!(serialize_board(&parse_board(source)), source);
    }

    #[test]
    fn dirty_header_is_regenerated() {
        let mut board = parse_board("## Review   #sticky\n- [ ] a\n");
        board.columns[0].set_tag("stack", true);
        assert_eq!(serialize_board(&board), "## Review #sticky #stack\n- [ ] a\n");
    }
}
