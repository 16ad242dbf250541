//! Elastic tabstops for printer output.
//!
//! The printer separates alignable cells with `\x0b`. A cell is aligned
//! when it is terminated by a separator; the last cell of a line is not.
//! Consecutive lines with the same indentation that all have a terminated
//! cell in column `j` form a column block; every cell of the block is padded
//! to the widest one plus [`PADDING`]. Blocks whose cells are all empty are
//! discarded.

pub const CELL_SEP: char = '\x0b';
const PADDING: usize = 1;

struct Line<'a> {
    indent: &'a str,
    cells: Vec<&'a str>,
}

impl<'a> Line<'a> {
    fn parse(text: &'a str) -> Self {
        let body = text.trim_start_matches('\t');
        let indent = &text[..text.len() - body.len()];
        let cells = if body.contains(CELL_SEP) {
            body.split(CELL_SEP).collect()
        } else {
            vec![body]
        };
        Self { indent, cells }
    }

    #[inline]
    fn has_cell(&self, col: usize) -> bool {
        self.cells.len() > col + 1
    }
}

/// Replaces cell separators with space padding.
pub fn align(text: &str) -> String {
    if !text.contains(CELL_SEP) {
        return text.to_string();
    }

    let lines: Vec<Line<'_>> = text.split('\n').map(Line::parse).collect();
    let mut widths: Vec<Vec<usize>> = lines
        .iter()
        .map(|l| vec![0; l.cells.len().saturating_sub(1)])
        .collect();
    format_block(&lines, 0, 0, lines.len(), &mut widths);

    let mut out = String::with_capacity(text.len());
    for (i, (line, widths)) in lines.iter().zip(&widths).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.indent);
        if line.cells.len() == 1 {
            out.push_str(line.cells[0]);
            continue;
        }
        let start = out.len();
        for (j, cell) in line.cells.iter().enumerate() {
            out.push_str(cell);
            if let Some(&w) = widths.get(j) {
                let pad = w.saturating_sub(cell.chars().count());
                out.extend(std::iter::repeat(' ').take(pad));
            }
        }
        let trimmed = out[start..].trim_end_matches(' ').len();
        out.truncate(start + trimmed);
    }
    out
}

fn format_block(lines: &[Line<'_>], col: usize, start: usize, end: usize, widths: &mut [Vec<usize>]) {
    let mut i = start;
    while i < end {
        if !lines[i].has_cell(col) {
            i += 1;
            continue;
        }

        let block_start = i;
        let indent = lines[i].indent;
        while i < end && lines[i].has_cell(col) && lines[i].indent == indent {
            i += 1;
        }

        let width = lines[block_start..i]
            .iter()
            .map(|l| l.cells[col].chars().count())
            .max()
            .unwrap_or(0);
        let w = if width == 0 { 0 } else { width + PADDING };
        for row in widths.iter_mut().take(i).skip(block_start) {
            row[col] = w;
        }

        format_block(lines, col + 1, block_start, i, widths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_consecutive_cells() {
        let got = align("\ta\x0bint\n\tbbbb\x0bstring\n");
        assert_eq!(got, "\ta    int\n\tbbbb string\n");
    }

    #[test]
    fn blank_lines_and_indentation_split_blocks() {
        let got = align("\ta\x0bint\n\n\tbbbb\x0bstring\n\t\tcc\x0bx\n");
        assert_eq!(got, "\ta int\n\n\tbbbb string\n\t\tcc x\n");
    }

    #[test]
    fn empty_columns_are_discarded() {
        let got = align("\ta\x0b\x0b= 1\n\tbb\x0b\x0b= 2\n");
        assert_eq!(got, "\ta  = 1\n\tbb = 2\n");
    }

    #[test]
    fn widths_count_characters() {
        let got = align("ꞏx\x0b// a\nyyy\x0b// b");
        assert_eq!(got, "ꞏx  // a\nyyy // b");
    }
}
