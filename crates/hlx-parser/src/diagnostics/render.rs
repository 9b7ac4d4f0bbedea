//! Diagnostic rendering: context windows, caret runs and quick fixes.
//!
//! A code error renders as a header line, a window of up to five source
//! lines centered on the failure, a caret run under the failing token,
//! quick-fix insertions into the failing line, and an optional `fix:` line.
//!
//! Rendering works on *styled cells*: every visible character carries a
//! style, and ANSI escapes are only emitted at style transitions when the
//! final string is assembled. Quick-fix insertion therefore grows the
//! visible width by exactly the inserted text's length, independent of the
//! escape sequences in the output.

use hlx_source::SourceCache;

use super::{Diagnostic, EngineError, Level, QuickFix};

/// Number of context lines shown around the failing line.
const LINES_TO_SHOW: u32 = 5;

/// ANSI fragments used by the renderer.
mod colors {
    pub const BOLD_RED: &str = "\x1b[1;31m";
    pub const BOLD_GREEN: &str = "\x1b[1;32m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RESET: &str = "\x1b[0m";
}

/// Style of one visible cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Err,
    Fix,
}

impl Style {
    const fn escape(self) -> &'static str {
        match self {
            Self::Plain => colors::RESET,
            Self::Err => colors::BOLD_RED,
            Self::Fix => colors::BOLD_GREEN,
        }
    }
}

/// A line of styled cells.
#[derive(Debug, Clone)]
struct StyledLine {
    cells: Vec<(char, Style)>,
}

impl StyledLine {
    fn from_plain(text: &str) -> Self {
        Self { cells: text.chars().map(|c| (c, Style::Plain)).collect() }
    }

    fn blank(len: usize) -> Self {
        Self { cells: vec![(' ', Style::Plain); len] }
    }

    /// Pads with plain spaces so the line holds at least `len` cells.
    fn pad_to(&mut self, len: usize) {
        while self.cells.len() < len {
            self.cells.push((' ', Style::Plain));
        }
    }

    /// Applies a style to the cells in `[start, end)`.
    fn paint(&mut self, start: usize, end: usize, style: Style) {
        self.pad_to(end);
        for cell in &mut self.cells[start..end] {
            cell.1 = style;
        }
    }

    /// Overwrites the cells in `[start, start + text.len())`.
    fn overwrite(&mut self, start: usize, text: &str, style: Style) {
        self.pad_to(start + text.chars().count());
        for (i, c) in text.chars().enumerate() {
            self.cells[start + i] = (c, style);
        }
    }

    /// Inserts styled text at `index`, shifting everything to its right.
    fn insert(&mut self, index: usize, text: &str, style: Style) {
        self.pad_to(index);
        for (i, c) in text.chars().enumerate() {
            self.cells.insert(index + i, (c, style));
        }
    }

    /// Assembles the final string, emitting escapes at style transitions.
    fn render(&self, color: bool) -> String {
        let mut out = String::new();
        let mut current = Style::Plain;

        for &(c, style) in &self.cells {
            if color && style != current {
                out.push_str(style.escape());
                current = style;
            }
            out.push(c);
        }

        if color && current != Style::Plain {
            out.push_str(colors::RESET);
        }

        while out.ends_with(' ') {
            out.pop();
        }

        out
    }
}

/// Resolves a 1-based (possibly negative) quick-fix column against the
/// pre-insertion line length. `-1` means "append after the last column".
fn resolve_fix_position(loc: i64, line_len: usize) -> usize {
    let resolved = if loc >= 1 { loc - 1 } else { line_len as i64 + loc + 1 };

    resolved.clamp(0, line_len as i64) as usize
}

/// Renders the failing line and its marking row.
///
/// Returns `(line, marking)`: the line with quick fixes inserted, and the
/// row of carets and `+` runs aligned under it.
fn mark_line(
    text: &str,
    col: u32,
    caret_len: u32,
    quick_fixes: &[QuickFix],
    mark_pof: bool,
    color: bool,
) -> (String, String) {
    let trimmed = text.trim_end();
    let line_len = trimmed.chars().count();

    let mut line = StyledLine::from_plain(trimmed);
    let mut marking = StyledLine::blank(line_len);

    let caret_start = (col.max(1) as usize - 1).min(line_len + 1);
    let caret_end = caret_start + caret_len.max(1) as usize;

    if mark_pof {
        line.paint(caret_start, caret_end, Style::Err);
        marking.overwrite(caret_start, &"^".repeat(caret_len.max(1) as usize), Style::Err);
    }

    // Fixes are given in pre-insertion columns: sort them left to right and
    // shift each by the total length inserted to its left. The caret run's
    // current end is tracked so a fix aimed past the original line (where
    // the caret sits on padding) renders after the run, not inside it.
    let mut fixes: Vec<(usize, &str)> = quick_fixes
        .iter()
        .map(|qf| (resolve_fix_position(qf.loc, line_len), qf.fix.as_str()))
        .collect();
    fixes.sort_by_key(|&(pos, _)| pos);

    let mut shift = 0usize;
    let mut caret_end_now = caret_end;

    for (pos, fix) in fixes {
        let mut at = pos + shift;

        if mark_pof && pos >= line_len && caret_end > line_len {
            at = at.max(caret_end_now);
        }

        let fix_len = fix.chars().count();
        line.insert(at, fix, Style::Fix);
        marking.insert(at, &"+".repeat(fix_len), Style::Fix);

        if at < caret_end_now {
            caret_end_now += fix_len;
        }
        shift += fix_len;
    }

    (line.render(color), marking.render(color))
}

/// One row of the context window.
#[derive(Debug)]
struct ContextLine {
    number: u32,
    text: String,
    is_pof: bool,
    ellipsis: bool,
}

/// Collects the window of lines around the failure.
///
/// The window is centered on the failing line; leading and trailing blank
/// lines are trimmed (the failing line is always kept), and any run of more
/// than two interior blank lines collapses to a single ellipsis row.
/// Missing lines terminate the window early.
fn surrounding_lines(cache: &SourceCache, file: &str, line: u32) -> Vec<ContextLine> {
    let lines_before =
        if LINES_TO_SHOW % 2 == 0 { LINES_TO_SHOW / 2 - 1 } else { LINES_TO_SHOW / 2 };
    let start = line.saturating_sub(lines_before).max(1);

    let mut rows = Vec::new();
    for number in start..start + LINES_TO_SHOW {
        let Some(text) = cache.get_line(file, number) else { break };
        rows.push(ContextLine { number, text, is_pof: number == line, ellipsis: false });
    }

    // Trim blank edges, never past the failing line.
    while rows.first().is_some_and(|row| !row.is_pof && row.text.trim().is_empty()) {
        let _ = rows.remove(0);
    }
    while rows.last().is_some_and(|row| !row.is_pof && row.text.trim().is_empty()) {
        let _ = rows.pop();
    }

    // Collapse interior blank runs longer than two into one ellipsis row.
    let mut collapsed: Vec<ContextLine> = Vec::with_capacity(rows.len());
    let mut blanks: Vec<ContextLine> = Vec::new();

    for row in rows {
        if !row.is_pof && row.text.trim().is_empty() {
            blanks.push(row);
            continue;
        }

        if blanks.len() > 2 {
            let number = blanks[0].number;
            collapsed.push(ContextLine {
                number,
                text: String::new(),
                is_pof: false,
                ellipsis: true,
            });
        } else {
            collapsed.append(&mut blanks);
        }
        blanks.clear();

        collapsed.push(row);
    }
    if blanks.len() <= 2 {
        collapsed.append(&mut blanks);
    }

    collapsed
}

fn paint(text: &str, escape: &str, color: bool) -> String {
    if color { format!("{escape}{text}{}", colors::RESET) } else { text.to_owned() }
}

/// Renders one diagnostic to a string.
///
/// ## Errors
///
/// Returns [`EngineError::MissingLine`] if the failing line of a code error
/// cannot be retrieved from the source cache.
pub fn render(
    cache: &SourceCache,
    diagnostic: &Diagnostic,
    color: bool,
) -> Result<String, EngineError> {
    let mut out: Vec<String> = Vec::new();

    let label = paint(diagnostic.level.as_str(), diagnostic.level.color_code(), color);

    if diagnostic.error_type == "compiler" {
        out.push(format!("{label}: {}", diagnostic.msg));

        if !diagnostic.fix.is_empty() {
            let fix_label = paint("fix", colors::BOLD_GREEN, color);
            out.push(format!("{fix_label}: {}", diagnostic.fix));
        }

        return Ok(finish(out, diagnostic.indent));
    }

    let pof_line = cache.get_line(&diagnostic.file, diagnostic.line).ok_or_else(|| {
        EngineError::MissingLine { file: diagnostic.file.clone(), line: diagnostic.line }
    })?;

    let rows = surrounding_lines(cache, &diagnostic.file, diagnostic.line);
    let width = rows
        .iter()
        .map(|row| row.number.to_string().len())
        .max()
        .unwrap_or(1)
        .max(2);

    out.push(format!("{label}: {}", diagnostic.msg));
    out.push(format!(
        "{:width$}--> at {}:{}:{}",
        "",
        paint(&diagnostic.file, colors::GREEN, color),
        paint(&diagnostic.line.to_string(), colors::YELLOW, color),
        paint(&diagnostic.col.to_string(), colors::YELLOW, color),
    ));

    for row in &rows {
        if row.ellipsis {
            out.push(format!("{:width$}···", ""));
            continue;
        }

        if row.is_pof {
            let (marked, marking) = mark_line(
                &pof_line,
                diagnostic.col,
                diagnostic.offset,
                &diagnostic.quick_fix,
                diagnostic.mark_pof,
                color,
            );

            out.push(format!("{:>width$} | {marked}", row.number));
            if !marking.is_empty() {
                out.push(format!("{:width$} : {marking}", ""));
            }
        } else {
            out.push(format!("{:>width$} | {}", row.number, row.text.trim_end()));
        }
    }

    if !diagnostic.fix.is_empty() {
        out.push(format!("{:width$} |", ""));
        let fix_label = paint("fix", colors::BOLD_GREEN, color);
        out.push(format!("{fix_label}: {}", diagnostic.fix));
    }

    Ok(finish(out, diagnostic.indent))
}

/// Joins the rendered lines, applying the request-level indent.
fn finish(lines: Vec<String>, indent: u8) -> String {
    let pad = " ".repeat(indent as usize * 4);

    lines
        .into_iter()
        .map(|line| if line.is_empty() { line } else { format!("{pad}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(text: &str) -> String {
        // Strip ANSI escapes for width comparisons.
        let mut out = String::new();
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for esc in chars.by_ref() {
                    if esc == 'm' {
                        break;
                    }
                }
                continue;
            }
            out.push(c);
        }

        out
    }

    #[test]
    fn caret_is_placed_under_the_column() {
        let (_, marking) = mark_line("let x = 1", 5, 1, &[], true, false);
        assert_eq!(marking, "    ^");
    }

    #[test]
    fn quick_fix_appends_at_minus_one() {
        let (line, marking) = mark_line("let x = 1", 10, 1, &[QuickFix {
            fix: ";".to_owned(),
            loc: -1,
        }], true, false);

        assert_eq!(line, "let x = 1 ;");
        // Caret lands past the end of the line, fix follows it.
        assert_eq!(marking, "         ^+");
    }

    #[test]
    fn fixes_insert_left_to_right_with_cumulative_shift() {
        let fixes = vec![
            QuickFix { fix: ")".to_owned(), loc: 8 },
            QuickFix { fix: "(".to_owned(), loc: 5 },
        ];

        let (line, _) = mark_line("let x = 1", 5, 1, &fixes, false, false);
        assert_eq!(line, "let (x = )1");
    }

    #[test]
    fn visible_width_grows_by_fix_lengths() {
        let text = "let x = 42";
        let fixes = vec![
            QuickFix { fix: ";".to_owned(), loc: -1 },
            QuickFix { fix: "mut ".to_owned(), loc: 5 },
        ];

        let (plain, _) = mark_line(text, 5, 1, &fixes, true, false);
        let (colored, _) = mark_line(text, 5, 1, &fixes, true, true);

        let expected = text.len() + 1 + 4;
        assert_eq!(plain.trim_end().chars().count(), expected);
        assert_eq!(visible(&colored).trim_end().chars().count(), expected);
    }

    #[test]
    fn negative_positions_resolve_from_line_end() {
        assert_eq!(resolve_fix_position(-1, 10), 10);
        assert_eq!(resolve_fix_position(-2, 10), 9);
        assert_eq!(resolve_fix_position(1, 10), 0);
        assert_eq!(resolve_fix_position(4, 10), 3);
        assert_eq!(resolve_fix_position(-100, 10), 0);
    }
}
