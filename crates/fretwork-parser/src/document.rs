//! Row and cell model of a song sheet.
//!
//! Song sheets lay out each line as a table row: a chord row (`<tr class="ch">`)
//! whose cells hold chord names, followed by a lyric row (`<tr class="ly">`).
//! [`SongDocument`] reads just enough of the markup to recover those rows and
//! their cell texts, and remembers where new content may be inserted so the
//! document can be written back with [`SongDocument::apply`] while every
//! untouched byte stays as it was.
//!
//! Rows close at `</tr>`, or implicitly at the next `<tr>`, at `</table>`,
//! `</tbody>`, `</thead>`, `</tfoot>`, or at the end of input. Cells open at
//! `<td>`/`<th>` and close at their end tag, the next cell, or the end of the
//! row.
//!
//! A table nested inside a cell starts a new nesting level: its rows are
//! rows of their own, and its tags never close the enclosing row. Text of a
//! nested table does not count towards the enclosing cell.

use log::{debug, warn};
use serde::Deserialize;

use crate::{
    entity,
    lexer::{PositionedToken, StartTag, Token, tokenize},
};

/// End tags other than `</table>` that close an open row.
const ROW_CLOSERS: [&str; 4] = ["tr", "tbody", "thead", "tfoot"];

/// Class names that give table rows their role.
///
/// ```toml
/// [document]
/// chord_class = "chords"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Class marking rows that carry chord names.
    pub chord_class: String,
    /// Class marking rows that carry lyrics.
    pub lyric_class: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            chord_class: String::from("ch"),
            lyric_class: String::from("ly"),
        }
    }
}

impl ParseConfig {
    fn role_of(&self, tag: &StartTag<'_>) -> RowRole {
        let mut role = RowRole::Other;
        for class in tag.classes() {
            if class == self.chord_class {
                return RowRole::Chord;
            }
            if class == self.lyric_class {
                role = RowRole::Lyric;
            }
        }
        role
    }
}

/// What a table row is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    Chord,
    Lyric,
    Other,
}

/// A table cell with its character references decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    text: String,
    header: bool,
}

impl Cell {
    /// Cell text with `<br>` as a space and references decoded; `&nbsp;` is
    /// kept as U+00A0.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` for `<th>` cells.
    pub fn is_header(&self) -> bool {
        self.header
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    role: RowRole,
    cells: Vec<Cell>,
    start: usize,
    insertion_offset: usize,
}

impl Row {
    pub fn role(&self) -> RowRole {
        self.role
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Byte offset of the `<tr` that opened the row.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset where a trailing cell can be inserted: the start of the
    /// row's `</tr>`, or of whatever closed the row implicitly.
    pub fn insertion_offset(&self) -> usize {
        self.insertion_offset
    }
}

/// Text to insert at a byte offset of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    offset: usize,
    text: String,
}

impl Patch {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Accumulates one row while its tokens are read.
struct RowBuilder {
    role: RowRole,
    start: usize,
    cells: Vec<Cell>,
    cell_open: bool,
}

impl RowBuilder {
    fn new(role: RowRole, start: usize) -> Self {
        Self {
            role,
            start,
            cells: Vec::new(),
            cell_open: false,
        }
    }

    fn open_cell(&mut self, header: bool) {
        self.cells.push(Cell {
            text: String::new(),
            header,
        });
        self.cell_open = true;
    }

    fn close_cell(&mut self) {
        self.cell_open = false;
    }

    fn push_text(&mut self, text: &str) {
        if !self.cell_open {
            return;
        }
        if let Some(cell) = self.cells.last_mut() {
            cell.text.push_str(text);
        }
    }

    fn finish(self, insertion_offset: usize) -> Row {
        Row {
            role: self.role,
            cells: self.cells,
            start: self.start,
            insertion_offset,
        }
    }
}

/// A parsed song sheet that borrows its source.
#[derive(Debug, Clone)]
pub struct SongDocument<'a> {
    source: &'a str,
    rows: Vec<Row>,
    body_insertion_offset: Option<usize>,
}

impl<'a> SongDocument<'a> {
    /// Parses `source` with the default `ch`/`ly` row classes.
    pub fn parse(source: &'a str) -> Self {
        Self::parse_with(source, &ParseConfig::default())
    }

    /// Parses `source` using the given row classes.
    ///
    /// Parsing never fails: markup that does not form rows simply yields
    /// fewer rows.
    pub fn parse_with(source: &'a str, config: &ParseConfig) -> Self {
        let mut rows = Vec::new();
        // Open rows with the table depth they belong to, innermost last
        let mut open_rows: Vec<(usize, RowBuilder)> = Vec::new();
        let mut depth = 0usize;
        let mut body_insertion_offset = None;
        let mut in_raw_text = false;

        let close_row = |open_rows: &mut Vec<(usize, RowBuilder)>,
                         rows: &mut Vec<Row>,
                         depth: usize,
                         offset: usize| {
            if let Some((_, row)) = open_rows.pop_if(|(level, _)| *level == depth) {
                rows.push(row.finish(offset));
            }
        };

        for PositionedToken { token, span } in tokenize(source) {
            let current = open_rows
                .last_mut()
                .filter(|(level, _)| *level == depth)
                .map(|(_, row)| row);

            match &token {
                Token::StartTag(tag) if tag.is("table") && !tag.self_closing => {
                    depth += 1;
                }
                Token::StartTag(tag) if tag.is("tr") => {
                    close_row(&mut open_rows, &mut rows, depth, span.start());
                    open_rows.push((depth, RowBuilder::new(config.role_of(tag), span.start())));
                }
                Token::StartTag(tag) if tag.is("td") || tag.is("th") => {
                    if let Some(row) = current {
                        row.open_cell(tag.is("th"));
                    }
                }
                Token::StartTag(tag) if tag.is("br") => {
                    if let Some(row) = current {
                        row.push_text(" ");
                    }
                }
                Token::StartTag(tag) if tag.is("body") && body_insertion_offset.is_none() => {
                    body_insertion_offset = Some(span.end());
                }
                Token::StartTag(tag) if tag.is("script") || tag.is("style") => {
                    in_raw_text = !tag.self_closing;
                }
                Token::EndTag { .. } if token.is_end("script") || token.is_end("style") => {
                    in_raw_text = false;
                }
                Token::EndTag { .. } if token.is_end("td") || token.is_end("th") => {
                    if let Some(row) = current {
                        row.close_cell();
                    }
                }
                Token::EndTag { .. } if token.is_end("table") => {
                    close_row(&mut open_rows, &mut rows, depth, span.start());
                    depth = depth.saturating_sub(1);
                }
                Token::EndTag { .. } if ROW_CLOSERS.iter().any(|name| token.is_end(name)) => {
                    close_row(&mut open_rows, &mut rows, depth, span.start());
                }
                Token::Text(text) if !in_raw_text => {
                    if let Some(row) = current {
                        row.push_text(&entity::decode(text));
                    }
                }
                _ => {}
            }
        }
        while let Some((_, row)) = open_rows.pop() {
            rows.push(row.finish(source.len()));
        }
        // Inner rows finish first; keep document order
        rows.sort_by_key(Row::start);

        debug!(rows = rows.len(), has_body = body_insertion_offset.is_some(); "Parsed song document");
        Self {
            source,
            rows,
            body_insertion_offset,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// All rows in document order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows with the chord role, in document order.
    ///
    /// The position of a row in this iterator is its chord-row index.
    pub fn chord_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.role == RowRole::Chord)
    }

    /// Byte offset just after the first `<body>` start tag, if any.
    pub fn body_insertion_offset(&self) -> Option<usize> {
        self.body_insertion_offset
    }

    /// Writes the source back with the patches inserted.
    ///
    /// Patches are applied in offset order; patches at the same offset keep
    /// the order they were given in. Offsets past the end are clamped, and a
    /// patch that does not fall on a character boundary is dropped.
    pub fn apply(&self, patches: &[Patch]) -> String {
        if patches.is_empty() {
            return self.source.to_string();
        }

        let mut ordered: Vec<&Patch> = patches.iter().collect();
        ordered.sort_by_key(|patch| patch.offset);

        let extra: usize = patches.iter().map(|patch| patch.text.len()).sum();
        let mut output = String::with_capacity(self.source.len() + extra);
        let mut cursor = 0;
        for patch in ordered {
            let offset = patch.offset.min(self.source.len());
            if !self.source.is_char_boundary(offset) {
                warn!(offset; "Dropping patch inside a character");
                continue;
            }
            output.push_str(&self.source[cursor..offset]);
            output.push_str(&patch.text);
            cursor = offset;
        }
        output.push_str(&self.source[cursor..]);
        output
    }
}
