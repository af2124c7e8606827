//! Composition of the element stream consumed by lint rules.
//!
//! Three independently generated sequences are merged here: the raw lexical
//! tokens produced by the external tokenizer, the `#` comments found in the
//! byte regions between tokens, and the physical lines of the document. The
//! result is a single sequence ordered by ascending line number, where a line
//! acts as the flush point for everything reported on it.

use yaml_rust2::scanner::{Scanner, TScalarStyle, TokenType};

/// A position in the source buffer.
///
/// `line` is 1-based, `column` is 0-based, `index` is a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

/// A lexical token with its start and end marks.
#[derive(Debug)]
pub struct RawToken {
    pub kind: TokenType,
    pub start: Mark,
    pub end: Mark,
}

impl RawToken {
    pub fn is_stream_start(&self) -> bool {
        matches!(self.kind, TokenType::StreamStart(..))
    }

    pub fn is_stream_end(&self) -> bool {
        matches!(self.kind, TokenType::StreamEnd)
    }
}

/// The two-token look-ahead window handed to token rules.
#[derive(Clone, Copy)]
pub struct TokenView<'a> {
    pub curr: &'a RawToken,
    pub prev: Option<&'a RawToken>,
    pub next: Option<&'a RawToken>,
    pub nextnext: Option<&'a RawToken>,
    pub buffer: &'a str,
}

impl TokenView<'_> {
    /// Line number used for ordering against `Line` elements.
    pub fn line_no(&self) -> usize {
        self.curr.start.line
    }
}

/// A `#` comment running to the end of its physical line.
#[derive(Debug)]
pub struct Comment {
    /// 1-based line of the `#` character.
    pub line_no: usize,
    /// 1-based column of the `#` character.
    pub column_no: usize,
    /// Byte offset of the `#` character.
    pub pointer: usize,
    text: String,
    inline: bool,
    /// End mark of the token immediately preceding the comment region.
    pub token_before_end: Option<Mark>,
    /// Index of the comment on the previous line of the same region, when
    /// this comment continues a comment block.
    pub comment_before: Option<usize>,
}

impl Comment {
    /// A comment is inline when it trails actual content on its line.
    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// The comment text, from `#` to the end of the line.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// A physical line: the half-open byte range `[start, end)` excluding the
/// terminating `\n`, plus a borrow of the whole buffer for rules that need
/// unrestricted look-back.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub line_no: usize,
    pub start: usize,
    pub end: usize,
    pub buffer: &'a str,
}

impl<'a> Line<'a> {
    pub fn content(&self) -> &'a str {
        &self.buffer[self.start..self.end]
    }
}

/// One element of the composed stream.
pub enum StreamElement<'a> {
    Token(TokenView<'a>),
    Comment(&'a Comment),
    Line(Line<'a>),
}

#[derive(Clone, Copy)]
enum ElemRef {
    Tok(usize),
    Com(usize),
}

/// The token and comment sequences of one document, in source order.
pub struct TokenStream<'a> {
    buffer: &'a str,
    tokens: Vec<RawToken>,
    comments: Vec<Comment>,
    /// Interleaved token/comment order; both underlying sequences are already
    /// position-ordered, this just records the interleaving.
    order: Vec<(usize, ElemRef)>,
}

impl<'a> TokenStream<'a> {
    /// Drive the tokenizer to exhaustion and collect the comments found
    /// between adjacent tokens. A lexical error truncates the token sequence;
    /// it never escapes this function.
    ///
    /// The tokenizer only reports where each token starts; the end marks the
    /// rules measure against are re-lexed from the source, bounded by the
    /// next token's start.
    pub fn scan(buffer: &'a str) -> TokenStream<'a> {
        let chars: Vec<char> = buffer.chars().collect();
        let byte_offsets = char_byte_offsets(buffer);

        let mut scanner = Scanner::new(buffer.chars());
        let raw: Vec<yaml_rust2::scanner::Token> = scanner.by_ref().collect();
        let truncated = scanner.get_error().is_some();

        let ends: Vec<usize> = (0..raw.len())
            .map(|i| {
                let bound = raw.get(i + 1).map_or(chars.len(), |next| next.0.index());
                token_end_index(&chars, raw[i].0.index(), bound, &raw[i].1)
            })
            .collect();
        let tokens: Vec<RawToken> = raw
            .into_iter()
            .zip(ends)
            .map(|(token, end_char)| {
                let start_char = token.0.index().min(chars.len());
                let start = Mark {
                    index: byte_offsets[start_char],
                    line: token.0.line(),
                    column: token.0.col(),
                };
                RawToken {
                    start,
                    end: advance_mark(start, &chars, start_char, end_char, &byte_offsets),
                    kind: token.1,
                }
            })
            .collect();

        let mut stream = TokenStream {
            buffer,
            tokens,
            comments: Vec::new(),
            order: Vec::with_capacity(buffer.len() / 8),
        };
        for i in 0..stream.tokens.len() {
            let line_no = stream.tokens[i].start.line;
            stream.order.push((line_no, ElemRef::Tok(i)));
            if i + 1 < stream.tokens.len() {
                stream.collect_comments(i, Some(i + 1));
            } else if !truncated {
                // After the final token the rest of the buffer is comment
                // territory, unless the scan stopped on a lexical error.
                stream.collect_comments(i, None);
            }
        }
        stream
    }

    /// Scan the byte region between two adjacent tokens for comments,
    /// line by line.
    fn collect_comments(&mut self, before: usize, after: Option<usize>) {
        let t1 = &self.tokens[before];
        let (range_start, range_end) = match after {
            None => (t1.end.index, self.buffer.len()),
            Some(a) => {
                let t2 = &self.tokens[a];
                // Two tokens on the same physical line (sentinels excluded)
                // have no comment region between them.
                if t1.end.line == t2.start.line
                    && !t1.is_stream_start()
                    && !t2.is_stream_end()
                {
                    return;
                }
                (t1.end.index, t2.start.index)
            }
        };

        let token_before_end = t1.end;
        let token_is_stream_start = t1.is_stream_start();
        let mut line_no = t1.end.line;
        let mut column_no = t1.end.column + 1;
        let mut pointer = range_start;
        let mut comment_before: Option<usize> = None;

        for line in self.buffer[range_start..range_end].split('\n') {
            if let Some(pos) = line.find('#') {
                let start = pointer + pos;
                let end = self.buffer[start..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| start + i);
                let inline = !token_is_stream_start
                    && line_no == token_before_end.line
                    && start > 0
                    && self.buffer.as_bytes()[start - 1] != b'\n';
                self.comments.push(Comment {
                    line_no,
                    column_no: column_no + line[..pos].chars().count(),
                    pointer: start,
                    text: self.buffer[start..end].to_string(),
                    inline,
                    token_before_end: Some(token_before_end),
                    comment_before,
                });
                let idx = self.comments.len() - 1;
                self.order.push((line_no, ElemRef::Com(idx)));
                comment_before = Some(idx);
            }
            pointer += line.len() + 1;
            line_no += 1;
            column_no = 1;
        }
    }

    pub fn tokens(&self) -> &[RawToken] {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Merge the token/comment sequence with the line sequence into one
    /// ascending-by-line-number stream. Both inputs are already ordered, so
    /// this is a single linear merge; on a line-number tie the non-line
    /// element is emitted first, making lines flush points.
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            stream: self,
            next_ref: 0,
            lines: lines(self.buffer),
            pending_line: None,
        }
    }
}

pub struct Elements<'a> {
    stream: &'a TokenStream<'a>,
    next_ref: usize,
    lines: Lines<'a>,
    pending_line: Option<Line<'a>>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = StreamElement<'a>;

    fn next(&mut self) -> Option<StreamElement<'a>> {
        if self.pending_line.is_none() {
            self.pending_line = self.lines.next();
        }
        let elem_line = self.stream.order.get(self.next_ref).map(|(l, _)| *l);
        match (elem_line, &self.pending_line) {
            (Some(el), Some(line)) if el > line.line_no => {
                Some(StreamElement::Line(self.pending_line.take()?))
            }
            (Some(_), _) => {
                let (_, elem) = &self.stream.order[self.next_ref];
                self.next_ref += 1;
                Some(match *elem {
                    ElemRef::Tok(i) => StreamElement::Token(TokenView {
                        curr: &self.stream.tokens[i],
                        prev: i.checked_sub(1).map(|p| &self.stream.tokens[p]),
                        next: self.stream.tokens.get(i + 1),
                        nextnext: self.stream.tokens.get(i + 2),
                        buffer: self.stream.buffer,
                    }),
                    ElemRef::Com(i) => StreamElement::Comment(&self.stream.comments[i]),
                })
            }
            (None, Some(_)) => Some(StreamElement::Line(self.pending_line.take()?)),
            (None, None) => None,
        }
    }
}

/// Split a buffer into physical lines on `\n`. The trailing unterminated
/// segment is still a line, so an empty input yields exactly one empty line.
pub fn lines(buffer: &str) -> Lines<'_> {
    Lines {
        buffer,
        cursor: 0,
        line_no: 1,
        done: false,
    }
}

pub struct Lines<'a> {
    buffer: &'a str,
    cursor: usize,
    line_no: usize,
    done: bool,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.done {
            return None;
        }
        let line_no = self.line_no;
        let start = self.cursor;
        match self.buffer[start..].find('\n') {
            Some(off) => {
                let nl = start + off;
                self.cursor = nl + 1;
                self.line_no += 1;
                // A \r\n terminator leaves the \r outside the line content.
                let end = if nl > start && self.buffer.as_bytes()[nl - 1] == b'\r' {
                    nl - 1
                } else {
                    nl
                };
                Some(Line {
                    line_no,
                    start,
                    end,
                    buffer: self.buffer,
                })
            }
            None => {
                self.done = true;
                Some(Line {
                    line_no,
                    start,
                    end: self.buffer.len(),
                    buffer: self.buffer,
                })
            }
        }
    }
}

/// Byte offset of every char index, plus one past-the-end entry. The scanner
/// counts characters, not bytes; this table converts its marks so slicing
/// stays on char boundaries for multi-byte documents.
fn char_byte_offsets(buffer: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = buffer.char_indices().map(|(i, _)| i).collect();
    offsets.push(buffer.len());
    offsets
}

fn is_blank_or_break(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Walk forward from a known mark to a later char index, tracking line
/// breaks so the resulting mark carries correct line/column coordinates.
fn advance_mark(
    start: Mark,
    chars: &[char],
    from: usize,
    to: usize,
    byte_offsets: &[usize],
) -> Mark {
    let mut line = start.line;
    let mut column = start.column;
    let mut i = from;
    while i < to {
        match chars[i] {
            '\n' => {
                line += 1;
                column = 0;
            }
            '\r' => {
                line += 1;
                column = 0;
                if chars.get(i + 1) == Some(&'\n') {
                    i += 1;
                }
            }
            _ => column += 1,
        }
        i += 1;
    }
    Mark {
        index: byte_offsets[to],
        line,
        column,
    }
}

/// The exclusive char index at which a token's source text ends.
///
/// Punctuation and indicator tokens have fixed widths; names are carried in
/// the token itself; scalars are re-lexed from the buffer by style. `bound`
/// is the next token's start and caps every scan.
fn token_end_index(chars: &[char], start: usize, bound: usize, kind: &TokenType) -> usize {
    let start = start.min(chars.len());
    let bound = bound.clamp(start, chars.len());
    match kind {
        TokenType::StreamStart(..)
        | TokenType::StreamEnd
        | TokenType::BlockSequenceStart
        | TokenType::BlockMappingStart
        | TokenType::BlockEnd => start,
        // An implicit key is zero-width at its scalar's position; the
        // explicit form covers the `?` indicator.
        TokenType::Key => {
            if chars.get(start) == Some(&'?') {
                start + 1
            } else {
                start
            }
        }
        TokenType::Value
        | TokenType::BlockEntry
        | TokenType::FlowEntry
        | TokenType::FlowSequenceStart
        | TokenType::FlowSequenceEnd
        | TokenType::FlowMappingStart
        | TokenType::FlowMappingEnd => (start + 1).min(chars.len()),
        TokenType::DocumentStart | TokenType::DocumentEnd => (start + 3).min(chars.len()),
        TokenType::Alias(name) | TokenType::Anchor(name) => {
            (start + 1 + name.chars().count()).min(chars.len())
        }
        TokenType::Tag(..) => nonblank_run(chars, start, bound),
        TokenType::VersionDirective(..) | TokenType::TagDirective(..) => {
            plain_extent(chars, start, bound)
        }
        TokenType::Scalar(style, _) => match style {
            TScalarStyle::Plain => plain_extent(chars, start, bound),
            TScalarStyle::SingleQuoted => single_quoted_extent(chars, start),
            TScalarStyle::DoubleQuoted => double_quoted_extent(chars, start),
            TScalarStyle::Literal | TScalarStyle::Folded => block_extent(chars, start, bound),
        },
    }
}

fn nonblank_run(chars: &[char], start: usize, bound: usize) -> usize {
    let mut i = start;
    while i < bound && !is_blank_or_break(chars[i]) {
        i += 1;
    }
    i
}

/// End of a plain scalar or a `%` directive: one past the last non-blank
/// char before a comment opens. Between a token and the next one the source
/// holds only the token's own text, blanks and comments, so a `#` after a
/// blank or break is always a comment even when the scalar spans lines.
fn plain_extent(chars: &[char], start: usize, bound: usize) -> usize {
    let mut last = start;
    let mut i = start;
    while i < bound {
        let c = chars[i];
        if c == '#' && i > start && is_blank_or_break(chars[i - 1]) {
            break;
        }
        if !is_blank_or_break(c) {
            last = i + 1;
        }
        i += 1;
    }
    last.max((start + 1).min(chars.len()))
}

fn single_quoted_extent(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == '\'' {
            // '' is an escaped quote, not a terminator
            if chars.get(i + 1) == Some(&'\'') {
                i += 2;
            } else {
                return i + 1;
            }
        } else {
            i += 1;
        }
    }
    chars.len()
}

fn double_quoted_extent(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// End of a `|`/`>` block scalar: one past the last non-blank char of its
/// last content line. Content lines sit after the header line, indented
/// past it; the first one fixes the minimum content indentation, and a
/// less-indented non-blank line ends the block (what follows can only be
/// comments before the next token).
fn block_extent(chars: &[char], start: usize, bound: usize) -> usize {
    let header_line_start = chars[..start]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |p| p + 1);
    let header_indent = chars[header_line_start..start]
        .iter()
        .take_while(|&&c| c == ' ')
        .count();

    // header indicator with its chomping/indentation modifiers
    let mut end = nonblank_run(chars, start, bound);
    let mut i = end;
    while i < bound && chars[i] != '\n' {
        i += 1;
    }

    let mut content_indent: Option<usize> = None;
    while i < bound && chars[i] == '\n' {
        let line_start = i + 1;
        let mut j = line_start;
        while j < bound && chars[j] != '\n' {
            j += 1;
        }
        let line = &chars[line_start..j];
        if let Some(pos) = line.iter().rposition(|&c| !is_blank_or_break(c)) {
            let indent = line.iter().take_while(|&&c| c == ' ').count();
            match content_indent {
                None if indent <= header_indent => break,
                None => content_indent = Some(indent),
                Some(ci) if indent < ci => break,
                Some(_) => {}
            }
            end = line_start + pos + 1;
        }
        i = j;
    }
    end
}
