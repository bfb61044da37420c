//! A bounds-checked scanner over a header value.
//!
//! Every advance goes through `str::get`/`chars`, so adversarial input can
//! only end the scan early, never index out of range or split a UTF-8
//! sequence.

use super::DirectiveError;

#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Looks one character past the next one.
    pub(crate) fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `expected` if it is the next character.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `pred` holds and returns them.
    pub(crate) fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        rest.get(..len).unwrap_or_default()
    }

    pub(crate) fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        self.take_while(pred);
    }

    /// Reads a quoted-string starting at the opening `"` and returns its
    /// unescaped contents.
    ///
    /// A missing closing quote, a bare CR/LF inside the string, or a trailing
    /// backslash is a [`DirectiveError::QuoteMismatch`].
    pub(crate) fn quoted_string(&mut self) -> Result<String, DirectiveError> {
        if !self.eat('"') {
            return Err(DirectiveError::QuoteMismatch);
        }

        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(DirectiveError::QuoteMismatch),
                },
                Some('\r' | '\n') | None => return Err(DirectiveError::QuoteMismatch),
                Some(c) => out.push(c),
            }
        }
    }
}
