/// A cursor for byte-by-byte tag scanning over an HTML fragment.
///
/// Failed tag parses clone the cursor up front and restore it, so a stray
/// `<` simply falls through to text.
#[derive(Clone)]
pub(crate) struct Cursor<'a> {
    /// The string being parsed.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i..].starts_with(pat)
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.s.as_bytes().get(self.i).copied()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Consumes up to (not including) the next occurrence of `byte`,
    /// returning the consumed slice.
    pub fn take_until(&mut self, byte: u8) -> &'a str {
        let start = self.i;
        while let Some(b) = self.peek() {
            if b == byte {
                break;
            }
            self.i += 1;
        }
        &self.s[start..self.i]
    }
}
