//! Forward-only cursor over a token sequence.

use std::str::FromStr;

use corelib::{Vec3, vec3};

use crate::error::{AseError, AseResult};

/// The parser's only view of the raw tokens. Never rewinds.
pub struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: Vec<&'a str>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Index of the current token.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Number of tokens not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    /// Current token, if any, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    /// Consume and return the current token.
    pub fn next_token(&mut self, context: &'static str) -> AseResult<&'a str> {
        let token = self.peek().ok_or(AseError::TruncatedStream {
            position: self.pos,
            context,
        })?;
        self.pos += 1;
        Ok(token)
    }

    /// Skip `n` tokens. Running past the end is a truncation.
    pub fn advance(&mut self, n: usize, context: &'static str) -> AseResult<()> {
        if self.pos + n > self.tokens.len() {
            return Err(AseError::TruncatedStream {
                position: self.tokens.len(),
                context,
            });
        }
        self.pos += n;
        Ok(())
    }

    /// Consume the current token, which must equal `literal`.
    pub fn expect(&mut self, literal: &'static str) -> AseResult<()> {
        let position = self.pos;
        let token = self.next_token(literal)?;
        if token != literal {
            return Err(AseError::UnexpectedToken {
                position,
                expected: literal,
                found: token.to_owned(),
            });
        }
        Ok(())
    }

    /// Consume a numeric token.
    pub fn number<T: FromStr>(&mut self, context: &'static str) -> AseResult<T> {
        let position = self.pos;
        let token = self.next_token(context)?;
        token.parse::<T>().map_err(|_| AseError::InvalidNumber {
            position,
            token: token.to_owned(),
            context,
        })
    }

    /// Consume a non-negative integer used as an index, id or count.
    pub fn index(&mut self, context: &'static str) -> AseResult<usize> {
        self.number(context)
    }

    pub fn float(&mut self, context: &'static str) -> AseResult<f32> {
        self.number(context)
    }

    /// Consume three floats as a vector.
    pub fn vec3(&mut self, context: &'static str) -> AseResult<Vec3> {
        let x = self.float(context)?;
        let y = self.float(context)?;
        let z = self.float(context)?;
        Ok(vec3(x, y, z))
    }

    /// Consume the current token verbatim.
    pub fn string(&mut self, context: &'static str) -> AseResult<String> {
        self.next_token(context).map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_consumes_advance() {
        let mut c = Cursor::new(vec!["3", "-0.5", "name", "1", "2", "3"]);
        assert_eq!(c.remaining(), 6);
        assert_eq!(c.index("count").unwrap(), 3);
        assert_eq!(c.float("scalar").unwrap(), -0.5);
        assert_eq!(c.string("name").unwrap(), "name");
        assert_eq!(c.vec3("vector").unwrap(), vec3(1.0, 2.0, 3.0));
        assert!(c.is_at_end());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn consuming_past_end_is_truncation() {
        let mut c = Cursor::new(vec!["1"]);
        c.index("first").unwrap();
        assert!(matches!(
            c.index("second"),
            Err(AseError::TruncatedStream { position: 1, context: "second" })
        ));
        assert!(matches!(
            c.advance(2, "skip"),
            Err(AseError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn expect_reports_mismatch() {
        let mut c = Cursor::new(vec!["{", "}"]);
        c.expect("{").unwrap();
        let err = c.expect("{").unwrap_err();
        assert!(matches!(
            err,
            AseError::UnexpectedToken { position: 1, expected: "{", ref found } if found == "}"
        ));
    }

    #[test]
    fn bad_number_is_reported_with_position() {
        let mut c = Cursor::new(vec!["abc"]);
        assert!(matches!(
            c.float("shine"),
            Err(AseError::InvalidNumber { position: 0, context: "shine", .. })
        ));
    }

    #[test]
    fn negative_index_is_invalid() {
        let mut c = Cursor::new(vec!["-1"]);
        assert!(matches!(c.index("vertex id"), Err(AseError::InvalidNumber { .. })));
    }
}
