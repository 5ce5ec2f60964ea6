//! # Frame Scanner
//!
//! Resumable structural walk over a buffered frame. It follows the same
//! grammar as the decoder but builds nothing, and keeps its position between
//! calls so bytes already walked are never walked again. The streaming codec
//! runs the full decoder only once the scanner reports a complete frame, or
//! bytes it cannot accept.
//!
//! The scanner treats each length-prefixed value as one unit: it advances
//! over a string or binary blob only once all of its bytes are buffered.

use crate::core::marker::{
    is_reserved, BINARY, DOUBLE_BYTE, LARGE, LIST_EMPTY, LIST_END, LIST_START, LITERAL,
    MAX_SINGLE_BYTE_TOKENS, MEDIUM,
};

/// Outcome of one scan call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    /// More bytes are needed
    Incomplete,
    /// A whole frame ends at this offset
    Complete(usize),
    /// The bytes can never form a frame; a full decode reports why
    Invalid,
}

/// Next grammar item the scanner expects
#[derive(Debug, Clone, Copy)]
enum Expect {
    Node,
    Tag,
    AttrCount,
    Pairs(usize),
    Key,
    Value,
    Content,
    Children,
    End,
}

#[derive(Debug, Clone)]
pub(crate) struct FrameScanner {
    pos: usize,
    depth: usize,
    stack: Vec<Expect>,
    steps: usize,
}

impl FrameScanner {
    pub(crate) fn new() -> Self {
        Self {
            pos: 0,
            depth: 0,
            stack: vec![Expect::Node],
            steps: 0,
        }
    }

    /// Forget progress; the next scan starts at offset 0
    pub(crate) fn reset(&mut self) {
        self.pos = 0;
        self.depth = 0;
        self.stack.clear();
        self.stack.push(Expect::Node);
    }

    /// Grammar steps attempted since creation, including ones that stopped
    /// for lack of input
    #[cfg(test)]
    pub(crate) fn steps(&self) -> usize {
        self.steps
    }

    /// Continue from the saved position over `buf`, which must extend the
    /// buffer seen by earlier calls.
    pub(crate) fn scan(&mut self, buf: &[u8], max_depth: usize) -> Scan {
        if buf.len() < self.pos {
            self.reset();
        }
        while !self.stack.is_empty() {
            if let Err(outcome) = self.step(buf, max_depth) {
                return outcome;
            }
        }
        Scan::Complete(self.pos)
    }

    fn step(&mut self, buf: &[u8], max_depth: usize) -> Result<(), Scan> {
        let Some(&expect) = self.stack.last() else {
            return Ok(());
        };
        let byte = *buf.get(self.pos).ok_or(Scan::Incomplete)?;
        self.steps += 1;

        match expect {
            Expect::Node => {
                if byte != LIST_START || self.depth >= max_depth {
                    return Err(Scan::Invalid);
                }
                self.consume(
                    buf,
                    1,
                    &[Expect::End, Expect::Content, Expect::AttrCount, Expect::Tag],
                )?;
                self.depth += 1;
            }
            Expect::Tag => {
                let len = match byte {
                    DOUBLE_BYTE => 2,
                    LITERAL => 1 + unit_len(buf, self.pos + 1)?,
                    code if (code as usize) < MAX_SINGLE_BYTE_TOKENS => 1,
                    _ => return Err(Scan::Invalid),
                };
                self.consume(buf, len, &[])?;
            }
            Expect::AttrCount => {
                let (prefix, count) = length(buf, self.pos)?;
                self.consume(buf, prefix, &[Expect::Pairs(count)])?;
            }
            Expect::Pairs(0) => self.consume(buf, 0, &[])?,
            Expect::Pairs(n) => {
                self.consume(buf, 0, &[Expect::Pairs(n - 1), Expect::Value, Expect::Key])?
            }
            Expect::Key => self.consume(buf, unit_len(buf, self.pos)?, &[])?,
            Expect::Value => {
                let len = if byte == BINARY {
                    1 + unit_len(buf, self.pos + 1)?
                } else {
                    unit_len(buf, self.pos)?
                };
                self.consume(buf, len, &[])?;
            }
            Expect::Content => match byte {
                LIST_START => self.consume(buf, 0, &[Expect::Children])?,
                LIST_EMPTY => self.consume(buf, 1, &[])?,
                LIST_END => self.consume(buf, 0, &[])?,
                BINARY => self.consume(buf, 1 + unit_len(buf, self.pos + 1)?, &[])?,
                _ => self.consume(buf, unit_len(buf, self.pos)?, &[])?,
            },
            Expect::Children => {
                if byte == LIST_START {
                    self.stack.push(Expect::Node);
                } else {
                    self.consume(buf, 0, &[])?;
                }
            }
            Expect::End => {
                if byte != LIST_END {
                    return Err(Scan::Invalid);
                }
                self.consume(buf, 1, &[])?;
                self.depth -= 1;
            }
        }
        Ok(())
    }

    /// Advance over `len` bytes and replace the current item with `then`
    /// (last entry on top). Nothing changes unless all `len` bytes are there.
    fn consume(&mut self, buf: &[u8], len: usize, then: &[Expect]) -> Result<(), Scan> {
        let end = self.pos.checked_add(len).ok_or(Scan::Invalid)?;
        if end > buf.len() {
            return Err(Scan::Incomplete);
        }
        self.pos = end;
        self.stack.pop();
        self.stack.extend_from_slice(then);
        Ok(())
    }
}

/// Prefix width and value of the length at `at`
fn length(buf: &[u8], at: usize) -> Result<(usize, usize), Scan> {
    match *buf.get(at).ok_or(Scan::Incomplete)? {
        MEDIUM => {
            let raw = buf.get(at + 1..at + 3).ok_or(Scan::Incomplete)?;
            Ok((3, u16::from_be_bytes([raw[0], raw[1]]) as usize))
        }
        LARGE => {
            let raw = buf.get(at + 1..at + 5).ok_or(Scan::Incomplete)?;
            Ok((5, u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize))
        }
        byte if is_reserved(byte) => Err(Scan::Invalid),
        byte => Ok((1, byte as usize)),
    }
}

/// Total width of the length-prefixed value at `at`
fn unit_len(buf: &[u8], at: usize) -> Result<usize, Scan> {
    let (prefix, len) = length(buf, at)?;
    prefix.checked_add(len).ok_or(Scan::Invalid)
}
