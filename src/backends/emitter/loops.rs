//! Loop shape recognition
//!
//! The generator lowers both loop forms to the same skeleton:
//!
//! ```text
//! Ls:
//! <condition temps>
//! if <cond> goto Lb
//! goto Le
//! Lb:
//! <body>
//! goto Ls
//! Le:
//! ```
//!
//! A for-each loop additionally has `t = iterator(X)` right before `Ls`,
//! tests `has_next(t)` and opens its body with `var = next(t)`. The body end
//! is the first `goto Ls` immediately followed by `Le:`, so nested loops
//! (which jump to their own labels) stay inside the span.

use crate::middle::ir::{Expr, Instruction};
use std::ops::Range;

/// A recognised for-each loop starting at the iterator assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ForLoop<'a> {
    pub var: &'a str,
    pub iterable: &'a str,
    /// Statements after the `next` binding, up to the back edge
    pub body: Range<usize>,
    /// First instruction after the end label
    pub resume: usize,
}

/// A recognised while loop starting at its header label
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct WhileLoop<'a> {
    pub cond: &'a Expr,
    pub body: Range<usize>,
    pub resume: usize,
}

pub(super) fn match_for(
    code: &[Instruction],
    at: usize,
) -> Option<ForLoop<'_>> {
    let (handle, iterable) = code.get(at)?.iterator_source()?;
    let start = code.get(at + 1)?.label()?;

    let body_label = match code.get(at + 2)? {
        Instruction::IfGoto {
            cond: Expr::HasNext(h),
            target,
        } if h == handle => target.as_str(),
        _ => return None,
    };
    let end = match code.get(at + 3)? {
        Instruction::Goto(target) => target.as_str(),
        _ => return None,
    };
    if code.get(at + 4)?.label()? != body_label {
        return None;
    }
    let var = match code.get(at + 5)? {
        Instruction::Declare {
            name,
            value: Expr::Next(h),
            ..
        }
        | Instruction::Assign {
            name,
            value: Expr::Next(h),
        } if h == handle => name.as_str(),
        _ => return None,
    };

    let back_edge = find_back_edge(code, at + 6, code.len(), start, end)?;
    Some(ForLoop {
        var,
        iterable,
        body: at + 6..back_edge,
        resume: back_edge + 2,
    })
}

pub(super) fn match_while(
    code: &[Instruction],
    at: usize,
    lookahead: usize,
) -> Option<WhileLoop<'_>> {
    let start = code.get(at)?.label()?;

    // condition temps sit between the header and the test
    let mut test = at + 1;
    while matches!(code.get(test)?, Instruction::TempAssign { .. }) {
        test += 1;
    }
    let (cond, body_label) = match &code[test] {
        Instruction::IfGoto { cond, target } if !matches!(cond, Expr::HasNext(_)) => {
            (cond, target.as_str())
        }
        _ => return None,
    };
    let end = match code.get(test + 1)? {
        Instruction::Goto(target) => target.as_str(),
        _ => return None,
    };
    if code.get(test + 2)?.label()? != body_label {
        return None;
    }

    let limit = code.len().min(at.saturating_add(lookahead));
    let back_edge = find_back_edge(code, test + 3, limit, start, end)?;
    Some(WhileLoop {
        cond,
        body: test + 3..back_edge,
        resume: back_edge + 2,
    })
}

/// Index of the first `goto start` directly followed by `end:`
fn find_back_edge(
    code: &[Instruction],
    from: usize,
    limit: usize,
    start: &str,
    end: &str,
) -> Option<usize> {
    (from..limit).find(|&i| {
        matches!(&code[i], Instruction::Goto(target) if target == start)
            && code.get(i + 1).and_then(Instruction::label) == Some(end)
    })
}
