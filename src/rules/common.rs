//! Shared position arithmetic for token rules.

use crate::linter::Problem;
use crate::stream::TokenView;

/// Check the run of spaces between the current token and the next one. Only
/// applies when both sit on the same physical line; `-1` disables a bound.
pub(crate) fn spaces_after(
    view: &TokenView<'_>,
    min: i64,
    max: i64,
    min_desc: &str,
    max_desc: &str,
) -> Option<Problem> {
    let next = view.next?;
    if view.curr.end.line != next.start.line {
        return None;
    }
    let spaces = (next.start.index - view.curr.end.index) as i64;
    if max != -1 && spaces > max {
        Some(Problem::new(
            view.curr.start.line,
            next.start.column,
            max_desc,
        ))
    } else if min != -1 && spaces < min {
        Some(Problem::new(
            view.curr.start.line,
            next.start.column + 1,
            min_desc,
        ))
    } else {
        None
    }
}

/// Check the run of spaces between the previous token and the current one.
/// A current token that starts its line has no space run before it.
pub(crate) fn spaces_before(
    view: &TokenView<'_>,
    min: i64,
    max: i64,
    min_desc: &str,
    max_desc: &str,
) -> Option<Problem> {
    let prev = view.prev?;
    if prev.end.line != view.curr.start.line {
        return None;
    }
    // The previous token may end exactly at a line break (block scalars do);
    // the current token then opens the line.
    if prev.end.index > 0 && view.buffer.as_bytes()[prev.end.index - 1] == b'\n' {
        return None;
    }
    let spaces = (view.curr.start.index - prev.end.index) as i64;
    if max != -1 && spaces > max {
        Some(Problem::new(
            view.curr.start.line,
            view.curr.start.column,
            max_desc,
        ))
    } else if min != -1 && spaces < min {
        Some(Problem::new(
            view.curr.start.line,
            view.curr.start.column + 1,
            min_desc,
        ))
    } else {
        None
    }
}

/// Whether a key token is the explicit `?` form.
pub(crate) fn is_explicit_key(view: &TokenView<'_>) -> bool {
    let token = view.curr;
    token.start.index < token.end.index
        && view.buffer.as_bytes().get(token.start.index) == Some(&b'?')
}
