//! Function argument splitting
//!
//! Function arguments are not tokenized. The raw text between a call's
//! parentheses is cut into top-level, comma-separated pieces, and every piece
//! is later evaluated as a formula of its own. Both scans skip over
//! single-quoted literals and nested parentheses. Double quotes are plain
//! characters here, so `len("a,b")` has two arguments.

/// Byte index of the `)` matching an already consumed `(`
///
/// `start` is the index just past the opening parenthesis.
pub fn find_closing_paren(text: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut quoted = false;

    for (index, c) in text.get(start..)?.char_indices() {
        match (quoted, c) {
            (_, '\'') => quoted = !quoted,
            (false, '(') => depth += 1,
            (false, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split the interior of a call on top-level commas
///
/// Pieces are trimmed. An empty interior yields no arguments.
pub fn split_arguments(inner: &str) -> Vec<String> {
    let inner = inner.trim();
    if inner.is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut quoted = false;
    let mut piece_start = 0;

    for (index, c) in inner.char_indices() {
        match (quoted, c) {
            (_, '\'') => quoted = !quoted,
            (false, '(') => depth += 1,
            (false, ')') => depth -= 1,
            (false, ',') if depth == 0 => {
                args.push(inner[piece_start..index].trim().to_string());
                piece_start = index + 1;
            }
            _ => {}
        }
    }
    args.push(inner[piece_start..].trim().to_string());
    args
}

/// Split the arguments of a call whose `(` ends just before `cursor`
///
/// Returns the arguments and the index just past the matching `)`, or `None`
/// when the parenthesis is never closed.
pub fn split_parameters(text: &str, cursor: usize) -> Option<(Vec<String>, usize)> {
    let close = find_closing_paren(text, cursor)?;
    Some((split_arguments(&text[cursor..close]), close + 1))
}
