//! Variable interpolation syntax.
//!
//! Interpolative fields may reference variables as `@name@`. A literal `@` or
//! `\` is written as `\@` or `\\`. Substitution itself happens at execution
//! time; this module only parses the syntax so malformed references can be
//! rejected when a specification is validated.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("Unterminated variable starting at position {0}")]
    Unterminated(usize),

    #[error("Empty variable name at position {0}")]
    EmptyName(usize),

    #[error("Dangling escape character at end of input")]
    DanglingEscape,
}

/// A piece of an interpolative string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text with escapes already resolved.
    Literal(String),
    /// Variable reference, without the surrounding `@`.
    Variable(&'a str),
}

/// Split `input` into literal and variable segments.
pub fn parse(input: &str) -> Result<Vec<Segment<'_>>, InterpolationError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = input.char_indices();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped @ ('@' | '\\'))) => literal.push(escaped),
                Some((_, other)) => {
                    literal.push('\\');
                    literal.push(other);
                }
                None => return Err(InterpolationError::DanglingEscape),
            },
            '@' => {
                let start = pos + 1;
                let end = input[start..]
                    .find(['@', '\n'])
                    .map(|offset| start + offset)
                    .filter(|&end| input[end..].starts_with('@'))
                    .ok_or(InterpolationError::Unterminated(pos))?;
                let name = &input[start..end];
                if name.trim().is_empty() {
                    return Err(InterpolationError::EmptyName(pos));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
                // Skip the variable body and closing '@'.
                for _ in input[start..=end].chars() {
                    chars.next();
                }
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Names of all variables referenced by `input`, in order of appearance.
pub fn variables(input: &str) -> Result<Vec<&str>, InterpolationError> {
    Ok(parse(input)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Whether `input` references at least one variable.
///
/// Malformed input counts as interpolated so that callers skip literal-only
/// checks and leave the syntax error to [`parse`].
pub fn has_variables(input: &str) -> bool {
    match variables(input) {
        Ok(vars) => !vars.is_empty(),
        Err(_) => true,
    }
}
