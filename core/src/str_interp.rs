//! `#{var}` interpolation for command templates. A literal `#` is written
//! `##`; plain `{...}` passes through untouched so templates stay friendly
//! to shell syntax.

use std::{borrow::Borrow, collections::HashMap, ffi::OsStr, hash::Hash};

pub type Result = std::result::Result<String, InterpError>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined variable '{0}' in command template")]
    UndefinedVar(String),

    #[error("Unclosed '#{{' in command template (at byte {0})")]
    UnclosedBrace(usize),
}

pub fn interp<K, V>(fmt: &str, variables: &HashMap<K, V>) -> Result
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    let mut res = String::with_capacity(fmt.len() * 2);
    let mut chars = fmt.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '#' {
            res.push(c);
            continue;
        }
        match chars.peek() {
            Some(&(_, '#')) => {
                chars.next();
                res.push('#');
            }
            Some(&(_, '{')) => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) => name.push(ch),
                        None => return Err(InterpError::UnclosedBrace(i)),
                    }
                }
                let Some(value) = variables.get(name.as_str()) else {
                    return Err(InterpError::UndefinedVar(name));
                };
                res += value.as_ref().to_string_lossy().as_ref();
            }
            _ => res.push('#'),
        }
    }
    Ok(res)
}
