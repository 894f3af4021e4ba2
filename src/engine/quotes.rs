//! Quote stripping for risk-keyword matching
//!
//! Removes every single- or double-quoted run from a command so that words
//! which are only printed or passed as literal arguments do not trigger risk
//! warnings. Inside a run a backslash escapes the following character. A run
//! never crosses a line break, and an opening quote with no closing quote on
//! the same line is left in place.

/// Remove quoted substrings (including the quotes themselves)
pub fn strip_quoted(command: &str) -> String {
    let chars: Vec<char> = command.chars().collect();
    let mut out = String::with_capacity(command.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            if let Some(end) = closing_quote(&chars, i) {
                i = end + 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Index of the quote closing the run opened at `start`, if any
fn closing_quote(chars: &[char], start: usize) -> Option<usize> {
    let quote = chars[start];
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            '\n' | '\r' => return None,
            '\\' => {
                // An escape needs something on the same line to consume.
                match chars.get(i + 1) {
                    Some('\n') | Some('\r') | None => return None,
                    Some(_) => i += 2,
                }
            }
            c if c == quote => return Some(i),
            _ => i += 1,
        }
    }

    None
}
