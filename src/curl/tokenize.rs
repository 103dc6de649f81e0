use crate::error::CurlError;

/// Splits a shell-style command line into words.
///
/// Handles single quotes (literal), double quotes (with `\"`, `\\`, `\$`,
/// and `` \` `` escapes), backslash escapes outside quotes, and
/// backslash-newline continuations. Adjacent quoted and bare pieces join
/// into one word.
pub(super) fn tokenize(input: &str) -> Result<Vec<String>, CurlError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err(CurlError::UnterminatedQuote { quote: '\'' }),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped @ ('"' | '\\' | '$' | '`')) => current.push(escaped),
                            Some('\n') => {}
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => return Err(CurlError::UnterminatedQuote { quote: '"' }),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err(CurlError::UnterminatedQuote { quote: '"' }),
                    }
                }
            }
            '\\' => match chars.next() {
                Some('\n') => {}
                Some('\r') if chars.peek() == Some(&'\n') => {
                    chars.next();
                }
                Some(escaped) => {
                    in_token = true;
                    current.push(escaped);
                }
                None => {}
            },
            whitespace if whitespace.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
