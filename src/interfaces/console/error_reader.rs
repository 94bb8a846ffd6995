use crate::error::SignerError;
use regex::Regex;
use std::sync::LazyLock;

static ERROR_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Error\s+number\s+(0x[0-9a-f]+)\s+\((\d+)\)\.\s*$").expect("error number pattern")
});

/// Turns the toolkit's error stream into a coded error.
///
/// The decimal code comes from an `Error number 0x.. (N).` line and the text
/// from the line right after it. Without such a line the whole stream is the
/// message and the code is `-1`.
pub fn read_error(stderr: &str) -> SignerError {
    let mut code = None;
    let mut text = None;

    for line in stderr.lines() {
        if let Some(captures) = ERROR_NUMBER.captures(line)
            && let Ok(number) = captures[2].parse::<i64>()
        {
            code = Some(number);
        } else if code.is_some() {
            text = Some(line.to_string());
            break;
        }
    }

    match code {
        Some(code) => SignerError::Toolkit {
            code,
            text: text.unwrap_or_else(|| format!("Error {code}")),
        },
        None => SignerError::uncoded(stderr.trim_end()),
    }
}
