use crate::domain::certificate::Certificate;
use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^=+$").expect("separator pattern"));
static BLOCK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+-+$").expect("block marker pattern"));
static FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s+:\s+(.*?)\s*$").expect("field pattern"));
static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{3,}(.*?)\s*$").expect("continuation pattern"));

enum State {
    /// Between blocks; field lines are ignored.
    Outside,
    /// Inside a `N-------` block, optionally after a field line.
    Block {
        certificate: Certificate,
        key: Option<String>,
    },
}

/// Parses a certificate store listing into one record per block.
///
/// A block opens with a `N-------` marker and is emitted when the next
/// `=====` separator line is reached. `Key : Value` lines set a field;
/// lines indented by three or more spaces append to the last field.
/// Anything else is skipped.
pub fn read_certificates(output: &str) -> Vec<Certificate> {
    let mut certificates = Vec::new();
    let mut state = State::Outside;

    for line in output.lines() {
        if SEPARATOR.is_match(line) {
            if let State::Block { certificate, .. } = std::mem::replace(&mut state, State::Outside)
            {
                certificates.push(certificate);
            }
        } else if BLOCK_MARKER.is_match(line) {
            state = State::Block {
                certificate: Certificate::new(),
                key: None,
            };
        } else if let State::Block { certificate, key } = &mut state {
            if let Some(field) = FIELD.captures(line) {
                let name = field[1].to_string();
                certificate.set(name.clone(), &field[2]);
                *key = Some(name);
            } else if let Some(name) = key.as_deref()
                && let Some(continuation) = CONTINUATION.captures(line)
            {
                certificate.append(name, &continuation[1]);
            }
        }
    }

    certificates
}
