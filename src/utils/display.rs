/// Make an untrusted on-chain string safe to print on a terminal.
///
/// Control characters are dropped, which also disarms ANSI escape sequences
/// (their ESC byte goes, the remainder prints as plain text). Newlines and
/// tabs become spaces so one entry stays on one line.
pub fn sanitize_for_display(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            // bidi overrides can reorder what the reader sees
            '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' => None,
            c => Some(c),
        })
        .collect()
}
