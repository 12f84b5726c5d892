/// Removes SGR colour and cursor-column escapes (`ESC [ params m|G`) from programmer output.
pub fn strip(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("\x1b[") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let params_len = tail
            .find(|c: char| !(c.is_ascii_digit() || c == ';'))
            .unwrap_or(tail.len());
        match tail[params_len..].chars().next() {
            Some('m') | Some('G') => rest = &tail[params_len + 1..],
            _ => {
                out.push('\x1b');
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
