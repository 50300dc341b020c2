// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rewrites host paths out of stack traces before sandbox code or the host
//! API can observe them. Three path flavors are scrubbed: `file://` URLs,
//! Unix absolute paths and Windows drive paths. The first line of a trace
//! is the message line and is preserved intact.

const NEUTRAL_MARKER: &str = "[native code]";

/// Sanitizes a whole trace, preserving the message line.
pub(crate) fn sanitize_stack(stack: &str) -> String {
    let mut out = String::with_capacity(stack.len());
    for (i, line) in stack.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if i == 0 {
            out.push_str(line);
        } else {
            out.push_str(&sanitize_frame(line));
        }
    }
    out
}

/// Sanitizes a single frame line.
pub(crate) fn sanitize_frame(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = find_path_start(rest) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = path_end(tail);
        out.push_str(NEUTRAL_MARKER);
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

fn find_path_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut best: Option<usize> = None;
    if let Some(index) = line.find("file://") {
        best = Some(index);
    }
    for (index, window) in bytes.windows(2).enumerate() {
        // Unix absolute path: '/' followed by a path character, not preceded
        // by an alphanumeric (so protocol-relative `//` inside URLs already
        // matched above wins).
        if window[0] == b'/'
            && (window[1].is_ascii_alphanumeric() || window[1] == b'_' || window[1] == b'.')
            && (index == 0 || !bytes[index - 1].is_ascii_alphanumeric())
            && (index == 0 || bytes[index - 1] != b'/')
        {
            if best.map_or(true, |b| index < b) {
                best = Some(index);
            }
            break;
        }
    }
    // Windows drive path: `X:\`.
    for (index, window) in bytes.windows(3).enumerate() {
        if window[0].is_ascii_alphabetic()
            && window[1] == b':'
            && window[2] == b'\\'
            && (index == 0 || !bytes[index - 1].is_ascii_alphanumeric())
        {
            if best.map_or(true, |b| index < b) {
                best = Some(index);
            }
            break;
        }
    }
    best
}

/// A path runs until whitespace or a closing delimiter; a trailing
/// `:line:column` suffix is consumed with it.
fn path_end(path: &str) -> usize {
    let mut end = path.len();
    for (index, ch) in path.char_indices() {
        if ch.is_whitespace() || ch == ')' || ch == '\'' || ch == '"' {
            end = index;
            break;
        }
    }
    end.max(1)
}

#[cfg(test)]
mod tests {
    use super::{sanitize_frame, sanitize_stack};

    #[test]
    fn scrubs_file_urls() {
        assert_eq!(
            sanitize_frame("    at run (file:///home/user/app.js:10:3)"),
            "    at run ([native code])"
        );
    }

    #[test]
    fn scrubs_unix_paths() {
        assert_eq!(
            sanitize_frame("    at /usr/lib/node/internal.js:1:1"),
            "    at [native code]"
        );
    }

    #[test]
    fn scrubs_windows_paths() {
        assert_eq!(
            sanitize_frame("    at C:\\Users\\dev\\app.js:4:2"),
            "    at [native code]"
        );
    }

    #[test]
    fn preserves_message_line() {
        let stack = "TypeError: nope\n    at /srv/app.js:1:1";
        assert_eq!(
            sanitize_stack(stack),
            "TypeError: nope\n    at [native code]"
        );
    }
}
