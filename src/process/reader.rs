// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::config::OutputLine;

/// Spawns a reader thread over `stream` that emits one callback per newline-terminated
/// line, plus a final callback for any trailing partial line. Used for both stdout and
/// stderr; `is_stderr` tags which stream a given line came from.
pub fn spawn_line_reader<R: Read + Send + 'static>(
    stream: R,
    is_stderr: bool,
    on_output: Option<Arc<dyn Fn(OutputLine) + Send + Sync>>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = String::new();
        loop {
            buf.clear();
            match reader.read_line(&mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let trimmed = buf.strip_suffix('\n').unwrap_or(&buf);
                    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
                    if let Some(cb) = &on_output {
                        cb(OutputLine {
                            line: trimmed.to_string(),
                            is_stderr,
                        });
                    }
                }
                Err(_) => break,
            }
        }
    })
}
