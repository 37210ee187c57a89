//! Line-buffered output streaming with an internal per-line length bound
//! (spec §4.D: "captures stdout and stderr line-by-line... lines exceeding
//! an internal bound (e.g. 64 KiB) are split at the bound").
//!
//! Grounded on `cuenv-core`'s `tasks/executor.rs`, which streams output via
//! `BufReader::lines()` per child stream; that approach has no length bound,
//! so this module reads raw chunks and does the line-splitting (and bound
//! enforcement) itself.

use tokio::io::AsyncReadExt;

use crate::output::{OutputLine, OutputSender, MAX_LINE_BYTES};

const READ_CHUNK: usize = 8 * 1024;

/// Reads `reader` to EOF, emitting one [`OutputLine`] per completed line (or
/// per `MAX_LINE_BYTES`-sized chunk of an overlong line) to `sink`.
pub async fn stream<R>(mut reader: R, task_name: String, is_stderr: bool, sink: OutputSender)
where
    R: AsyncReadExt + Unpin,
{
    let mut acc: Vec<u8> = Vec::new();
    let mut continued = false;
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(error) => {
                tracing::debug!(task = %task_name, %error, "output stream ended with an error");
                break;
            }
        };

        let mut start = 0;
        for i in 0..n {
            if buf[i] == b'\n' {
                acc.extend_from_slice(&buf[start..i]);
                emit(&sink, &task_name, is_stderr, &acc, continued);
                acc.clear();
                continued = false;
                start = i + 1;
            }
        }
        acc.extend_from_slice(&buf[start..n]);

        while acc.len() >= MAX_LINE_BYTES {
            let rest = acc.split_off(MAX_LINE_BYTES);
            emit(&sink, &task_name, is_stderr, &acc, continued);
            acc = rest;
            continued = true;
        }
    }

    if !acc.is_empty() {
        emit(&sink, &task_name, is_stderr, &acc, continued);
    }
}

fn emit(sink: &OutputSender, task_name: &str, is_stderr: bool, bytes: &[u8], continued: bool) {
    let content = String::from_utf8_lossy(bytes).into_owned();
    let _ = sink.send(OutputLine {
        task_name: task_name.to_string(),
        is_stderr,
        content,
        continued,
    });
}
