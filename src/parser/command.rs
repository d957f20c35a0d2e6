//! External parser backend run as a subprocess.
//!
//! The program gets the source on stdin and must print one JSON object on
//! stdout (the LibCST / `ast` helper scripts do exactly this).

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

use super::{CodeParser, ParserError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct CommandParser {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandParser {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        CommandParser {
            name: program.clone(),
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn io_error(&self, source: std::io::Error) -> ParserError {
        ParserError::Io {
            program: self.program.clone(),
            source,
        }
    }

    /// Poll until the child exits or the deadline passes. A child that
    /// times out, or whose status cannot be read, is killed and reaped.
    fn wait_with_deadline(&self, child: &mut Child) -> Result<i32, ParserError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status.code().unwrap_or(-1)),
                Ok(None) => {}
                Err(e) => {
                    reap(child);
                    return Err(self.io_error(e));
                }
            }
            if Instant::now() >= deadline {
                reap(child);
                return Err(ParserError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl CodeParser for CommandParser {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ParserError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Separate threads so neither side blocks on a full pipe. A child
        // that exits without reading stdin makes the write fail; that is
        // reported through its exit status instead.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_owned();
            thread::spawn(move || {
                let _ = stdin.write_all(input.as_bytes());
            })
        });
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        // On error the child is already reaped; the helper threads end once
        // its pipes close and are not joined.
        let status = self.wait_with_deadline(&mut child)?;

        if let Some(writer) = writer {
            let _ = writer.join();
        }
        let stdout = collect(stdout);
        let stderr = collect(stderr);

        if status != 0 {
            return Err(ParserError::Exit {
                program: self.program.clone(),
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&stdout).map_err(|source| ParserError::InvalidOutput {
            program: self.program.clone(),
            source,
        })
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
