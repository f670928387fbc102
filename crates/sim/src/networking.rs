use std::io::{self, BufRead, Write};

use flotilla_shared::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed frame on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode commands: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Transport between the game engine and the bot.
pub trait Networking {
    /// Next turn's world, or `None` once the game is over.
    fn receive_snapshot(&mut self) -> Result<Option<WorldSnapshot>, NetError>;

    fn send_commands(&mut self, commands: &[Command]) -> Result<(), NetError>;
}

/// One JSON `WorldFrame` per input line, one JSON command array per output line.
pub struct JsonLinesNetworking<R, W> {
    reader: R,
    writer: W,
    line: usize,
    buf: String,
}

impl<R: BufRead, W: Write> JsonLinesNetworking<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: 0,
            buf: String::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Networking for JsonLinesNetworking<R, W> {
    fn receive_snapshot(&mut self) -> Result<Option<WorldSnapshot>, NetError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            let frame: WorldFrame = serde_json::from_str(text).map_err(|source| NetError::Decode {
                line: self.line,
                source,
            })?;
            return Ok(Some(WorldSnapshot::new(frame)));
        }
    }

    fn send_commands(&mut self, commands: &[Command]) -> Result<(), NetError> {
        serde_json::to_writer(&mut self.writer, commands).map_err(NetError::Encode)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
