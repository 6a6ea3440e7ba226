use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};

use sushigo::{ClientCommand, ServerEvent};
use tracing::{info, trace};

use crate::error::SessionError;

/// A blocking line-oriented connection to the game server.
pub struct Connection {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    // A re-usable buffer for IO.
    // Should always be empty before and after recv().
    buf: String,
}

impl Connection {
    pub fn connect(host: &str, port: u16) -> anyhow::Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        let reader = BufReader::new(stream.try_clone()?);
        info!(host, port, "Connected");
        Ok(Self {
            stream,
            reader,
            buf: String::new(),
        })
    }

    pub fn send(&mut self, command: &ClientCommand) -> anyhow::Result<()> {
        let mut line = command.to_string();
        trace!(name: "Sending command", command = %line);
        line.push('\n');
        self.stream.write_all(line.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }

    /// Blocks until the next line arrives and decodes it. EOF is fatal.
    pub fn recv(&mut self) -> anyhow::Result<ServerEvent> {
        self.buf.clear();
        let num_bytes_read = self.reader.read_line(&mut self.buf)?;
        if num_bytes_read == 0 {
            return Err(SessionError::ConnectionClosed.into());
        }
        let line = self.buf.trim_end();
        trace!(name: "Received line", line = %line);
        Ok(ServerEvent::parse(line))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Release the connection on any exit path, including panics and
        // interrupt-driven unwinds.
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
