//! Line-oriented byte stream transport.
//!
//! The stream-based puzzle keeps one connection open for the whole run. The
//! server pushes a chunk of text per round and the client answers with a single
//! newline-terminated line.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use super::executor::TransportError;

/// Default size of the per-read buffer.
pub const DEFAULT_READ_BUFFER: usize = 1024;

/// Open bidirectional connection reused across rounds.
#[derive(Debug)]
pub struct LineConnection<S> {
    stream: S,
    buffer: Vec<u8>,
}

impl LineConnection<TcpStream> {
    /// Dial a TCP endpoint.
    pub async fn connect<A: ToSocketAddrs>(
        addr: A,
        buffer_size: usize,
    ) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream, buffer_size))
    }
}

impl<S> LineConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, buffer_size: usize) -> Self {
        Self {
            stream,
            buffer: vec![0; buffer_size.max(1)],
        }
    }

    /// Perform exactly one read and return whatever the server sent.
    ///
    /// End of stream is reported as [`TransportError::Closed`].
    pub async fn read_chunk(&mut self) -> Result<Bytes, TransportError> {
        let read = self.stream.read(&mut self.buffer).await?;
        if read == 0 {
            return Err(TransportError::Closed);
        }
        Ok(Bytes::copy_from_slice(&self.buffer[..read]))
    }

    /// Write `line` followed by `\n` and flush.
    pub async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Close the write half; the read half is dropped with the connection.
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn send_line_appends_newline() {
        let (client, mut server) = duplex(64);
        let mut connection = LineConnection::new(client, 16);

        connection.send_line("x: 2").await.unwrap();
        connection.shutdown().await.unwrap();

        let mut received = String::new();
        server.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "x: 2\n");
    }

    #[tokio::test]
    async fn read_chunk_is_bounded_by_buffer() {
        let (client, mut server) = duplex(64);
        let mut connection = LineConnection::new(client, 4);

        server.write_all(b"abcdefgh").await.unwrap();
        let first = connection.read_chunk().await.unwrap();
        assert_eq!(&first[..], b"abcd");
    }

    #[tokio::test]
    async fn closed_peer_is_a_transport_error() {
        let (client, server) = duplex(64);
        drop(server);
        let mut connection = LineConnection::new(client, 16);

        let err = connection.read_chunk().await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }
}
