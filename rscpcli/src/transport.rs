//! TCP connection to the device

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::Context;
use log::debug;

/// TCP stream whose read timeouts always surface as [io::ErrorKind::TimedOut]
///
/// Depending on the platform an expired `SO_RCVTIMEO` is reported as
/// `WouldBlock` instead.
#[derive(Debug)]
pub struct DeviceStream(TcpStream);

impl DeviceStream {
    pub fn connect(host: &str, port: u16, timeout: Duration) -> anyhow::Result<DeviceStream> {
        let addr = (host, port)
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve {host}:{port}"))?
            .next()
            .with_context(|| format!("No address found for {host}"))?;
        debug!("Connecting to {addr}");
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .with_context(|| format!("Failed to connect to {addr}"))?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        Ok(DeviceStream(stream))
    }

    pub fn shutdown(&self) -> io::Result<()> {
        self.0.shutdown(Shutdown::Both)
    }
}

fn normalize_timeout(err: io::Error) -> io::Error {
    if err.kind() == io::ErrorKind::WouldBlock {
        io::Error::new(io::ErrorKind::TimedOut, err)
    } else {
        err
    }
}

impl Read for DeviceStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(normalize_timeout)
    }
}

impl Write for DeviceStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf).map_err(normalize_timeout)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_read_timeout_is_timed_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut stream =
            DeviceStream::connect("127.0.0.1", port, Duration::from_millis(50)).unwrap();
        let (mut peer, _) = listener.accept().unwrap();

        let mut buf = [0u8; 8];
        let err = stream.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        peer.write_all(b"e3dc").unwrap();
        assert_eq!(stream.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"e3dc");
        stream.shutdown().unwrap();
    }

    #[test]
    fn test_would_block_is_mapped() {
        let err = normalize_timeout(io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        let err = normalize_timeout(io::Error::from(io::ErrorKind::ConnectionReset));
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
