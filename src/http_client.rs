//! Shared HTTP agent and bounded response reading.

use std::io::{self, Read};
use std::sync::OnceLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Listing and stats bodies stay far below this.
pub(crate) const MAX_JSON_BYTES: usize = 32 * 1024 * 1024;
pub(crate) const MAX_IMAGE_BYTES: usize = 128 * 1024 * 1024;

/// Return a shared HTTP agent with consistent timeouts.
pub(crate) fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .build()
    })
}

/// Read a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, io::Error> {
    check_content_length(&response, max_bytes)?;
    let reader = response.into_reader();
    let mut limited = reader.take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

fn check_content_length(response: &ureq::Response, max_bytes: usize) -> Result<(), io::Error> {
    let Some(length) = response.header("Content-Length") else {
        return Ok(());
    };
    let Ok(length) = length.parse::<u64>() else {
        return Ok(());
    };
    if length > max_bytes as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {length} bytes"),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_server {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one canned response; the raw request line is sent back on the channel.
    pub(crate) fn serve_once(response: String) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let read = stream.read(&mut buf).unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..read]).to_string();
                let first_line = request.lines().next().unwrap_or_default().to_string();
                let _ = tx.send(first_line);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{addr}/api/"), rx)
    }

    pub(crate) fn json_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::serve_once;
    use super::*;

    #[test]
    fn read_response_bytes_rejects_content_length_over_max() {
        let response = concat!("HTTP/1.1 200 OK\r\n", "Content-Length: 100\r\n", "\r\n", "ok")
            .to_string();
        let (url, _requests) = serve_once(response);
        let response = agent().get(&url).call().unwrap();
        let err = read_response_bytes(response, 10).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn read_response_bytes_accepts_under_limit() {
        let body = "hello";
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (url, _requests) = serve_once(response);
        let response = agent().get(&url).call().unwrap();
        let bytes = read_response_bytes(response, 16).unwrap();
        assert_eq!(bytes, body.as_bytes());
    }
}
