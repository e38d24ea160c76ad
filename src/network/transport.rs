//! Deadline-bounded I/O over non-blocking streams
//!
//! Every transfer goes through [`drive`], which keeps calling a per-attempt
//! closure until the requested byte count has moved or the deadline passes.
//! The deadline is fixed when the call starts; progress never extends it.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{DhtError, IoStage, Result};

/// How long to wait between attempts on a stream that would block
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Move `total` bytes with `attempt`, retrying on would-block until `timeout`
///
/// `attempt` receives the number of bytes already moved and returns how many
/// more it moved. A zero return before completion means the peer is gone.
pub fn drive<F>(peer: &str, stage: IoStage, total: usize, timeout: Duration, mut attempt: F) -> Result<()>
where
    F: FnMut(usize) -> io::Result<usize>,
{
    let start = Instant::now();
    let deadline = start + timeout;
    let mut done = 0;

    while done < total {
        let blocked = match attempt(done) {
            Ok(0) => return Err(closed_early(peer, stage, done, total)),
            Ok(n) => {
                done += n;
                false
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => false,
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                true
            }
            Err(e) => return Err(DhtError::from_io(peer, stage, e)),
        };

        if done == total {
            break;
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(DhtError::Timeout {
                peer: peer.to_string(),
                stage,
                done,
                expected: total,
                elapsed: now - start,
            });
        }
        if blocked {
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    tracing::trace!(peer, %stage, bytes = total, elapsed = ?start.elapsed(), "transfer complete");
    Ok(())
}

/// Write all of `buf`, or fail with a typed error
pub fn send_all<W: Write>(writer: &mut W, buf: &[u8], peer: &str, timeout: Duration) -> Result<()> {
    drive(peer, IoStage::Send, buf.len(), timeout, |done| {
        writer.write(&buf[done..])
    })
}

/// Fill all of `buf`, or fail with a typed error; never returns short
pub fn recv_into<R: Read>(reader: &mut R, buf: &mut [u8], peer: &str, timeout: Duration) -> Result<()> {
    let total = buf.len();
    drive(peer, IoStage::Recv, total, timeout, |done| {
        reader.read(&mut buf[done..])
    })
}

fn closed_early(peer: &str, stage: IoStage, done: usize, expected: usize) -> DhtError {
    match stage {
        IoStage::Recv => DhtError::PeerClosed {
            peer: peer.to_string(),
            done,
            expected,
        },
        _ => DhtError::from_io(peer, stage, io::Error::from(io::ErrorKind::WriteZero)),
    }
}
