//! Pointing-device input from the Linux event interface.

use quadmouse_pacer::{Axis, MouseEvent};
use std::time::Duration;

const EV_KEY: u16 = 0x01;
const EV_REL: u16 = 0x02;
const REL_X: u16 = 0x00;
const REL_Y: u16 = 0x01;
const BTN_LEFT: u16 = 0x110;

/// Decode one raw input event.
///
/// Only relative X/Y motion and the left button are kept. Key autorepeat (value 2)
/// and every other event class decode to `None`.
pub fn decode_raw(event_type: u16, code: u16, value: i32) -> Option<MouseEvent> {
    match (event_type, code) {
        (EV_REL, REL_X) => Some(MouseEvent::motion(Axis::X, value)),
        (EV_REL, REL_Y) => Some(MouseEvent::motion(Axis::Y, value)),
        (EV_KEY, BTN_LEFT) => match value {
            0 => Some(MouseEvent::button(false)),
            1 => Some(MouseEvent::button(true)),
            _ => None,
        },
        _ => None,
    }
}

/// Whether a device name looks like a pointing device.
pub fn is_pointer_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("mouse") || name.contains("pointer")
}

/// Convert a readiness timeout to whole milliseconds for `poll(2)`.
///
/// Sub-millisecond waits round up so a non-zero timeout never degrades into a
/// non-blocking check.
pub fn poll_millis(timeout: Duration) -> u16 {
    u16::try_from(timeout.as_micros().div_ceil(1000)).unwrap_or(u16::MAX)
}

#[cfg(target_os = "linux")]
pub use linux::EvdevSource;

#[cfg(target_os = "linux")]
mod linux {
    use super::{decode_raw, is_pointer_name, poll_millis};
    use crate::error::BridgeError;
    use evdev::Device;
    use nix::errno::Errno;
    use nix::fcntl::{FcntlArg, OFlag, fcntl};
    use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
    use quadmouse_pacer::{EventSource, MouseEvent, PacerError, PacerResult};
    use std::io;
    use std::os::fd::AsFd;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tracing::{debug, info, warn};

    /// Exclusive, non-blocking reader for one event device.
    ///
    /// The grab is released by [`EventSource::release`] and again on drop.
    pub struct EvdevSource {
        device: Device,
        path: PathBuf,
        name: String,
        grabbed: bool,
    }

    impl EvdevSource {
        /// Find the first pointing device, ordered by device path.
        pub fn discover() -> Result<(PathBuf, String), BridgeError> {
            let mut candidates: Vec<(PathBuf, String)> = evdev::enumerate()
                .filter_map(|(path, device)| {
                    let name = device.name().unwrap_or_default().to_string();
                    is_pointer_name(&name).then_some((path, name))
                })
                .collect();
            candidates.sort();

            for (path, name) in &candidates {
                debug!(path = %path.display(), %name, "pointing device candidate");
            }
            candidates.into_iter().next().ok_or_else(|| {
                BridgeError::DeviceNotFound("no mouse or pointer device".into())
            })
        }

        /// Open `path`, optionally grab it, and switch it to non-blocking reads.
        pub fn open(path: &Path, grab: bool) -> Result<Self, BridgeError> {
            let mut device = Device::open(path).map_err(|e| {
                BridgeError::DeviceNotFound(format!("{}: {e}", path.display()))
            })?;
            let name = device.name().unwrap_or_default().to_string();

            if grab {
                device.grab()?;
            }

            let flags = fcntl(device.as_fd(), FcntlArg::F_GETFL).map_err(io::Error::from)?;
            let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
            fcntl(device.as_fd(), FcntlArg::F_SETFL(flags)).map_err(io::Error::from)?;

            info!(path = %path.display(), %name, grabbed = grab, "using pointing device");
            Ok(Self {
                device,
                path: path.to_path_buf(),
                name,
                grabbed: grab,
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        pub fn name(&self) -> &str {
            &self.name
        }

        fn ungrab(&mut self) -> io::Result<()> {
            if !self.grabbed {
                return Ok(());
            }
            self.grabbed = false;
            self.device.ungrab()
        }
    }

    fn input_error(err: io::Error) -> PacerError {
        match err.raw_os_error() {
            Some(code) if code == Errno::ENODEV as i32 => PacerError::Disconnected,
            _ => PacerError::Io(err),
        }
    }

    impl EventSource for EvdevSource {
        fn wait_ready(&mut self, timeout: Duration) -> PacerResult<bool> {
            let mut fds = [PollFd::new(self.device.as_fd(), PollFlags::POLLIN)];

            match poll(&mut fds, PollTimeout::from(poll_millis(timeout))) {
                Ok(0) => Ok(false),
                Ok(_) => {
                    let revents = fds
                        .first()
                        .and_then(PollFd::revents)
                        .unwrap_or(PollFlags::empty());
                    if revents.contains(PollFlags::POLLHUP) {
                        return Err(PacerError::Disconnected);
                    }
                    if revents.intersects(PollFlags::POLLERR | PollFlags::POLLNVAL) {
                        return Err(PacerError::input(format!(
                            "poll reported {revents:?} on {}",
                            self.path.display()
                        )));
                    }
                    Ok(revents.contains(PollFlags::POLLIN))
                }
                Err(Errno::EINTR) => Ok(false),
                Err(errno) => Err(input_error(io::Error::from(errno))),
            }
        }

        fn drain(&mut self, events: &mut Vec<MouseEvent>) -> PacerResult<usize> {
            let before = events.len();
            match self.device.fetch_events() {
                Ok(batch) => {
                    events.extend(batch.filter_map(|event| {
                        decode_raw(event.event_type().0, event.code(), event.value())
                    }));
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) => return Err(input_error(err)),
            }
            Ok(events.len() - before)
        }

        fn release(&mut self) -> PacerResult<()> {
            self.ungrab().map_err(input_error)
        }
    }

    impl Drop for EvdevSource {
        fn drop(&mut self) {
            if let Err(err) = self.ungrab() {
                warn!(error = %err, "failed to release grab on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_motion() {
        assert_eq!(
            decode_raw(EV_REL, REL_X, -7),
            Some(MouseEvent::motion(Axis::X, -7))
        );
        assert_eq!(
            decode_raw(EV_REL, REL_Y, 3),
            Some(MouseEvent::motion(Axis::Y, 3))
        );
    }

    #[test]
    fn test_decode_button() {
        assert_eq!(
            decode_raw(EV_KEY, BTN_LEFT, 1),
            Some(MouseEvent::button(true))
        );
        assert_eq!(
            decode_raw(EV_KEY, BTN_LEFT, 0),
            Some(MouseEvent::button(false))
        );
        assert_eq!(decode_raw(EV_KEY, BTN_LEFT, 2), None);
    }

    #[test]
    fn test_other_events_ignored() {
        // SYN_REPORT, REL_WHEEL, BTN_RIGHT
        assert_eq!(decode_raw(0x00, 0x00, 0), None);
        assert_eq!(decode_raw(EV_REL, 0x08, 1), None);
        assert_eq!(decode_raw(EV_KEY, 0x111, 1), None);
    }

    #[test]
    fn test_poll_timeout_rounds_up() {
        assert_eq!(poll_millis(Duration::ZERO), 0);
        assert_eq!(poll_millis(Duration::from_micros(200)), 1);
        assert_eq!(poll_millis(Duration::from_micros(1000)), 1);
        assert_eq!(poll_millis(Duration::from_micros(1001)), 2);
        assert_eq!(poll_millis(Duration::from_millis(100)), 100);
        assert_eq!(poll_millis(Duration::from_secs(3600)), u16::MAX);
    }

    #[test]
    fn test_pointer_names() {
        assert!(is_pointer_name("Logitech USB Optical Mouse"));
        assert!(is_pointer_name("PixArt HP USB Optical MOUSE"));
        assert!(is_pointer_name("ELAN Touchpad Pointer"));
        assert!(!is_pointer_name("AT Translated Set 2 keyboard"));
    }
}
