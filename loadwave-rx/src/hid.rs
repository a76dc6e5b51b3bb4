//! Linux `hiddev` feature-report interrogation.
//!
//! The kernel's hiddev ioctls aren't exposed by the `libc` crate (they're
//! driver-specific, not POSIX), so this models the handful of structs and
//! request codes from `linux/hiddev.h` directly and drives them with raw
//! `libc::ioctl` calls — the same "no binding crate exists, so talk to
//! the kernel directly behind `unsafe`" pattern this workspace's transmitter
//! uses for scheduler/affinity syscalls.

use std::io;

/// A source of the load-telemetry usage value. Abstracted so the sampler
/// can be exercised against a mock (scenario S6) without a real hiddev
/// node.
pub trait UsageSource: Send {
    /// Re-fetches the feature report and returns the current usage value.
    fn read_value(&mut self) -> io::Result<i32>;
}

/// Fixed-value mock used for scenario S6 and unit tests.
pub struct MockUsageSource {
    pub value: i32,
}

impl UsageSource for MockUsageSource {
    fn read_value(&mut self) -> io::Result<i32> {
        Ok(self.value)
    }
}

#[cfg(target_os = "linux")]
pub use linux::LinuxHidDevice;

#[cfg(target_os = "linux")]
mod linux {
    use super::UsageSource;
    use std::io;
    use std::os::unix::io::AsRawFd;

    use log::debug;

    const HID_REPORT_TYPE_FEATURE: u32 = 3;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, Default)]
    struct HiddevReportInfo {
        report_type: u32,
        report_id: u32,
        num_fields: u32,
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, Default)]
    struct HiddevUsageRef {
        report_type: u32,
        report_id: u32,
        field_index: u32,
        usage_index: u32,
        usage_code: u32,
        value: i32,
    }

    const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> libc::c_ulong {
        ((dir as libc::c_ulong) << 30)
            | ((ty as libc::c_ulong) << 8)
            | (nr as libc::c_ulong)
            | ((size as libc::c_ulong) << 16)
    }

    const IOC_WRITE: u32 = 1;
    const IOC_READ: u32 = 2;
    const HIDDEV_TYPE: u8 = b'H';

    fn hidiocgreportinfo() -> libc::c_ulong {
        ioc(
            IOC_READ | IOC_WRITE,
            HIDDEV_TYPE,
            0x09,
            std::mem::size_of::<HiddevReportInfo>(),
        )
    }

    fn hidiocgreport() -> libc::c_ulong {
        ioc(IOC_WRITE, HIDDEV_TYPE, 0x07, std::mem::size_of::<HiddevReportInfo>())
    }

    fn hidiocgucode() -> libc::c_ulong {
        ioc(
            IOC_READ | IOC_WRITE,
            HIDDEV_TYPE,
            0x0E,
            std::mem::size_of::<HiddevUsageRef>(),
        )
    }

    fn hidiocgusage() -> libc::c_ulong {
        ioc(
            IOC_READ | IOC_WRITE,
            HIDDEV_TYPE,
            0x0C,
            std::mem::size_of::<HiddevUsageRef>(),
        )
    }

    /// Talks to a real `/dev/usb/hiddevN` node: report_type=feature,
    /// report_id=44, field_index=0, usage_index=0 (spec.md §4.4).
    pub struct LinuxHidDevice {
        fd: std::fs::File,
        rinfo: HiddevReportInfo,
        uref: HiddevUsageRef,
    }

    impl LinuxHidDevice {
        pub fn open(path: &str, report_id: u32) -> io::Result<Self> {
            let fd = std::fs::OpenOptions::new().read(true).write(true).open(path)?;
            let raw_fd = fd.as_raw_fd();

            let mut rinfo = HiddevReportInfo {
                report_type: HID_REPORT_TYPE_FEATURE,
                report_id,
                num_fields: 0,
            };
            ioctl_checked(raw_fd, hidiocgreportinfo(), &mut rinfo, "HIDIOCGREPORTINFO")?;
            ioctl_checked(raw_fd, hidiocgreport(), &mut rinfo, "HIDIOCGREPORT")?;

            let mut uref = HiddevUsageRef {
                report_type: HID_REPORT_TYPE_FEATURE,
                report_id,
                field_index: 0,
                usage_index: 0,
                usage_code: 0,
                value: 0,
            };
            ioctl_checked(raw_fd, hidiocgucode(), &mut uref, "HIDIOCGUCODE")?;
            ioctl_checked(raw_fd, hidiocgusage(), &mut uref, "HIDIOCGUSAGE")?;

            debug!("resolved hiddev usage_code=0x{:08x}", uref.usage_code);

            Ok(Self { fd, rinfo, uref })
        }
    }

    impl UsageSource for LinuxHidDevice {
        fn read_value(&mut self) -> io::Result<i32> {
            let raw_fd = self.fd.as_raw_fd();
            ioctl_checked(raw_fd, hidiocgreport(), &mut self.rinfo, "HIDIOCGREPORT")?;
            ioctl_checked(raw_fd, hidiocgusage(), &mut self.uref, "HIDIOCGUSAGE")?;
            Ok(self.uref.value)
        }
    }

    fn ioctl_checked<T>(fd: i32, request: libc::c_ulong, arg: &mut T, name: &str) -> io::Result<()> {
        let ret = unsafe { libc::ioctl(fd, request as _, arg as *mut T) };
        if ret < 0 {
            return Err(io::Error::new(
                io::Error::last_os_error().kind(),
                format!("ioctl({name}) failed: {}", io::Error::last_os_error()),
            ));
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_usage_source_returns_fixed_value() {
        let mut mock = MockUsageSource { value: 345 };
        assert_eq!(mock.read_value().unwrap(), 345);
        assert_eq!(mock.read_value().unwrap(), 345);
    }
}
