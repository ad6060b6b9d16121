//! V4L2 capture device bindings
//!
//! Talks to the kernel video interface directly: open the device node,
//! negotiate a YUYV format with `VIDIOC_S_FMT`, then pull frames with
//! blocking `read()` calls. Devices must advertise `V4L2_CAP_READWRITE`.

use std::ffi::CString;
use std::io;
use std::os::raw::{c_int, c_ulong};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::frame::{yuyv_to_rgb, VideoFrame};
use crate::{CameraConfig, CameraError, FrameSource};

const V4L2_BUF_TYPE_VIDEO_CAPTURE: u32 = 1;
const V4L2_FIELD_NONE: u32 = 1;
const V4L2_CAP_VIDEO_CAPTURE: u32 = 0x0000_0001;
const V4L2_CAP_READWRITE: u32 = 0x0100_0000;

/// fourcc('Y', 'U', 'Y', 'V')
const V4L2_PIX_FMT_YUYV: u32 = u32::from_le_bytes(*b"YUYV");

// ioctl request encoding (asm-generic): dir | size | type | nr
const fn ioc(dir: c_ulong, ty: u8, nr: u8, size: usize) -> c_ulong {
    (dir << 30) | ((size as c_ulong) << 16) | ((ty as c_ulong) << 8) | nr as c_ulong
}

const IOC_READ: c_ulong = 2;
const IOC_WRITE: c_ulong = 1;

/// `VIDIOC_QUERYCAP` = _IOR('V', 0, v4l2_capability)
const VIDIOC_QUERYCAP: c_ulong = ioc(IOC_READ, b'V', 0, std::mem::size_of::<V4l2Capability>());
/// `VIDIOC_S_FMT` = _IOWR('V', 5, v4l2_format)
const VIDIOC_S_FMT: c_ulong = ioc(
    IOC_READ | IOC_WRITE,
    b'V',
    5,
    std::mem::size_of::<V4l2Format>(),
);

#[repr(C)]
struct V4l2Capability {
    driver: [u8; 16],
    card: [u8; 32],
    bus_info: [u8; 32],
    version: u32,
    capabilities: u32,
    device_caps: u32,
    reserved: [u32; 3],
}

#[repr(C)]
#[derive(Clone, Copy)]
struct V4l2PixFormat {
    width: u32,
    height: u32,
    pixelformat: u32,
    field: u32,
    bytesperline: u32,
    sizeimage: u32,
    colorspace: u32,
    private: u32,
    flags: u32,
    ycbcr_enc: u32,
    quantization: u32,
    xfer_func: u32,
}

// The kernel union is 200 bytes and 8-byte aligned (some members hold
// pointers); the u64 arm preserves both properties.
#[repr(C)]
union V4l2FormatUnion {
    pix: V4l2PixFormat,
    raw: [u64; 25],
}

#[repr(C)]
struct V4l2Format {
    type_: u32,
    fmt: V4l2FormatUnion,
}

/// Live capture device backed by `/dev/video{N}`
pub struct V4l2Camera {
    fd: c_int,
    config: CameraConfig,
    frame_bytes: usize,
    read_buf: Vec<u8>,
    sequence: u32,
}

impl V4l2Camera {
    /// Open the device selected by `config.device_index` and negotiate
    /// a YUYV capture format.
    pub fn open(config: CameraConfig) -> Result<Self, CameraError> {
        let path = config.device_path();
        let c_path = CString::new(path.as_str())
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDWR) };
        if fd < 0 {
            return Err(CameraError::DeviceUnavailable(format!(
                "{}: {}",
                path,
                io::Error::last_os_error()
            )));
        }

        let mut camera = Self {
            fd,
            config,
            frame_bytes: 0,
            read_buf: Vec::new(),
            sequence: 0,
        };

        camera.check_capabilities(&path)?;
        camera.set_format()?;

        info!(
            device = %path,
            width = camera.config.width,
            height = camera.config.height,
            "Opened capture device"
        );
        Ok(camera)
    }

    fn check_capabilities(&self, path: &str) -> Result<(), CameraError> {
        let mut caps: V4l2Capability = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::ioctl(self.fd, VIDIOC_QUERYCAP, &mut caps) };
        if ret < 0 {
            return Err(CameraError::DeviceUnavailable(format!(
                "{}: QUERYCAP failed: {}",
                path,
                io::Error::last_os_error()
            )));
        }

        if caps.capabilities & V4L2_CAP_VIDEO_CAPTURE == 0 {
            return Err(CameraError::Format(format!(
                "{} is not a video capture device",
                path
            )));
        }
        if caps.capabilities & V4L2_CAP_READWRITE == 0 {
            return Err(CameraError::Format(format!(
                "{} does not support read() capture",
                path
            )));
        }
        Ok(())
    }

    fn set_format(&mut self) -> Result<(), CameraError> {
        let mut format = V4l2Format {
            type_: V4L2_BUF_TYPE_VIDEO_CAPTURE,
            fmt: V4l2FormatUnion { raw: [0; 25] },
        };
        format.fmt.pix = V4l2PixFormat {
            width: self.config.width,
            height: self.config.height,
            pixelformat: V4L2_PIX_FMT_YUYV,
            field: V4L2_FIELD_NONE,
            bytesperline: 0,
            sizeimage: 0,
            colorspace: 0,
            private: 0,
            flags: 0,
            ycbcr_enc: 0,
            quantization: 0,
            xfer_func: 0,
        };

        let ret = unsafe { libc::ioctl(self.fd, VIDIOC_S_FMT, &mut format) };
        if ret < 0 {
            return Err(CameraError::Format(format!(
                "S_FMT failed: {}",
                io::Error::last_os_error()
            )));
        }

        // The driver may adjust the requested geometry.
        let pix = unsafe { format.fmt.pix };
        if pix.pixelformat != V4L2_PIX_FMT_YUYV {
            return Err(CameraError::Format(
                "driver refused YUYV pixel format".to_string(),
            ));
        }
        if pix.width != self.config.width || pix.height != self.config.height {
            warn!(
                requested_w = self.config.width,
                requested_h = self.config.height,
                actual_w = pix.width,
                actual_h = pix.height,
                "Driver adjusted capture geometry"
            );
            self.config.width = pix.width;
            self.config.height = pix.height;
        }

        self.frame_bytes = if pix.sizeimage > 0 {
            pix.sizeimage as usize
        } else {
            (pix.width * pix.height * 2) as usize
        };
        self.read_buf = vec![0u8; self.frame_bytes];
        debug!(frame_bytes = self.frame_bytes, "Negotiated YUYV format");
        Ok(())
    }
}

impl FrameSource for V4l2Camera {
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError> {
        let n = unsafe {
            libc::read(
                self.fd,
                self.read_buf.as_mut_ptr() as *mut libc::c_void,
                self.frame_bytes,
            )
        };
        if n < 0 {
            return Err(CameraError::Capture(io::Error::last_os_error().to_string()));
        }
        if n as usize != self.frame_bytes {
            return Err(CameraError::Capture(format!(
                "short read: {} of {} bytes",
                n, self.frame_bytes
            )));
        }

        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        self.sequence = self.sequence.wrapping_add(1);
        let rgb = yuyv_to_rgb(&self.read_buf, self.config.width, self.config.height);
        Ok(VideoFrame::new(
            rgb,
            self.config.width,
            self.config.height,
            timestamp_ns,
            self.sequence,
        ))
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
        debug!(device = %self.config.device_path(), "Released capture device");
    }
}
