//! Published picture geometry and plane views

use crate::codec::{FrameBuffer, PixelFormat, Plane};

/// Rectangle in luma pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Dimensions handed to the pixel consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub format: PixelFormat,
    /// Luma width
    pub width: u32,
    /// Luma height, rounded up to even
    pub height: u32,
    pub chroma_width: u32,
    pub chroma_height: u32,
    pub crop: Rect,
    pub render: Rect,
}

impl Geometry {
    /// Geometry for a picture of the given size, or None if `format` can't be published
    ///
    /// Odd heights are rounded up so 4:2:0 chroma rows cover the whole picture.
    /// Chroma sizes derive from the corrected height.
    pub fn derive(width: u32, height: u32, format: PixelFormat) -> Option<Self> {
        let height = height.saturating_add(height & 1);
        let (chroma_width, chroma_height) = match format {
            PixelFormat::Yuv420p => (width >> 1, height >> 1),
            PixelFormat::Yuv444p => (width, height),
            PixelFormat::Unsupported(_) => return None,
        };
        let full = Rect::new(0, 0, width, height);

        Some(Self {
            format,
            width,
            height,
            chroma_width,
            chroma_height,
            crop: full,
            render: full,
        })
    }

    pub fn of<F: FrameBuffer + ?Sized>(frame: &F) -> Option<Self> {
        Self::derive(frame.width(), frame.height(), frame.pixel_format())
    }
}

/// Read-only projection of a decoded picture at publication time
///
/// Borrows the planes from their owner; nothing is copied.
#[derive(Debug, Clone, Copy)]
pub struct PictureView<'a> {
    /// Y, U and V planes
    pub planes: [Plane<'a>; 3],
    pub geometry: Geometry,
}

impl<'a> PictureView<'a> {
    /// View over `frame`, or None for unsupported formats and missing planes
    pub fn new<F: FrameBuffer + ?Sized>(frame: &'a F) -> Option<Self> {
        let geometry = Geometry::of(frame)?;
        let planes = [frame.plane(0)?, frame.plane(1)?, frame.plane(2)?];
        Some(Self { planes, geometry })
    }

    pub fn luma(&self) -> Plane<'a> {
        self.planes[0]
    }

    pub fn chroma_u(&self) -> Plane<'a> {
        self.planes[1]
    }

    pub fn chroma_v(&self) -> Plane<'a> {
        self.planes[2]
    }
}

/// Deep copy of a decoded picture, independent of the decoder's frame buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPicture {
    width: u32,
    height: u32,
    format: PixelFormat,
    planes: [Vec<u8>; 3],
    strides: [usize; 3],
}

impl OwnedPicture {
    /// Copy the three planes of `frame`, keeping their strides
    ///
    /// Pictures without a publishable geometry keep only their size and
    /// format; no plane bytes are copied.
    pub fn duplicate<F: FrameBuffer + ?Sized>(frame: &F) -> Self {
        let mut planes: [Vec<u8>; 3] = Default::default();
        let mut strides = [0usize; 3];
        if Geometry::of(frame).is_some() {
            for (index, (data, stride)) in planes.iter_mut().zip(strides.iter_mut()).enumerate() {
                if let Some(plane) = frame.plane(index) {
                    *data = plane.data.to_vec();
                    *stride = plane.stride;
                }
            }
        }

        Self {
            width: frame.width(),
            height: frame.height(),
            format: frame.pixel_format(),
            planes,
            strides,
        }
    }

    /// Total bytes held across all planes
    pub fn byte_len(&self) -> usize {
        self.planes.iter().map(Vec::len).sum()
    }
}

impl FrameBuffer for OwnedPicture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn plane(&self, index: usize) -> Option<Plane<'_>> {
        let data = self.planes.get(index)?;
        if data.is_empty() {
            return None;
        }
        Some(Plane {
            data,
            stride: self.strides[index],
        })
    }
}
