//! Scripted codec double for unit tests
//!
//! Each `send_packet` consumes one [`Step`] from the script and queues what the
//! following `receive_frame` calls return. Allocations and codec calls are
//! counted so tests can check resource balance and "no codec interaction".

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    CodecError, CodecLibrary, CodecResult, CodecStream, DecoderConfig, FrameBuffer,
    PacketBuffer, PixelFormat, Plane,
};

/// Codec names the double "knows"
const KNOWN_CODECS: &[&str] = &["vp8", "vp9", "av1"];

/// What the codec does with one submitted packet
#[derive(Debug, Clone)]
pub enum Step {
    /// Refuse the packet
    Reject(CodecError),
    /// Accept and produce these pictures, then ask for more input
    Yield(Vec<TestPicture>),
    /// Accept but produce nothing yet
    NeedMore,
    /// Accept, then fail the first receive
    Fail(CodecError),
    /// Accept, produce pictures, then fail instead of asking for more input
    YieldThenFail(Vec<TestPicture>, CodecError),
}

/// Allocation step to fail on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Find,
    Context,
    Packet,
    Frame,
    Open,
}

#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub live_contexts: isize,
    pub live_packets: isize,
    pub live_frames: isize,
    pub bound_packets: isize,
    pub find_calls: usize,
    pub open_calls: usize,
    pub send_calls: usize,
    pub receive_calls: usize,
}

impl Counters {
    /// Calls that reached the codec itself
    pub fn codec_calls(&self) -> usize {
        self.send_calls + self.receive_calls
    }
}

#[derive(Debug, Default)]
struct Shared {
    counters: Counters,
    script: VecDeque<Step>,
    fail_at: Option<FailAt>,
    last_config: Option<DecoderConfig>,
    last_packet: Option<Vec<u8>>,
}

/// A decoded picture with owned planes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPicture {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub planes: [Vec<u8>; 3],
    pub strides: [usize; 3],
}

impl TestPicture {
    /// Planar picture with padded strides; luma bytes are `seed`, chroma `seed + 1`/`seed + 2`
    pub fn new(width: u32, height: u32, format: PixelFormat, seed: u8) -> Self {
        let rows = (height + (height & 1)) as usize;
        let (chroma_width, chroma_rows) = match format {
            PixelFormat::Yuv420p => ((width as usize).div_ceil(2), rows / 2),
            _ => (width as usize, rows),
        };
        let luma_stride = width as usize + 16;
        let chroma_stride = chroma_width + 16;
        Self {
            width,
            height,
            format,
            planes: [
                vec![seed; luma_stride * rows],
                vec![seed.wrapping_add(1); chroma_stride * chroma_rows],
                vec![seed.wrapping_add(2); chroma_stride * chroma_rows],
            ],
            strides: [luma_stride, chroma_stride, chroma_stride],
        }
    }

    pub fn yuv420(width: u32, height: u32) -> Self {
        Self::new(width, height, PixelFormat::Yuv420p, 16)
    }

    pub fn yuv444(width: u32, height: u32) -> Self {
        Self::new(width, height, PixelFormat::Yuv444p, 16)
    }
}

impl FrameBuffer for TestPicture {
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
        Some(Plane {
            data,
            stride: self.strides[index],
        })
    }
}

/// Codec library double
#[derive(Debug, Clone, Default)]
pub struct ScriptedLibrary {
    shared: Arc<Mutex<Shared>>,
}

impl ScriptedLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap()
    }

    pub fn push(&self, step: Step) -> &Self {
        self.lock().script.push_back(step);
        self
    }

    pub fn fail_at(&self, step: Option<FailAt>) {
        self.lock().fail_at = step;
    }

    pub fn counters(&self) -> Counters {
        self.lock().counters.clone()
    }

    pub fn last_config(&self) -> Option<DecoderConfig> {
        self.lock().last_config.clone()
    }

    pub fn last_packet(&self) -> Option<Vec<u8>> {
        self.lock().last_packet.clone()
    }

    fn should_fail(&self, step: FailAt) -> bool {
        self.lock().fail_at == Some(step)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TestCodec;

impl CodecLibrary for ScriptedLibrary {
    type Codec = TestCodec;
    type Packet = TestPacket;
    type Frame = TestFrame;
    type Context = TestContext;

    fn find_decoder(&self, name: &str) -> CodecResult<TestCodec> {
        self.lock().counters.find_calls += 1;
        if self.should_fail(FailAt::Find) || !KNOWN_CODECS.contains(&name) {
            return Err(CodecError::CodecNotFound(name.to_string()));
        }
        Ok(TestCodec)
    }

    fn alloc_context(&self, _codec: TestCodec, config: &DecoderConfig) -> CodecResult<TestContext> {
        if self.should_fail(FailAt::Context) {
            return Err(CodecError::AllocationFailed("AVCodecContext"));
        }
        let mut shared = self.lock();
        shared.counters.live_contexts += 1;
        shared.last_config = Some(config.clone());
        Ok(TestContext {
            library: self.clone(),
            pending: VecDeque::new(),
        })
    }

    fn alloc_packet(&self) -> CodecResult<TestPacket> {
        if self.should_fail(FailAt::Packet) {
            return Err(CodecError::AllocationFailed("AVPacket"));
        }
        self.lock().counters.live_packets += 1;
        Ok(TestPacket {
            library: self.clone(),
            data: None,
        })
    }

    fn alloc_frame(&self) -> CodecResult<TestFrame> {
        if self.should_fail(FailAt::Frame) {
            return Err(CodecError::AllocationFailed("AVFrame"));
        }
        self.lock().counters.live_frames += 1;
        Ok(TestFrame {
            library: self.clone(),
            picture: None,
        })
    }
}

#[derive(Debug)]
pub struct TestContext {
    library: ScriptedLibrary,
    pending: VecDeque<CodecResult<TestPicture>>,
}

impl CodecStream for TestContext {
    type Packet = TestPacket;
    type Frame = TestFrame;

    fn open(&mut self) -> CodecResult<()> {
        self.library.lock().counters.open_calls += 1;
        if self.library.should_fail(FailAt::Open) {
            return Err(CodecError::Codec {
                code: -22,
                message: "Invalid argument".into(),
            });
        }
        Ok(())
    }

    fn send_packet(&mut self, packet: &TestPacket) -> CodecResult<()> {
        let step = {
            let mut shared = self.library.lock();
            shared.counters.send_calls += 1;
            shared.last_packet = packet.data.clone();
            shared.script.pop_front().unwrap_or(Step::NeedMore)
        };
        match step {
            Step::Reject(err) => return Err(err),
            Step::Yield(pictures) => self.pending.extend(pictures.into_iter().map(Ok)),
            Step::NeedMore => {}
            Step::Fail(err) => self.pending.push_back(Err(err)),
            Step::YieldThenFail(pictures, err) => {
                self.pending.extend(pictures.into_iter().map(Ok));
                self.pending.push_back(Err(err));
            }
        }
        Ok(())
    }

    fn receive_frame(&mut self, frame: &mut TestFrame) -> CodecResult<bool> {
        self.library.lock().counters.receive_calls += 1;
        match self.pending.pop_front() {
            None => Ok(false),
            Some(Ok(picture)) => {
                frame.picture = Some(picture);
                Ok(true)
            }
            Some(Err(err)) => Err(err),
        }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.library.lock().counters.live_contexts -= 1;
    }
}

#[derive(Debug)]
pub struct TestPacket {
    library: ScriptedLibrary,
    data: Option<Vec<u8>>,
}

impl PacketBuffer for TestPacket {
    fn attach(&mut self, data: &[u8]) -> CodecResult<()> {
        self.data = Some(data.to_vec());
        self.library.lock().counters.bound_packets += 1;
        Ok(())
    }

    fn release(&mut self) {
        if self.data.take().is_some() {
            self.library.lock().counters.bound_packets -= 1;
        }
    }
}

impl Drop for TestPacket {
    fn drop(&mut self) {
        self.library.lock().counters.live_packets -= 1;
    }
}

#[derive(Debug)]
pub struct TestFrame {
    library: ScriptedLibrary,
    picture: Option<TestPicture>,
}

impl FrameBuffer for TestFrame {
    fn width(&self) -> u32 {
        self.picture.as_ref().map_or(0, |p| p.width)
    }

    fn height(&self) -> u32 {
        self.picture.as_ref().map_or(0, |p| p.height)
    }

    fn pixel_format(&self) -> PixelFormat {
        self.picture
            .as_ref()
            .map_or(PixelFormat::Unsupported(-1), |p| p.format)
    }

    fn plane(&self, index: usize) -> Option<Plane<'_>> {
        self.picture.as_ref()?.plane(index)
    }
}

impl Drop for TestFrame {
    fn drop(&mut self) {
        self.library.lock().counters.live_frames -= 1;
    }
}
