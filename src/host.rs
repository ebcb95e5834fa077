//! Host-facing entry points
//!
//! [`DecoderHost`] is what an embedding runtime drives: initialize once, feed
//! access units (or a sync marker), tear down. It owns at most one decoder and
//! one hand-off.

use tracing::{debug, error, info, trace, warn};

use crate::codec::{CodecLibrary, DecoderConfig};
use crate::decoder::handoff::{self, FrameReceiver, FrameSender, Handoff, HandoffMode, Inline};
use crate::decoder::{DecodeResult, Decoder, DecoderStats, Delivery, FrameSink};

/// A decoder slot plus the hand-off its pictures go through
pub struct DecoderHost<L: CodecLibrary, H: Handoff> {
    library: L,
    config: DecoderConfig,
    decoder: Option<Decoder<L>>,
    handoff: H,
}

impl<L: CodecLibrary + Clone, S: FrameSink> DecoderHost<L, Inline<S>> {
    /// Host whose sink runs on the decoding thread against the decoder's own buffer
    pub fn synchronous(library: L, config: DecoderConfig, sink: S) -> Self {
        Self::with_handoff(library, config, Inline::new(sink))
    }

    pub fn sink(&self) -> &S {
        self.handoff.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.handoff.sink_mut()
    }
}

impl<L: CodecLibrary + Clone> DecoderHost<L, FrameSender> {
    /// Host that copies each picture to a consumer on another thread
    ///
    /// The queue is unbounded: decoding never waits, and copies accumulate if
    /// the consumer falls behind. Use
    /// [`cross_context_bounded`](Self::cross_context_bounded) to cap it.
    pub fn cross_context(library: L, config: DecoderConfig) -> (Self, FrameReceiver) {
        let (sender, receiver) = handoff::unbounded();
        (Self::with_handoff(library, config, sender), receiver)
    }

    /// Like [`cross_context`](Self::cross_context), but `process_input` blocks
    /// once `capacity` deliveries are waiting for the consumer
    pub fn cross_context_bounded(
        library: L,
        config: DecoderConfig,
        capacity: usize,
    ) -> (Self, FrameReceiver) {
        let (sender, receiver) = handoff::bounded(capacity);
        (Self::with_handoff(library, config, sender), receiver)
    }
}

impl<L: CodecLibrary + Clone, H: Handoff> DecoderHost<L, H> {
    /// Host with no decoder yet; call [`initialize`](Self::initialize) first
    pub fn with_handoff(library: L, config: DecoderConfig, handoff: H) -> Self {
        Self {
            library,
            config,
            decoder: None,
            handoff,
        }
    }

    /// Tear down any current decoder and create a fresh one
    ///
    /// On failure the host is left without a decoder.
    pub fn initialize(&mut self) -> DecodeResult<()> {
        self.teardown();

        match Decoder::new(self.library.clone(), self.config.clone()) {
            Ok(decoder) => {
                info!(codec = %self.config.codec_name, mode = ?H::MODE, "decoder host initialized");
                self.decoder = Some(decoder);
                Ok(())
            }
            Err(e) => {
                error!(codec = %self.config.codec_name, error = %e, "decoder host initialization failed");
                Err(e)
            }
        }
    }

    /// Decode one access unit and hand the result to the consumer
    ///
    /// `None` is the flush/sync marker: the consumer is told no picture is
    /// coming and the codec is not touched. Returns whether a picture was
    /// handed over.
    pub fn process_input(&mut self, data: Option<&[u8]>) -> bool {
        let Some(data) = data else {
            trace!("sync marker");
            return self.handoff.hand_off(Delivery::<&L::Frame>::Sync);
        };

        let Some(decoder) = self.decoder.as_mut() else {
            warn!("input received without an initialized decoder");
            return self.handoff.hand_off(Delivery::<&L::Frame>::Failed);
        };

        match decoder.decode(data) {
            Ok(frame) => self.handoff.hand_off(Delivery::Picture(frame)),
            Err(e) => {
                if e.is_no_picture() {
                    trace!("no picture for this input");
                } else {
                    debug!(error = %e, "decode failed");
                }
                self.handoff.hand_off(Delivery::<&L::Frame>::Failed)
            }
        }
    }

    /// Release the decoder and its codec resources; no-op if there is none
    pub fn teardown(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            decoder.teardown();
            debug!(stats = ?decoder.stats(), "decoder host torn down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.decoder.as_ref().is_some_and(Decoder::is_open)
    }

    /// Counters of the current decoder, if any
    pub fn stats(&self) -> Option<DecoderStats> {
        self.decoder.as_ref().map(Decoder::stats)
    }

    pub fn mode(&self) -> HandoffMode {
        H::MODE
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

impl<L: CodecLibrary, H: Handoff> std::fmt::Debug for DecoderHost<L, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderHost")
            .field("codec", &self.config.codec_name)
            .field("mode", &H::MODE)
            .field("decoder", &self.decoder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::{FailAt, ScriptedLibrary, Step, TestPicture};
    use crate::codec::PixelFormat;
    use crate::decoder::publish::tests::RecordingSink;
    use crate::decoder::{DeliveryKind, Rect};
    use tracing_test::traced_test;

    fn synchronous(library: &ScriptedLibrary) -> DecoderHost<ScriptedLibrary, Inline<RecordingSink>> {
        let mut host = DecoderHost::synchronous(
            library.clone(),
            DecoderConfig::default(),
            RecordingSink::default(),
        );
        host.initialize().unwrap();
        host
    }

    #[test]
    fn test_vp9_keyframe_is_published() {
        let library = ScriptedLibrary::new();
        library.push(Step::Yield(vec![TestPicture::yuv420(64, 48)]));
        let mut host = synchronous(&library);

        assert!(host.process_input(Some(&[0x82, 0x49, 0x83, 0x42, 0x00])));

        let sink = host.sink();
        assert_eq!(sink.kinds, vec![DeliveryKind::Picture]);
        let geometry = sink.frames[0];
        assert_eq!((geometry.width, geometry.height), (64, 48));
        assert_eq!((geometry.chroma_width, geometry.chroma_height), (32, 24));
        assert_eq!(geometry.crop, Rect::new(0, 0, 64, 48));
        assert_eq!(geometry.render, Rect::new(0, 0, 64, 48));
    }

    #[test]
    fn test_sync_marker_skips_codec() {
        let library = ScriptedLibrary::new();
        let mut host = synchronous(&library);

        assert!(!host.process_input(None));
        assert_eq!(library.counters().codec_calls(), 0);
        assert_eq!(host.sink().kinds, vec![DeliveryKind::Sync]);
        assert_eq!(host.sink().no_frames, 1);
    }

    #[test]
    fn test_empty_input_reports_failure_without_codec_calls() {
        let library = ScriptedLibrary::new();
        let mut host = synchronous(&library);

        assert!(!host.process_input(Some(&[])));
        assert_eq!(library.counters().codec_calls(), 0);
        assert_eq!(host.sink().kinds, vec![DeliveryKind::Failed]);
        assert_eq!(host.sink().no_frames, 1);
    }

    #[test]
    fn test_first_picture_on_third_unit() {
        let library = ScriptedLibrary::new();
        library
            .push(Step::NeedMore)
            .push(Step::NeedMore)
            .push(Step::Yield(vec![TestPicture::yuv420(16, 16)]));
        let mut host = synchronous(&library);

        let results: Vec<bool> = (0u8..3).map(|i| host.process_input(Some(&[i]))).collect();
        assert_eq!(results, vec![false, false, true]);
        assert_eq!(host.sink().frames.len(), 1);
        assert_eq!(host.sink().no_frames, 2);
    }

    #[test]
    fn test_unsupported_format_never_reaches_sink() {
        let library = ScriptedLibrary::new();
        library.push(Step::Yield(vec![TestPicture::new(
            32,
            32,
            PixelFormat::Unsupported(23),
            0,
        )]));
        let mut host = synchronous(&library);

        assert!(!host.process_input(Some(&[1])));
        assert_eq!(host.stats().unwrap().pictures, 1);
        assert!(host.sink().frames.is_empty());
        assert_eq!(host.sink().no_frames, 0);
    }

    #[test]
    fn test_unsupported_format_same_result_in_both_modes() {
        let picture = TestPicture::new(32, 32, PixelFormat::Unsupported(62), 0);

        let library = ScriptedLibrary::new();
        library.push(Step::Yield(vec![picture.clone()]));
        let mut host = synchronous(&library);
        let inline_result = host.process_input(Some(&[1]));

        let library = ScriptedLibrary::new();
        library.push(Step::Yield(vec![picture]));
        let (mut cross, receiver) = DecoderHost::cross_context(library, DecoderConfig::default());
        cross.initialize().unwrap();
        let cross_result = cross.process_input(Some(&[1]));

        assert_eq!(inline_result, cross_result);
        assert!(!cross_result);
        match receiver.recv().unwrap() {
            Delivery::Picture(copy) => assert_eq!(copy.byte_len(), 0),
            other => panic!("unexpected delivery {other:?}"),
        }
    }

    #[test]
    fn test_bounded_cross_context_delivers_every_picture() {
        let library = ScriptedLibrary::new();
        for _ in 0..4 {
            library.push(Step::Yield(vec![TestPicture::yuv420(16, 16)]));
        }
        let (mut host, receiver) =
            DecoderHost::cross_context_bounded(library, DecoderConfig::default(), 1);
        host.initialize().unwrap();

        let consumer = std::thread::spawn(move || {
            let mut sink = RecordingSink::default();
            while receiver.publish_next(&mut sink).is_ok() {}
            sink
        });

        for i in 0u8..4 {
            assert!(host.process_input(Some(&[i])));
        }
        drop(host);

        let sink = consumer.join().unwrap();
        assert_eq!(sink.frames.len(), 4);
    }

    #[test]
    fn test_failed_initialize_leaves_no_decoder() {
        let library = ScriptedLibrary::new();
        let mut host = synchronous(&library);

        library.fail_at(Some(FailAt::Open));
        assert!(host.initialize().is_err());
        assert!(!host.is_initialized());
        assert!(host.stats().is_none());
        assert_eq!(library.counters().live_contexts, 0);

        assert!(!host.process_input(Some(&[1])));
        assert_eq!(host.sink().kinds, vec![DeliveryKind::Failed]);
    }

    #[test]
    fn test_reinitialize_replaces_decoder() {
        let library = ScriptedLibrary::new();
        let mut host = synchronous(&library);
        host.initialize().unwrap();
        host.initialize().unwrap();

        assert!(host.is_initialized());
        assert_eq!(library.counters().live_contexts, 1);
        assert_eq!(library.counters().live_frames, 1);
    }

    #[test]
    fn test_teardown_releases_resources() {
        let library = ScriptedLibrary::new();
        let mut host = synchronous(&library);

        host.teardown();
        host.teardown();
        assert!(!host.is_initialized());
        let counters = library.counters();
        assert_eq!(counters.live_contexts, 0);
        assert_eq!(counters.live_packets, 0);
        assert_eq!(counters.live_frames, 0);
    }

    #[test]
    fn test_cross_context_delivers_copies() {
        let library = ScriptedLibrary::new();
        library
            .push(Step::Yield(vec![TestPicture::new(64, 47, PixelFormat::Yuv420p, 40)]))
            .push(Step::NeedMore);
        let (mut host, receiver) = DecoderHost::cross_context(library.clone(), DecoderConfig::default());
        host.initialize().unwrap();
        assert_eq!(host.mode(), HandoffMode::CrossContext);

        assert!(host.process_input(Some(&[1])));
        assert!(!host.process_input(Some(&[2])));
        assert!(!host.process_input(None));
        host.teardown();
        drop(host);

        let mut sink = RecordingSink::default();
        assert_eq!(receiver.publish_next(&mut sink), Ok(true));
        assert_eq!(receiver.publish_next(&mut sink), Ok(false));
        assert_eq!(receiver.publish_next(&mut sink), Ok(false));
        assert!(receiver.publish_next(&mut sink).is_err());

        assert_eq!(
            sink.kinds,
            vec![DeliveryKind::Picture, DeliveryKind::Failed, DeliveryKind::Sync]
        );
        assert_eq!(sink.frames[0].height, 48);
        assert_eq!(sink.frames[0].chroma_height, 24);
        assert_eq!(sink.luma_first_bytes, vec![40]);
    }

    #[traced_test]
    #[test]
    fn test_lifecycle_is_logged() {
        let library = ScriptedLibrary::new();
        library.push(Step::Reject(crate::codec::CodecError::Codec {
            code: -1094995529,
            message: "Invalid data found when processing input".into(),
        }));
        let mut host = synchronous(&library);
        host.process_input(Some(&[1]));

        assert!(logs_contain("decoder initialized"));
        assert!(logs_contain("decoder host initialized"));
        assert!(logs_contain("send_packet failed"));
    }
}
