use std::sync::Arc;

use crate::domain::events::OutboundFrame;

/// Best-effort sink for realtime frames; implemented by the transport.
pub trait FrameSink {
    /// Hands a frame to the live connection. Never fails: a transport that
    /// is not ready reports the drop internally and the caller moves on.
    fn send_frame(&self, frame: OutboundFrame);
}

/// Sends chat notifications and ephemeral signals over the transport.
///
/// Chat content here is a notification-only side channel; the authoritative
/// message is created through the persistence call the caller makes
/// separately, and a failure here must never block that path.
#[derive(Clone)]
pub struct OutboundDispatcher {
    sink: Arc<dyn FrameSink + Send + Sync>,
}

impl OutboundDispatcher {
    pub fn new(sink: Arc<dyn FrameSink + Send + Sync>) -> Self {
        Self { sink }
    }

    pub fn send_chat(&self, content: impl Into<String>, channel_id: impl Into<String>) {
        self.sink.send_frame(OutboundFrame::Message {
            content: content.into(),
            channel_id: channel_id.into(),
        });
    }

    /// Fire-and-forget and idempotent; repeated identical states are
    /// harmless.
    pub fn send_typing(&self, channel_id: impl Into<String>, is_typing: bool) {
        self.sink.send_frame(OutboundFrame::Typing {
            channel_id: channel_id.into(),
            is_typing,
        });
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use super::*;

    /// Captures frames instead of sending them.
    #[derive(Default)]
    pub struct RecordingSink {
        pub frames: Mutex<Vec<OutboundFrame>>,
    }

    impl FrameSink for RecordingSink {
        fn send_frame(&self, frame: OutboundFrame) {
            self.frames.lock().expect("frames lock").push(frame);
        }
    }
}
