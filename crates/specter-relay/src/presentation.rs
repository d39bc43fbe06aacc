//! Channel feeding an overlay or any other display consumer.
//!
//! The relay computes camera pose and entity snapshots; the consumer on
//! the other end of the channel renders them. Posting never blocks and
//! never awaits, so the packet path cannot stall on a slow consumer.

use tokio::sync::mpsc;

use specter_proto::math::Vec3;
use specter_state::entity::EntitySnapshot;

#[derive(Debug, Clone)]
pub struct CameraPose {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub fov: f32,
}

/// One display update: where the camera is and everything worth drawing.
#[derive(Debug, Clone)]
pub struct PresentationFrame {
    pub camera: CameraPose,
    pub entities: Vec<EntitySnapshot>,
}

/// Sending half held by the session. A closed receiver drops frames
/// silently.
#[derive(Debug, Clone)]
pub struct PresentationSender {
    tx: mpsc::UnboundedSender<PresentationFrame>,
}

impl PresentationSender {
    pub fn post(&self, frame: PresentationFrame) {
        let _ = self.tx.send(frame);
    }
}

pub type PresentationReceiver = mpsc::UnboundedReceiver<PresentationFrame>;

pub fn channel() -> (PresentationSender, PresentationReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PresentationSender { tx }, rx)
}
