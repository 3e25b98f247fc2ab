//! Scripted sessions.
//!
//! A script is a JSON list of viewer inputs. Running it through an
//! [`AnnotationSession`] gives a reproducible record of what the session
//! ends up with, which the `spheremark-replay` binary prints.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sphere_geo::{GeoCoordinate, UvCoordinate};
use web_time::Instant;

use crate::api::{AnnotationRecord, InMemoryApi, SyncBackend};
use crate::interaction::InteractionMode;
use crate::keybindings::Key;
use crate::model::{BoundingBox, BoxId, ImageId};
use crate::session::{AnnotationSession, SessionEvent};
use crate::store::SaveStatus;

/// A pointer sample in either coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptPoint {
    Geo { azimuth: f64, altitude: f64 },
    Uv { u: f64, v: f64 },
}

impl From<ScriptPoint> for GeoCoordinate {
    fn from(point: ScriptPoint) -> Self {
        match point {
            ScriptPoint::Geo { azimuth, altitude } => GeoCoordinate::new(azimuth, altitude),
            ScriptPoint::Uv { u, v } => UvCoordinate::new(u, v).to_geo(),
        }
    }
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    Mode { mode: InteractionMode },
    PointerDown { point: ScriptPoint },
    PointerMove { point: ScriptPoint },
    PointerUp,
    Key { key: Key },
    CameraPan { active: bool },
    /// Mouse wheel step
    Zoom { delta: f64 },
    /// Turn the camera to the selected box
    Focus,
    /// Label the selected box
    Label { label: String },
    /// Apply pending service completions
    Tick,
    OpenImage { image_id: ImageId },
}

/// A replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub image_id: ImageId,
    /// Records the in-memory service starts with.
    #[serde(default)]
    pub seed: Vec<AnnotationRecord>,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// An in-memory service holding the script's seed records.
    pub fn seeded_api(&self) -> InMemoryApi {
        self.seed
            .iter()
            .cloned()
            .fold(InMemoryApi::new(), InMemoryApi::with_record)
    }
}

/// Final state of a replayed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub boxes: Vec<BoundingBox>,
    pub selected: Option<BoxId>,
    pub save_status: SaveStatus,
    /// Camera field of view at the end, in degrees.
    pub fov: f64,
    pub events: Vec<SessionEvent>,
    /// Requests still unanswered when the replay gave up waiting.
    pub unanswered: usize,
}

/// Run `script` through `session` and wait up to `settle` for the service.
pub fn run<B: SyncBackend>(
    session: &mut AnnotationSession<B>,
    script: &Script,
    settle: Duration,
) -> ReplayReport {
    let mut events = Vec::new();
    session.open_image(script.image_id);
    session.tick();

    for step in &script.steps {
        log::debug!("Replay step {:?}", step);
        apply(session, step);
        events.extend(session.take_events());
    }

    let deadline = Instant::now() + settle;
    loop {
        session.tick();
        if session.store().pending_requests() == 0 || Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    events.extend(session.take_events());

    let unanswered = session.store().pending_requests();
    if unanswered > 0 {
        log::warn!("{} requests still unanswered", unanswered);
    }

    let store = session.store();
    ReplayReport {
        boxes: store.boxes().to_vec(),
        selected: store.selected(),
        save_status: store.save_status(),
        fov: session.fov(),
        events,
        unanswered,
    }
}

fn apply<B: SyncBackend>(session: &mut AnnotationSession<B>, step: &ScriptStep) {
    match step {
        ScriptStep::Mode { mode } => session.set_mode(*mode),
        ScriptStep::PointerDown { point } => session.pointer_down(*point),
        ScriptStep::PointerMove { point } => session.pointer_move(*point),
        ScriptStep::PointerUp => session.pointer_up(),
        ScriptStep::Key { key } => {
            if session.key_pressed(*key).is_none() {
                log::debug!("Key {:?} is not bound", key);
            }
        }
        ScriptStep::CameraPan { active } => session.set_camera_pan(*active),
        ScriptStep::Zoom { delta } => {
            session.zoom(*delta);
        }
        ScriptStep::Focus => {
            if session.focus_selected().is_none() {
                log::debug!("Focus step without a selected box");
            }
        }
        ScriptStep::Label { label } => match session.store().selected() {
            Some(box_id) => {
                if let Err(e) = session.set_label(box_id, label) {
                    log::warn!("Failed to label {}: {}", box_id, e);
                }
            }
            None => log::warn!("Label step without a selected box"),
        },
        ScriptStep::Tick => session.tick(),
        ScriptStep::OpenImage { image_id } => {
            session.open_image(*image_id);
            session.tick();
        }
    }
}
