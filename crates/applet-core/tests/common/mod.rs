//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use applet_core::applet_protocol::{
    ActivityRequest, ActivityResponse, ProtocolError, ProtocolResult,
};
use applet_core::{
    ActionInvoker, AppletCard, AppletHooks, ChannelAdapter, ExecuteAction, InvocationContext,
    LoginPopup, ProgressOverlay, RetryDecision, Surface, Verdict, WindowGeometry,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;
use uuid::Uuid;

// =============================================================================
// Channel
// =============================================================================

/// One scripted channel reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Success(String),
    Failure(String),
    Unreachable,
}

/// Channel adapter that answers from a script and records what it was sent.
#[derive(Default)]
pub struct ScriptedChannel {
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ActivityRequest>>,
}

impl ScriptedChannel {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ActivityRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn sends(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChannelAdapter for ScriptedChannel {
    async fn send(&self, request: &ActivityRequest) -> ProtocolResult<ActivityResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.script.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Success(content)) => Ok(ActivityResponse::success(content)),
            Some(Reply::Failure(content)) => Ok(ActivityResponse::failure(content)),
            Some(Reply::Unreachable) => {
                Err(ProtocolError::ChannelUnavailable("connection refused".into()))
            }
            None => Ok(ActivityResponse::failure("script exhausted")),
        }
    }
}

// =============================================================================
// Surface
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Mounted(String),
    Attached(Uuid, InvocationContext),
    Detached(Uuid),
    Alert(String),
    Popup(LoginPopup),
}

/// Surface that records everything it is asked to do.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    cards: Mutex<Vec<AppletCard>>,
    attached: Mutex<Vec<ProgressOverlay>>,
    invoker: Mutex<Option<ActionInvoker>>,
    pub fail_mount: bool,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_mount: true,
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn mounted(&self) -> Vec<AppletCard> {
        self.cards.lock().unwrap().clone()
    }

    pub fn invoker(&self) -> ActionInvoker {
        self.invoker
            .lock()
            .unwrap()
            .clone()
            .expect("no card mounted")
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Alert(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn popups(&self) -> Vec<LoginPopup> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Popup(popup) => Some(popup),
                _ => None,
            })
            .collect()
    }

    /// Every overlay attached, as attached.
    pub fn attached_overlays(&self) -> Vec<ProgressOverlay> {
        self.attached.lock().unwrap().clone()
    }

    pub fn mounts(&self) -> usize {
        self.cards.lock().unwrap().len()
    }

    /// Attached and detached overlay ids, in order.
    pub fn overlays(&self) -> (Vec<Uuid>, Vec<Uuid>) {
        let mut attached = Vec::new();
        let mut detached = Vec::new();
        for event in self.events() {
            match event {
                SurfaceEvent::Attached(id, _) => attached.push(id),
                SurfaceEvent::Detached(id) => detached.push(id),
                _ => {}
            }
        }
        (attached, detached)
    }
}

impl Surface for RecordingSurface {
    fn mount(&self, card: &AppletCard, invoker: ActionInvoker) -> Result<(), String> {
        if self.fail_mount {
            return Err("renderer crashed".into());
        }
        let app_id = card.app_id().unwrap_or_default().to_string();
        self.events.lock().unwrap().push(SurfaceEvent::Mounted(app_id));
        self.cards.lock().unwrap().push(card.clone());
        *self.invoker.lock().unwrap() = Some(invoker);
        Ok(())
    }

    fn attach_overlay(&self, overlay: &ProgressOverlay) {
        self.attached.lock().unwrap().push(overlay.clone());
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Attached(overlay.id, overlay.context));
    }

    fn detach_overlay(&self, overlay: &ProgressOverlay) {
        self.events.lock().unwrap().push(SurfaceEvent::Detached(overlay.id));
    }

    fn alert(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Alert(message.to_string()));
    }

    fn window(&self) -> WindowGeometry {
        WindowGeometry {
            screen_x: 100,
            screen_y: 50,
            outer_width: 1200,
            outer_height: 900,
        }
    }

    fn open_popup(&self, popup: &LoginPopup) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Popup(popup.clone()));
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Hooks with scripted decisions that record how often they were called.
pub struct RecordingHooks {
    pub prepare: Verdict,
    pub card: Verdict,
    pub retry: RetryDecision,
    /// Label of the overlay to supply; `None` keeps the default spinner.
    pub overlay: Option<&'static str>,
    pub prepared: Mutex<Vec<InvocationContext>>,
    pub prepared_at: Mutex<Vec<Instant>>,
    pub overlay_requests: Mutex<Vec<InvocationContext>>,
    pub completed: Mutex<usize>,
    pub changed: Mutex<usize>,
}

impl Default for RecordingHooks {
    fn default() -> Self {
        Self {
            prepare: Verdict::Allow,
            card: Verdict::Allow,
            retry: RetryDecision::RetryWithDefaultDelay,
            overlay: None,
            prepared: Mutex::new(Vec::new()),
            prepared_at: Mutex::new(Vec::new()),
            overlay_requests: Mutex::new(Vec::new()),
            completed: Mutex::new(0),
            changed: Mutex::new(0),
        }
    }
}

impl RecordingHooks {
    pub fn changed(&self) -> usize {
        *self.changed.lock().unwrap()
    }

    pub fn completed(&self) -> usize {
        *self.completed.lock().unwrap()
    }
}

impl AppletHooks for RecordingHooks {
    fn prepare_request(&self, _action: &ExecuteAction, request: &mut ActivityRequest) -> Verdict {
        self.prepared.lock().unwrap().push(request.context);
        self.prepared_at.lock().unwrap().push(Instant::now());
        self.prepare
    }

    fn card_changing(&self, _payload: &Value) -> Verdict {
        self.card
    }

    fn card_changed(&self) {
        *self.changed.lock().unwrap() += 1;
    }

    fn request_completed(&self, _response: &ActivityResponse) -> RetryDecision {
        *self.completed.lock().unwrap() += 1;
        self.retry
    }

    fn create_progress_overlay(&self, context: InvocationContext) -> Option<ProgressOverlay> {
        self.overlay_requests.lock().unwrap().push(context);
        self.overlay.map(|label| ProgressOverlay::message(context, label))
    }
}

// =============================================================================
// Cards
// =============================================================================

/// A card with one `Action.Execute` whose id and verb are `go`.
pub fn card(app_id: &str) -> Value {
    json!({
        "type": "AdaptiveCard",
        "version": "1.4",
        "appId": app_id,
        "body": [{"type": "TextBlock", "text": format!("Card {app_id}")}],
        "actions": [{"type": "Action.Execute", "id": "go", "title": "Go", "verb": "go"}]
    })
}

pub fn card_text(app_id: &str) -> String {
    card(app_id).to_string()
}
