//! Progress overlay shown while an invocation sequence is in flight.
//!
//! The overlay is attached once when a sequence starts and detached once when
//! it ends, whichever way it ends. [`OverlayGuard`] owns that pairing: it is
//! released explicitly on the normal exits and detaches on drop otherwise.

use std::sync::Arc;

use applet_protocol::InvocationContext;
use uuid::Uuid;

use crate::surface::Surface;

/// Edge length of the default spinner, in pixels.
pub const DEFAULT_SPINNER_SIZE: u32 = 28;

/// A progress overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverlay {
    /// Identity, so surfaces can pair attach and detach.
    pub id: Uuid,

    /// The invocation this overlay belongs to.
    pub context: InvocationContext,

    pub style: OverlayStyle,
}

/// What the overlay looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayStyle {
    /// A square spinner.
    Spinner { size: u32 },
    /// A text label.
    Message(String),
}

impl ProgressOverlay {
    /// The default spinner overlay.
    pub fn spinner(context: InvocationContext) -> Self {
        Self::with_style(context, OverlayStyle::Spinner { size: DEFAULT_SPINNER_SIZE })
    }

    /// An overlay showing a message.
    pub fn message(context: InvocationContext, text: impl Into<String>) -> Self {
        Self::with_style(context, OverlayStyle::Message(text.into()))
    }

    fn with_style(context: InvocationContext, style: OverlayStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            context,
            style,
        }
    }
}

/// Attached overlay; detaches exactly once.
pub struct OverlayGuard {
    surface: Arc<dyn Surface>,
    overlay: Option<ProgressOverlay>,
}

impl OverlayGuard {
    /// Attach `overlay` to `surface`.
    pub fn attach(surface: Arc<dyn Surface>, overlay: ProgressOverlay) -> Self {
        surface.attach_overlay(&overlay);
        Self {
            surface,
            overlay: Some(overlay),
        }
    }

    /// The attached overlay.
    pub fn overlay(&self) -> Option<&ProgressOverlay> {
        self.overlay.as_ref()
    }

    /// Detach now.
    pub fn release(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(overlay) = self.overlay.take() {
            self.surface.detach_overlay(&overlay);
        }
    }
}

impl Drop for OverlayGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for OverlayGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayGuard")
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use applet_protocol::AppletCard;

    use crate::applet::ActionInvoker;
    use crate::surface::{LoginPopup, WindowGeometry};

    #[derive(Default)]
    struct Tally {
        attached: Mutex<Vec<Uuid>>,
        detached: Mutex<Vec<Uuid>>,
    }

    impl Surface for Tally {
        fn mount(&self, _card: &AppletCard, _invoker: ActionInvoker) -> Result<(), String> {
            Ok(())
        }
        fn attach_overlay(&self, overlay: &ProgressOverlay) {
            self.attached.lock().unwrap().push(overlay.id);
        }
        fn detach_overlay(&self, overlay: &ProgressOverlay) {
            self.detached.lock().unwrap().push(overlay.id);
        }
        fn alert(&self, _message: &str) {}
        fn window(&self) -> WindowGeometry {
            WindowGeometry::default()
        }
        fn open_popup(&self, _popup: &LoginPopup) {}
    }

    #[test]
    fn test_default_spinner() {
        let overlay = ProgressOverlay::spinner(InvocationContext::UserInteraction);
        assert_eq!(overlay.style, OverlayStyle::Spinner { size: 28 });
        assert_ne!(overlay.id, ProgressOverlay::spinner(InvocationContext::UserInteraction).id);
    }

    #[test]
    fn test_release_detaches_once() {
        let surface = Arc::new(Tally::default());
        let overlay = ProgressOverlay::message(InvocationContext::AutoRefresh, "Refreshing");
        let id = overlay.id;

        let guard = OverlayGuard::attach(surface.clone(), overlay);
        assert_eq!(guard.overlay().map(|o| o.id), Some(id));
        guard.release();

        assert_eq!(*surface.attached.lock().unwrap(), vec![id]);
        assert_eq!(*surface.detached.lock().unwrap(), vec![id]);
    }

    #[test]
    fn test_drop_detaches() {
        let surface = Arc::new(Tally::default());
        {
            let _guard = OverlayGuard::attach(
                surface.clone(),
                ProgressOverlay::spinner(InvocationContext::UserInteraction),
            );
            assert!(surface.detached.lock().unwrap().is_empty());
        }
        assert_eq!(surface.detached.lock().unwrap().len(), 1);
    }
}
