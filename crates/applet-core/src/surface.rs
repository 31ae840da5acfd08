//! Surface — the host UI the applet draws on.
//!
//! Rendering, alerts and popups are the host's business. The runtime only
//! tells the surface what to show and when.

use applet_protocol::AppletCard;
use url::Url;

use crate::applet::ActionInvoker;
use crate::overlay::ProgressOverlay;

/// Position and outer size of the host window, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowGeometry {
    pub screen_x: i32,
    pub screen_y: i32,
    pub outer_width: u32,
    pub outer_height: u32,
}

/// A login popup to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPopup {
    pub url: Url,
    /// Window name; always `"Login"`.
    pub name: String,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl LoginPopup {
    /// Window feature string in the `window.open` format.
    pub fn features(&self) -> String {
        format!(
            "width={},height={},left={},top={}",
            self.width, self.height, self.left, self.top
        )
    }
}

/// The host UI.
pub trait Surface: Send + Sync {
    /// Render `card` and make it the only displayed content.
    ///
    /// Actions the user triggers on the rendered card go through `invoker`.
    /// On error the currently displayed content must be left as it was.
    fn mount(&self, card: &AppletCard, invoker: ActionInvoker) -> Result<(), String>;

    /// Show a progress overlay on top of the card.
    fn attach_overlay(&self, overlay: &ProgressOverlay);

    /// Remove a progress overlay.
    fn detach_overlay(&self, overlay: &ProgressOverlay);

    /// Show a plain message to the user.
    fn alert(&self, message: &str);

    /// Current window placement, used to center popups.
    fn window(&self) -> WindowGeometry;

    /// Open a login popup.
    fn open_popup(&self, popup: &LoginPopup);
}
