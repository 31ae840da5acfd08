//! Auth challenge handler — opens a login popup when the channel asks the
//! user to sign in.
//!
//! This does not resume the invocation. Once the user has signed in, they
//! trigger the action again.

use url::Url;

use crate::config::AuthPromptConfig;
use crate::error::{AppletError, AppletResult};
use crate::surface::{LoginPopup, Surface, WindowGeometry};

/// Window name of the login popup.
pub const LOGIN_WINDOW_NAME: &str = "Login";

/// Validate the login URL of an auth challenge.
pub fn parse_login_url(raw: &str) -> AppletResult<Url> {
    Url::parse(raw).map_err(|source| {
        tracing::error!(login_url = raw, "Invalid loginUrl");
        AppletError::InvalidLoginUrl {
            url: raw.to_string(),
            source,
        }
    })
}

/// A login popup of `prompt` size centered on `window`.
pub fn centered_popup(url: Url, window: WindowGeometry, prompt: AuthPromptConfig) -> LoginPopup {
    LoginPopup {
        url,
        name: LOGIN_WINDOW_NAME.into(),
        left: center(window.screen_x, window.outer_width, prompt.width),
        top: center(window.screen_y, window.outer_height, prompt.height),
        width: prompt.width,
        height: prompt.height,
    }
}

fn center(origin: i32, outer: u32, inner: u32) -> i32 {
    let offset = (i64::from(outer) - i64::from(inner)) / 2;
    let position = i64::from(origin) + offset;
    position.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Handle an auth challenge: validate the URL and open the login popup.
///
/// A malformed URL fails immediately and opens nothing.
pub fn prompt_login(
    surface: &dyn Surface,
    login_url: &str,
    prompt: AuthPromptConfig,
) -> AppletResult<LoginPopup> {
    let url = parse_login_url(login_url)?;
    let popup = centered_popup(url, surface.window(), prompt);

    tracing::info!(login_url = %popup.url, features = %popup.features(), "Login required");
    surface.open_popup(&popup);

    Ok(popup)
}
