//! Request builder — turns an executed action into the first attempt of an
//! invocation.

use applet_protocol::{ActivityRequest, ExecuteAction, InvocationContext};

use crate::hooks::AppletHooks;

/// Build the request for `action`, giving `hooks` a chance to amend or veto it.
///
/// Returns `None` when the prepare hook vetoes; nothing must be sent then.
pub fn build_request(
    app_id: &str,
    action: &ExecuteAction,
    context: InvocationContext,
    hooks: &dyn AppletHooks,
) -> Option<ActivityRequest> {
    let mut request = ActivityRequest::new(app_id, action, context);

    if hooks.prepare_request(action, &mut request).is_veto() {
        tracing::info!(app_id, %context, "Activity request vetoed by prepare hook");
        return None;
    }

    Some(request)
}
