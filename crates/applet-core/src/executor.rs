//! Activity executor — sends one invocation to the channel, retrying failed
//! attempts, and acts on the result.
//!
//! ```text
//!            ┌──────────── BackoffElapsed ────────────┐
//!            ▼                                        │
//!        SENDING ── Rejected (retry allowed) ──▶ RETRYING
//!            │
//!            ├── Accepted ─────────────▶ SUCCEEDED (terminal)
//!            ├── Rejected (no retry) ──▶ GIVEN_UP  (terminal)
//!            └── TransportFailed ──────▶ ABORTED   (terminal)
//! ```
//!
//! [`transition`] is the whole state machine; [`ActivityExecutor`] feeds it
//! with channel responses and timer expirations.

use std::sync::Arc;
use std::time::Duration;

use applet_protocol::{ActivityRequest, ActivityResponse, ChannelAdapter, ProtocolError};
use serde_json::Value;
use url::Url;

use crate::applet::CardChange;
use crate::auth;
use crate::classify::{classify, ActivityResult};
use crate::config::{AuthPromptConfig, RetryConfig};
use crate::error::{AppletError, AppletResult};
use crate::hooks::{AppletHooks, RetryDecision};
use crate::overlay::{OverlayGuard, ProgressOverlay};
use crate::surface::Surface;

/// How many times and how often an invocation is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on sends, first attempt included. Never below 1.
    pub maximum_request_attempts: u32,

    /// Delay used when the hook does not pick one.
    pub default_retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(maximum_request_attempts: u32, default_retry_delay: Duration) -> Self {
        Self {
            maximum_request_attempts: maximum_request_attempts.max(1),
            default_retry_delay,
        }
    }

    /// Whether another attempt may follow the current one.
    pub fn allows_retry(&self, request: &ActivityRequest) -> bool {
        request.attempt_number + 1 < self.maximum_request_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.maximum_request_attempts, config.default_retry_delay())
    }
}

/// State of an invocation sequence.
#[derive(Debug)]
pub enum ExecutionState {
    /// Waiting for the channel to answer the current attempt.
    Sending,
    /// Waiting before the next attempt.
    Retrying { delay: Duration },
    /// The channel accepted the request (terminal).
    Succeeded(ActivityResponse),
    /// Every allowed attempt failed, or the hook gave up (terminal).
    GivenUp(ActivityResponse),
    /// The request could not be delivered (terminal).
    Aborted(ProtocolError),
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Succeeded(_) | ExecutionState::GivenUp(_) | ExecutionState::Aborted(_)
        )
    }

    fn name(&self) -> &'static str {
        match self {
            ExecutionState::Sending => "SENDING",
            ExecutionState::Retrying { .. } => "RETRYING",
            ExecutionState::Succeeded(_) => "SUCCEEDED",
            ExecutionState::GivenUp(_) => "GIVEN_UP",
            ExecutionState::Aborted(_) => "ABORTED",
        }
    }
}

/// Something that happened to an invocation sequence.
#[derive(Debug)]
pub enum ExecutionEvent {
    /// The channel answered with a success status.
    Accepted(ActivityResponse),
    /// The channel answered with any other status; `decision` is the hook's.
    Rejected {
        response: ActivityResponse,
        decision: RetryDecision,
    },
    /// The channel adapter failed.
    TransportFailed(ProtocolError),
    /// The backoff delay is over.
    BackoffElapsed,
}

impl ExecutionEvent {
    fn name(&self) -> &'static str {
        match self {
            ExecutionEvent::Accepted(_) => "Accepted",
            ExecutionEvent::Rejected { .. } => "Rejected",
            ExecutionEvent::TransportFailed(_) => "TransportFailed",
            ExecutionEvent::BackoffElapsed => "BackoffElapsed",
        }
    }
}

/// An event that does not apply to the current state.
#[derive(Debug)]
pub struct InvalidTransition {
    pub from: &'static str,
    pub event: &'static str,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid execution transition: {} on {}", self.event, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

/// Apply `event` to `state`.
///
/// Going from `Sending` to `Retrying` bumps `request.attempt_number`; nothing
/// else touches the request. A retry is only granted while the bumped number
/// stays below the policy's maximum.
pub fn transition(
    state: ExecutionState,
    event: ExecutionEvent,
    request: &mut ActivityRequest,
    policy: &RetryPolicy,
) -> Result<ExecutionState, InvalidTransition> {
    match (state, event) {
        (ExecutionState::Sending, ExecutionEvent::Accepted(response)) => {
            Ok(ExecutionState::Succeeded(response))
        }
        (ExecutionState::Sending, ExecutionEvent::Rejected { response, decision }) => {
            match decision.delay(policy.default_retry_delay) {
                Some(delay) if policy.allows_retry(request) => {
                    request.next_attempt();
                    Ok(ExecutionState::Retrying { delay })
                }
                _ => Ok(ExecutionState::GivenUp(response)),
            }
        }
        (ExecutionState::Sending, ExecutionEvent::TransportFailed(error)) => {
            Ok(ExecutionState::Aborted(error))
        }
        (ExecutionState::Retrying { .. }, ExecutionEvent::BackoffElapsed) => {
            Ok(ExecutionState::Sending)
        }
        (state, event) => Err(InvalidTransition {
            from: state.name(),
            event: event.name(),
        }),
    }
}

/// How an invocation ended, when it did not fail.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The prepare hook vetoed the request; nothing was sent.
    Vetoed,
    /// The channel answered with a message, shown to the user.
    MessageShown(String),
    /// The channel answered with a card, handed to the card replacer.
    CardUpdated(CardChange),
    /// The channel answered with a card the replacer refused. The previous
    /// card stays on screen.
    CardRejected(AppletError),
    /// The channel asked the user to sign in; a login popup was opened.
    LoginRequested(Url),
}

/// Runs invocation sequences against a channel.
pub struct ActivityExecutor {
    channel: Arc<dyn ChannelAdapter>,
    surface: Arc<dyn Surface>,
    hooks: Arc<dyn AppletHooks>,
    policy: RetryPolicy,
    auth_prompt: AuthPromptConfig,
}

impl ActivityExecutor {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        surface: Arc<dyn Surface>,
        hooks: Arc<dyn AppletHooks>,
        policy: RetryPolicy,
        auth_prompt: AuthPromptConfig,
    ) -> Self {
        Self {
            channel,
            surface,
            hooks,
            policy,
            auth_prompt,
        }
    }

    /// Run one invocation sequence to completion.
    ///
    /// The progress overlay is attached before the first send and detached
    /// exactly once when the sequence ends. Card results are passed to
    /// `on_card`; messages and login prompts go to the surface.
    pub async fn execute<F>(&self, mut request: ActivityRequest, on_card: F) -> AppletResult<ExecutionOutcome>
    where
        F: FnOnce(Value) -> ExecutionOutcome + Send,
    {
        let overlay = self
            .hooks
            .create_progress_overlay(request.context)
            .unwrap_or_else(|| ProgressOverlay::spinner(request.context));
        let overlay = OverlayGuard::attach(self.surface.clone(), overlay);

        match self.drive(&mut request).await? {
            ExecutionState::Succeeded(response) => {
                tracing::info!(
                    attempts = request.attempt_count(),
                    "Activity request succeeded"
                );
                let outcome = self.dispatch(&response.content, on_card);
                overlay.release();
                outcome
            }
            ExecutionState::GivenUp(response) => {
                tracing::warn!(
                    attempts = request.attempt_count(),
                    "Activity request failed. Giving up"
                );
                overlay.release();
                self.surface.alert(&response.content);
                Err(AppletError::RetriesExhausted {
                    attempts: request.attempt_count(),
                    content: response.content,
                })
            }
            ExecutionState::Aborted(error) => {
                tracing::error!(
                    attempt = request.attempt_count(),
                    %error,
                    "Activity request failed"
                );
                overlay.release();
                self.surface.alert(&format!("Something went wrong: {error}"));
                Err(AppletError::Transport(error))
            }
            state => Err(InvalidTransition {
                from: state.name(),
                event: "end of sequence",
            }
            .into()),
        }
    }

    /// Send attempts until the sequence reaches a terminal state.
    async fn drive(&self, request: &mut ActivityRequest) -> AppletResult<ExecutionState> {
        let mut state = ExecutionState::Sending;

        while !state.is_terminal() {
            let event = match &state {
                ExecutionState::Retrying { delay } => {
                    tokio::time::sleep(*delay).await;
                    ExecutionEvent::BackoffElapsed
                }
                _ => {
                    tracing::info!(
                        attempt = request.attempt_count(),
                        "Sending activity request to channel"
                    );
                    match self.channel.send(request).await {
                        Ok(response) if response.is_success() => ExecutionEvent::Accepted(response),
                        Ok(response) => {
                            let decision = self.hooks.request_completed(&response);
                            ExecutionEvent::Rejected { response, decision }
                        }
                        Err(error) => ExecutionEvent::TransportFailed(error),
                    }
                }
            };

            state = transition(state, event, request, &self.policy)?;

            if let ExecutionState::Retrying { delay } = &state {
                tracing::info!(
                    next_attempt = request.attempt_count(),
                    delay_ms = delay.as_millis() as u64,
                    "Activity request failed. Retrying"
                );
            }
        }

        Ok(state)
    }

    /// Act on the content of a successful response.
    fn dispatch<F>(&self, content: &str, on_card: F) -> AppletResult<ExecutionOutcome>
    where
        F: FnOnce(Value) -> ExecutionOutcome,
    {
        match classify(content)? {
            ActivityResult::Message(text) => {
                self.surface.alert(&text);
                Ok(ExecutionOutcome::MessageShown(text))
            }
            ActivityResult::Card(payload) => Ok(on_card(payload)),
            ActivityResult::Unauthorized { login_url } => {
                let popup = auth::prompt_login(self.surface.as_ref(), &login_url, self.auth_prompt)?;
                Ok(ExecutionOutcome::LoginRequested(popup.url))
            }
        }
    }
}
