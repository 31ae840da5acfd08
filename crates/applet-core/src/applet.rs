//! Applet — the card on screen and the actions it runs.
//!
//! [`Applet::set_card`] is the card replacer: it expands, parses and mounts a
//! payload, then starts the card's auto-refresh. [`Applet::execute_action`]
//! runs one invocation sequence through the [`ActivityExecutor`].

use std::sync::{Arc, Weak};

use applet_protocol::{
    Action, AppletCard, CardParser, ChannelAdapter, ExecuteAction, InvocationContext,
    JsonCardParser,
};
use arc_swap::ArcSwapOption;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AppletConfig, AuthPromptConfig};
use crate::error::{AppletError, AppletResult};
use crate::executor::{ActivityExecutor, ExecutionOutcome, RetryPolicy};
use crate::hooks::{AppletHooks, DefaultHooks};
use crate::request::build_request;
use crate::session::{AppletSession, CardPayload};
use crate::surface::Surface;
use crate::template::{PathTemplateEngine, TemplateEngine};

/// Handle to a running auto-refresh sequence.
pub type AutoRefreshHandle = JoinHandle<AppletResult<ExecutionOutcome>>;

/// What `set_card` did.
#[derive(Debug)]
pub enum CardChange {
    /// The new card is on screen.
    Swapped {
        app_id: String,
        /// The auto-refresh sequence the card started, if it declares one.
        auto_refresh: Option<AutoRefreshHandle>,
    },
    /// The card-changing hook refused the new card.
    Vetoed,
    /// Data arrived before any card template; nothing changed.
    NoTemplate,
}

impl CardChange {
    pub fn is_swapped(&self) -> bool {
        matches!(self, CardChange::Swapped { .. })
    }
}

/// A card payload expanded and parsed, not yet on screen.
#[derive(Debug, Clone)]
pub struct PreparedCard {
    pub card: AppletCard,
    pub app_id: String,
    /// The card template, without `$data`.
    pub template: Value,
    /// Data the template was expanded with.
    pub data: Option<Value>,
}

/// Expand and parse `payload` the way [`Applet::set_card`] does, without
/// mounting it.
///
/// A data-only payload borrows its template from `current`; with no current
/// session it yields `Ok(None)`.
pub fn prepare_card(
    payload: Value,
    current: Option<&AppletSession>,
    templates: &dyn TemplateEngine,
    parser: &dyn CardParser,
) -> AppletResult<Option<PreparedCard>> {
    let Some((template, data)) = CardPayload::from_value(payload)?.resolve(current) else {
        return Ok(None);
    };

    let expanded = match &data {
        Some(root) => templates.expand(&template, root)?,
        None => template.clone(),
    };

    let card = parser.parse(&expanded).map_err(AppletError::CardParse)?;
    let app_id = card.app_id().ok_or(AppletError::MissingAppId)?.to_string();

    Ok(Some(PreparedCard {
        card,
        app_id,
        template,
        data,
    }))
}

/// An adaptive applet bound to one surface.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct Applet {
    inner: Arc<AppletInner>,
}

struct AppletInner {
    channel: Option<Arc<dyn ChannelAdapter>>,
    surface: Arc<dyn Surface>,
    hooks: Arc<dyn AppletHooks>,
    parser: Arc<dyn CardParser>,
    templates: Arc<dyn TemplateEngine>,
    policy: RetryPolicy,
    auth_prompt: AuthPromptConfig,
    user_id: Option<String>,
    session: ArcSwapOption<AppletSession>,
    /// Held for the whole of an invocation sequence.
    gate: tokio::sync::Mutex<()>,
}

impl Applet {
    /// Start building an applet that draws on `surface`.
    pub fn builder(surface: Arc<dyn Surface>) -> AppletBuilder {
        AppletBuilder::new(surface)
    }

    /// The displayed card.
    pub fn card(&self) -> Option<Arc<AppletCard>> {
        self.session().map(|s| s.card.clone())
    }

    /// The current session.
    pub fn session(&self) -> Option<Arc<AppletSession>> {
        self.inner.session.load_full()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.inner.user_id.as_deref()
    }

    pub fn has_channel(&self) -> bool {
        self.inner.channel.is_some()
    }

    /// An invoker for actions of the displayed card.
    pub fn invoker(&self) -> Option<ActionInvoker> {
        let app_id = self.session()?.app_id()?.to_string();
        Some(ActionInvoker {
            applet: Arc::downgrade(&self.inner),
            app_id,
        })
    }

    /// Replace the displayed card.
    ///
    /// `payload` is either a card template (its `$data`, if any, is the bound
    /// data) or a bare data object for the current template. On any error the
    /// previous card stays on screen and the session is unchanged.
    ///
    /// Auto-refresh runs on the current tokio runtime; without one it is
    /// skipped with a warning.
    pub fn set_card(&self, payload: Value) -> AppletResult<CardChange> {
        let current = self.inner.session.load_full();
        let Some(prepared) = prepare_card(
            payload,
            current.as_deref(),
            self.inner.templates.as_ref(),
            self.inner.parser.as_ref(),
        )?
        else {
            tracing::debug!("Card data received before any card template");
            return Ok(CardChange::NoTemplate);
        };
        let PreparedCard {
            card,
            app_id,
            template,
            data,
        } = prepared;

        if self.inner.hooks.card_changing(&template).is_veto() {
            tracing::info!(%app_id, "Card change vetoed by hook");
            return Ok(CardChange::Vetoed);
        }

        let invoker = ActionInvoker {
            applet: Arc::downgrade(&self.inner),
            app_id: app_id.clone(),
        };
        self.inner
            .surface
            .mount(&card, invoker)
            .map_err(AppletError::Render)?;

        let refresh = card.auto_refresh.as_ref().map(|r| r.action.clone());
        self.inner.session.store(Some(Arc::new(AppletSession {
            card: Arc::new(card),
            payload: template,
            data,
        })));
        tracing::info!(%app_id, auto_refresh = refresh.is_some(), "Card swapped");

        let auto_refresh = refresh.and_then(|action| self.spawn_auto_refresh(&app_id, action));
        self.inner.hooks.card_changed();

        Ok(CardChange::Swapped {
            app_id,
            auto_refresh,
        })
    }

    fn spawn_auto_refresh(&self, app_id: &str, action: ExecuteAction) -> Option<AutoRefreshHandle> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!(app_id, "No async runtime; auto-refresh skipped");
                return None;
            }
        };

        let applet = self.clone();
        let app_id = app_id.to_string();
        Some(runtime.spawn(async move {
            applet
                .execute_action(&app_id, &Action::Execute(action), InvocationContext::AutoRefresh)
                .await
        }))
    }

    /// Run `action` as one invocation sequence.
    ///
    /// Sequences of the same applet run one at a time, in call order. The
    /// request is built, and the prepare hook called, once it is this
    /// sequence's turn.
    pub async fn execute_action(
        &self,
        app_id: &str,
        action: &Action,
        context: InvocationContext,
    ) -> AppletResult<ExecutionOutcome> {
        let Some(execute) = action.as_execute() else {
            return Err(AppletError::UnsupportedAction(action.type_name().into()));
        };
        let channel = self
            .inner
            .channel
            .clone()
            .ok_or(AppletError::NoChannelAdapter)?;

        let span = tracing::info_span!(
            "activity_sequence",
            sequence = %Uuid::new_v4(),
            app_id,
            %context,
        );

        async move {
            let _turn = self.inner.gate.lock().await;

            let Some(request) = build_request(app_id, execute, context, self.inner.hooks.as_ref())
            else {
                return Ok(ExecutionOutcome::Vetoed);
            };

            let executor = ActivityExecutor::new(
                channel,
                self.inner.surface.clone(),
                self.inner.hooks.clone(),
                self.inner.policy,
                self.inner.auth_prompt,
            );
            let applet = self.clone();
            executor
                .execute(request, move |payload| applet.apply_result_card(payload))
                .await
        }
        .instrument(span)
        .await
    }

    fn apply_result_card(&self, payload: Value) -> ExecutionOutcome {
        match self.set_card(payload) {
            Ok(change) => ExecutionOutcome::CardUpdated(change),
            Err(error) => {
                tracing::error!(%error, "Card returned by the channel was rejected");
                ExecutionOutcome::CardRejected(error)
            }
        }
    }
}

impl std::fmt::Debug for Applet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applet")
            .field("has_channel", &self.has_channel())
            .field("policy", &self.inner.policy)
            .field("app_id", &self.session().and_then(|s| s.app_id().map(str::to_owned)))
            .finish_non_exhaustive()
    }
}

/// Executes actions on behalf of a rendered card.
///
/// Holds a weak reference: a surface keeping its invoker does not keep the
/// applet alive.
#[derive(Debug, Clone)]
pub struct ActionInvoker {
    applet: Weak<AppletInner>,
    app_id: String,
}

impl ActionInvoker {
    /// `appId` of the card this invoker was mounted with.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Run `action` as a user interaction and wait for the outcome.
    pub async fn execute(&self, action: &Action) -> AppletResult<ExecutionOutcome> {
        let inner = self.applet.upgrade().ok_or(AppletError::Detached)?;
        Applet { inner }
            .execute_action(&self.app_id, action, InvocationContext::UserInteraction)
            .await
    }

    /// Run `action` in the background, as a click handler would.
    ///
    /// Fails with [`AppletError::NoRuntime`] when called outside a tokio
    /// runtime.
    pub fn invoke(
        &self,
        action: Action,
    ) -> AppletResult<JoinHandle<AppletResult<ExecutionOutcome>>> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| AppletError::NoRuntime)?;
        let invoker = self.clone();
        Ok(runtime.spawn(async move { invoker.execute(&action).await }))
    }
}

/// Builder for [`Applet`].
pub struct AppletBuilder {
    surface: Arc<dyn Surface>,
    channel: Option<Arc<dyn ChannelAdapter>>,
    hooks: Arc<dyn AppletHooks>,
    parser: Arc<dyn CardParser>,
    templates: Arc<dyn TemplateEngine>,
    policy: RetryPolicy,
    auth_prompt: AuthPromptConfig,
    user_id: Option<String>,
}

impl AppletBuilder {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            channel: None,
            hooks: Arc::new(DefaultHooks),
            parser: Arc::new(JsonCardParser),
            templates: Arc::new(PathTemplateEngine),
            policy: RetryPolicy::default(),
            auth_prompt: AuthPromptConfig::default(),
            user_id: None,
        }
    }

    pub fn channel(mut self, channel: Arc<dyn ChannelAdapter>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn AppletHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn parser(mut self, parser: Arc<dyn CardParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn templates(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = templates;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn auth_prompt(mut self, auth_prompt: AuthPromptConfig) -> Self {
        self.auth_prompt = auth_prompt;
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Take retry, login prompt and user settings from `config`.
    pub fn config(mut self, config: &AppletConfig) -> Self {
        self.policy = RetryPolicy::from(&config.retry);
        self.auth_prompt = config.auth_prompt;
        if let Some(user_id) = &config.user_id {
            self.user_id = Some(user_id.clone());
        }
        self
    }

    pub fn build(self) -> Applet {
        Applet {
            inner: Arc::new(AppletInner {
                channel: self.channel,
                surface: self.surface,
                hooks: self.hooks,
                parser: self.parser,
                templates: self.templates,
                policy: self.policy,
                auth_prompt: self.auth_prompt,
                user_id: self.user_id,
                session: ArcSwapOption::empty(),
                gate: tokio::sync::Mutex::new(()),
            }),
        }
    }
}
