//! Flow controller: one offer session from start to exhaustion. Drives the
//! network steps, interprets responses, hands offer payloads to the
//! composer, and funnels every failure through a single error path so a
//! background problem never reaches the host as anything worse than a
//! callback message or a cleared surface.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::FlowError;
use crate::host::HostSurface;
use crate::render::composer::{compose, Composition, StyleContext};
use crate::render::node::DispatchRule;
use crate::render::visual::Action;
use crate::theme::FlowTheme;
use crate::transport::Transport;
use crate::wire::{parse_envelope, server_error, Envelope, Placement, RenderMode, ServerDirective};

/// Construction-time configuration. Palette and dispatch rule are per
/// controller, never process-wide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowConfig {
    pub theme: FlowTheme,
    pub dispatch: DispatchRule,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    Starting,
    /// Flow is live, no offer currently on the surface.
    BetweenOffers,
    /// Flow is live with an offer on the surface.
    OfferShown,
    /// No further offer; the surface has been cleared.
    Exhausted,
}

impl FlowState {
    pub fn is_active(self) -> bool {
        matches!(self, FlowState::BetweenOffers | FlowState::OfferShown)
    }
}

type ErrorCallback = Arc<dyn Fn(String) + Send + Sync>;
type RenderModeCallback = Arc<dyn Fn(RenderMode) + Send + Sync>;

#[derive(Default)]
struct Session {
    integration_id: String,
    placement: Placement,
    params: BTreeMap<String, String>,
    flow_id: String,
}

struct Inner<T, H> {
    transport: T,
    host: H,
    config: FlowConfig,
    state: Mutex<FlowState>,
    session: Mutex<Session>,
    directive: Mutex<Option<ServerDirective>>,
    theme: Mutex<FlowTheme>,
    /// Forward pointer from the most recent response; consumed by the next
    /// advance.
    next_offer: Mutex<Option<String>>,
    /// One-shot guard armed per shown screen; the first advancing click
    /// disarms it, so a double-tap cannot issue a second advance.
    advance_armed: AtomicBool,
    /// Set on view teardown; every continuation checks it and becomes a
    /// no-op afterwards.
    detached: AtomicBool,
    /// Serializes start/advance so a step's UI update lands before the next
    /// step is issued.
    step: tokio::sync::Mutex<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    on_error: Mutex<Option<ErrorCallback>>,
    on_render_mode: Mutex<Option<RenderModeCallback>>,
}

/// The offer session state machine. Cheap to clone; clones share the session.
pub struct FlowController<T, H> {
    inner: Arc<Inner<T, H>>,
}

impl<T, H> Clone for FlowController<T, H> {
    fn clone(&self) -> Self {
        FlowController {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Transport, H: HostSurface> FlowController<T, H> {
    pub fn new(config: FlowConfig, transport: T, host: H) -> Self {
        let theme = config.theme.clone();
        FlowController {
            inner: Arc::new(Inner {
                transport,
                host,
                config,
                state: Mutex::new(FlowState::Idle),
                session: Mutex::new(Session::default()),
                directive: Mutex::new(None),
                theme: Mutex::new(theme),
                next_offer: Mutex::new(None),
                advance_armed: AtomicBool::new(false),
                detached: AtomicBool::new(false),
                step: tokio::sync::Mutex::new(()),
                tasks: Mutex::new(Vec::new()),
                on_error: Mutex::new(None),
                on_render_mode: Mutex::new(None),
            }),
        }
    }

    /// Called with a human-readable message whenever a network step fails.
    pub fn set_on_error(&self, callback: impl Fn(String) + Send + Sync + 'static) {
        *self.inner.on_error.lock().unwrap() = Some(Arc::new(callback));
    }

    /// Called once, when the server states the flow's render mode.
    pub fn set_on_render_mode(&self, callback: impl Fn(RenderMode) + Send + Sync + 'static) {
        *self.inner.on_render_mode.lock().unwrap() = Some(Arc::new(callback));
    }

    pub fn state(&self) -> FlowState {
        *self.inner.state.lock().unwrap()
    }

    pub fn flow_id(&self) -> String {
        self.inner.session.lock().unwrap().flow_id.clone()
    }

    pub fn optional_params(&self) -> BTreeMap<String, String> {
        self.inner.session.lock().unwrap().params.clone()
    }

    /// Kick off the flow in the background. Must be called on a tokio
    /// runtime; `start` is the awaitable equivalent.
    pub fn initiate_view(
        &self,
        integration_id: impl Into<String>,
        placement: Placement,
        optional_params: BTreeMap<String, String>,
    ) {
        let controller = self.clone();
        let integration_id = integration_id.into();
        self.spawn_task(async move {
            controller
                .start(integration_id, placement, optional_params)
                .await;
        });
    }

    /// Create the flow and show its first offer. On failure the error is
    /// surfaced through the error callback and the controller returns to
    /// idle so the host may retry by starting again.
    pub async fn start(
        &self,
        integration_id: impl Into<String>,
        placement: Placement,
        optional_params: BTreeMap<String, String>,
    ) {
        let _step = self.inner.step.lock().await;
        if self.detached() {
            return;
        }

        {
            let mut session = self.inner.session.lock().unwrap();
            *session = Session {
                integration_id: integration_id.into(),
                placement,
                params: optional_params,
                flow_id: String::new(),
            };
            *self.inner.directive.lock().unwrap() = None;
            *self.inner.next_offer.lock().unwrap() = None;
            *self.inner.theme.lock().unwrap() = self.inner.config.theme.clone();
            *self.inner.state.lock().unwrap() = FlowState::Starting;
        }

        let (integration_id, placement, params) = {
            let session = self.inner.session.lock().unwrap();
            (
                session.integration_id.clone(),
                session.placement,
                session.params.clone(),
            )
        };

        let reply = match self
            .inner
            .transport
            .create_flow(&integration_id, placement, &params)
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                self.report(err);
                self.set_state(FlowState::Idle);
                return;
            }
        };
        if self.detached() {
            return;
        }

        if !reply.is_success() {
            self.report(server_error(reply.status, &reply.body));
            self.set_state(FlowState::Idle);
            return;
        }

        let envelope = match parse_envelope(&reply.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(%err, "treating flow response as no offer");
                self.clear_surface();
                self.set_state(FlowState::Idle);
                return;
            }
        };

        let Some(entry) = envelope.flow_entry() else {
            debug!("flow response carried no flow entry");
            self.clear_surface();
            self.set_state(FlowState::Idle);
            return;
        };

        let directive = ServerDirective::from_entry(entry);
        {
            let mut session = self.inner.session.lock().unwrap();
            session.flow_id = entry.id.clone();
            if !directive.personalization_allowed {
                session.params.remove("first_name");
            }
        }
        if let Some(color) = directive.highlight_color {
            self.inner.theme.lock().unwrap().primary = color;
        }
        *self.inner.directive.lock().unwrap() = Some(directive);
        if directive.render_mode_explicit {
            let callback = self.inner.on_render_mode.lock().unwrap().clone();
            if let Some(callback) = callback {
                callback(directive.render_mode);
            }
        }

        self.set_state(FlowState::BetweenOffers);
        *self.inner.next_offer.lock().unwrap() = envelope.links.next_offer.clone();
        self.step_advance().await;
    }

    /// React to a click the host forwarded from the composed tree.
    pub async fn submit(&self, action: Action) {
        if self.detached() {
            return;
        }
        match action {
            Action::Accept { to } => {
                if !self.disarm() {
                    return;
                }
                self.inner.host.open_link(&to);
                self.advance().await;
            }
            Action::Reject => {
                if !self.disarm() {
                    return;
                }
                self.advance().await;
            }
            Action::OpenLink { to } => self.inner.host.open_link(&to),
            Action::Dismiss => self.clear_surface(),
        }
    }

    /// `submit` for hosts whose click handlers cannot await.
    pub fn submit_detached(&self, action: Action) {
        let controller = self.clone();
        self.spawn_task(async move {
            controller.submit(action).await;
        });
    }

    /// Cancel everything on view teardown. In-flight steps are aborted and
    /// any continuation that still fires drops without touching the host.
    pub fn detach(&self) {
        self.inner.detached.store(true, Ordering::Release);
        for task in self.inner.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
    }

    async fn advance(&self) {
        let _step = self.inner.step.lock().await;
        self.step_advance().await;
    }

    /// Consume the pending forward pointer: no pointer means the flow is
    /// exhausted; otherwise fetch the next offer and show it. Assumes the
    /// step lock is held.
    async fn step_advance(&self) {
        if self.detached() {
            return;
        }

        let Some(url) = self.inner.next_offer.lock().unwrap().take() else {
            self.set_state(FlowState::Exhausted);
            self.clear_surface();
            return;
        };

        let (placement, params) = {
            let session = self.inner.session.lock().unwrap();
            (session.placement, session.params.clone())
        };

        let result = self
            .inner
            .transport
            .next_offer(&url, placement, &params)
            .await;
        if self.detached() {
            return;
        }

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                // Keep the pointer and re-arm so the host can retry the step.
                *self.inner.next_offer.lock().unwrap() = Some(url);
                self.inner.advance_armed.store(true, Ordering::Release);
                self.report(err);
                return;
            }
        };

        if !reply.is_success() {
            *self.inner.next_offer.lock().unwrap() = Some(url);
            self.inner.advance_armed.store(true, Ordering::Release);
            self.report(server_error(reply.status, &reply.body));
            return;
        }

        let envelope = match parse_envelope(&reply.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(%err, "treating offer response as no offer");
                self.clear_surface();
                return;
            }
        };

        self.show_offer(envelope);
    }

    /// Compose and display the offer carried by a response, then fire its
    /// view beacon. A response without a recognizable offer clears the
    /// surface instead.
    fn show_offer(&self, envelope: Envelope) {
        let screen = envelope
            .offer_entry()
            .and_then(|entry| entry.attributes.clone());
        let Some(screen) = screen else {
            self.clear_surface();
            *self.inner.next_offer.lock().unwrap() = envelope.links.next_offer.clone();
            return;
        };

        let directive = self.inner.directive.lock().unwrap().unwrap_or_default();
        let style = StyleContext {
            theme: self.inner.theme.lock().unwrap().clone(),
            render_mode: directive.render_mode,
            show_dismiss: directive.show_dismiss,
            dispatch: self.inner.config.dispatch,
        };

        let viewport = self.inner.host.viewport();
        let Composition { root, issues } = compose(&screen, &style, viewport);
        for issue in issues {
            self.report(issue);
        }

        if root.is_empty() {
            self.clear_surface();
            *self.inner.next_offer.lock().unwrap() = envelope.links.next_offer.clone();
            return;
        }

        if self.detached() {
            return;
        }
        self.inner.host.show(root);
        *self.inner.next_offer.lock().unwrap() = envelope.links.next_offer.clone();
        self.inner.advance_armed.store(true, Ordering::Release);
        self.set_state(FlowState::OfferShown);

        if let Some(beacon_url) = envelope.links.offer_event.clone() {
            self.fire_beacon(beacon_url);
        }
    }

    /// Fire-and-forget view beacon; the state machine never observes its
    /// outcome.
    fn fire_beacon(&self, url: String) {
        let controller = self.clone();
        self.spawn_task(async move {
            if controller.detached() {
                return;
            }
            match controller.inner.transport.offer_event(&url).await {
                Ok(reply) if reply.is_success() => debug!(%url, "view beacon delivered"),
                Ok(reply) => warn!(%url, status = reply.status, "view beacon rejected"),
                Err(err) => warn!(%url, %err, "view beacon failed"),
            }
        });
    }

    fn spawn_task(&self, future: impl std::future::Future<Output = ()> + Send + 'static) {
        let task = tokio::spawn(future);
        let mut tasks = self.inner.tasks.lock().unwrap();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    fn disarm(&self) -> bool {
        self.inner.advance_armed.swap(false, Ordering::AcqRel)
    }

    fn detached(&self) -> bool {
        self.inner.detached.load(Ordering::Acquire)
    }

    fn set_state(&self, state: FlowState) {
        *self.inner.state.lock().unwrap() = state;
    }

    fn clear_surface(&self) {
        if self.detached() {
            return;
        }
        self.inner.host.clear();
    }

    fn report(&self, err: FlowError) {
        if self.detached() {
            return;
        }
        warn!(%err, "offer flow error");
        let callback = self.inner.on_error.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(err.to_string());
        }
    }
}
