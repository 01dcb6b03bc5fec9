//! The assistant controller: the ask/answer state machine behind the widget.
//!
//! ```text
//!            submit("")                 submit(q)
//!   Initial ───────────> EmptyQuestion ─────────> Thinking{1..3} ──ok──> Answer(text)
//!      │                                              │
//!      │ no knowledge                                 └───err──> ServiceError
//!      v
//!   ConfigError (inert forever)
//! ```
//!
//! Every submit takes a strictly increasing sequence number.  Only the latest
//! one may touch the display: a result arriving for an older cycle is
//! dropped, and an empty question supersedes whatever was in flight.  The thinking ticker belongs to
//! its cycle and is stopped on every exit path, including the cycle future
//! being dropped mid-call.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, error, info, warn};

use crate::completion::Completion;
use crate::config::WidgetConfig;
use crate::knowledge::KnowledgeBase;
use crate::prompt::build_prompt;

/// How often the thinking indicator advances.
pub const THINKING_INTERVAL: Duration = Duration::from_millis(500);

/// Loading phrase shown while a completion is in flight; 1-3 dots follow it.
pub const THINKING_TEXT: &str = "Looking up the answer to your question";

/// Shown when the user submits an empty question.
pub const EMPTY_QUESTION_TEXT: &str = "Please enter your question first.";

/// Shown when the completion service fails for any reason.
pub const SERVICE_ERROR_TEXT: &str = "An error occurred while connecting to the AI service.";

/// Shown when the assistant was started without a knowledge base.
pub const CONFIG_ERROR_TEXT: &str = "Configuration Error: The knowledge base is missing. \
Please define it in your configuration file.";

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// What the answer area currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerView {
    /// The configured greeting, before any question.
    Initial(String),
    /// Waiting for the completion service.
    Thinking { dots: u8 },
    /// The completion text, verbatim.
    Answer(String),
    /// The user submitted nothing.
    EmptyQuestion,
    /// The completion service failed.
    ServiceError,
    /// No knowledge base was configured.
    ConfigError,
}

impl AnswerView {
    /// Stable lowercase tag for wire formats.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Initial(_) => "initial",
            Self::Thinking { .. } => "thinking",
            Self::Answer(_) => "answer",
            Self::EmptyQuestion => "empty_question",
            Self::ServiceError => "service_error",
            Self::ConfigError => "config_error",
        }
    }

    /// The text to put in the answer area.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Initial(text) | Self::Answer(text) => Cow::Borrowed(text),
            Self::Thinking { dots } => {
                Cow::Owned(format!("{THINKING_TEXT}{}", ".".repeat(usize::from(*dots))))
            }
            Self::EmptyQuestion => Cow::Borrowed(EMPTY_QUESTION_TEXT),
            Self::ServiceError => Cow::Borrowed(SERVICE_ERROR_TEXT),
            Self::ConfigError => Cow::Borrowed(CONFIG_ERROR_TEXT),
        }
    }
}

/// How a call to [`AssistantController::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The assistant has no knowledge base; nothing happened.
    Inert,
    /// The question was empty; no completion was requested.
    EmptyQuestion,
    /// The answer was displayed.
    Answered,
    /// The completion failed and the generic error was displayed.
    Failed,
    /// A newer cycle started before this one settled; its result was dropped.
    Superseded,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// State shared between the controller and its thinking ticker.
#[derive(Debug)]
struct Shared {
    display: watch::Sender<AnswerView>,
    slot: Mutex<CycleSlot>,
}

/// The latest cycle and its ticker.  Guarded together so that "is this still
/// the latest cycle?" and "update the display" happen atomically.
#[derive(Debug, Default)]
struct CycleSlot {
    latest: u64,
    ticker: Option<JoinHandle<()>>,
}

impl Shared {
    fn lock_slot(&self) -> MutexGuard<'_, CycleSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop the ticker of cycle `seq` and show `view`, unless a newer cycle
    /// owns the display.  Returns whether `seq` was still current.
    fn settle(&self, seq: u64, view: AnswerView) -> bool {
        let mut slot = self.lock_slot();
        if slot.latest != seq {
            return false;
        }
        if let Some(ticker) = slot.ticker.take() {
            ticker.abort();
        }
        self.display.send_replace(view);
        true
    }
}

/// Drives one widget: validates setup, owns the display, runs ask cycles.
pub struct AssistantController {
    config: WidgetConfig,
    knowledge: Option<KnowledgeBase>,
    completion: Arc<dyn Completion>,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for AssistantController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantController")
            .field("config", &self.config)
            .field("facts", &self.knowledge.as_ref().map_or(0, KnowledgeBase::len))
            .field("display", &*self.shared.display.borrow())
            .finish_non_exhaustive()
    }
}

impl AssistantController {
    /// Build a controller.
    ///
    /// `config` may be a [`PartialWidgetConfig`](crate::config::PartialWidgetConfig)
    /// (merged over the defaults) or an already effective [`WidgetConfig`].
    /// When `facts` is absent or empty the controller starts in
    /// [`AnswerView::ConfigError`] and ignores every submit.
    pub fn new(
        config: impl Into<WidgetConfig>,
        facts: Option<Vec<String>>,
        completion: Arc<dyn Completion>,
    ) -> Self {
        let config = config.into();
        let (knowledge, initial) = match KnowledgeBase::new(facts) {
            Ok(kb) => {
                debug!(facts = kb.len(), "assistant ready");
                let greeting = AnswerView::Initial(config.initial_answer_text.clone());
                (Some(kb), greeting)
            }
            Err(e) => {
                error!(error = %e, "assistant disabled: no knowledge base configured");
                (None, AnswerView::ConfigError)
            }
        };

        let (display, _) = watch::channel(initial);
        Self {
            config,
            knowledge,
            completion,
            shared: Arc::new(Shared {
                display,
                slot: Mutex::new(CycleSlot::default()),
            }),
        }
    }

    /// The effective widget configuration.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// The knowledge base, or `None` when the controller is inert.
    pub fn knowledge(&self) -> Option<&KnowledgeBase> {
        self.knowledge.as_ref()
    }

    /// Whether setup failed and the controller ignores all input.
    pub fn is_inert(&self) -> bool {
        self.knowledge.is_none()
    }

    /// Snapshot of the answer area.
    pub fn display(&self) -> AnswerView {
        self.shared.display.borrow().clone()
    }

    /// Watch the answer area for changes.
    pub fn subscribe(&self) -> watch::Receiver<AnswerView> {
        self.shared.display.subscribe()
    }

    /// Run one ask/answer cycle for `question`.
    ///
    /// Never fails: completion errors are logged and shown as
    /// [`AnswerView::ServiceError`].  Concurrent calls are allowed; only the
    /// most recently started cycle updates the display when it settles.
    ///
    /// A question that is empty or only whitespace is treated as empty: it
    /// shows [`AnswerView::EmptyQuestion`] without calling the completion
    /// and supersedes any cycle still in flight.
    pub async fn submit(&self, question: &str) -> CycleOutcome {
        let Some(knowledge) = &self.knowledge else {
            debug!("submit ignored: assistant is inert");
            return CycleOutcome::Inert;
        };

        if question.trim().is_empty() {
            let mut slot = self.shared.lock_slot();
            slot.latest += 1;
            if let Some(ticker) = slot.ticker.take() {
                ticker.abort();
            }
            self.shared.display.send_replace(AnswerView::EmptyQuestion);
            debug!(seq = slot.latest, "empty question");
            return CycleOutcome::EmptyQuestion;
        }

        let guard = self.begin_cycle();
        let seq = guard.seq;
        info!(seq, question_len = question.len(), "ask cycle started");

        let prompt = build_prompt(knowledge, question);
        let result = self.completion.complete(&prompt).await;

        let (view, outcome) = match result {
            Ok(text) => (AnswerView::Answer(text), CycleOutcome::Answered),
            Err(e) => {
                error!(seq, error = %e, "AI service error");
                (AnswerView::ServiceError, CycleOutcome::Failed)
            }
        };

        if self.shared.settle(seq, view) {
            debug!(seq, outcome = ?outcome, "ask cycle settled");
            outcome
        } else {
            debug!(seq, "discarding result of superseded ask cycle");
            CycleOutcome::Superseded
        }
    }

    /// Open a new cycle: bump the sequence, replace any running ticker, show
    /// the first thinking frame, and start ticking.
    fn begin_cycle(&self) -> ThinkingGuard {
        let mut slot = self.shared.lock_slot();
        slot.latest += 1;
        let seq = slot.latest;

        if let Some(previous) = slot.ticker.take() {
            debug!(seq, "stopping thinking indicator of previous cycle");
            previous.abort();
        }

        self.shared.display.send_replace(AnswerView::Thinking { dots: 1 });
        slot.ticker = Some(tokio::spawn(tick_thinking(Arc::clone(&self.shared), seq)));

        ThinkingGuard {
            shared: Arc::clone(&self.shared),
            seq,
        }
    }
}

/// Stops the ticker of its cycle when dropped, if that cycle is still the
/// latest and has not settled.
struct ThinkingGuard {
    shared: Arc<Shared>,
    seq: u64,
}

impl Drop for ThinkingGuard {
    fn drop(&mut self) {
        let mut slot = self.shared.lock_slot();
        if slot.latest == self.seq
            && let Some(ticker) = slot.ticker.take()
        {
            warn!(seq = self.seq, "ask cycle abandoned before settling");
            ticker.abort();
        }
    }
}

/// Advance the dots 1 -> 2 -> 3 -> 1 every [`THINKING_INTERVAL`] until the
/// cycle stops being current.
async fn tick_thinking(shared: Arc<Shared>, seq: u64) {
    let mut ticks = interval_at(Instant::now() + THINKING_INTERVAL, THINKING_INTERVAL);
    let mut dots: u8 = 1;

    loop {
        ticks.tick().await;
        dots = dots % 3 + 1;

        let slot = shared.lock_slot();
        if slot.latest != seq || slot.ticker.is_none() {
            return;
        }
        shared.display.send_replace(AnswerView::Thinking { dots });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
