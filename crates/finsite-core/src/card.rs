use crate::chart::escape_text;
use crate::model::PriceSnapshot;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, trace};

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Card state
//
////////////////////////////////////////////////////////////////////////////////////////////////////

/// What the realtime price card shows.
///
/// A failed poll keeps the last good snapshot next to the error message; the next
/// successful poll clears the error.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CardState {
    #[default]
    Loading,
    Ready(PriceSnapshot),
    Errored {
        last: Option<PriceSnapshot>,
        message: String,
    },
}

impl CardState {
    pub fn succeed(&self, snapshot: PriceSnapshot) -> CardState {
        CardState::Ready(snapshot)
    }

    pub fn fail(&self, message: impl Into<String>) -> CardState {
        CardState::Errored {
            last: self.snapshot().cloned(),
            message: message.into(),
        }
    }

    /// Apply the outcome of one poll.
    pub fn apply(&self, result: anyhow::Result<PriceSnapshot>) -> CardState {
        match result {
            Ok(snapshot) => self.succeed(snapshot),
            Err(e) => self.fail(format!("{e:#}")),
        }
    }

    pub fn snapshot(&self) -> Option<&PriceSnapshot> {
        match self {
            CardState::Loading => None,
            CardState::Ready(snapshot) => Some(snapshot),
            CardState::Errored { last, .. } => last.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CardState::Errored { message, .. } => Some(message),
            _ => None,
        }
    }

    /// HTML fragment of the card.
    pub fn render_html(&self) -> String {
        let mut html = String::from(
            "<div class='price-card' style='margin-top: 16px; padding: 12px; border: 1px solid #444'>\n  <h2>Realtime price</h2>\n",
        );
        if let Some(message) = self.error() {
            html.push_str(&format!(
                "  <p class='price-card-error' style='color: tomato'>{}</p>\n",
                escape_text(message)
            ));
        }
        match self.snapshot() {
            Some(s) => html.push_str(&format!(
                "  <p class='price-card-value'>{} @ {}</p>\n",
                s.price,
                escape_text(&s.ts.to_string())
            )),
            None => html.push_str("  <p class='price-card-value'>Loading…</p>\n"),
        }
        html.push_str("</div>");
        html
    }
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.snapshot() {
            Some(s) => write!(f, "{} @ {}", s.price, s.ts)?,
            None => f.write_str("Loading…")?,
        }
        if let Some(message) = self.error() {
            write!(f, " (error: {message})")?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Polling
//
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Anything that can fetch the latest price of a ticker.
pub trait PriceSource: Send + Sync + 'static {
    fn fetch_price(
        &self,
        ticker: &str,
    ) -> impl Future<Output = anyhow::Result<PriceSnapshot>> + Send;
}

/// Realtime price card: polls a [`PriceSource`] on a fixed interval while mounted.
///
/// Every request is numbered when it is issued and the card only ever moves forward:
/// a response that resolves after a newer one has been applied is dropped, so the last
/// issued request wins. Unmounting (or dropping) the card stops the loop, aborts
/// outstanding requests and guarantees that no result lands afterwards.
pub struct PriceCard {
    ticker: String,
    state: Arc<watch::Sender<CardState>>,
    alive: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl PriceCard {
    /// Start polling. The first request goes out immediately. Must be called from
    /// within a tokio runtime.
    pub fn mount<S: PriceSource>(
        source: Arc<S>,
        ticker: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let ticker = ticker.into();
        let (tx, _) = watch::channel(CardState::Loading);
        let state = Arc::new(tx);
        let alive = Arc::new(AtomicBool::new(true));

        debug!("[{ticker}] price card mounted, polling every {} ms", interval.as_millis());
        let task = tokio::spawn(poll(
            source,
            ticker.clone(),
            interval,
            state.clone(),
            alive.clone(),
        ));

        PriceCard {
            ticker,
            state,
            alive,
            task: Some(task),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn state(&self) -> CardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CardState> {
        self.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Stop polling. Idempotent.
    pub fn unmount(&mut self) {
        // flipping the flag under the channel lock orders it against any in-progress update
        let alive = &self.alive;
        self.state.send_if_modified(|_| {
            alive.store(false, Ordering::SeqCst);
            false
        });

        if let Some(task) = self.task.take() {
            task.abort();
            debug!("[{}] price card unmounted", self.ticker);
        }
    }
}

impl Drop for PriceCard {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn poll<S: PriceSource>(
    source: Arc<S>,
    ticker: String,
    period: Duration,
    state: Arc<watch::Sender<CardState>>,
    alive: Arc<AtomicBool>,
) {
    let ticker: Arc<str> = Arc::from(ticker);
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // dropped with this task on unmount, which aborts whatever is still in flight
    let mut inflight = JoinSet::new();
    let mut issued: u64 = 0;
    let mut applied: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                issued += 1;
                let seq = issued;
                let source = source.clone();
                let ticker = ticker.clone();
                trace!("[{ticker}] issuing price request #{seq}");
                inflight.spawn(async move {
                    let result = source.fetch_price(&ticker).await;
                    (seq, result)
                });
            }

            Some(joined) = inflight.join_next() => {
                let (seq, result) = match joined {
                    Ok(out) => out,
                    Err(e) => {
                        error!("[{ticker}] price request task failed: {e}");
                        continue;
                    }
                };

                if seq <= applied {
                    debug!("[{ticker}] dropping stale response #{seq} (already at #{applied})");
                    continue;
                }
                applied = seq;

                if let Err(e) = &result {
                    error!("[{ticker}] price fetch failed: {e:#}");
                }

                let alive = &alive;
                let updated = state.send_if_modified(|current| {
                    if !alive.load(Ordering::SeqCst) {
                        return false;
                    }
                    *current = current.apply(result);
                    true
                });
                if !updated {
                    trace!("[{ticker}] card unmounted, response #{seq} discarded");
                    return;
                }
            }
        }
    }
}
