//! Call stack and call log panels fed by `tracing` spans.

use std::{
    collections::VecDeque,
    fmt::Write as _,
    sync::{Arc, Mutex},
};

use tracing::{span, Subscriber};
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

/// Number of entries retained by the call log.
pub const CALL_LOG_LEN: usize = 20;

/// Latest span stack plus a bounded history of entered spans.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallLog {
    stack: Vec<String>,
    log: VecDeque<String>,
}

impl CallLog {
    /// Creates an empty call log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records entry into the innermost span of `stack`, ordered root first.
    ///
    /// The stack replaces the previous one and its innermost name is appended
    /// to the log, evicting the oldest entry once the log is full.
    pub fn record(&mut self, stack: Vec<String>) {
        if let Some(innermost) = stack.last() {
            if self.log.len() == CALL_LOG_LEN {
                let _ = self.log.pop_front();
            }
            self.log.push_back(innermost.clone());
        }
        self.stack = stack;
    }

    /// Span names of the latest entry, root first.
    #[must_use]
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// Entered span names, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    /// Renders the call stack panel.
    #[must_use]
    pub fn format_stack(&self) -> String {
        panel("Call stack:", self.stack.iter().map(String::as_str))
    }

    /// Renders the call log panel.
    #[must_use]
    pub fn format_log(&self) -> String {
        panel("Call log:", self.log())
    }
}

fn panel<'a>(title: &str, entries: impl Iterator<Item = &'a str>) -> String {
    let mut text = format!("{title}\n");
    for (index, entry) in entries.enumerate() {
        let _ = writeln!(text, "{entry}   | {}", index + 1);
    }
    text
}

/// Layer that mirrors span entries into a shared [`CallLog`].
#[derive(Clone, Debug, Default)]
pub struct CallLogLayer {
    calls: Arc<Mutex<CallLog>>,
}

impl CallLogLayer {
    /// Creates a layer with an empty call log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the call log shared by every clone of this layer.
    ///
    /// Returns an empty log if the lock was poisoned.
    #[must_use]
    pub fn snapshot(&self) -> CallLog {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl<S> Layer<S> for CallLogLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let stack = span
            .scope()
            .from_root()
            .map(|entry| entry.name().to_owned())
            .collect();
        if let Ok(mut calls) = self.calls.lock() {
            calls.record(stack);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn log_keeps_the_latest_entries() {
        let mut calls = CallLog::new();
        for index in 0..(CALL_LOG_LEN + 3) {
            calls.record(vec![format!("call_{index}")]);
        }

        let log: Vec<&str> = calls.log().collect();
        assert_eq!(log.len(), CALL_LOG_LEN);
        assert_eq!(log.first(), Some(&"call_3"));
        assert_eq!(calls.stack(), &names(&["call_22"])[..]);
    }

    #[test]
    fn empty_stack_is_not_logged() {
        let mut calls = CallLog::new();
        calls.record(Vec::new());
        assert_eq!(calls.log().count(), 0);
    }

    #[test]
    fn panels_number_entries_from_one() {
        let mut calls = CallLog::new();
        calls.record(names(&["apply", "interact"]));

        assert_eq!(calls.format_stack(), "Call stack:\napply   | 1\ninteract   | 2\n");
        assert_eq!(calls.format_log(), "Call log:\ninteract   | 1\n");
    }

    #[test]
    fn layer_records_entered_span_scopes() {
        let layer = CallLogLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer.clone());

        tracing::subscriber::with_default(subscriber, || {
            let _outer = tracing::info_span!("apply").entered();
            let _inner = tracing::info_span!("place").entered();
        });

        let calls = layer.snapshot();
        assert_eq!(calls.stack(), &names(&["apply", "place"])[..]);
        assert_eq!(calls.log().collect::<Vec<_>>(), vec!["apply", "place"]);
    }
}
