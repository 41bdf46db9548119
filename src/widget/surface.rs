//! Rendering surface the widget projects its state onto.

use super::message::MessageEntry;

/// A visible change to the widget, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Input focus was placed on the message field.
    Focused,
    /// An entry was appended; the view scrolls to it.
    MessageAppended(MessageEntry),
    /// The message field was emptied.
    InputCleared,
    /// The send control was enabled or disabled.
    SendControlChanged { enabled: bool },
    /// The typing indicator was added at the end of the list.
    TypingShown,
    /// The typing indicator was removed.
    TypingRemoved,
    /// All entries were removed.
    Cleared,
}

/// Receives every [`WidgetEvent`] as it happens.
///
/// Implementations render to a terminal, a DOM bridge, or just record.
pub trait Surface {
    fn apply(&mut self, event: &WidgetEvent);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn apply(&mut self, event: &WidgetEvent) {
        (**self).apply(event);
    }
}

/// Surface that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn apply(&mut self, _event: &WidgetEvent) {}
}

/// Surface that keeps every event, mostly for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    events: Vec<WidgetEvent>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[WidgetEvent] {
        &self.events
    }
}

impl Surface for RecordingSurface {
    fn apply(&mut self, event: &WidgetEvent) {
        self.events.push(event.clone());
    }
}
