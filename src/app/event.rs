//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task that
//! forwards them over a channel so the main loop stays non-blocking.  Left
//! button press / drag / release become the pointer stream that drives the
//! pull gesture; other mouse buttons are dropped.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

/// Phase of a single-pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Move,
    Release,
}

/// A pointer event in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub column: u16,
    pub row: u16,
}

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Pointer(PointerEvent),
    /// Mouse wheel; `down` scrolls further into the list.
    Wheel { column: u16, row: u16, down: bool },
    Resize(u16, u16),
    Tick,
}

/// Map a mouse event to an app event.  Only the left button is tracked.
pub fn translate_mouse(mouse: MouseEvent) -> Option<AppEvent> {
    let (column, row) = (mouse.column, mouse.row);
    let pointer = |kind| Some(AppEvent::Pointer(PointerEvent { kind, column, row }));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => pointer(PointerKind::Press),
        MouseEventKind::Drag(MouseButton::Left) => pointer(PointerKind::Move),
        MouseEventKind::Up(MouseButton::Left) => pointer(PointerKind::Release),
        MouseEventKind::ScrollDown => Some(AppEvent::Wheel { column, row, down: true }),
        MouseEventKind::ScrollUp => Some(AppEvent::Wheel { column, row, down: false }),
        _ => None,
    }
}

/// Spawns a background task that polls the terminal for events and sends them
/// through the returned channel.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        // Poll with the tick rate so animation ticks keep flowing even when
        // nothing is happening.
        let app_event = if event::poll(tick_rate).unwrap_or(false) {
            match event::read() {
                Ok(CtEvent::Key(k)) => AppEvent::Key(k),
                Ok(CtEvent::Mouse(m)) => match translate_mouse(m) {
                    Some(ev) => ev,
                    None => continue,
                },
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!("terminal event read failed: {err}");
                    continue;
                }
            }
        } else {
            AppEvent::Tick
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn left_button_becomes_pointer_stream() {
        let expect = [
            (MouseEventKind::Down(MouseButton::Left), PointerKind::Press),
            (MouseEventKind::Drag(MouseButton::Left), PointerKind::Move),
            (MouseEventKind::Up(MouseButton::Left), PointerKind::Release),
        ];
        for (kind, want) in expect {
            match translate_mouse(mouse(kind)) {
                Some(AppEvent::Pointer(p)) => {
                    assert_eq!(p, PointerEvent { kind: want, column: 7, row: 3 });
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn other_buttons_are_dropped() {
        assert!(translate_mouse(mouse(MouseEventKind::Down(MouseButton::Right))).is_none());
        assert!(translate_mouse(mouse(MouseEventKind::Moved)).is_none());
        assert!(matches!(
            translate_mouse(mouse(MouseEventKind::ScrollDown)),
            Some(AppEvent::Wheel { down: true, .. })
        ));
    }
}
