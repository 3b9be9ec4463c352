//! Custom Ratatui widget that renders one side of the whiskey log
//! (purchases or tastings) as a scrollable list.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::app::state::{ListState, Pane};
use crate::core::collection::{Collection, Purchase, Tasting};

use super::theme::Theme;

/// The list widget itself — created fresh each frame.
pub struct LogPane<'a> {
    collection: &'a Collection,
    pane: Pane,
    block: Option<Block<'a>>,
    /// Rows the content is pushed down by (pull indicator gap).
    shift: u16,
}

impl<'a> LogPane<'a> {
    pub fn new(collection: &'a Collection, pane: Pane) -> Self {
        Self {
            collection,
            pane,
            block: None,
            shift: 0,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn shift(mut self, rows: u16) -> Self {
        self.shift = rows;
        self
    }

    fn len(&self) -> usize {
        match self.pane {
            Pane::Purchases => self.collection.purchases.len(),
            Pane::Tastings => self.collection.tastings.len(),
        }
    }

    fn row(&self, idx: usize, selected: bool) -> Line<'a> {
        let pick = |style: Style| if selected { Theme::selected_style() } else { style };
        match self.pane {
            Pane::Purchases => purchase_line(&self.collection.purchases[idx], pick),
            Pane::Tastings => tasting_line(&self.collection.tastings[idx], pick),
        }
    }
}

fn purchase_line<'a>(p: &Purchase, pick: impl Fn(Style) -> Style) -> Line<'a> {
    let mut spans = vec![
        Span::styled(format!("{} ", p.date.format("%Y-%m-%d")), pick(Theme::date_style())),
        Span::styled(p.bottle.clone(), pick(Theme::bottle_style())),
        Span::styled(format!("  ${:.2}", p.paid()), pick(Theme::price_style())),
    ];
    if let Some(d) = p.discount_pct.filter(|d| *d > 0.0) {
        spans.push(Span::styled(format!(" (-{d:.0}%)"), pick(Theme::discount_style())));
    }
    if let Some(store) = p.store.as_deref().or(p.distillery.as_deref()) {
        spans.push(Span::styled(format!("  · {store}"), pick(Theme::note_style())));
    }
    Line::from(spans)
}

fn tasting_line<'a>(t: &Tasting, pick: impl Fn(Style) -> Style) -> Line<'a> {
    let mut spans = vec![
        Span::styled(format!("{} ", t.date.format("%Y-%m-%d")), pick(Theme::date_style())),
        Span::styled(format!("{:>3} ", t.rating), pick(Theme::rating_style(t.rating))),
        Span::styled(t.bottle.clone(), pick(Theme::bottle_style())),
    ];
    // First tasting note available, nose before palate before finish.
    let note = [&t.nose, &t.palate, &t.finish, &t.note]
        .into_iter()
        .find_map(|n| n.as_deref());
    if let Some(note) = note {
        spans.push(Span::styled(format!("  · {note}"), pick(Theme::note_style())));
    }
    Line::from(spans)
}

impl<'a> StatefulWidget for LogPane<'a> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Resolve the inner area (inside the optional block border).
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let shift = self.shift.min(inner.height);
        let content = Rect::new(inner.x, inner.y + shift, inner.width, inner.height - shift);

        let len = self.len();
        if len == 0 {
            if content.height > 0 {
                let empty = match self.pane {
                    Pane::Purchases => "No purchases yet",
                    Pane::Tastings => "No tastings yet",
                };
                buf.set_line(
                    content.x + 1,
                    content.y,
                    &Line::from(Span::styled(empty, Theme::empty_style())),
                    content.width.saturating_sub(1),
                );
            }
            return;
        }

        for (i, idx) in (state.offset..len).take(content.height as usize).enumerate() {
            let line = self.row(idx, idx == state.selected);
            buf.set_line(content.x, content.y + i as u16, &line, content.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn collection() -> Collection {
        let purchase = |bottle: &str| Purchase {
            bottle: bottle.into(),
            distillery: None,
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            price: 100.0,
            discount_pct: Some(20.0),
            store: Some("Shop".into()),
            note: None,
        };
        Collection {
            purchases: vec![purchase("Alpha"), purchase("Beta"), purchase("Gamma")],
            tastings: Vec::new(),
        }
    }

    fn text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn rows_start_at_offset() {
        let c = collection();
        let area = Rect::new(0, 0, 50, 2);
        let mut buf = Buffer::empty(area);
        let mut state = ListState {
            selected: 1,
            offset: 1,
            viewport_rows: 2,
        };
        LogPane::new(&c, Pane::Purchases).render(area, &mut buf, &mut state);
        assert!(text(&buf, 0).contains("Beta"));
        assert!(text(&buf, 0).contains("$80.00 (-20%)"));
        assert!(text(&buf, 1).contains("Gamma"));
    }

    #[test]
    fn shift_pushes_content_down() {
        let c = collection();
        let area = Rect::new(0, 0, 50, 3);
        let mut buf = Buffer::empty(area);
        LogPane::new(&c, Pane::Purchases)
            .shift(2)
            .render(area, &mut buf, &mut ListState::default());
        assert!(text(&buf, 0).trim().is_empty());
        assert!(text(&buf, 2).contains("Alpha"));
    }

    #[test]
    fn empty_pane_says_so() {
        let c = collection();
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        LogPane::new(&c, Pane::Tastings).render(area, &mut buf, &mut ListState::default());
        assert!(text(&buf, 0).contains("No tastings yet"));
    }
}
