use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::ui::Keybinding;

/// Single-line keybinding hints at the bottom of the screen.
///
/// Screen-local bindings come first, then the global ones. Hints that do not
/// fit are cut from the end.
pub struct HintBar {
    resolver: Arc<KeyResolver>,
}

impl HintBar {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self { resolver }
    }

    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_global(GlobalAction::Theme), "Theme"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit"),
        ]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, local: &[Keybinding]) {
        let separator = Span::styled(" │ ", Style::default().fg(theme.surface2()));
        let mut spans = Vec::new();
        let mut used = 0usize;
        let width = usize::from(area.width);

        for kb in local.iter().cloned().chain(self.global_keybindings()) {
            let cost = kb.key.chars().count() + kb.description.chars().count() + 4;
            if used + cost > width {
                break;
            }
            if !spans.is_empty() {
                spans.push(separator.clone());
            }
            spans.push(Span::styled(kb.key, Style::default().fg(theme.peach())));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(kb.description, Style::default().fg(theme.subtext0())));
            used += cost;
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
