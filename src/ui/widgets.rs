//! Custom TUI widgets

use super::app::ChartData;
use super::theme::ThemeColors;
use crate::tools::{ResultStatus, TestResult};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

/// Widget for displaying test results
pub struct ResultsPanel<'a> {
    results: &'a [TestResult],
    title: &'a str,
    colors: ThemeColors,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(results: &'a [TestResult], title: &'a str, colors: ThemeColors) -> Self {
        Self {
            results,
            title,
            colors,
        }
    }

    fn status_symbol(status: ResultStatus) -> &'static str {
        match status {
            ResultStatus::Ok => "[OK]",
            ResultStatus::Warning => "[!!]",
            ResultStatus::Error => "[XX]",
            ResultStatus::Info => "[--]",
        }
    }
}

impl<'a> Widget for ResultsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.dim));

        let inner = block.inner(area);
        block.render(area, buf);

        let rows = self.results.iter().take(inner.height as usize);
        for (y, result) in (inner.y..).zip(rows) {
            let color = self.colors.status(result.status);
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", Self::status_symbol(result.status)),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("{}: ", result.label),
                    Style::default().fg(self.colors.fg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(&result.value, Style::default().fg(color)),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

/// Line chart of a tool's series
pub struct SeriesChart<'a> {
    data: &'a ChartData,
    colors: ThemeColors,
}

impl<'a> SeriesChart<'a> {
    pub fn new(data: &'a ChartData, colors: ThemeColors) -> Self {
        Self { data, colors }
    }

    /// Axis bounds padded so a flat or single-point series still renders
    fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }
        let min = min.min(0.0);
        if max - min < 1.0 {
            [min, min + 1.0]
        } else {
            [min, max * 1.1]
        }
    }
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let points = &self.data.points;
        let x_bounds = Self::bounds(points.iter().map(|p| p.0));
        let y_bounds = Self::bounds(points.iter().map(|p| p.1));
        let axis_style = Style::default().fg(self.colors.dim);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.colors.accent))
            .data(points);

        let chart = Chart::new(vec![dataset])
            .block(
                Block::default()
                    .title(self.data.title)
                    .borders(Borders::ALL)
                    .border_style(axis_style),
            )
            .x_axis(
                Axis::default()
                    .title(self.data.x_label)
                    .style(axis_style)
                    .bounds(x_bounds)
                    .labels([format!("{:.0}", x_bounds[0]), format!("{:.0}", x_bounds[1])]),
            )
            .y_axis(
                Axis::default()
                    .title(self.data.y_label)
                    .style(axis_style)
                    .bounds(y_bounds)
                    .labels([format!("{:.0}", y_bounds[0]), format!("{:.0}", y_bounds[1])]),
            );
        chart.render(area, buf);
    }
}

/// Field showing the next precision target at its absolute cell
pub struct TargetPanel {
    target: Option<(i32, i32)>,
    colors: ThemeColors,
}

impl TargetPanel {
    pub fn new(target: Option<(i32, i32)>, colors: ThemeColors) -> Self {
        Self { target, colors }
    }
}

impl Widget for TargetPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Targets (F2 to start)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.dim));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some((x, y)) = self.target else {
            return;
        };
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        if x >= inner.x && x < inner.right() && y >= inner.y && y < inner.bottom() {
            let style = Style::default().fg(self.colors.red).add_modifier(Modifier::BOLD);
            buf.set_string(x, y, "●", style);
        }
    }
}

/// Typing prompt coloured by what has been typed so far
pub struct TypingPanel<'a> {
    prompt: &'a str,
    typed: &'a str,
    colors: ThemeColors,
}

impl<'a> TypingPanel<'a> {
    pub fn new(prompt: &'a str, typed: &'a str, colors: ThemeColors) -> Self {
        Self {
            prompt,
            typed,
            colors,
        }
    }
}

impl<'a> Widget for TypingPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let typed: Vec<char> = self.typed.chars().collect();
        let spans: Vec<Span> = self
            .prompt
            .chars()
            .enumerate()
            .map(|(i, want)| {
                let style = match typed.get(i) {
                    Some(got) if *got == want => Style::default().fg(self.colors.green),
                    Some(_) => Style::default().fg(self.colors.red),
                    None if i == typed.len() => Style::default()
                        .fg(self.colors.fg)
                        .add_modifier(Modifier::UNDERLINED),
                    None => Style::default().fg(self.colors.dim),
                };
                Span::styled(want.to_string(), style)
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Prompt")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.colors.dim)),
            )
            .render(area, buf);
    }
}

/// Widget for the help screen
pub struct HelpPanel {
    colors: ThemeColors,
}

impl HelpPanel {
    pub fn new(colors: ThemeColors) -> Self {
        Self { colors }
    }
}

const HELP_TEXT: &[&str] = &[
    "",
    " NAVIGATION",
    " -----------",
    " Tab / Shift+Tab  : Switch view (when the view does not capture Tab)",
    " F3 / F4          : Previous / next view",
    " F1               : Show this help",
    " Esc              : Quit application",
    "",
    " CONTROLS",
    " -----------",
    " F2               : Start the current test",
    " F5               : Reset the current test",
    " F6               : Pause / resume polling measurement",
    " F7               : Clear held keys (NKRO)",
    " F8               : Export report to JSON",
    "",
    " TESTS",
    " -----------",
    " Polling          : Move the mouse to estimate its report rate",
    " CPS              : Click as fast as you can for 10 seconds",
    " Reaction         : Respond when the target appears",
    " Precision        : Click the center of each target",
    " NKRO             : Hold many keys at once",
    " Typing           : Type the prompt; F2 picks a new one",
    " DPI              : Drag a known distance to measure DPI",
];

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Help - Rig TestKit")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.accent));

        let inner = block.inner(area);
        block.render(area, buf);

        for (i, line) in HELP_TEXT.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let heading = line.trim_start().chars().all(|c| c.is_ascii_uppercase()) && !line.trim().is_empty();
            let style = if line.contains("---") {
                Style::default().fg(self.colors.dim)
            } else if heading {
                Style::default().fg(self.colors.yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg)
            };
            buf.set_string(inner.x, inner.y + i as u16, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    view: &'a str,
    elapsed: &'a str,
    events: u64,
    message: Option<&'a str>,
    colors: ThemeColors,
}

impl<'a> StatusBar<'a> {
    pub fn new(view: &'a str, elapsed: &'a str, events: u64, colors: ThemeColors) -> Self {
        Self {
            view,
            elapsed,
            events,
            message: None,
            colors,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg_style = Style::default().bg(self.colors.bar).fg(self.colors.fg);
        buf.set_style(area, bg_style);

        let left = format!(" {} ", self.view);
        buf.set_string(area.x, area.y, &left, bg_style.add_modifier(Modifier::BOLD));

        if let Some(msg) = self.message {
            let msg_style = bg_style.fg(self.colors.yellow);
            let msg_x = area.x + (area.width / 2).saturating_sub(msg.len() as u16 / 2);
            buf.set_string(msg_x, area.y, msg, msg_style);
        }

        let right = format!(" {} | Events: {} ", self.elapsed, self.events);
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}

/// Tab bar widget
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    selected: usize,
    colors: ThemeColors,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], selected: usize, colors: ThemeColors) -> Self {
        Self {
            tabs,
            selected,
            colors,
        }
    }
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.colors.bar));
        let end = area.x + area.width;
        let mut x = area.x;

        for (i, tab) in self.tabs.iter().enumerate() {
            let style = if i == self.selected {
                Style::default()
                    .fg(self.colors.key_text_on)
                    .bg(self.colors.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg).bg(self.colors.bar)
            };

            let label = format!(" {} ", tab);
            let width = label.len() as u16;
            if x + width > end {
                break;
            }
            buf.set_string(x, area.y, &label, style);
            x += width;

            if i + 1 < self.tabs.len() && x < end {
                buf.set_string(x, area.y, "|", Style::default().fg(self.colors.dim));
                x += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn results_panel_renders_rows() {
        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        let results = vec![TestResult::ok("Max Rate", "1000 Hz")];
        ResultsPanel::new(&results, "Polling", ThemeColors::dark()).render(area, &mut buf);

        assert!(row_text(&buf, 1).contains("[OK] Max Rate: 1000 Hz"));
    }

    #[test]
    fn tab_bar_highlights_selection() {
        let colors = ThemeColors::dark();
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        TabBar::new(&["One", "Two"], 1, colors).render(area, &mut buf);

        assert!(row_text(&buf, 0).starts_with(" One | Two "));
        assert_eq!(buf[(7, 0)].bg, colors.accent);
        assert_eq!(buf[(1, 0)].bg, colors.bar);
    }

    #[test]
    fn chart_bounds_handle_empty_and_flat_series() {
        assert_eq!(SeriesChart::bounds(std::iter::empty()), [0.0, 1.0]);
        assert_eq!(SeriesChart::bounds([5.0, 5.0].into_iter()), [0.0, 5.5]);
        assert_eq!(SeriesChart::bounds([0.0].into_iter()), [0.0, 1.0]);
    }

    #[test]
    fn target_panel_draws_target_inside_field() {
        let colors = ThemeColors::dark();
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        TargetPanel::new(Some((5, 3)), colors).render(area, &mut buf);
        assert_eq!(buf[(5, 3)].symbol(), "●");
        assert_eq!(buf[(5, 3)].fg, colors.red);

        // On the border or outside: not drawn
        let mut buf = Buffer::empty(area);
        TargetPanel::new(Some((0, 0)), colors).render(area, &mut buf);
        assert_ne!(buf[(0, 0)].symbol(), "●");
        TargetPanel::new(Some((-4, 90)), colors).render(area, &mut buf);
    }

    #[test]
    fn typing_panel_colours_typed_characters() {
        let colors = ThemeColors::dark();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        TypingPanel::new("abcd", "ax", colors).render(area, &mut buf);

        assert_eq!(row_text(&buf, 1), "│abcd              │");
        assert_eq!(buf[(1, 1)].fg, colors.green);
        assert_eq!(buf[(2, 1)].fg, colors.red);
        assert!(buf[(3, 1)].modifier.contains(Modifier::UNDERLINED));
        assert_eq!(buf[(4, 1)].fg, colors.dim);
    }

    #[test]
    fn chart_renders_without_panicking() {
        let data = ChartData {
            title: "Polling Rate",
            x_label: "s",
            y_label: "Hz",
            points: vec![(0.2, 500.0), (0.4, 1000.0)],
        };
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        SeriesChart::new(&data, ThemeColors::dark()).render(area, &mut buf);
        assert!(row_text(&buf, 0).contains("Polling Rate"));
    }
}
