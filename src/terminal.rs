use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart as PlotChart, Dataset, GraphType,
    Paragraph,
};
use ratatui::{Frame, Terminal};

use crate::charts::{BoxSummary, Chart, ChartBody, ChartRenderer, HistogramSeries, Series};

const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
    Color::LightCyan,
    Color::LightYellow,
];

/// Full-screen chart viewer. Each chart stays up until a key is pressed.
pub struct TerminalRenderer {
    tick: Duration,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
        }
    }
}

impl ChartRenderer for TerminalRenderer {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = show_until_key(&mut terminal, chart, self.tick);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        res
    }
}

fn show_until_key<B: Backend>(
    terminal: &mut Terminal<B>,
    chart: &Chart,
    tick: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, chart))?;
        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(
                        key.code,
                        KeyCode::Char('q') | KeyCode::Char(' ') | KeyCode::Esc | KeyCode::Enter
                    )
                {
                    return Ok(());
                }
            }
        }
    }
}

fn draw(frame: &mut Frame, chart: &Chart) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.size());

    let block = Block::default()
        .title(chart.title.as_str())
        .borders(Borders::ALL);
    match &chart.body {
        ChartBody::Bars(bars) => render_bars(frame, chunks[0], block, bars),
        ChartBody::Boxes(boxes) => render_boxes(frame, chunks[0], block, boxes),
        ChartBody::Histogram(series) => render_histogram(frame, chunks[0], block, series),
        ChartBody::Lines(series) => {
            render_xy(frame, chunks[0], block, chart, series, GraphType::Line)
        }
        ChartBody::Scatter(series) => {
            render_xy(frame, chunks[0], block, chart, series, GraphType::Scatter)
        }
        ChartBody::Heatmap { labels, values } => {
            let text = crate::charts::heatmap_lines(labels, values).join("\n");
            frame.render_widget(Paragraph::new(text).block(block), chunks[0]);
        }
    }

    let footer = Paragraph::new("Enter/Space/q Next chart")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[1]);
}

fn render_bars(frame: &mut Frame, area: Rect, block: Block, bars: &[(String, f64)]) {
    let width = bar_width(area, bars.len());
    let bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(idx, (label, value))| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .text_value(format!("{value:.0}"))
                .label(Line::from(label.as_str()))
                .style(Style::default().fg(PALETTE[idx % PALETTE.len()]))
        })
        .collect();
    let widget = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(width)
        .bar_gap(1);
    frame.render_widget(widget, area);
}

fn render_boxes(frame: &mut Frame, area: Rect, block: Block, boxes: &[BoxSummary]) {
    let label_w = boxes.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    let mut lines = vec![Line::from(format!(
        "{:<label_w$}   min    q1   med    q3   max",
        ""
    ))];
    for b in boxes {
        lines.push(Line::from(format!(
            "{:<label_w$} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1}",
            b.label, b.min, b.q1, b.median, b.q3, b.max
        )));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_histogram(frame: &mut Frame, area: Rect, block: Block, series: &[HistogramSeries]) {
    // Probabilities are shown per mille so they survive the integer bar values.
    let fractional = series
        .iter()
        .flat_map(|s| &s.bins)
        .all(|b| b.value <= 1.0);
    let scale = if fractional { 1000.0 } else { 1.0 };

    let total_bars: usize = series.iter().map(|s| s.bins.len()).sum();
    let mut widget = BarChart::default()
        .block(block)
        .bar_width(bar_width(area, total_bars + series.len()))
        .bar_gap(0)
        .group_gap(1);
    for (idx, s) in series.iter().enumerate() {
        let style = Style::default().fg(PALETTE[idx % PALETTE.len()]);
        let bars: Vec<Bar> = s
            .bins
            .iter()
            .map(|b| {
                Bar::default()
                    .value((b.value * scale).round() as u64)
                    .text_value(String::new())
                    .style(style)
            })
            .collect();
        widget = widget.data(
            BarGroup::default()
                .label(Line::from(s.name.as_str()))
                .bars(&bars),
        );
    }
    frame.render_widget(widget, area);
}

fn render_xy(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    chart: &Chart,
    series: &[Series],
    graph_type: GraphType,
) {
    let (x_bounds, y_bounds) = bounds(series);
    let datasets = series
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            Dataset::default()
                .name(s.name.clone())
                .marker(Marker::Braille)
                .graph_type(graph_type)
                .style(Style::default().fg(PALETTE[idx % PALETTE.len()]))
                .data(&s.points)
        })
        .collect::<Vec<_>>();

    let widget = PlotChart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(chart.x_label.as_str())
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.as_str())
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );
    frame.render_widget(widget, area);
}

fn bounds(series: &[Series]) -> ([f64; 2], [f64; 2]) {
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    for (px, py) in series.iter().flat_map(|s| &s.points) {
        x = [x[0].min(*px), x[1].max(*px)];
        y = [y[0].min(*py), y[1].max(*py)];
    }
    (pad(x), pad(y))
}

fn pad(b: [f64; 2]) -> [f64; 2] {
    if !b[0].is_finite() || !b[1].is_finite() {
        return [0.0, 1.0];
    }
    if b[0] == b[1] {
        return [b[0] - 1.0, b[1] + 1.0];
    }
    b
}

fn axis_labels(b: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (b[0] + b[1]) / 2.0;
    vec![
        Span::raw(format!("{:.1}", b[0])),
        Span::raw(format!("{mid:.1}")),
        Span::raw(format!("{:.1}", b[1])),
    ]
}

fn bar_width(area: Rect, bars: usize) -> u16 {
    if bars == 0 {
        return 1;
    }
    let inner = area.width.saturating_sub(2) as usize;
    ((inner / bars).saturating_sub(1)).clamp(1, 9) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn sample(body: ChartBody) -> Chart {
        Chart {
            title: "Sample".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            body,
        }
    }

    fn draws_without_panicking(chart: &Chart) {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, chart)).unwrap();
    }

    #[test]
    fn every_chart_body_draws() {
        draws_without_panicking(&sample(ChartBody::Bars(vec![
            ("Arsenal".to_string(), 80.2),
            ("Chelsea".to_string(), -1.0),
        ])));
        draws_without_panicking(&sample(ChartBody::Lines(vec![Series {
            name: "A".to_string(),
            points: vec![(1.0, 3.0), (2.0, 6.0)],
        }])));
        draws_without_panicking(&sample(ChartBody::Scatter(Vec::new())));
        draws_without_panicking(&sample(ChartBody::Heatmap {
            labels: vec!["a".to_string()],
            values: vec![vec![1.0]],
        }));
    }

    #[test]
    fn bar_width_stays_in_range() {
        let area = Rect::new(0, 0, 80, 20);
        assert_eq!(bar_width(area, 0), 1);
        assert_eq!(bar_width(area, 200), 1);
        assert_eq!(bar_width(area, 2), 9);
    }

    #[test]
    fn flat_bounds_are_padded() {
        assert_eq!(pad([2.0, 2.0]), [1.0, 3.0]);
        assert_eq!(pad([f64::INFINITY, f64::NEG_INFINITY]), [0.0, 1.0]);
    }
}
