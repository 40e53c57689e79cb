use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Axis, Block, Borders, Cell, Chart, Dataset, Gauge, GraphType, Paragraph, Row, Table, Tabs,
        Wrap,
    },
};

use nn_dashboard::{
    network::{EdgeGeometry, NodeRole, Point},
    prefs::Preferences,
    visualizers::{
        attention::AttentionHead,
        feature_maps::{FeatureMap, MAP_SIZE},
        loss_chart::CHART_HEIGHT,
        ConfusionFrame, LogLine, NetworkStyle, StatusFrame,
    },
    RunState, Snapshot,
};

use super::theme::Theme;
use crate::state::dashboard::{Tab, CANVAS_SIZE};

const SHADES: [&str; 5] = [" ", "░", "▒", "▓", "█"];

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(title, theme.title()))
}

pub fn header<'a>(status: &'a StatusFrame, snapshot: &Snapshot<'_>, theme: &Theme) -> Paragraph<'a> {
    let state_style = match snapshot.state {
        RunState::Idle => theme.muted(),
        RunState::Running => theme.accent_cyan(),
        RunState::Paused => theme.warn(),
        RunState::Finished => theme.accent_magenta(),
    };

    let line1 = Line::from(vec![
        Span::styled(
            "Neural Network Training Visualizer",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(format!("Model: {}", snapshot.variant().display_name())),
        Span::raw("  |  "),
        Span::styled(snapshot.state.label(), state_style),
    ]);

    let line2 = Line::from(Span::styled(status.message.as_str(), theme.text()));

    let line3 = Line::from(vec![Span::styled(
        format!(
            "Epoch: {} / {}  |  Loss: {}  |  Val loss: {}  |  Accuracy: {}",
            status.epoch, snapshot.max_epochs, status.train_loss, status.val_loss, status.accuracy
        ),
        theme.dim(),
    )]);

    Paragraph::new(vec![line1, line2, line3])
        .style(theme.base())
        .wrap(Wrap { trim: true })
}

pub fn progress<'a>(status: &StatusFrame, theme: &Theme) -> Gauge<'a> {
    let ratio = (status.progress_percent / 100.0).clamp(0.0, 1.0);
    Gauge::default()
        .block(panel("Progress", theme))
        .gauge_style(Style::default().fg(theme.fg).bg(theme.highlight))
        .ratio(ratio)
        .label(format!("{:.0}%", status.progress_percent))
}

pub fn tab_bar<'a>(selected: Tab, theme: &Theme) -> Tabs<'a> {
    Tabs::new(Tab::ALL.iter().map(|t| t.title()).collect::<Vec<_>>())
        .block(panel("View [Tab]", theme))
        .style(theme.muted())
        .highlight_style(theme.title().patch(theme.highlight_bg()))
        .select(selected.index())
}

/// Node drawn on the network canvas.
pub struct NodeMark {
    pub at: Point,
    pub role: NodeRole,
}

/// Everything placed on the network canvas for one frame.
pub struct NetworkScene {
    pub nodes: Vec<NodeMark>,
    /// Connections revealed so far.
    pub edges: Vec<EdgeGeometry>,
    /// Layer names with their column position.
    pub layer_labels: Vec<(f64, &'static str)>,
    pub particles: Vec<(f64, f64)>,
    pub style: NetworkStyle,
    pub pulse_on: bool,
}

/// Network diagram: faded connections, neurons, I/O labels and travelling particles.
pub fn network<'a>(
    title: &'a str,
    scene: NetworkScene,
    theme: Theme,
) -> Canvas<'a, impl Fn(&mut Context) + 'a> {
    Canvas::default()
        .block(panel(title, &theme))
        .background_color(theme.bg)
        .marker(Marker::Braille)
        .x_bounds([0.0, CANVAS_SIZE])
        .y_bounds([0.0, CANVAS_SIZE])
        .paint(move |ctx| {
            let style = scene.style;
            if style.edge_opacity > 0.0 {
                let color = theme.fade(style.edge_opacity);
                for e in &scene.edges {
                    let end = e.end();
                    ctx.draw(&CanvasLine {
                        x1: e.origin.x,
                        y1: e.origin.y,
                        x2: end.x,
                        y2: end.y,
                        color,
                    });
                }
            }
            ctx.layer();

            for n in &scene.nodes {
                let color = match n.role {
                    NodeRole::Output if style.pulse_outputs && scene.pulse_on => theme.accent_magenta,
                    NodeRole::Input | NodeRole::Output => theme.accent_cyan,
                    NodeRole::Hidden => theme.fg,
                };
                ctx.draw(&Circle {
                    x: n.at.x,
                    y: n.at.y,
                    radius: 1.0,
                    color,
                });
                let label = n.role.label();
                if !label.is_empty() {
                    let dx = if n.role == NodeRole::Input { -5.0 } else { 3.0 };
                    ctx.print(n.at.x + dx, n.at.y, Span::styled(label, theme.dim()));
                }
            }

            for (x, name) in &scene.layer_labels {
                ctx.print(*x - 3.0, 1.0, Span::styled(*name, theme.muted()));
            }

            ctx.layer();
            ctx.draw(&Points {
                coords: &scene.particles,
                color: theme.accent_yellow,
            });
        })
}

pub fn feature_map<'a>(map: &FeatureMap, theme: &Theme) -> Paragraph<'a> {
    let lines = if map.visible {
        (0..MAP_SIZE)
            .map(|row| {
                let cells = (0..MAP_SIZE)
                    .map(|col| {
                        let v = map.cell(row, col).clamp(0.0, 1.0);
                        let shade = SHADES[(v * (SHADES.len() - 1) as f64).round() as usize];
                        shade.repeat(2)
                    })
                    .collect::<String>();
                Line::from(Span::styled(cells, theme.text()))
            })
            .collect()
    } else {
        vec![Line::from(Span::styled("-", theme.muted()))]
    };

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border())
            .title(format!("map {}", map.index + 1)),
    )
}

pub fn attention_head<'a>(index: usize, head: &AttentionHead, theme: &Theme) -> Paragraph<'a> {
    let lines = head
        .weights
        .iter()
        .map(|row| {
            row.iter()
                .map(|w| {
                    Span::styled(
                        "   ",
                        Style::default().bg(theme.heat((w * head.scale * 2.0).min(1.0))),
                    )
                })
                .collect::<Vec<_>>()
        })
        .map(Line::from)
        .collect::<Vec<_>>();

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border())
            .title(format!("head {} ({:.0}%)", index + 1, head.scale * 100.0)),
    )
}

pub fn confusion<'a>(frame: &ConfusionFrame, theme: &Theme) -> Table<'a> {
    let classes = frame.classes();
    let header = Row::new(
        std::iter::once(Cell::from("true\\pred"))
            .chain((0..classes).map(|c| Cell::from(c.to_string())))
            .collect::<Vec<_>>(),
    )
    .style(theme.title());

    let rows = (0..classes).map(|row| {
        let cells = (0..classes).map(|col| {
            let style = if frame.visible {
                Style::default()
                    .fg(theme.fg)
                    .bg(theme.heat(frame.intensity(row, col)))
            } else {
                theme.muted()
            };
            Cell::from(frame.counts[row][col].to_string()).style(style)
        });
        Row::new(
            std::iter::once(Cell::from(row.to_string()).style(theme.title()))
                .chain(cells)
                .collect::<Vec<_>>(),
        )
    });

    let widths = std::iter::once(Constraint::Length(10))
        .chain((0..classes).map(|_| Constraint::Length(4)))
        .collect::<Vec<_>>();

    Table::new(rows, widths)
        .header(header)
        .block(panel("Confusion Matrix", theme))
}

/// Loss chart: the full training curve plus the trailing highlighted points.
pub fn loss_chart<'a>(
    curve: &'a [(f64, f64)],
    points: &'a [(f64, f64)],
    width: f64,
    theme: &Theme,
) -> Chart<'a> {
    let datasets = vec![
        Dataset::default()
            .name("train loss")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.dim())
            .data(curve),
        Dataset::default()
            .name("recent")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(theme.accent_cyan())
            .data(points),
    ];

    Chart::new(datasets)
        .block(panel("Loss", theme))
        .x_axis(
            Axis::default()
                .title("epoch")
                .style(theme.muted())
                .bounds([0.0, width.max(1.0)])
                .labels(vec![Span::raw("0"), Span::raw("max")]),
        )
        .y_axis(
            Axis::default()
                .style(theme.muted())
                .bounds([0.0, CHART_HEIGHT])
                .labels(vec![Span::raw("0.0"), Span::raw("2.5")]),
        )
}

pub fn controls<'a>(prefs: &Preferences, theme: &Theme) -> Paragraph<'a> {
    let lines = vec![
        Line::from(format!("model:         {} [m]", prefs.model_type.display_name())),
        Line::from(format!("dataset:       {} [D]", prefs.dataset)),
        Line::from(format!("learning rate: {:.4} [+/-]", prefs.learning_rate)),
        Line::from(format!("batch size:    {} [b]", prefs.batch_size)),
        Line::from(format!(
            "theme:         {} [t]",
            if prefs.dark_mode { "dark" } else { "light" }
        )),
        Line::from(Span::styled(
            "s start  p pause  r reset  q quit",
            theme.muted(),
        )),
    ];

    Paragraph::new(lines)
        .style(theme.text())
        .block(panel("Controls", theme))
}

pub fn logs<'a>(logs: &'a [LogLine], theme: &Theme) -> Paragraph<'a> {
    let tail = logs.iter().rev().take(6).rev();

    let lines = tail
        .map(|l| {
            let level = match l.level {
                "WARN" => theme.warn(),
                "ERROR" => theme.error(),
                _ => theme.dim(),
            };
            Line::from(vec![
                Span::styled(format!("[{}] ", l.level), level),
                Span::styled(l.message.as_str(), theme.text()),
            ])
        })
        .collect::<Vec<_>>();

    Paragraph::new(lines)
        .block(panel("Events", theme))
        .wrap(Wrap { trim: true })
}
