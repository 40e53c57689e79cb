use std::time::Instant;

use ratatui::{
    layout::Rect,
    widgets::{Block, Paragraph},
    Frame,
};

use nn_dashboard::{
    network::NodeId,
    visualizers::{attention::HEADS, feature_maps::MAP_COUNT},
    Scheduler,
};

use super::{
    layout,
    theme::Theme,
    widgets::{self, NetworkScene, NodeMark},
};
use crate::state::dashboard::{node_position, Dashboard, Tab};

/// Draws the entire UI.
pub fn draw<S: Scheduler>(f: &mut Frame, dash: &Dashboard<S>, now: Instant) {
    let theme = Theme::for_mode(dash.prefs().dark_mode);
    let area = f.size();
    f.render_widget(Block::default().style(theme.base()), area);

    let snapshot = dash.snapshot();
    let visuals = dash.visuals();

    let (header_area, body_area, logs_area) = layout::vertical(area);
    let (status_area, progress_area) = layout::header(header_area);
    let (tabs_area, chart_area, controls_area) = layout::body(body_area);

    f.render_widget(
        widgets::header(visuals.status(), &snapshot, &theme),
        status_area,
    );
    f.render_widget(widgets::progress(visuals.status(), &theme), progress_area);

    let (bar_area, content_area) = layout::tabs(tabs_area);
    f.render_widget(widgets::tab_bar(dash.tab(), &theme), bar_area);
    match dash.tab() {
        Tab::Network => draw_network(f, dash, content_area, now, theme),
        Tab::Features => draw_feature_maps(f, dash, content_area, &theme),
        Tab::Attention => draw_attention(f, dash, content_area, &theme),
        Tab::Confusion => {
            f.render_widget(widgets::confusion(visuals.confusion(), &theme), content_area)
        }
    }

    let chart = visuals.chart();
    let curve = chart.curve.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
    let points = chart.points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
    f.render_widget(
        widgets::loss_chart(&curve, &points, chart.width, &theme),
        chart_area,
    );

    f.render_widget(widgets::controls(dash.prefs(), &theme), controls_area);
    f.render_widget(widgets::logs(visuals.logs(), &theme), logs_area);
}

fn draw_network<S: Scheduler>(
    f: &mut Frame,
    dash: &Dashboard<S>,
    area: Rect,
    now: Instant,
    theme: Theme,
) {
    let renderer = dash.visuals().network();
    let topology = *renderer.topology();
    let position = |id: NodeId| node_position(&topology, id);

    let nodes = renderer
        .graph()
        .nodes
        .iter()
        .filter_map(|n| {
            Some(NodeMark {
                at: position(n.id)?,
                role: n.role,
            })
        })
        .collect();

    let mut edges = renderer.layout(position);
    edges.truncate(dash.revealed_edges(now));

    let layer_labels = (0..topology.layers().len())
        .filter_map(|li| {
            let at = position(NodeId::new(li, 0))?;
            Some((at.x, topology.layers()[li].name))
        })
        .collect();

    let particles = dash
        .particle_positions(now)
        .into_iter()
        .map(|p| (p.x, p.y))
        .collect();

    let scene = NetworkScene {
        nodes,
        edges,
        layer_labels,
        particles,
        style: dash.visuals().network_style(),
        pulse_on: dash.pulse_phase(now),
    };
    f.render_widget(
        widgets::network(topology.variant().display_name(), scene, theme),
        area,
    );
}

fn draw_feature_maps<S: Scheduler>(f: &mut Frame, dash: &Dashboard<S>, area: Rect, theme: &Theme) {
    let frame = dash.visuals().feature_maps();
    let cells = layout::grid(area, 3, (MAP_COUNT as u32).div_ceil(3));
    for (map, cell) in frame.maps.iter().zip(cells) {
        f.render_widget(widgets::feature_map(map, theme), cell);
    }
}

fn draw_attention<S: Scheduler>(f: &mut Frame, dash: &Dashboard<S>, area: Rect, theme: &Theme) {
    let frame = dash.visuals().attention();
    if !frame.is_visible() {
        let hint = if dash.snapshot().variant() == nn_dashboard::Variant::Transformer {
            "attention appears every few epochs"
        } else {
            "attention is only shown for the transformer model"
        };
        f.render_widget(Paragraph::new(hint).style(theme.muted()), area);
        return;
    }

    let cells = layout::grid(area, 2, (HEADS as u32).div_ceil(2));
    for (i, (head, cell)) in frame.heads.iter().zip(cells).enumerate() {
        f.render_widget(widgets::attention_head(i, head, theme), cell);
    }
}
