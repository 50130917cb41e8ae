use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use super::{canvas::Framebuffer, minimap::Minimap};
use crate::game::RaceState;
use crate::metrics::GameMetrics;

/// Width of the telemetry column beside the road
const SIDE_PANEL_WIDTH: u16 = 34;

/// Everything one frame shows
pub struct RaceView<'a> {
    pub state: &'a RaceState,
    pub road: &'a Framebuffer,
    pub minimap: &'a Minimap,
    pub metrics: &'a GameMetrics,
    /// Blocking message drawn over the road
    pub overlay: Option<&'a str>,
}

struct Areas {
    header: Rect,
    road: Rect,
    side: Rect,
    footer: Rect,
}

fn split(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Road and panels
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(SIDE_PANEL_WIDTH)])
        .split(rows[1]);

    Areas {
        header: rows[0],
        road: columns[0],
        side: columns[1],
        footer: rows[2],
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Terminal cells available to the road view for a frame of `area`
    pub fn road_area(area: Rect) -> Rect {
        split(area).road
    }

    pub fn render(&self, frame: &mut Frame, view: &RaceView) {
        let areas = split(frame.area());

        frame.render_widget(self.render_stats(view), areas.header);
        frame.render_widget(view.road, areas.road);

        if let Some(banner) = view.state.lap_banner() {
            let banner_area = banner_rect(areas.road);
            frame.render_widget(Clear, banner_area);
            frame.render_widget(self.render_banner(banner), banner_area);
        }

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(15), // Telemetry
                Constraint::Length(5),  // Laps
                Constraint::Length(7),  // Opponent
                Constraint::Min(0),     // Map
            ])
            .split(areas.side);

        frame.render_widget(self.render_telemetry(view.state), side[0]);
        frame.render_widget(self.render_laps(view.state), side[1]);
        frame.render_widget(self.render_opponent(view.state), side[2]);
        frame.render_widget(
            view.minimap
                .widget(view.state.position, Some(view.state.ai.position)),
            side[3],
        );

        frame.render_widget(self.render_controls(), areas.footer);

        if let Some(message) = view.overlay {
            let overlay_area = centered_rect(areas.road, 40, 5);
            frame.render_widget(Clear, overlay_area);
            frame.render_widget(self.render_overlay(message), overlay_area);
        }
    }

    fn render_stats(&self, view: &RaceView) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:.0}", view.state.score),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:.0}", view.metrics.high_score),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(view.metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .title(" Pseudo Racer "),
        )
    }

    fn render_telemetry(&self, state: &RaceState) -> Paragraph<'_> {
        let vehicle = &state.vehicle;
        let rows = [
            ("Acceleration", format!("{:.2}", vehicle.acceleration_clamped)),
            ("Velocity", format!("{:.2}", vehicle.velocity)),
            ("Air Resistance", format!("{:.2}", vehicle.air_resistance)),
            ("Rolling Res.", format!("{:.2}", vehicle.rolling_resistance)),
            ("Fuel Rate", format!("{:.2}", vehicle.fuel_consumption_rate)),
            ("Engine Temp", format!("{:.1}", vehicle.engine_temperature)),
            ("Distance", format!("{:.0}", vehicle.total_distance)),
            ("Drag Losses", format!("{:.2}", vehicle.drag_losses)),
            ("Tire Wear", format!("{:.2}", vehicle.tire_wear)),
            ("Rolling Losses", format!("{:.2}", vehicle.rr_losses)),
            ("Nitro", format!("{:.0}", vehicle.nitro_level)),
            ("RPM", vehicle.engine_rpm.to_string()),
            ("Gravity Force", format!("{:.0}", vehicle.gf_force)),
        ];

        let lines: Vec<Line> = rows
            .into_iter()
            .map(|(label, value)| stat_line(label, value))
            .collect();

        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Car "))
    }

    fn render_laps(&self, state: &RaceState) -> Paragraph<'_> {
        let laps = &state.laps;
        let best = laps
            .best_lap
            .map(|secs| format!("{:.2}s", secs))
            .unwrap_or_else(|| "--".to_string());

        let lines = vec![
            stat_line("Lap", laps.lap_count.to_string()),
            stat_line("Lap Time", format!("{:.2}s", laps.lap_time)),
            stat_line("Best", best),
        ];

        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Laps "))
    }

    fn render_opponent(&self, state: &RaceState) -> Paragraph<'_> {
        let ai = &state.ai;
        let lines = vec![
            stat_line("Action", ai.last_action.name().to_string()),
            stat_line("Explore", format!("{:.1}%", ai.explore_pct)),
            stat_line("Reward", format!("{:.1}", ai.total_reward)),
            stat_line("Speed", format!("{:.0}", ai.speed)),
            stat_line("States", ai.q_table().len().to_string()),
        ];

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Opponent "),
        )
    }

    fn render_banner(&self, banner: String) -> Paragraph<'static> {
        Paragraph::new(Line::from(Span::styled(
            banner,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
    }

    fn render_overlay<'a>(&self, message: &'a str) -> Paragraph<'a> {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                message,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" drive | "),
            Span::styled("W", Style::default().fg(Color::Cyan)),
            Span::raw(" cruise | "),
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::raw(" boost | "),
            Span::styled("S", Style::default().fg(Color::Green)),
            Span::raw(" save | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<15}", label), Style::default().fg(Color::Yellow)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

/// Rectangle of at most `width` x `height` cells centred in `area`
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Strip across the upper third of the road view
fn banner_rect(area: Rect) -> Rect {
    let centred = centered_rect(area, 30, 3);
    Rect {
        y: area.y + area.height / 4,
        ..centred
    }
}
