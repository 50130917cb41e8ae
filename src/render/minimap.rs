use ratatui::{
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Context, Line, Points},
        Block, Borders,
    },
};

use crate::game::{wrap_position, Track};

/// Every n-th segment contributes a point to the outline
const SAMPLE_STEP: usize = 8;

/// Heading change (radians) per unit of segment curvature
const HEADING_PER_CURVE: f64 = 0.008;

/// Track outline normalised into the unit square
#[derive(Debug, Clone, PartialEq)]
pub struct Minimap {
    points: Vec<(f64, f64)>,
    track_length: f64,
}

impl Minimap {
    /// Trace the track by integrating curvature into a heading and
    /// stepping one segment length along it per segment
    pub fn from_track(track: &Track) -> Self {
        let mut heading: f64 = 0.0;
        let (mut x, mut y) = (0.0, 0.0);
        let mut raw = Vec::with_capacity(track.len() / SAMPLE_STEP + 1);

        for (i, segment) in track.segments().iter().enumerate() {
            if i % SAMPLE_STEP == 0 {
                raw.push((x, y));
            }
            heading += segment.curve * HEADING_PER_CURVE;
            x += heading.sin() * track.segment_length();
            y += heading.cos() * track.segment_length();
        }

        Self {
            points: normalise(&raw),
            track_length: track.length(),
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Outline point for a track position
    pub fn point_at(&self, position: f64) -> Option<(f64, f64)> {
        if self.points.is_empty() || self.track_length <= 0.0 {
            return None;
        }
        let ratio = wrap_position(position, self.track_length) / self.track_length;
        let index = (ratio * self.points.len() as f64) as usize % self.points.len();
        Some(self.points[index])
    }

    /// Canvas widget with the outline, the opponent and the player
    pub fn widget(
        &self,
        player: f64,
        opponent: Option<f64>,
    ) -> Canvas<'_, impl Fn(&mut Context<'_>) + '_> {
        let player_point = self.point_at(player);
        let opponent_point = opponent.and_then(|position| self.point_at(position));

        Canvas::default()
            .block(Block::default().borders(Borders::ALL).title(" Map "))
            .marker(Marker::Braille)
            .x_bounds([-0.05, 1.05])
            .y_bounds([-0.05, 1.05])
            .paint(move |ctx| {
                for pair in self.points.windows(2) {
                    ctx.draw(&Line {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color: Color::DarkGray,
                    });
                }
                if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
                    ctx.draw(&Line {
                        x1: last.0,
                        y1: last.1,
                        x2: first.0,
                        y2: first.1,
                        color: Color::DarkGray,
                    });
                }
                ctx.layer();
                if let Some(point) = opponent_point {
                    ctx.draw(&Points {
                        coords: &[point],
                        color: Color::Red,
                    });
                }
                if let Some(point) = player_point {
                    ctx.draw(&Points {
                        coords: &[point],
                        color: Color::Cyan,
                    });
                }
            })
    }
}

/// Scale points into `[0, 1]` on both axes, keeping a flat axis at 0
fn normalise(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let bounds = |axis: fn(&(f64, f64)) -> f64| {
        points.iter().map(axis).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (min_x, max_x) = bounds(|p| p.0);
    let (min_y, max_y) = bounds(|p| p.1);
    let span = |lo: f64, hi: f64| if hi - lo > 0.0 { hi - lo } else { 1.0 };
    let (span_x, span_y) = (span(min_x, max_x), span(min_y, max_y));

    points
        .iter()
        .map(|&(x, y)| ((x - min_x) / span_x, (y - min_y) / span_y))
        .collect()
}
