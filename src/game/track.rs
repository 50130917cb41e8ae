use super::config::GameConfig;
use super::segment::{Decoration, RoadSegment, Rgb, SegmentColors};
use crate::assets::Sprite;

/// Added to every segment depth so the first one never sits at depth zero
pub const DEPTH_EPSILON: f64 = 0.00001;

/// Segments per colour band
const BAND_LENGTH: usize = 3;

const RIGHT_CURVE: (usize, usize) = (300, 700);
const RIGHT_CURVE_AMOUNT: f64 = 0.5;
const LEFT_CURVE_START: usize = 1100;
const LEFT_CURVE_AMOUNT: f64 = -1.2;

const HILLS_START: usize = 750;
const HILL_PERIOD: f64 = 30.0;
const HILL_AMPLITUDE: f64 = 1500.0;

const LIGHT_BAND: SegmentColors = SegmentColors {
    surface: Rgb(0, 255, 255),
    rumble: Rgb(255, 255, 255),
    road: Rgb(108, 108, 108),
};

const DARK_BAND: SegmentColors = SegmentColors {
    surface: Rgb(127, 127, 127),
    rumble: Rgb(0, 0, 0),
    road: Rgb(105, 105, 105),
};

/// Closed loop of road segments, indexed modulo its length
#[derive(Debug, Clone)]
pub struct Track {
    segments: Vec<RoadSegment>,
    segment_length: f64,
}

impl Track {
    /// Build the circuit.
    ///
    /// Layout, by segment index:
    /// - 0..300: straight, trees on the left, poles on the right
    /// - 301..699: right-hand bend
    /// - 751..: rolling hills
    /// - 1101..: left-hand bend
    ///
    /// The result depends only on the config and the number of sprites.
    /// Decorations whose sprite index is not in `sprites` are left out.
    pub fn build(config: &GameConfig, sprites: &[Sprite]) -> Self {
        let segments = (0..config.total_segments)
            .map(|i| build_segment(i, config.segment_length, sprites.len()))
            .collect();

        Self {
            segments,
            segment_length: config.segment_length,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    /// Total physical length of the loop
    pub fn length(&self) -> f64 {
        self.segments.len() as f64 * self.segment_length
    }

    /// Wrap a world position into `[0, length)`
    pub fn wrap(&self, position: f64) -> f64 {
        wrap_position(position, self.length())
    }

    /// Index of the segment containing `position` (wrapped)
    pub fn segment_index(&self, position: f64) -> usize {
        let index = (self.wrap(position) / self.segment_length) as usize;
        index.min(self.segments.len().saturating_sub(1))
    }

    /// Segment at `index` modulo the track length
    pub fn segment(&self, index: usize) -> &RoadSegment {
        &self.segments[index % self.segments.len()]
    }

    pub fn segment_mut(&mut self, index: usize) -> &mut RoadSegment {
        let len = self.segments.len();
        &mut self.segments[index % len]
    }

    /// Segment under the given world position
    pub fn segment_at(&self, position: f64) -> &RoadSegment {
        self.segment(self.segment_index(position))
    }

    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }
}

/// Wrap `position` into `[0, length)`, mapping non-finite input to 0
pub fn wrap_position(position: f64, length: f64) -> f64 {
    if !position.is_finite() || length <= 0.0 {
        return 0.0;
    }
    let wrapped = position.rem_euclid(length);
    // rem_euclid can round up to `length` for tiny negative inputs
    if wrapped >= length {
        0.0
    } else {
        wrapped
    }
}

fn build_segment(i: usize, segment_length: f64, sprite_count: usize) -> RoadSegment {
    let band = (i / BAND_LENGTH) % 2;
    let colors = if band == 1 { LIGHT_BAND } else { DARK_BAND };

    let mut segment = RoadSegment::new(i, colors);
    segment.z = i as f64 * segment_length + DEPTH_EPSILON;

    if RIGHT_CURVE.0 < i && i < RIGHT_CURVE.1 {
        segment.curve = RIGHT_CURVE_AMOUNT;
    }
    if i > LEFT_CURVE_START {
        segment.curve = LEFT_CURVE_AMOUNT;
    }

    if i > HILLS_START {
        segment.y = (i as f64 / HILL_PERIOD).sin() * HILL_AMPLITUDE;
    }

    // Later rules override earlier ones on shared indices
    let mut decoration = None;
    if i < 300 && i % 30 == 0 {
        decoration = Some(Decoration { sprite: 4, offset: -2.5 });
    }
    if i % 21 == 0 {
        decoration = Some(Decoration { sprite: 5, offset: 1.0 });
    }
    if i > 300 && i % 45 == 0 {
        decoration = Some(Decoration { sprite: 3, offset: -1.0 });
    }
    if i > 800 && i % 45 == 0 {
        decoration = Some(Decoration { sprite: 0, offset: -1.2 });
    }
    segment.decoration = decoration.filter(|d| d.sprite < sprite_count);

    segment
}
