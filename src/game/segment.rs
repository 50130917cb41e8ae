use serde::{Deserialize, Serialize};

/// Smallest camera-to-segment depth used by the projection
pub const MIN_DEPTH: f64 = 1e-5;

/// An opaque 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// The three colours a segment is painted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentColors {
    /// Ground on both sides of the road
    pub surface: Rgb,
    pub rumble: Rgb,
    pub road: Rgb,
}

/// Screen-space projection of a segment, rewritten every frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Projection {
    /// Screen x of the road centre
    pub x: f64,
    /// Screen y of the road surface
    pub y: f64,
    /// Half the road width on screen
    pub w: f64,
    pub scale: f64,
}

/// Camera position in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Camera {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Screen and lens parameters shared by every projection in a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub camera_depth: f64,
    pub road_width: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, camera_depth: f64, road_width: f64) -> Self {
        Self {
            width,
            height,
            camera_depth,
            road_width,
        }
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }
}

/// A decoration placed beside a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    /// Index into the decoration sprite set
    pub sprite: usize,
    /// Lateral offset in road half-widths (negative is left)
    pub offset: f64,
}

/// One fixed-length slice of the track
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    index: usize,
    /// World position
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Curvature added to the horizontal offset of the following segments
    pub curve: f64,
    pub decoration: Option<Decoration>,
    pub colors: SegmentColors,
    /// Latest projection; only valid for the frame that computed it
    pub projection: Projection,
    /// Screen y of the nearest occluding road edge for this frame
    pub clip: f64,
}

impl RoadSegment {
    pub fn new(index: usize, colors: SegmentColors) -> Self {
        Self {
            index,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            curve: 0.0,
            decoration: None,
            colors,
            projection: Projection::default(),
            clip: 0.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Project the world position into screen space for the given camera.
    ///
    /// A depth at or below [`MIN_DEPTH`] is evaluated at `MIN_DEPTH`, which
    /// pushes the segment far below the screen instead of dividing by zero.
    pub fn project(&mut self, camera: Camera, viewport: &Viewport) -> Projection {
        let depth = self.z - camera.z;
        let depth = if depth.is_finite() && depth > MIN_DEPTH {
            depth
        } else {
            MIN_DEPTH
        };

        let scale = viewport.camera_depth / depth;
        let projection = Projection {
            x: (1.0 + scale * (self.x - camera.x)) * viewport.half_width(),
            y: (1.0 - scale * (self.y - camera.y)) * viewport.half_height(),
            w: scale * viewport.road_width * viewport.half_width(),
            scale,
        };

        self.projection = projection;
        projection
    }
}
