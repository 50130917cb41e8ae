//! Per-frame projection pass
//!
//! Walks the segments ahead of the camera, projects each one, and records
//! what has to be painted: road bands back to front, decoration sprites,
//! and the opponent if it sits on a visible segment. Nothing is drawn
//! here, so the pass can be tested without a screen.

use crate::assets::Sprite;
use crate::game::{Camera, Projection, SegmentColors, Track, Viewport};

/// Reference window the sprite constants were tuned against
const REFERENCE_WIDTH: f64 = 1000.0;
const REFERENCE_HEIGHT: f64 = 750.0;

/// Screen half-width at which a decoration is drawn at its nominal size
const DECORATION_SCALE_W: f64 = 266.0;
/// Decorations sit slightly below their segment line
const DECORATION_DROP: f64 = 4.0;

/// Screen half-width at which the opponent is drawn at full size
const OPPONENT_SCALE_W: f64 = 400.0;
const OPPONENT_SIZE: (f64, f64) = (456.0, 285.0);
const OPPONENT_MIN_SIZE: (f64, f64) = (8.0, 5.0);

/// Player car size and bottom edge on the reference window
const PLAYER_SIZE: (f64, f64) = (456.0, 285.0);
const PLAYER_BOTTOM: f64 = 735.0;

/// One trapezoid of road between two projected segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadBand {
    pub colors: SegmentColors,
    /// Nearer edge (lower on screen)
    pub near: Projection,
    /// Farther edge (higher on screen)
    pub far: Projection,
}

/// Screen rectangle for a sprite, with its occlusion line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Rows at or below this screen y are hidden
    pub clip: f64,
}

impl Placement {
    /// Height left visible after clipping
    pub fn visible_height(&self) -> f64 {
        (self.clip - self.top).clamp(0.0, self.height)
    }
}

/// A decoration resolved during the pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpritePlacement {
    /// Index into the decoration sprite set
    pub sprite: usize,
    pub placement: Placement,
}

/// The opponent resolved during the pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorPlacement {
    /// Segment the actor was found on
    pub segment: usize,
    pub placement: Placement,
}

/// The opponent as seen by the projection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opponent {
    pub position: f64,
    /// Lateral offset in world units
    pub lane: f64,
}

/// Camera and look-ahead inputs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneInput {
    /// Player position along the track
    pub position: f64,
    /// Player lateral offset; the camera follows it
    pub player_x: f64,
    pub camera_height: f64,
    /// Segments projected ahead of the camera
    pub render_distance: usize,
    /// World half-width used to place the opponent across the road
    pub road_half_width: f64,
    pub opponent: Option<Opponent>,
}

/// Everything needed to paint one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Road bands in painting order (far bands are painted last and sit on top)
    pub bands: Vec<RoadBand>,
    /// Decorations in painting order, farthest first
    pub decorations: Vec<SpritePlacement>,
    pub actor: Option<ActorPlacement>,
    pub player: Option<Placement>,
}

/// Project the segments ahead of the camera and collect what to draw.
///
/// Segment projections and clip lines are written back into the track.
/// Each projected segment shifts the camera for the next one by the
/// accumulated curvature, and a segment is only drawn when it rises above
/// everything drawn before it.
pub fn project_scene(
    track: &mut Track,
    input: &SceneInput,
    viewport: &Viewport,
    decorations: &[Sprite],
) -> Scene {
    let mut scene = Scene::default();
    if track.is_empty() || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return scene;
    }

    let count = track.len();
    let length = track.length();
    let position = track.wrap(input.position);
    let start = track.segment_index(position);
    let render_distance = input.render_distance.min(count);
    let opponent_segment = input.opponent.map(|o| track.segment_index(o.position));

    let mut max_y = viewport.height;
    let mut x = 0.0;
    let mut dx = 0.0;
    let mut previous: Option<Projection> = None;

    for n in start..start + render_distance {
        let segment = track.segment_mut(n);
        // Segments past the loop end are seen from one lap back
        let camera_z = if n >= count { position - length } else { position };
        let camera = Camera::new(input.player_x - x, input.camera_height, camera_z);

        let projection = segment.project(camera, viewport);
        x += dx;
        dx += segment.curve;
        segment.clip = max_y;

        let near = previous.replace(projection);
        if projection.y >= max_y {
            continue;
        }
        max_y = projection.y;

        if let Some(near) = near {
            scene.bands.push(RoadBand {
                colors: segment.colors,
                near,
                far: projection,
            });
        }

        if let (Some(index), Some(opponent)) = (opponent_segment, input.opponent) {
            if n % count == index {
                scene.actor = place_opponent(
                    index,
                    &projection,
                    segment.clip,
                    opponent.lane,
                    input.road_half_width,
                    viewport,
                );
            }
        }
    }

    for n in (start + 2..start + render_distance).rev() {
        let segment = track.segment(n);
        let Some(decoration) = segment.decoration else {
            continue;
        };
        let Some(sprite) = decorations.get(decoration.sprite) else {
            continue;
        };
        if let Some(placement) = place_decoration(
            sprite,
            &segment.projection,
            segment.clip,
            decoration.offset,
            viewport,
        ) {
            scene.decorations.push(SpritePlacement {
                sprite: decoration.sprite,
                placement,
            });
        }
    }

    scene.player = Some(place_player(viewport));
    scene
}

/// Scale and clip a decoration beside its segment.
///
/// Returns `None` when the sprite would be drawn larger than its nominal
/// size (too close to the camera) or is fully hidden behind the clip line.
pub fn place_decoration(
    sprite: &Sprite,
    projection: &Projection,
    clip: f64,
    offset: f64,
    viewport: &Viewport,
) -> Option<Placement> {
    let w = sprite.width() as f64;
    let h = sprite.height() as f64;

    let width = w * projection.w / DECORATION_SCALE_W;
    let height = h * projection.w / DECORATION_SCALE_W;
    if !(width.is_finite() && height.is_finite()) || width > w || height <= 0.0 {
        return None;
    }

    let drop = DECORATION_DROP * viewport.height / REFERENCE_HEIGHT;
    let left = projection.x + projection.scale * offset * viewport.half_width() + width * offset;
    let top = projection.y + drop - height;

    let hidden = (top + height - clip).max(0.0);
    if hidden >= height {
        return None;
    }

    Some(Placement {
        left,
        top,
        width,
        height,
        clip,
    })
}

fn place_opponent(
    segment: usize,
    projection: &Projection,
    clip: f64,
    lane: f64,
    road_half_width: f64,
    viewport: &Viewport,
) -> Option<ActorPlacement> {
    if projection.w <= 0.0 || road_half_width <= 0.0 {
        return None;
    }

    let ratio = lane / road_half_width;
    let center_x = projection.x + ratio * projection.w;
    let bottom = projection.y;

    let screen_scale = viewport.width / REFERENCE_WIDTH;
    let scale = projection.w / OPPONENT_SCALE_W;
    let width = (OPPONENT_SIZE.0 * scale).max(OPPONENT_MIN_SIZE.0 * screen_scale).floor();
    let height = (OPPONENT_SIZE.1 * scale).max(OPPONENT_MIN_SIZE.1 * screen_scale).floor();

    if bottom - height > viewport.height || bottom < 0.0 {
        return None;
    }

    let top = bottom - height;
    let placement = Placement {
        left: (center_x - width / 2.0).floor(),
        top,
        width,
        height,
        clip,
    };
    if placement.visible_height() <= 0.0 {
        return None;
    }

    Some(ActorPlacement { segment, placement })
}

fn place_player(viewport: &Viewport) -> Placement {
    let scale = viewport.width / REFERENCE_WIDTH;
    let width = PLAYER_SIZE.0 * scale;
    let height = PLAYER_SIZE.1 * scale;
    let bottom = PLAYER_BOTTOM * viewport.height / REFERENCE_HEIGHT;

    Placement {
        left: viewport.half_width() - width / 2.0,
        top: bottom - height,
        width,
        height,
        clip: viewport.height,
    }
}
