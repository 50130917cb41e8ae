//! Terminal presentation of a race
//!
//! [`scene`] turns the track and camera into screen-space geometry,
//! [`canvas`] rasterises it, and [`renderer`] lays the road view out with
//! the HUD panels.

pub mod canvas;
pub mod minimap;
pub mod renderer;
pub mod scene;

pub use canvas::Framebuffer;
pub use minimap::Minimap;
pub use renderer::{RaceView, Renderer};
pub use scene::{
    place_decoration, project_scene, ActorPlacement, Opponent, Placement, RoadBand, Scene,
    SceneInput, SpritePlacement,
};
