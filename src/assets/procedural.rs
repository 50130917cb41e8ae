use super::{AssetProvider, Sprite};
use crate::game::{Facing, Rgb};

const LEAF: Rgb = Rgb(34, 139, 34);
const DARK_LEAF: Rgb = Rgb(0, 100, 0);
const BARK: Rgb = Rgb(101, 67, 33);
const STONE: Rgb = Rgb(128, 128, 128);
const WOOD: Rgb = Rgb(139, 90, 43);
const WIRE: Rgb = Rgb(40, 40, 40);
const SIGN: Rgb = Rgb(255, 200, 0);
const BODY: Rgb = Rgb(230, 180, 0);
const GLASS: Rgb = Rgb(60, 90, 140);
const TYRE: Rgb = Rgb(20, 20, 20);
const LIGHT: Rgb = Rgb(255, 60, 60);

/// Built-in sprites drawn from ASCII art, used when no image assets exist
pub struct ProceduralAssets {
    decorations: Vec<Sprite>,
    front: Sprite,
    left: Sprite,
    right: Sprite,
    opponent: Sprite,
}

impl ProceduralAssets {
    pub fn new() -> Self {
        let front = car_sprite(&[
            "   ######   ",
            "  #gggggg#  ",
            " ##########",
            "#L########L#",
            "############",
            "tt        tt",
        ]);
        let left = car_sprite(&[
            "  ######    ",
            " #gggggg#   ",
            "##########  ",
            "L###########",
            "############",
            "tt       tt ",
        ]);
        let right = car_sprite(&[
            "    ######  ",
            "   #gggggg# ",
            "  ##########",
            "###########L",
            "############",
            " tt       tt",
        ]);
        let opponent = front.tinted(Rgb(180, 0, 0), 0.47);

        Self {
            decorations: decoration_sprites(),
            front,
            left,
            right,
            opponent,
        }
    }
}

impl Default for ProceduralAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetProvider for ProceduralAssets {
    fn decorations(&self) -> &[Sprite] {
        &self.decorations
    }

    fn vehicle(&self, facing: Facing) -> &Sprite {
        match facing {
            Facing::Front => &self.front,
            Facing::Left => &self.left,
            Facing::Right => &self.right,
        }
    }

    fn opponent(&self) -> &Sprite {
        &self.opponent
    }
}

fn car_sprite(art: &[&str]) -> Sprite {
    Sprite::from_art(
        456,
        285,
        art,
        &[('#', BODY), ('g', GLASS), ('t', TYRE), ('L', LIGHT)],
    )
}

fn decoration_sprites() -> Vec<Sprite> {
    let boulder = Sprite::from_art(
        160,
        100,
        &[" ### ", "#####", "#####"],
        &[('#', STONE)],
    );
    let bush = Sprite::from_art(
        180,
        120,
        &[" ooo ", "ooOoo", "OoooO"],
        &[('o', LEAF), ('O', DARK_LEAF)],
    );
    let sign = Sprite::from_art(
        200,
        220,
        &["#####", "#####", "  |  ", "  |  "],
        &[('#', SIGN), ('|', WOOD)],
    );
    let palm = Sprite::from_art(
        220,
        420,
        &["oo oo", " ooo ", "  |  ", "  |  ", "  |  ", "  |  "],
        &[('o', LEAF), ('|', BARK)],
    );
    let pine = Sprite::from_art(
        240,
        480,
        &["  o  ", " ooo ", " ooo ", "ooooo", "ooooo", "  |  "],
        &[('o', DARK_LEAF), ('|', BARK)],
    );
    let pole = Sprite::from_art(
        120,
        460,
        &["-----", "  |  ", "  |  ", "  |  ", "  |  ", "  |  "],
        &[('-', WIRE), ('|', WOOD)],
    );

    vec![boulder, bush, sign, palm, pine, pole]
}
