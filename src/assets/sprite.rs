use crate::game::Rgb;

/// An image with integer pixel dimensions and per-texel transparency.
///
/// `width`/`height` are the nominal size used for on-screen scaling. The
/// texel grid may be coarser than that; it is sampled by normalised
/// coordinates when drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    width: u32,
    height: u32,
    columns: usize,
    rows: usize,
    texels: Vec<Option<Rgb>>,
}

impl Sprite {
    /// Build a sprite from a texel grid in row-major order.
    ///
    /// Returns `None` when the grid is empty or its length does not match
    /// `columns * rows`.
    pub fn new(
        width: u32,
        height: u32,
        columns: usize,
        rows: usize,
        texels: Vec<Option<Rgb>>,
    ) -> Option<Self> {
        if columns == 0 || rows == 0 || texels.len() != columns * rows {
            return None;
        }
        Some(Self {
            width: width.max(1),
            height: height.max(1),
            columns,
            rows,
            texels,
        })
    }

    /// Build a sprite from ASCII art, mapping each character through `palette`.
    /// Characters missing from the palette are transparent; short rows are padded.
    pub fn from_art(width: u32, height: u32, art: &[&str], palette: &[(char, Rgb)]) -> Self {
        let rows = art.len().max(1);
        let columns = art.iter().map(|row| row.chars().count()).max().unwrap_or(1).max(1);

        let mut texels = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            let line: Vec<char> = art.get(row).map(|r| r.chars().collect()).unwrap_or_default();
            for column in 0..columns {
                let texel = line.get(column).and_then(|ch| {
                    palette
                        .iter()
                        .find(|(key, _)| key == ch)
                        .map(|(_, color)| *color)
                });
                texels.push(texel);
            }
        }

        Self {
            width: width.max(1),
            height: height.max(1),
            columns,
            rows,
            texels,
        }
    }

    /// A fully opaque single-colour rectangle
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            columns: 1,
            rows: 1,
            texels: vec![Some(color)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample the texel at normalised coordinates (`u`, `v` in `[0, 1)`).
    /// Returns `None` for transparent texels.
    pub fn sample(&self, u: f64, v: f64) -> Option<Rgb> {
        let column = ((u.clamp(0.0, 1.0) * self.columns as f64) as usize).min(self.columns - 1);
        let row = ((v.clamp(0.0, 1.0) * self.rows as f64) as usize).min(self.rows - 1);
        self.texels[row * self.columns + column]
    }

    /// Same image with every opaque texel blended towards `tint` by `amount` (0..=1)
    pub fn tinted(&self, tint: Rgb, amount: f64) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - amount) + b as f64 * amount).round() as u8;
        Self {
            texels: self
                .texels
                .iter()
                .map(|texel| texel.map(|c| Rgb(mix(c.0, tint.0), mix(c.1, tint.1), mix(c.2, tint.2))))
                .collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb(255, 0, 0);

    #[test]
    fn test_from_art_dimensions_and_transparency() {
        let sprite = Sprite::from_art(40, 20, &["#.", ".#"], &[('#', RED)]);

        assert_eq!(sprite.width(), 40);
        assert_eq!(sprite.height(), 20);
        assert_eq!(sprite.sample(0.1, 0.1), Some(RED));
        assert_eq!(sprite.sample(0.9, 0.1), None);
        assert_eq!(sprite.sample(0.9, 0.9), Some(RED));
    }

    #[test]
    fn test_sample_clamps_out_of_range() {
        let sprite = Sprite::solid(10, 10, RED);
        assert_eq!(sprite.sample(-1.0, 2.0), Some(RED));
        assert_eq!(sprite.sample(1.0, 1.0), Some(RED));
    }

    #[test]
    fn test_new_rejects_mismatched_grid() {
        assert!(Sprite::new(10, 10, 2, 2, vec![None; 3]).is_none());
        assert!(Sprite::new(10, 10, 0, 0, vec![]).is_none());
        assert!(Sprite::new(10, 10, 1, 2, vec![None, Some(RED)]).is_some());
    }

    #[test]
    fn test_tint_keeps_transparency() {
        let sprite = Sprite::from_art(2, 1, &["#."], &[('#', Rgb(0, 0, 0))]);
        let tinted = sprite.tinted(Rgb(200, 0, 0), 0.5);

        assert_eq!(tinted.sample(0.0, 0.0), Some(Rgb(100, 0, 0)));
        assert_eq!(tinted.sample(0.9, 0.0), None);
    }
}
