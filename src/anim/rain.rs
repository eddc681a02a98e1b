//! Falling-glyph rain backdrop.
//!
//! A fixed pool of particles, one per stream. Each particle falls down a
//! fixed column slot, occasionally flips its glyph, and respawns above the
//! top edge once it passes the bottom. The pool never grows or shrinks
//! after seeding; only particle attributes mutate.

use rand::rngs::StdRng;
use rand::Rng;

use super::{Backdrop, BackdropKind, Frame, FrameGlyph, GlyphStyle, Viewport};

/// Default number of falling streams.
pub const DEFAULT_POOL: usize = 50;

/// Particles spawn with `y` in `[-SPAWN_OFFSET, 0)`, staggering re-entry.
pub const SPAWN_OFFSET: f32 = 20.0;

/// Fall speed bounds, rows per tick.
const MIN_SPEED: f32 = 0.2;
const MAX_SPEED: f32 = 0.9;

/// Brightness bounds for a freshly spawned particle.
const MIN_LEVEL: f32 = 0.3;
const MAX_LEVEL: f32 = 1.0;

/// Per-tick probability that a particle's glyph re-randomizes.
const GLYPH_FLIP_CHANCE: f64 = 0.04;

/// Halfwidth katakana plus digits, the classic rain alphabet.
const ALPHABET: &[char] = &[
    'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ',
    'ﾀ', 'ﾁ', 'ﾂ', 'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', 'ﾊ', 'ﾋ', 'ﾌ', 'ﾍ', 'ﾎ',
    'ﾏ', 'ﾐ', 'ﾑ', 'ﾒ', 'ﾓ', 'ﾔ', 'ﾕ', 'ﾖ', 'ﾗ', 'ﾘ', 'ﾙ', 'ﾚ', 'ﾛ', 'ﾜ', 'ﾝ',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// One falling glyph.
#[derive(Debug, Clone)]
struct Particle {
    col: u16,
    y: f32,
    speed: f32,
    glyph: char,
    level: f32,
}

impl Particle {
    fn spawn(viewport: Viewport, rng: &mut StdRng) -> Self {
        Self {
            col: rng.gen_range(0..viewport.cols),
            y: -rng.gen_range(0.0..SPAWN_OFFSET),
            speed: rng.gen_range(MIN_SPEED..MAX_SPEED),
            glyph: random_glyph(rng),
            level: rng.gen_range(MIN_LEVEL..MAX_LEVEL),
        }
    }
}

fn random_glyph(rng: &mut StdRng) -> char {
    ALPHABET[rng.gen_range(0..ALPHABET.len())]
}

/// The rain particle store.
pub struct CharRain {
    particles: Vec<Particle>,
    viewport: Viewport,
    pool: usize,
}

impl CharRain {
    /// Create an empty store; call `reseed` before the first frame.
    pub fn new(pool: usize) -> Self {
        Self {
            particles: Vec::new(),
            viewport: Viewport::default(),
            pool,
        }
    }
}

impl Backdrop for CharRain {
    fn kind(&self) -> BackdropKind {
        BackdropKind::Rain
    }

    fn reseed(&mut self, viewport: Viewport, rng: &mut StdRng) {
        self.viewport = viewport;
        self.particles.clear();
        if viewport.is_degenerate() {
            return;
        }
        self.particles
            .extend((0..self.pool).map(|_| Particle::spawn(viewport, rng)));
    }

    fn advance(&mut self, rng: &mut StdRng) {
        let floor = f32::from(self.viewport.rows);
        for p in &mut self.particles {
            p.y += p.speed;
            if rng.gen_bool(GLYPH_FLIP_CHANCE) {
                p.glyph = random_glyph(rng);
            }
            if p.y > floor {
                *p = Particle::spawn(self.viewport, rng);
            }
        }
    }

    fn frame(&self) -> Frame {
        self.particles
            .iter()
            .filter(|p| p.y >= 0.0 && (p.y as u16) < self.viewport.rows)
            .map(|p| FrameGlyph {
                col: p.col,
                row: p.y as u16,
                ch: p.glyph,
                level: p.level,
                style: if p.level > 0.8 {
                    GlyphStyle::BOLD
                } else {
                    GlyphStyle::DIM
                },
            })
            .collect()
    }

    fn population(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn pool_size_is_constant_across_ticks() {
        let mut rng = seeded();
        let mut rain = CharRain::new(DEFAULT_POOL);
        rain.reseed(Viewport::new(120, 40), &mut rng);
        assert_eq!(rain.population(), DEFAULT_POOL);

        for _ in 0..10_000 {
            rain.advance(&mut rng);
            assert_eq!(rain.population(), DEFAULT_POOL);
        }
    }

    #[test]
    fn particles_wrap_independently() {
        let mut rng = seeded();
        let mut rain = CharRain::new(DEFAULT_POOL);
        let viewport = Viewport::new(80, 24);
        rain.reseed(viewport, &mut rng);

        for _ in 0..5_000 {
            rain.advance(&mut rng);
            for p in &rain.particles {
                // Never below the floor after an advance: anything that fell
                // past it was respawned above the top edge in the same tick.
                assert!(p.y <= f32::from(viewport.rows));
                assert!(p.y >= -SPAWN_OFFSET);
                assert!(p.col < viewport.cols);
            }
        }
    }

    #[test]
    fn reseed_replaces_the_whole_pool() {
        let mut rng = seeded();
        let mut rain = CharRain::new(DEFAULT_POOL);
        rain.reseed(Viewport::new(200, 60), &mut rng);
        for _ in 0..100 {
            rain.advance(&mut rng);
        }

        // Shrinking resize: same pool size, every particle fits the new
        // bounds, nothing carried over from the old seeding.
        let small = Viewport::new(100, 30);
        rain.reseed(small, &mut rng);
        assert_eq!(rain.population(), DEFAULT_POOL);
        for p in &rain.particles {
            assert!(p.col < small.cols);
            assert!(p.y < f32::from(small.rows));
            assert!(p.y >= -SPAWN_OFFSET);
        }
    }

    #[test]
    fn degenerate_viewport_seeds_empty() {
        let mut rng = seeded();
        let mut rain = CharRain::new(DEFAULT_POOL);
        rain.reseed(Viewport::new(0, 0), &mut rng);
        assert_eq!(rain.population(), 0);

        // Advancing an empty store is a no-op, not a crash.
        rain.advance(&mut rng);
        assert!(rain.frame().is_empty());

        // A real resize recovers.
        rain.reseed(Viewport::new(80, 24), &mut rng);
        assert_eq!(rain.population(), DEFAULT_POOL);
    }

    #[test]
    fn frame_stays_inside_viewport() {
        let mut rng = seeded();
        let mut rain = CharRain::new(DEFAULT_POOL);
        let viewport = Viewport::new(60, 20);
        rain.reseed(viewport, &mut rng);
        for _ in 0..500 {
            rain.advance(&mut rng);
            for g in rain.frame() {
                assert!(g.col < viewport.cols);
                assert!(g.row < viewport.rows);
            }
        }
    }
}
