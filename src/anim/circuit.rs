//! Pulsing circuit-board backdrop.
//!
//! Nodes are sampled on a jittered grid across the viewport, each cell
//! included with a fixed probability. Edges are then built in one isolated
//! pairwise pass over the sampled nodes: any two nodes closer than a fixed
//! threshold on both axes get a link. The whole graph is rebuilt atomically
//! on every reseed, so edges can never dangle.

use rand::rngs::StdRng;
use rand::Rng;

use super::{Backdrop, BackdropKind, Frame, FrameGlyph, GlyphStyle, Viewport};

/// Grid sampling step, in cells. Terminal cells are roughly twice as tall
/// as they are wide, hence the 2:1 column/row ratio throughout.
const GRID_STEP_COLS: u16 = 8;
const GRID_STEP_ROWS: u16 = 4;

/// Jitter applied to each sampled grid position.
const JITTER_COLS: f32 = 2.0;
const JITTER_ROWS: f32 = 1.0;

/// Probability that a grid cell produces a node.
const NODE_CHANCE: f64 = 0.3;

/// Two nodes link when both axis distances are under these thresholds.
const LINK_COLS: f32 = 16.0;
const LINK_ROWS: f32 = 8.0;

/// Pulse radius wraps to zero past this ceiling.
pub const PULSE_CEILING: f32 = 6.0;

/// Pulse growth bounds, cells per tick.
const MIN_PULSE_RATE: f32 = 0.05;
const MAX_PULSE_RATE: f32 = 0.15;

/// Edge phase advance bounds, radians per tick.
const MIN_PHASE_RATE: f32 = 1.0 / 60.0;
const MAX_PHASE_RATE: f32 = 3.0 / 60.0;

/// A board node with an expanding pulse ring.
#[derive(Debug, Clone)]
pub struct Node {
    x: f32,
    y: f32,
    pulse: f32,
    pulse_rate: f32,
}

/// A link between two nodes, by index into the same generation's node list.
#[derive(Debug, Clone)]
pub struct Edge {
    a: usize,
    b: usize,
    phase: f32,
    phase_rate: f32,
}

/// The circuit-board store.
pub struct CircuitBoard {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    viewport: Viewport,
}

impl CircuitBoard {
    /// Create an empty store; call `reseed` before the first frame.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    #[allow(dead_code)]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn sample_nodes(viewport: Viewport, rng: &mut StdRng) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut gx = 0u16;
        while gx < viewport.cols {
            let mut gy = 0u16;
            while gy < viewport.rows {
                if rng.gen_bool(NODE_CHANCE) {
                    nodes.push(Node {
                        x: f32::from(gx) + rng.gen_range(-JITTER_COLS..JITTER_COLS),
                        y: f32::from(gy) + rng.gen_range(-JITTER_ROWS..JITTER_ROWS),
                        pulse: 0.0,
                        pulse_rate: rng.gen_range(MIN_PULSE_RATE..MAX_PULSE_RATE),
                    });
                }
                gy += GRID_STEP_ROWS;
            }
            gx += GRID_STEP_COLS;
        }
        nodes
    }
}

impl Default for CircuitBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Build edges for every node pair within the link threshold on both axes.
/// One-shot O(n²) pass; the node set is capped by grid density, so n stays
/// small.
fn link_nodes(nodes: &[Node], rng: &mut StdRng) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        for (j, other) in nodes.iter().enumerate().skip(i + 1) {
            if (node.x - other.x).abs() < LINK_COLS && (node.y - other.y).abs() < LINK_ROWS {
                edges.push(Edge {
                    a: i,
                    b: j,
                    phase: 0.0,
                    phase_rate: rng.gen_range(MIN_PHASE_RATE..MAX_PHASE_RATE),
                });
            }
        }
    }
    edges
}

/// Walk the integer cells of the segment from `(x0, y0)` to `(x1, y1)`.
fn raster_line(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        plot(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

impl Backdrop for CircuitBoard {
    fn kind(&self) -> BackdropKind {
        BackdropKind::Circuit
    }

    fn reseed(&mut self, viewport: Viewport, rng: &mut StdRng) {
        self.viewport = viewport;
        self.nodes.clear();
        self.edges.clear();
        if viewport.is_degenerate() {
            return;
        }
        self.nodes = Self::sample_nodes(viewport, rng);
        self.edges = link_nodes(&self.nodes, rng);
    }

    fn advance(&mut self, _rng: &mut StdRng) {
        for node in &mut self.nodes {
            node.pulse += node.pulse_rate;
            if node.pulse >= PULSE_CEILING {
                node.pulse = 0.0;
            }
        }
        for edge in &mut self.edges {
            edge.phase += edge.phase_rate;
        }
    }

    fn frame(&self) -> Frame {
        let mut frame = Frame::new();
        let (cols, rows) = (i32::from(self.viewport.cols), i32::from(self.viewport.rows));
        let mut push = |x: i32, y: i32, ch: char, level: f32, style: GlyphStyle| {
            if x >= 0 && x < cols && y >= 0 && y < rows && level > 0.0 {
                frame.push(FrameGlyph {
                    col: x as u16,
                    row: y as u16,
                    ch,
                    level,
                    style,
                });
            }
        };

        // Edges first so nodes draw over them.
        for edge in &self.edges {
            let (a, b) = (&self.nodes[edge.a], &self.nodes[edge.b]);
            let level = 0.3 + edge.phase.sin() * 0.2;
            raster_line(
                a.x.round() as i32,
                a.y.round() as i32,
                b.x.round() as i32,
                b.y.round() as i32,
                |x, y| push(x, y, '·', level, GlyphStyle::DIM),
            );
        }

        for node in &self.nodes {
            let (x, y) = (node.x.round() as i32, node.y.round() as i32);

            // Pulse ring, fading as it expands.
            let r = node.pulse.round() as i32;
            if r > 0 {
                let level = (0.5 - node.pulse / (2.0 * PULSE_CEILING)).max(0.0);
                push(x - r, y, 'o', level, GlyphStyle::DIM);
                push(x + r, y, 'o', level, GlyphStyle::DIM);
                push(x, y - r / 2, 'o', level, GlyphStyle::DIM);
                push(x, y + r / 2, 'o', level, GlyphStyle::DIM);
            }

            push(x, y, '+', 0.9, GlyphStyle::BOLD);
        }

        frame
    }

    fn population(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn seeded_board(cols: u16, rows: u16) -> (CircuitBoard, StdRng) {
        let mut rng = seeded();
        let mut board = CircuitBoard::new();
        board.reseed(Viewport::new(cols, rows), &mut rng);
        (board, rng)
    }

    #[test]
    fn pulse_radius_stays_bounded() {
        let (mut board, mut rng) = seeded_board(120, 40);
        assert!(board.population() > 0);

        for _ in 0..10_000 {
            board.advance(&mut rng);
            for node in &board.nodes {
                assert!(node.pulse >= 0.0);
                assert!(node.pulse < PULSE_CEILING);
            }
        }
    }

    #[test]
    fn edges_reference_live_nodes() {
        let (board, _) = seeded_board(160, 50);
        for edge in &board.edges {
            assert!(edge.a < board.nodes.len());
            assert!(edge.b < board.nodes.len());
            let (a, b) = (&board.nodes[edge.a], &board.nodes[edge.b]);
            assert!((a.x - b.x).abs() < LINK_COLS);
            assert!((a.y - b.y).abs() < LINK_ROWS);
        }
    }

    #[test]
    fn reseed_rebuilds_graph_atomically() {
        let (mut board, mut rng) = seeded_board(160, 50);
        for _ in 0..50 {
            board.advance(&mut rng);
        }

        board.reseed(Viewport::new(40, 12), &mut rng);
        // No index from the old, larger generation may survive.
        for edge in &board.edges {
            assert!(edge.a < board.nodes.len());
            assert!(edge.b < board.nodes.len());
        }
        for node in &board.nodes {
            assert!(node.x < 40.0 + JITTER_COLS);
            assert!(node.y < 12.0 + JITTER_ROWS);
            assert_eq!(node.pulse, 0.0);
        }
    }

    #[test]
    fn node_count_is_capped_by_grid_density() {
        let (board, _) = seeded_board(120, 40);
        let grid_cells = (120 / GRID_STEP_COLS as usize + 1) * (40 / GRID_STEP_ROWS as usize + 1);
        assert!(board.population() <= grid_cells);
    }

    #[test]
    fn degenerate_viewport_seeds_empty() {
        let (mut board, mut rng) = seeded_board(0, 0);
        assert_eq!(board.population(), 0);
        assert_eq!(board.edge_count(), 0);
        board.advance(&mut rng);
        assert!(board.frame().is_empty());
    }

    #[test]
    fn frame_stays_inside_viewport() {
        let (mut board, mut rng) = seeded_board(60, 20);
        for _ in 0..200 {
            board.advance(&mut rng);
            for g in board.frame() {
                assert!(g.col < 60);
                assert!(g.row < 20);
            }
        }
    }

    #[test]
    fn raster_line_endpoints_included() {
        let mut cells = Vec::new();
        raster_line(0, 0, 5, 3, |x, y| cells.push((x, y)));
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells.last(), Some(&(5, 3)));
    }
}
