use crate::config::MIN_CURVE_POINTS;
use glam::Vec2;

/// Parametric formula turning control points into a curve
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasisFamily {
    /// Uniform cubic B-spline, every 4 consecutive points form one piece
    #[default]
    Spline,
    /// Piecewise cubic Bézier, every 3 points after the first form one piece
    Bezier,
    /// Catmull-Rom spline through the inner points of every 4 point window
    CatmullRom,
}

impl BasisFamily {
    pub const ALL: [BasisFamily; 3] = [
        BasisFamily::Spline,
        BasisFamily::Bezier,
        BasisFamily::CatmullRom,
    ];

    /// Number of pieces formed by `point_count` control points
    ///
    /// `None` when the points cannot form a curve.
    pub fn piece_count(&self, point_count: usize) -> Option<u32> {
        if point_count < MIN_CURVE_POINTS {
            return None;
        }

        let pieces = match self {
            BasisFamily::Spline | BasisFamily::CatmullRom => point_count - 3,
            BasisFamily::Bezier => (point_count - 1) / 3,
        };

        Some(pieces as u32)
    }

    /// Number of samples the renderer draws for `point_count` control points
    ///
    /// `None` means nothing is drawn.
    pub fn sample_count(&self, point_count: usize, segments_per_piece: u32) -> Option<u32> {
        self.piece_count(point_count)
            .map(|pieces| segments_per_piece * pieces + 1)
    }

    /// Index of the first control point of `piece`
    pub fn piece_start(&self, piece: u32) -> usize {
        match self {
            BasisFamily::Spline | BasisFamily::CatmullRom => piece as usize,
            BasisFamily::Bezier => 3 * piece as usize,
        }
    }

    /// Characteristic matrix, row `i` holds the weights of `t^i`
    fn char_matrix(&self) -> [[f32; 4]; 4] {
        match self {
            BasisFamily::Spline => [
                [1.0 / 6.0, 4.0 / 6.0, 1.0 / 6.0, 0.0],
                [-3.0 / 6.0, 0.0, 3.0 / 6.0, 0.0],
                [3.0 / 6.0, -6.0 / 6.0, 3.0 / 6.0, 0.0],
                [-1.0 / 6.0, 3.0 / 6.0, -3.0 / 6.0, 1.0 / 6.0],
            ],
            BasisFamily::Bezier => [
                [1.0, 0.0, 0.0, 0.0],
                [-3.0, 3.0, 0.0, 0.0],
                [3.0, -6.0, 3.0, 0.0],
                [-1.0, 3.0, -3.0, 1.0],
            ],
            BasisFamily::CatmullRom => [
                [0.0, 1.0, 0.0, 0.0],
                [-0.5, 0.0, 0.5, 0.0],
                [1.0, -2.5, 2.0, -0.5],
                [-0.5, 1.5, -1.5, 0.5],
            ],
        }
    }

    /// Evaluates one piece at parameter `t` in `[0, 1]`
    pub fn evaluate_piece(&self, p: [Vec2; 4], t: f32) -> Vec2 {
        let [c0, c1, c2, c3] = self.char_matrix();
        let powers = [1.0, t, t * t, t * t * t];

        let mut weights = [0.0; 4];
        for (i, w) in weights.iter_mut().enumerate() {
            *w = powers[0] * c0[i] + powers[1] * c1[i] + powers[2] * c2[i] + powers[3] * c3[i];
        }

        p[0] * weights[0] + p[1] * weights[1] + p[2] * weights[2] + p[3] * weights[3]
    }

    /// Position of sample `index`, the same layout `curve.vert` uses
    ///
    /// Sample `i` lies on piece `i / s` at `t = (i % s) / s`, the final sample
    /// closes the last piece at `t = 1`.
    pub fn evaluate(&self, points: &[Vec2], segments_per_piece: u32, index: u32) -> Option<Vec2> {
        let pieces = self.piece_count(points.len())?;
        let samples = self.sample_count(points.len(), segments_per_piece)?;
        if index >= samples {
            return None;
        }

        let segments = segments_per_piece.max(1);
        let mut piece = index / segments;
        let mut t = (index % segments) as f32 / segments as f32;
        if piece >= pieces {
            piece = pieces - 1;
            t = 1.0;
        }

        let start = self.piece_start(piece);
        let window = points.get(start..start + 4)?;
        Some(self.evaluate_piece([window[0], window[1], window[2], window[3]], t))
    }

    /// Short lowercase name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            BasisFamily::Spline => "bspline",
            BasisFamily::Bezier => "bezier",
            BasisFamily::CatmullRom => "catmull_rom",
        }
    }
}
