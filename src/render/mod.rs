//! Contract between the curve model and a GPU backend.
//!
//! [`Sketch::frame`](crate::sketch::Sketch::frame) produces a [`Frame`],
//! [`submit`] turns it into [`RenderDriver`] calls.

pub mod vulkan;

use crate::sketch::BasisFamily;
use glam::Vec2;

/// Uniform values a curve program reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Hue(f32),
    Brightness(f32),
    ControlPoint { index: usize, position: Vec2 },
    SegmentsPerPiece(u32),
    PointSize(f32),
}

/// GPU backend drawing curves
pub trait RenderDriver {
    /// Selects the program of a basis family for the following draws
    fn bind_program(&mut self, basis: BasisFamily);

    fn set_uniform(&mut self, uniform: Uniform);

    /// Draws `count` samples of the bound program as points
    fn draw_points(&mut self, count: u32);

    /// Draws `count` samples of the bound program as a connected line
    fn draw_line_strip(&mut self, count: u32);
}

/// Everything needed to draw one curve
#[derive(Debug, Clone, PartialEq)]
pub struct CurveDraw {
    pub control_points: Vec<Vec2>,
    pub hue: f32,
    pub brightness: f32,
    pub point_size: f32,
    /// `None` when the curve has too few points to be drawn
    pub sample_count: Option<u32>,
}

/// Snapshot of one tick, curves in render order
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub basis: BasisFamily,
    pub segments_per_piece: u32,
    pub show_samples: bool,
    pub show_segments: bool,
    pub curves: Vec<CurveDraw>,
}

/// Issues the draw calls of `frame`
///
/// Color and control points are uploaded for every curve, curves without a
/// sample count are never drawn.
pub fn submit<D: RenderDriver + ?Sized>(driver: &mut D, frame: &Frame) {
    driver.bind_program(frame.basis);

    for curve in &frame.curves {
        driver.set_uniform(Uniform::Hue(curve.hue));
        driver.set_uniform(Uniform::Brightness(curve.brightness));

        for (index, position) in curve.control_points.iter().enumerate() {
            driver.set_uniform(Uniform::ControlPoint {
                index,
                position: *position,
            });
        }

        let Some(count) = curve.sample_count else {
            continue;
        };

        driver.set_uniform(Uniform::SegmentsPerPiece(frame.segments_per_piece));

        if frame.show_samples {
            driver.set_uniform(Uniform::PointSize(curve.point_size));
            driver.draw_points(count);
        }

        if frame.show_segments {
            driver.draw_line_strip(count);
        }
    }
}

/// Receives the status line once per tick
pub trait StatusDisplay {
    fn show_status(&mut self, segments_per_piece: u32, speed: f32);
}

/// Human readable status line
pub fn status_text(segments_per_piece: u32, speed: f32) -> String {
    format!("Segments: {segments_per_piece} | Speed: {speed:.1}x")
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Bind(BasisFamily),
        Set(Uniform),
        Points(u32),
        Lines(u32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl RenderDriver for Recorder {
        fn bind_program(&mut self, basis: BasisFamily) {
            self.calls.push(Call::Bind(basis));
        }

        fn set_uniform(&mut self, uniform: Uniform) {
            self.calls.push(Call::Set(uniform));
        }

        fn draw_points(&mut self, count: u32) {
            self.calls.push(Call::Points(count));
        }

        fn draw_line_strip(&mut self, count: u32) {
            self.calls.push(Call::Lines(count));
        }
    }

    fn curve(points: usize, sample_count: Option<u32>) -> CurveDraw {
        CurveDraw {
            control_points: (0..points).map(|i| vec2(i as f32, 0.0)).collect(),
            hue: 10.0,
            brightness: 0.5,
            point_size: 4.0,
            sample_count,
        }
    }

    fn frame(curves: Vec<CurveDraw>) -> Frame {
        Frame {
            basis: BasisFamily::CatmullRom,
            segments_per_piece: 3,
            show_samples: false,
            show_segments: true,
            curves,
        }
    }

    fn draws(calls: &[Call]) -> Vec<Call> {
        calls
            .iter()
            .filter(|call| matches!(call, Call::Points(_) | Call::Lines(_)))
            .cloned()
            .collect()
    }

    #[test]
    fn binds_program_first() {
        let mut recorder = Recorder::default();
        submit(&mut recorder, &frame(vec![]));
        assert_eq!(recorder.calls, vec![Call::Bind(BasisFamily::CatmullRom)]);
    }

    #[test]
    fn short_curves_upload_but_never_draw() {
        let mut recorder = Recorder::default();
        submit(&mut recorder, &frame(vec![curve(3, None)]));

        assert!(draws(&recorder.calls).is_empty());
        assert!(recorder.calls.contains(&Call::Set(Uniform::ControlPoint {
            index: 2,
            position: vec2(2.0, 0.0),
        })));
        assert!(
            !recorder
                .calls
                .iter()
                .any(|call| matches!(call, Call::Set(Uniform::SegmentsPerPiece(_))))
        );
    }

    #[test]
    fn visibility_flags_select_draws() {
        let curves = vec![curve(4, Some(4)), curve(2, None), curve(5, Some(7))];

        let mut recorder = Recorder::default();
        submit(&mut recorder, &frame(curves.clone()));
        assert_eq!(draws(&recorder.calls), vec![Call::Lines(4), Call::Lines(7)]);

        let mut both = frame(curves.clone());
        both.show_samples = true;
        let mut recorder = Recorder::default();
        submit(&mut recorder, &both);
        assert_eq!(
            draws(&recorder.calls),
            vec![
                Call::Points(4),
                Call::Lines(4),
                Call::Points(7),
                Call::Lines(7)
            ]
        );

        let mut none = frame(curves);
        none.show_segments = false;
        let mut recorder = Recorder::default();
        submit(&mut recorder, &none);
        assert!(draws(&recorder.calls).is_empty());
    }

    #[test]
    fn uniforms_precede_draws() {
        let mut samples = frame(vec![curve(4, Some(4))]);
        samples.show_samples = true;
        let mut recorder = Recorder::default();
        submit(&mut recorder, &samples);

        let expected_tail = [
            Call::Set(Uniform::SegmentsPerPiece(3)),
            Call::Set(Uniform::PointSize(4.0)),
            Call::Points(4),
            Call::Lines(4),
        ];
        assert!(recorder.calls.ends_with(&expected_tail));
        assert_eq!(recorder.calls[1], Call::Set(Uniform::Hue(10.0)));
        assert_eq!(recorder.calls[2], Call::Set(Uniform::Brightness(0.5)));
    }

    #[test]
    fn status_line_format() {
        assert_eq!(status_text(20, 1.0), "Segments: 20 | Speed: 1.0x");
        assert_eq!(status_text(0, 0.3000001), "Segments: 0 | Speed: 0.3x");
    }
}
