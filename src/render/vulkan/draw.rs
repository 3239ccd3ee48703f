use super::Renderer;
use super::pipeline::Topology;
use crate::render::{RenderDriver, Uniform};
use crate::sketch::BasisFamily;
use anyhow::{Context, Result};
use ash::vk;
use utils::color::Color;

impl Renderer {
    /* Drawing */

    /// Submits the draw commands queued in `draw_pool` to the graphics queue
    ///
    /// 1. Fill `draw_pool` through the [`RenderDriver`] calls
    /// 2. Call `draw_request` function to submit draw
    /// 3. The `draw_pool` is cleared after submission
    pub fn draw_request(&mut self, window: &winit::window::Window) -> Result<()> {
        let window_size = window.inner_size();

        // Window Minimized -> No Draw
        if window_size.height == 0 || window_size.width == 0 {
            self.draw_pool.clear();
            return Ok(());
        }

        let frame = self.current_frame;

        let fence = *self
            .fences_inflight
            .get(frame)
            .context("Inflight Fence: Index out of bounds")?;

        unsafe {
            self.device
                .wait_for_fences(std::slice::from_ref(&fence), true, u64::MAX)
        }?;

        let acquired = unsafe {
            self.swapchain_ext.loader.acquire_next_image(
                self.swapchain_ext.swapchain,
                u64::MAX,
                *self
                    .semaphores_acquire
                    .get(frame)
                    .context("Acquire Semaphore: Index out of bounds")?,
                vk::Fence::null(),
            )
        };

        let image_index = match acquired {
            Ok((index, _)) => index,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                log::debug!("Swapchain out of date on acquire");
                self.draw_pool.clear();
                return self.recreate_swapchain(window_size);
            }
            Err(err) => return Err(err.into()),
        };

        // Only reset once work is guaranteed to be submitted
        unsafe { self.device.reset_fences(std::slice::from_ref(&fence)) }?;

        // The fence of this frame is signaled, its point buffer is free
        self.point_buffers.write(frame, self.draw_pool.points())?;

        let command_buffer = *self
            .draw_command_buffers
            .get(frame)
            .context("Draw Command Buffer: Index out of bounds")?;

        unsafe {
            self.device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())?;

            self.device
                .begin_command_buffer(command_buffer, &vk::CommandBufferBeginInfo::default())?;

            let render_pass_begin = vk::RenderPassBeginInfo::default()
                .render_pass(self.pipelines.render_pass)
                .framebuffer(
                    *self
                        .frame_buffers
                        .get(image_index as usize)
                        .context("Frame Buffer: Index out of bounds")?,
                )
                .render_area(self.scissor)
                .clear_values(&self.clear_color);

            self.device.cmd_begin_render_pass(
                command_buffer,
                &render_pass_begin,
                vk::SubpassContents::INLINE,
            );

            self.device
                .cmd_set_viewport(command_buffer, 0, std::slice::from_ref(&self.viewport));

            self.device
                .cmd_set_scissor(command_buffer, 0, std::slice::from_ref(&self.scissor));

            let descriptor_set = self
                .descriptor
                .sets
                .get(frame)
                .context("Descriptor Sets: Index out of bounds")?;

            self.device.cmd_bind_descriptor_sets(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipelines.layout,
                0,
                std::slice::from_ref(descriptor_set),
                &[],
            );
        }

        self.draw_from_pool(command_buffer);

        unsafe {
            self.device.cmd_end_render_pass(command_buffer);
            self.device.end_command_buffer(command_buffer)?;
        }

        let release_semaphore = *self
            .semaphores_release
            .get(frame)
            .context("Release Semaphores: Index out of bounds")?;

        let submit_info = vk::SubmitInfo::default()
            .wait_dst_stage_mask(std::slice::from_ref(
                &vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            ))
            .wait_semaphores(std::slice::from_ref(&self.semaphores_acquire[frame]))
            .command_buffers(std::slice::from_ref(&command_buffer))
            .signal_semaphores(std::slice::from_ref(&release_semaphore));

        unsafe {
            self.device
                .queue_submit(self.graphics_queue, std::slice::from_ref(&submit_info), fence)
        }?;

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(std::slice::from_ref(&release_semaphore))
            .swapchains(std::slice::from_ref(&self.swapchain_ext.swapchain))
            .image_indices(std::slice::from_ref(&image_index));

        let presented = unsafe {
            self.swapchain_ext
                .loader
                .queue_present(self.present_queue, &present_info)
        };

        let swapchain_stale = match presented {
            Ok(suboptimal) => suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => true,
            Err(err) => return Err(err.into()),
        };

        self.current_frame = (frame + 1) % Self::MAX_FRAMES_INFLIGHT;

        // Reset Draw Pool
        self.draw_pool.clear();

        if swapchain_stale {
            log::debug!("Swapchain stale after present");
            self.recreate_swapchain(window_size)?;
        }

        Ok(())
    }

    /// Records one draw per queued [`DrawInstance`], binding pipelines only when they change
    ///
    /// Used only internally by draw_request function!
    fn draw_from_pool(&self, command_buffer: vk::CommandBuffer) {
        let mut bound = None;

        for draw_instance in self.draw_pool.instances() {
            let key = (draw_instance.basis, draw_instance.topology);

            unsafe {
                if bound != Some(key) {
                    self.device.cmd_bind_pipeline(
                        command_buffer,
                        vk::PipelineBindPoint::GRAPHICS,
                        self.pipelines.get(draw_instance.basis, draw_instance.topology),
                    );
                    bound = Some(key);
                }

                let mut push_constants = draw_instance.push_constants;
                push_constants.point_size = push_constants
                    .point_size
                    .clamp(self.point_size_range[0], self.point_size_range[1]);

                self.device.cmd_push_constants(
                    command_buffer,
                    self.pipelines.layout,
                    vk::ShaderStageFlags::VERTEX,
                    0,
                    bytemuck::bytes_of(&push_constants),
                );

                self.device
                    .cmd_draw(command_buffer, draw_instance.vertex_count, 1, 0, 0);
            }
        }
    }
}

impl RenderDriver for Renderer {
    fn bind_program(&mut self, basis: BasisFamily) {
        self.draw_pool.bind_program(basis);
    }

    fn set_uniform(&mut self, uniform: Uniform) {
        self.draw_pool.set_uniform(uniform);
    }

    fn draw_points(&mut self, count: u32) {
        self.draw_pool.draw_points(count);
    }

    fn draw_line_strip(&mut self, count: u32) {
        self.draw_pool.draw_line_strip(count);
    }
}

//==================================================
//=== Draw Instance
//==================================================

/// Push constant block of `curve.vert`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CurvePushConstants {
    pub color: [f32; 3],
    pub point_size: f32,
    /// First control point of the curve in the frame's point buffer
    pub point_offset: u32,
    pub pieces: u32,
    pub segments: u32,
    _pad: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawInstance {
    pub basis: BasisFamily,
    pub topology: Topology,
    pub vertex_count: u32,
    pub push_constants: CurvePushConstants,
}

//==================================================
//=== Draw Pool
//==================================================

/// Draws of one frame and the control points they read
///
/// Uniforms persist across draws and frames, like program uniforms do.
/// Control points are copied into the frame's point block only when they
/// changed since the last draw.
#[derive(Debug, Default)]
pub struct DrawPool {
    basis: BasisFamily,
    hue: f32,
    brightness: f32,
    segments_per_piece: u32,
    point_size: f32,
    control_points: Vec<[f32; 2]>,
    /// Offset of the staged control points in `points`, `None` when stale
    block_offset: Option<u32>,
    instances: Vec<DrawInstance>,
    points: Vec<[f32; 2]>,
}

impl DrawPool {
    /// Most control points one frame can upload
    pub const MAX_FRAME_POINTS: usize = 64 * 1024;

    pub fn instances(&self) -> &[DrawInstance] {
        &self.instances
    }

    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    /// Drops the queued draws, staged uniforms are kept
    pub fn clear(&mut self) {
        self.instances.clear();
        self.points.clear();
        self.block_offset = None;
    }

    fn queue(&mut self, topology: Topology, vertex_count: u32) {
        if vertex_count == 0 {
            return;
        }

        let segments = self.segments_per_piece.max(1);
        let pieces = ((vertex_count - 1) / segments).max(1);

        let required = match self.basis {
            BasisFamily::Spline | BasisFamily::CatmullRom => pieces as usize + 3,
            BasisFamily::Bezier => 3 * pieces as usize + 1,
        };

        if self.control_points.len() < required {
            log::warn!(
                "Skipping {} draw: {} control points staged, {} needed",
                self.basis.name(),
                self.control_points.len(),
                required
            );
            return;
        }

        let point_offset = match self.block_offset {
            Some(offset) => offset,
            None => {
                if self.points.len() + self.control_points.len() > Self::MAX_FRAME_POINTS {
                    log::warn!("Frame point buffer full, dropping draw");
                    return;
                }

                let offset = self.points.len() as u32;
                self.points.extend_from_slice(&self.control_points);
                self.block_offset = Some(offset);
                offset
            }
        };

        self.instances.push(DrawInstance {
            basis: self.basis,
            topology,
            vertex_count,
            push_constants: CurvePushConstants {
                color: Color::from_hsv(self.hue, 1.0, self.brightness).to_array(),
                point_size: self.point_size,
                point_offset,
                pieces,
                segments,
                _pad: 0,
            },
        });
    }
}

impl RenderDriver for DrawPool {
    fn bind_program(&mut self, basis: BasisFamily) {
        self.basis = basis;
    }

    fn set_uniform(&mut self, uniform: Uniform) {
        match uniform {
            Uniform::Hue(hue) => self.hue = hue,
            Uniform::Brightness(brightness) => self.brightness = brightness,
            Uniform::SegmentsPerPiece(segments) => self.segments_per_piece = segments,
            Uniform::PointSize(size) => self.point_size = size,
            Uniform::ControlPoint { index, position } => {
                if index >= crate::config::MAX_CONTROL_POINTS {
                    log::warn!("Control point index {index} out of range");
                    return;
                }

                if index >= self.control_points.len() {
                    self.control_points.resize(index + 1, [0.0; 2]);
                }

                self.control_points[index] = position.to_array();
                self.block_offset = None;
            }
        }
    }

    fn draw_points(&mut self, count: u32) {
        self.queue(Topology::Points, count);
    }

    fn draw_line_strip(&mut self, count: u32) {
        self.queue(Topology::LineStrip, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CurveDraw, Frame, submit};
    use approx::assert_relative_eq;
    use glam::vec2;

    fn set_points(pool: &mut DrawPool, count: usize) {
        for index in 0..count {
            pool.set_uniform(Uniform::ControlPoint {
                index,
                position: vec2(index as f32 * 0.1, 0.0),
            });
        }
    }

    #[test]
    fn push_constants_block_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<CurvePushConstants>(), 32);
    }

    #[test]
    fn consecutive_draws_share_one_point_block() {
        let mut pool = DrawPool::default();
        pool.set_uniform(Uniform::SegmentsPerPiece(4));
        set_points(&mut pool, 5);

        pool.draw_points(9);
        pool.draw_line_strip(9);

        assert_eq!(pool.points().len(), 5);
        assert_eq!(pool.instances().len(), 2);
        assert_eq!(pool.instances()[0].topology, Topology::Points);
        assert_eq!(pool.instances()[1].topology, Topology::LineStrip);
        assert_eq!(pool.instances()[1].push_constants.point_offset, 0);
        assert_eq!(pool.instances()[1].push_constants.pieces, 2);
    }

    #[test]
    fn changed_points_start_a_new_block() {
        let mut pool = DrawPool::default();
        pool.set_uniform(Uniform::SegmentsPerPiece(1));
        set_points(&mut pool, 4);
        pool.draw_line_strip(2);

        set_points(&mut pool, 4);
        pool.draw_line_strip(2);

        assert_eq!(pool.points().len(), 8);
        assert_eq!(pool.instances()[1].push_constants.point_offset, 4);
    }

    #[test]
    fn color_comes_from_hue_and_brightness() {
        let mut pool = DrawPool::default();
        pool.set_uniform(Uniform::Hue(120.0));
        pool.set_uniform(Uniform::Brightness(0.5));
        pool.set_uniform(Uniform::SegmentsPerPiece(2));
        set_points(&mut pool, 4);
        pool.draw_points(3);

        let [r, g, b] = pool.instances()[0].push_constants.color;
        assert_relative_eq!(r, 0.0);
        assert_relative_eq!(g, 0.5);
        assert_relative_eq!(b, 0.0);
    }

    #[test]
    fn draws_without_enough_points_are_skipped() {
        let mut pool = DrawPool::default();
        pool.bind_program(BasisFamily::Bezier);
        pool.set_uniform(Uniform::SegmentsPerPiece(2));
        set_points(&mut pool, 4);

        // Two Bezier pieces need 7 points
        pool.draw_line_strip(5);
        assert!(pool.instances().is_empty());

        pool.draw_line_strip(3);
        assert_eq!(pool.instances().len(), 1);
    }

    #[test]
    fn zero_segments_do_not_divide_by_zero() {
        let mut pool = DrawPool::default();
        pool.set_uniform(Uniform::SegmentsPerPiece(0));
        set_points(&mut pool, 4);
        pool.draw_points(1);

        assert_eq!(pool.instances()[0].push_constants.segments, 1);
        assert_eq!(pool.instances()[0].push_constants.pieces, 1);
    }

    #[test]
    fn clear_keeps_uniforms_but_drops_draws() {
        let mut pool = DrawPool::default();
        pool.bind_program(BasisFamily::CatmullRom);
        pool.set_uniform(Uniform::SegmentsPerPiece(3));
        set_points(&mut pool, 4);
        pool.draw_line_strip(4);

        pool.clear();
        assert!(pool.instances().is_empty());
        assert!(pool.points().is_empty());

        pool.draw_line_strip(4);
        assert_eq!(pool.points().len(), 4);
        assert_eq!(pool.instances()[0].basis, BasisFamily::CatmullRom);
    }

    #[test]
    fn submitted_frame_queues_one_block_per_curve() {
        let curve = |n: usize| CurveDraw {
            control_points: (0..n).map(|i| vec2(i as f32, 0.0)).collect(),
            hue: 0.0,
            brightness: 1.0,
            point_size: 3.0,
            sample_count: Some(((n - 3) * 2 + 1) as u32),
        };

        let frame = Frame {
            basis: BasisFamily::Spline,
            segments_per_piece: 2,
            show_samples: true,
            show_segments: true,
            curves: vec![curve(4), curve(6)],
        };

        let mut pool = DrawPool::default();
        submit(&mut pool, &frame);

        assert_eq!(pool.instances().len(), 4);
        assert_eq!(pool.points().len(), 10);
        assert_eq!(pool.instances()[2].push_constants.point_offset, 4);
        assert_eq!(pool.instances()[3].push_constants.pieces, 3);
        assert_relative_eq!(pool.instances()[0].push_constants.point_size, 3.0);
    }
}
