//! Vulkan backend drawing curves straight from their control points.
//!
//! Curve samples are evaluated in the vertex shader, every frame uploads the
//! control points of all curves into a host visible storage buffer.

mod buffers;
mod descriptor;
mod draw;
mod extensions;
mod pipeline;

pub use draw::{CurvePushConstants, DrawInstance, DrawPool};
pub use pipeline::Topology;

use crate::render::vulkan::buffers::*;
use crate::render::vulkan::descriptor::*;
use crate::render::vulkan::extensions::*;
use crate::render::vulkan::pipeline::*;
use anyhow::{Context, Result};
use ash::{khr, vk};
use raw_window_handle::HasDisplayHandle;
use std::ffi::CStr;
use utils::color::Color;
use winit::dpi::PhysicalSize;

//==================================================
//=== Renderer
//==================================================

pub struct Renderer {
    // Vulkan: Base
    #[allow(dead_code)]
    entry: ash::Entry,
    instance: ash::Instance,
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    queue_family_indices: Vec<u32>,

    // Vulkan: Extensions
    debug_ext: Option<DebugExtension>,
    surface_ext: SurfaceExtension,
    swapchain_ext: SwapchainExtension,

    // Vulkan: Descriptor
    descriptor: Descriptor,

    // Vulkan: Graphics Pipeline
    pipelines: CurvePipelines,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    clear_color: [vk::ClearValue; 1],
    viewport: vk::Viewport,
    scissor: vk::Rect2D,
    point_size_range: [f32; 2],

    // Vulkan: Buffers
    frame_buffers: Vec<vk::Framebuffer>,
    command_pool: vk::CommandPool,
    draw_command_buffers: Vec<vk::CommandBuffer>,
    point_buffers: HostBuffer,

    // Vulkan: Syncronization
    semaphores_acquire: Vec<vk::Semaphore>,
    semaphores_release: Vec<vk::Semaphore>,
    fences_inflight: Vec<vk::Fence>,

    // Render Loop Data
    current_frame: usize,
    draw_pool: DrawPool,
}

impl Renderer {
    const MAX_FRAMES_INFLIGHT: usize = 2;

    /// Creates a new [`Renderer`] using `window`
    pub fn new(window: &winit::window::Window, clear_color: Color) -> Result<Renderer> {
        let window_size = window.inner_size();

        // Base: Entry & Instance
        let entry = unsafe { ash::Entry::load() }?;

        let instance = create_instance(&entry, window)?;

        // Extensions: Debug & Surface
        #[cfg(not(feature = "render_dbg"))]
        let debug_ext = None;

        #[cfg(feature = "render_dbg")]
        let debug_ext = Some(DebugExtension::new(&entry, &instance)?);

        let surface_ext = SurfaceExtension::new(&entry, &instance, window)?;

        // Device
        let device = Device::new(&instance, &surface_ext)?;

        // Queue Families
        let graphics_queue = unsafe {
            device
                .logical_device
                .get_device_queue(device.graphics_queue_index, 0)
        };

        let present_queue = unsafe {
            device
                .logical_device
                .get_device_queue(device.present_queue_index, 0)
        };

        let queue_family_indices = device.queue_family_indices();

        // Extension: Swapchain
        let swapchain_ext = SwapchainExtension::new(
            &instance,
            &device.logical_device,
            device.physical_device,
            &surface_ext,
            &queue_family_indices,
            window_size,
        )?;

        // Clear Color
        let clear_color = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: [clear_color.r(), clear_color.g(), clear_color.b(), 1.0],
            },
        }];

        // Descriptor
        let descriptor = Descriptor::new(&device.logical_device, Self::MAX_FRAMES_INFLIGHT)?;

        // Push Constants
        let push_constant_range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .size(std::mem::size_of::<CurvePushConstants>() as u32)
            .offset(0);

        // Graphics Pipelines
        let pipelines = CurvePipelines::new(
            &device.logical_device,
            descriptor.set_layout,
            swapchain_ext.format.format,
            push_constant_range,
        )?;

        // Buffers
        let draw_command_buffer = CommandBuffer::new_draw_cmd_buffer(
            &device.logical_device,
            device.graphics_queue_index,
            Self::MAX_FRAMES_INFLIGHT as u32,
        )?;

        let frame_buffer = FrameBuffer::new(
            &device.logical_device,
            &swapchain_ext.image_views,
            pipelines.render_pass,
            swapchain_ext.extent,
        )?;

        let point_buffer_size = (std::mem::size_of::<[f32; 2]>() * DrawPool::MAX_FRAME_POINTS) as u64;

        let point_buffers = HostBuffer::new(
            &device.logical_device,
            &device.memory_properties,
            Self::MAX_FRAMES_INFLIGHT,
            point_buffer_size,
            vk::BufferUsageFlags::STORAGE_BUFFER,
        )?;

        descriptor.update_descriptor_sets(
            &device.logical_device,
            &point_buffers.buffers,
            point_buffer_size,
        )?;

        // Syncronization
        let mut semaphores_release: Vec<vk::Semaphore> =
            Vec::with_capacity(Self::MAX_FRAMES_INFLIGHT);

        let mut semaphores_acquire: Vec<vk::Semaphore> =
            Vec::with_capacity(Self::MAX_FRAMES_INFLIGHT);

        let mut fences_inflight: Vec<vk::Fence> = Vec::with_capacity(Self::MAX_FRAMES_INFLIGHT);

        for _ in 0..Self::MAX_FRAMES_INFLIGHT {
            semaphores_release.push(unsafe {
                device
                    .logical_device
                    .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
            }?);

            semaphores_acquire.push(unsafe {
                device
                    .logical_device
                    .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
            }?);

            fences_inflight.push(unsafe {
                device.logical_device.create_fence(
                    &vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED),
                    None,
                )
            }?);
        }

        let (viewport, scissor) = dynamic_state(swapchain_ext.extent);

        log::info!(
            "Renderer ready: {}x{} {:?}",
            swapchain_ext.extent.width,
            swapchain_ext.extent.height,
            swapchain_ext.format.format
        );

        Ok(Self {
            // Base
            entry,
            instance,
            device: device.logical_device,
            physical_device: device.physical_device,
            queue_family_indices,

            // Extensions
            debug_ext,
            surface_ext,
            swapchain_ext,

            // Descriptors
            descriptor,

            // Graphics Pipeline
            pipelines,
            graphics_queue,
            present_queue,
            clear_color,
            viewport,
            scissor,
            point_size_range: device.point_size_range,

            // Buffers
            frame_buffers: frame_buffer.buffers,
            command_pool: draw_command_buffer.pool,
            draw_command_buffers: draw_command_buffer.buffers,
            point_buffers,

            // Syncronization
            semaphores_acquire,
            semaphores_release,
            fences_inflight,

            // Render Loop Data
            current_frame: 0,
            draw_pool: DrawPool::default(),
        })
    }

    /* Swapchain */

    /// Recreates the swapchain based on the `new_size`
    ///
    /// Recreation occurs only when `new_size` is valid
    pub fn recreate_swapchain(&mut self, new_size: PhysicalSize<u32>) -> Result<()> {
        // Window Minimized -> No Recreation
        if new_size.height == 0 || new_size.width == 0 {
            return Ok(());
        }

        // Cleanup Old Swapchain
        unsafe {
            self.device.device_wait_idle()?;

            for fb in self.frame_buffers.drain(..) {
                self.device.destroy_framebuffer(fb, None)
            }
        }
        self.swapchain_ext.destroy(&self.device);

        // Recreate Swapchain / ImageViews / FrameBuffers
        self.swapchain_ext.create(
            &self.device,
            self.physical_device,
            &self.surface_ext,
            &self.queue_family_indices,
            new_size,
        )?;

        self.frame_buffers = FrameBuffer::new(
            &self.device,
            &self.swapchain_ext.image_views,
            self.pipelines.render_pass,
            self.swapchain_ext.extent,
        )?
        .buffers;

        // Adjust Dynamic State
        (self.viewport, self.scissor) = dynamic_state(self.swapchain_ext.extent);

        log::debug!(
            "Swapchain recreated: {}x{}",
            self.swapchain_ext.extent.width,
            self.swapchain_ext.extent.height
        );

        Ok(())
    }

    /// Waits until the device finished every submitted frame
    pub fn wait_device_idle(&self) -> Result<()> {
        Ok(unsafe { self.device.device_wait_idle() }?)
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(err) = self.wait_device_idle() {
            log::error!("Device did not go idle before teardown: {err}");
        }

        unsafe {
            // Syncronisation
            for s in &self.semaphores_acquire {
                self.device.destroy_semaphore(*s, None);
            }
            for s in &self.semaphores_release {
                self.device.destroy_semaphore(*s, None);
            }
            for f in &self.fences_inflight {
                self.device.destroy_fence(*f, None);
            }

            // Command Pool
            self.device.destroy_command_pool(self.command_pool, None);

            // Buffers: Frame & Point
            for fb in &self.frame_buffers {
                self.device.destroy_framebuffer(*fb, None);
            }
        }

        self.point_buffers.destroy(&self.device);

        // Descriptors & Pipelines
        self.descriptor.destroy(&self.device);
        self.pipelines.destroy(&self.device);

        // Extensions: Swapchain & Surface
        self.swapchain_ext.destroy(&self.device);

        unsafe {
            self.surface_ext
                .loader
                .destroy_surface(self.surface_ext.surface, None);

            // Device
            self.device.destroy_device(None);
        }

        // Extension: Debug
        if let Some(debug_ext) = &self.debug_ext {
            debug_ext.destroy();
        }

        // Instance
        unsafe { self.instance.destroy_instance(None) };
    }
}

/// Viewport and scissor covering `extent`
fn dynamic_state(extent: vk::Extent2D) -> (vk::Viewport, vk::Rect2D) {
    let viewport = vk::Viewport {
        width: extent.width as f32,
        height: extent.height as f32,
        max_depth: 1.0,
        ..Default::default()
    };

    let scissor = vk::Rect2D {
        extent,
        ..Default::default()
    };

    (viewport, scissor)
}

/// Cretes a Vulkan Instance using the given `entry` and `window`
pub fn create_instance(
    entry: &ash::Entry,
    window: &winit::window::Window,
) -> Result<ash::Instance> {
    /* Application Data */
    let api_version = unsafe { entry.try_enumerate_instance_version() }?
        .unwrap_or(vk::API_VERSION_1_0);

    log::debug!(
        "Vulkan instance version {}.{}.{}",
        vk::api_version_major(api_version),
        vk::api_version_minor(api_version),
        vk::api_version_patch(api_version)
    );

    let application_info = vk::ApplicationInfo::default()
        .application_name(c"splinepond")
        .application_version(vk::make_api_version(0, 0, 1, 0))
        .engine_name(c"splinepond")
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(api_version);

    /* Extensions */
    let mut enabled_extension_names =
        ash_window::enumerate_required_extensions(window.display_handle()?.as_raw())?.to_vec();

    if !enabled_extension_names
        .iter()
        .any(|name| unsafe { CStr::from_ptr(*name) } == khr::surface::NAME)
    {
        enabled_extension_names.push(khr::surface::NAME.as_ptr());
    }

    #[cfg(feature = "render_dbg")]
    enabled_extension_names.push(ash::ext::debug_utils::NAME.as_ptr());

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&application_info)
        .enabled_extension_names(&enabled_extension_names);

    /* Layers */
    #[cfg(feature = "render_dbg")]
    let enabled_layer_names = [c"VK_LAYER_KHRONOS_validation".as_ptr()];

    /* Validation Features*/
    #[allow(unused_mut)]
    #[cfg(feature = "render_dbg")]
    let mut enabled_validation_features = vec![];

    #[cfg(all(feature = "render_dbg", feature = "best_practices"))]
    enabled_validation_features.push(vk::ValidationFeatureEnableEXT::BEST_PRACTICES);

    #[cfg(all(feature = "render_dbg", feature = "debug_printf"))]
    enabled_validation_features.push(vk::ValidationFeatureEnableEXT::DEBUG_PRINTF);

    #[cfg(all(feature = "render_dbg", feature = "gpu_assist"))]
    enabled_validation_features.push(vk::ValidationFeatureEnableEXT::GPU_ASSISTED);

    #[cfg(all(feature = "render_dbg", feature = "sync_validation"))]
    enabled_validation_features.push(vk::ValidationFeatureEnableEXT::SYNCHRONIZATION_VALIDATION);

    #[cfg(feature = "render_dbg")]
    let mut validation_features = vk::ValidationFeaturesEXT::default()
        .enabled_validation_features(&enabled_validation_features);

    #[cfg(feature = "render_dbg")]
    let create_info = create_info
        .enabled_layer_names(&enabled_layer_names)
        .push_next(&mut validation_features);

    Ok(unsafe { entry.create_instance(&create_info, None) }?)
}

//==================================================
//=== Device
//==================================================

struct Device {
    physical_device: vk::PhysicalDevice,
    logical_device: ash::Device,
    memory_properties: vk::PhysicalDeviceMemoryProperties,
    graphics_queue_index: u32,
    present_queue_index: u32,
    point_size_range: [f32; 2],
}

/// A physical device able to draw to the surface
struct Candidate {
    physical_device: vk::PhysicalDevice,
    graphics_queue_index: u32,
    present_queue_index: u32,
    score: u32,
}

impl Device {
    const EXTENSION_NAMES: [*const std::ffi::c_char; 1] = [khr::swapchain::NAME.as_ptr()];

    /// Creates a new device using the given `instance` and `surface_ext`
    ///
    /// Discrete GPUs are preferred, any device with graphics, present and
    /// swapchain support is accepted.
    fn new(instance: &ash::Instance, surface_ext: &SurfaceExtension) -> Result<Self> {
        /* Find Physical Device */
        let mut best: Option<Candidate> = None;

        for pd in unsafe { instance.enumerate_physical_devices() }? {
            let Some(candidate) = Self::rate(instance, surface_ext, pd)? else {
                continue;
            };

            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        let Candidate {
            physical_device,
            graphics_queue_index,
            present_queue_index,
            ..
        } = best.context("Could not find a proper physical device!")?;

        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let device_name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::info!(
            "Using {device_name} ({:?}), graphics queue {graphics_queue_index}, present queue {present_queue_index}",
            properties.device_type
        );

        /* Physical Device Memory Properties */
        let memory_properties =
            unsafe { instance.get_physical_device_memory_properties(physical_device) };

        /* Device Features */
        let supported = unsafe { instance.get_physical_device_features(physical_device) };
        let large_points = supported.large_points == vk::TRUE;
        let point_size_range = if large_points {
            properties.limits.point_size_range
        } else {
            [1.0, 1.0]
        };

        if !large_points {
            log::warn!("Device lacks large point support, samples are drawn 1px wide");
        }

        let features = vk::PhysicalDeviceFeatures::default().large_points(large_points);

        /* Create Logical Device */
        let logical_device = {
            let queue_priority = [1.0];

            let mut queue_create_infos = vec![
                // Graphics Queue
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(graphics_queue_index)
                    .queue_priorities(&queue_priority),
            ];

            // Present Queue
            if present_queue_index != graphics_queue_index {
                queue_create_infos.push(
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(present_queue_index)
                        .queue_priorities(&queue_priority),
                );
            }

            let create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&Device::EXTENSION_NAMES)
                .enabled_features(&features);

            unsafe { instance.create_device(physical_device, &create_info, None) }?
        };

        Ok(Self {
            physical_device,
            logical_device,
            memory_properties,
            graphics_queue_index,
            present_queue_index,
            point_size_range,
        })
    }

    /// Rates `pd`, `None` when it cannot present to the surface
    fn rate(
        instance: &ash::Instance,
        surface_ext: &SurfaceExtension,
        pd: vk::PhysicalDevice,
    ) -> Result<Option<Candidate>> {
        /* Extension Properties */
        let extensions = unsafe { instance.enumerate_device_extension_properties(pd) }?;

        let has_extensions = Device::EXTENSION_NAMES.iter().all(|required| {
            let required = unsafe { CStr::from_ptr(*required) };
            extensions
                .iter()
                .any(|ep| ep.extension_name_as_c_str().is_ok_and(|name| name == required))
        });

        if !has_extensions {
            return Ok(None);
        }

        /* Surface Formats & Present Modes */
        let formats = unsafe {
            surface_ext
                .loader
                .get_physical_device_surface_formats(pd, surface_ext.surface)
        }?;

        let present_modes = unsafe {
            surface_ext
                .loader
                .get_physical_device_surface_present_modes(pd, surface_ext.surface)
        }?;

        if formats.is_empty() || present_modes.is_empty() {
            return Ok(None);
        }

        /* Queue Family Indices */
        let mut graphics_queue_index = None;
        let mut present_queue_index = None;

        let families = unsafe { instance.get_physical_device_queue_family_properties(pd) };

        for (i, qf) in families.iter().enumerate() {
            let index = i as u32;

            let graphics = qf.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let present = unsafe {
                surface_ext
                    .loader
                    .get_physical_device_surface_support(pd, index, surface_ext.surface)
            }?;

            // One family doing both is the best case
            if graphics && present {
                graphics_queue_index = Some(index);
                present_queue_index = Some(index);
                break;
            }

            if graphics && graphics_queue_index.is_none() {
                graphics_queue_index = Some(index);
            }

            if present && present_queue_index.is_none() {
                present_queue_index = Some(index);
            }
        }

        let (Some(graphics_queue_index), Some(present_queue_index)) =
            (graphics_queue_index, present_queue_index)
        else {
            return Ok(None);
        };

        /* Device Properties */
        let score = match unsafe { instance.get_physical_device_properties(pd) }.device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => 3,
            vk::PhysicalDeviceType::INTEGRATED_GPU => 2,
            vk::PhysicalDeviceType::VIRTUAL_GPU => 1,
            _ => 0,
        };

        Ok(Some(Candidate {
            physical_device: pd,
            graphics_queue_index,
            present_queue_index,
            score,
        }))
    }

    /// Distinct queue family indices, swapchain images are shared between them
    fn queue_family_indices(&self) -> Vec<u32> {
        if self.graphics_queue_index == self.present_queue_index {
            vec![self.graphics_queue_index]
        } else {
            vec![self.graphics_queue_index, self.present_queue_index]
        }
    }
}
