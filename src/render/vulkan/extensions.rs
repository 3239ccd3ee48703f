use anyhow::{Context, Result};
use ash::{ext, khr, vk};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::{borrow::Cow, ffi::CStr};

//==================================================
//=== Debug Messenger
//==================================================

#[cfg_attr(not(feature = "render_dbg"), allow(dead_code))]
pub struct DebugExtension {
    pub loader: ext::debug_utils::Instance,
    pub messenger: vk::DebugUtilsMessengerEXT,
}

#[cfg_attr(not(feature = "render_dbg"), allow(dead_code))]
impl DebugExtension {
    pub fn new(entry: &ash::Entry, instance: &ash::Instance) -> Result<Self> {
        let loader = ext::debug_utils::Instance::new(entry, instance);

        let messenger = {
            let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                .message_severity(
                    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
                )
                .message_type(
                    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                )
                .pfn_user_callback(Some(vulkan_debug_callback));

            unsafe { loader.create_debug_utils_messenger(&debug_info, None) }?
        };

        Ok(Self { loader, messenger })
    }

    pub fn destroy(&self) {
        unsafe {
            self.loader
                .destroy_debug_utils_messenger(self.messenger, None)
        };
    }
}

unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = unsafe { *p_callback_data };
    let message_id_number = callback_data.message_id_number;

    let message_id_name = if callback_data.p_message_id_name.is_null() {
        Cow::from("")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message_id_name) }.to_string_lossy()
    };

    let message = if callback_data.p_message.is_null() {
        Cow::from("")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message) }.to_string_lossy()
    };

    let level = match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => log::Level::Error,
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => log::Level::Warn,
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => log::Level::Debug,
        _ => log::Level::Trace,
    };

    log::log!(
        level,
        "{message_type:?} [{message_id_name} ({message_id_number})] : {message}"
    );

    vk::FALSE
}

//==================================================
//=== Surface
//==================================================

pub struct SurfaceExtension {
    pub loader: khr::surface::Instance,
    pub surface: vk::SurfaceKHR,
}

impl SurfaceExtension {
    pub fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        window: &winit::window::Window,
    ) -> Result<Self> {
        let loader = khr::surface::Instance::new(entry, instance);

        let surface = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                window.display_handle()?.as_raw(),
                window.window_handle()?.as_raw(),
                None,
            )
        }?;

        Ok(Self { loader, surface })
    }

    /// Prefers an sRGB BGRA format, otherwise takes the first one offered
    pub fn pick_format(&self, physical_device: vk::PhysicalDevice) -> Result<vk::SurfaceFormatKHR> {
        let formats = unsafe {
            self.loader
                .get_physical_device_surface_formats(physical_device, self.surface)
        }?;

        formats
            .iter()
            .find(|f| {
                f.format == vk::Format::B8G8R8A8_SRGB
                    && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
            .or_else(|| formats.first())
            .copied()
            .context("Surface offers no formats")
    }

    /// Mailbox when available, FIFO is always supported
    pub fn pick_present_mode(&self, physical_device: vk::PhysicalDevice) -> Result<vk::PresentModeKHR> {
        let present_modes = unsafe {
            self.loader
                .get_physical_device_surface_present_modes(physical_device, self.surface)
        }?;

        Ok(present_modes
            .into_iter()
            .find(|pm| *pm == vk::PresentModeKHR::MAILBOX)
            .unwrap_or(vk::PresentModeKHR::FIFO))
    }
}

//==================================================
//=== Swapchain
//==================================================

pub struct SwapchainExtension {
    pub loader: khr::swapchain::Device,
    pub swapchain: vk::SwapchainKHR,
    pub image_views: Vec<vk::ImageView>,
    pub extent: vk::Extent2D,
    pub format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
}

impl SwapchainExtension {
    pub fn new(
        instance: &ash::Instance,
        logical_device: &ash::Device,
        physical_device: vk::PhysicalDevice,
        surface_ext: &SurfaceExtension,
        queue_family_indices: &[u32],
        window_size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<Self> {
        let format = surface_ext.pick_format(physical_device)?;
        let present_mode = surface_ext.pick_present_mode(physical_device)?;

        let mut swapchain_ext = Self {
            loader: khr::swapchain::Device::new(instance, logical_device),
            swapchain: vk::SwapchainKHR::null(),
            image_views: Vec::new(),
            extent: vk::Extent2D::default(),
            format,
            present_mode,
        };

        swapchain_ext.create(
            logical_device,
            physical_device,
            surface_ext,
            queue_family_indices,
            window_size,
        )?;

        Ok(swapchain_ext)
    }

    /// (Re)creates the swapchain and its image views
    ///
    /// The previous swapchain, if any, must already be destroyed.
    pub fn create(
        &mut self,
        logical_device: &ash::Device,
        physical_device: vk::PhysicalDevice,
        surface_ext: &SurfaceExtension,
        queue_family_indices: &[u32],
        window_size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<()> {
        let caps = unsafe {
            surface_ext
                .loader
                .get_physical_device_surface_capabilities(physical_device, surface_ext.surface)
        }?;

        let mut min_image_count = caps.min_image_count + 1;
        if caps.max_image_count > 0 && min_image_count > caps.max_image_count {
            min_image_count = caps.max_image_count;
        }

        // u32::MAX means the surface size follows the swapchain
        self.extent = if caps.current_extent.width != u32::MAX {
            caps.current_extent
        } else {
            vk::Extent2D {
                width: window_size.width.clamp(
                    caps.min_image_extent.width,
                    caps.max_image_extent.width,
                ),
                height: window_size.height.clamp(
                    caps.min_image_extent.height,
                    caps.max_image_extent.height,
                ),
            }
        };

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface_ext.surface)
            .min_image_count(min_image_count)
            .image_format(self.format.format)
            .image_color_space(self.format.color_space)
            .image_extent(self.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(self.present_mode)
            .clipped(true);

        let create_info = if queue_family_indices.len() > 1 {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(queue_family_indices)
        } else {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        };

        self.swapchain = unsafe { self.loader.create_swapchain(&create_info, None) }?;

        let swapchain_images = unsafe { self.loader.get_swapchain_images(self.swapchain) }?;

        let subresource_range = vk::ImageSubresourceRange::default()
            .aspect_mask(vk::ImageAspectFlags::COLOR)
            .level_count(1)
            .layer_count(1);

        self.image_views = Vec::with_capacity(swapchain_images.len());
        for img in swapchain_images {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(img)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.format.format)
                .subresource_range(subresource_range);

            self.image_views
                .push(unsafe { logical_device.create_image_view(&create_info, None) }?);
        }

        Ok(())
    }

    /// Destroys the image views and the swapchain
    pub fn destroy(&mut self, logical_device: &ash::Device) {
        unsafe {
            for iv in self.image_views.drain(..) {
                logical_device.destroy_image_view(iv, None);
            }
            self.loader.destroy_swapchain(self.swapchain, None);
        }
        self.swapchain = vk::SwapchainKHR::null();
    }
}
