use anyhow::{Context, Result};
use ash::{util, vk};

//==================================================
//=== Commad Buffer
//==================================================

pub struct CommandBuffer {
    pub pool: vk::CommandPool,
    pub buffers: Vec<vk::CommandBuffer>,
}

impl CommandBuffer {
    /// Creates a new (Draw) [`CommandBuffer`]
    pub fn new_draw_cmd_buffer(
        logical_device: &ash::Device,
        queue_family_index: u32,
        buffer_count: u32,
    ) -> Result<Self> {
        let pool = {
            let create_info = vk::CommandPoolCreateInfo::default()
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
                .queue_family_index(queue_family_index);

            unsafe { logical_device.create_command_pool(&create_info, None) }?
        };

        let buffers = {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(buffer_count);

            unsafe { logical_device.allocate_command_buffers(&allocate_info) }?
        };

        Ok(Self { pool, buffers })
    }
}

//==================================================
//=== Frame Buffer
//==================================================

pub struct FrameBuffer {
    pub buffers: Vec<vk::Framebuffer>,
}

impl FrameBuffer {
    /// Creates one framebuffer per swapchain image view
    pub fn new(
        logical_device: &ash::Device,
        image_views: &[vk::ImageView],
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
    ) -> Result<Self> {
        let mut buffers = Vec::with_capacity(image_views.len());

        for iv in image_views {
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass)
                .attachments(std::slice::from_ref(iv))
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            buffers.push(unsafe { logical_device.create_framebuffer(&create_info, None) }?);
        }

        Ok(Self { buffers })
    }
}

//==================================================
//=== Host Buffer
//==================================================

/// Persistently mapped, host coherent buffers, one per frame in flight
pub struct HostBuffer {
    pub buffers: Vec<vk::Buffer>,
    pub buffers_memory: Vec<vk::DeviceMemory>,
    pub buffers_mem_req: Vec<vk::MemoryRequirements>,
    pub buffers_mapped: Vec<*mut std::ffi::c_void>,
    pub buffer_size: u64,
}

impl HostBuffer {
    pub fn new(
        logical_device: &ash::Device,
        device_mem_properties: &vk::PhysicalDeviceMemoryProperties,
        buffer_count: usize,
        buffer_size: u64,
        usage: vk::BufferUsageFlags,
    ) -> Result<Self> {
        let mut buffers = Vec::with_capacity(buffer_count);
        let mut buffers_memory = Vec::with_capacity(buffer_count);
        let mut buffers_mem_req = Vec::with_capacity(buffer_count);
        let mut buffers_mapped = Vec::with_capacity(buffer_count);

        for _ in 0..buffer_count {
            let buffer = {
                let create_info = vk::BufferCreateInfo::default()
                    .size(buffer_size)
                    .usage(usage)
                    .sharing_mode(vk::SharingMode::EXCLUSIVE);

                unsafe { logical_device.create_buffer(&create_info, None) }?
            };

            let mem_requirements = unsafe { logical_device.get_buffer_memory_requirements(buffer) };

            let memory = {
                let memory_type_index = find_memory_type(
                    device_mem_properties,
                    mem_requirements.memory_type_bits,
                    vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
                )?;

                let allocate_info = vk::MemoryAllocateInfo::default()
                    .allocation_size(mem_requirements.size)
                    .memory_type_index(memory_type_index);

                unsafe { logical_device.allocate_memory(&allocate_info, None) }?
            };

            unsafe { logical_device.bind_buffer_memory(buffer, memory, 0) }?;

            let mapped = unsafe {
                logical_device.map_memory(
                    memory,
                    0,
                    mem_requirements.size,
                    vk::MemoryMapFlags::empty(),
                )
            }?;

            buffers.push(buffer);
            buffers_memory.push(memory);
            buffers_mem_req.push(mem_requirements);
            buffers_mapped.push(mapped);
        }

        Ok(Self {
            buffers,
            buffers_memory,
            buffers_mem_req,
            buffers_mapped,
            buffer_size,
        })
    }

    /// Copies `data` to the start of the buffer of `frame`
    ///
    /// The frame's fence must be signaled, the GPU may still read the buffer otherwise.
    pub fn write<T: Copy>(&self, frame: usize, data: &[T]) -> Result<()> {
        let data_size = std::mem::size_of_val(data) as u64;
        if data_size > self.buffer_size {
            anyhow::bail!(
                "Host buffer overflow: {} bytes into {} bytes",
                data_size,
                self.buffer_size
            );
        }

        let mapped = *self
            .buffers_mapped
            .get(frame)
            .context("Host Buffers Mapped: Index out of bounds")?;

        let mem_req = self
            .buffers_mem_req
            .get(frame)
            .context("Host Buffers Mem Req: Index out of bounds")?;

        let mut align =
            unsafe { util::Align::new(mapped, std::mem::align_of::<T>() as u64, mem_req.size) };
        align.copy_from_slice(data);

        Ok(())
    }

    pub fn destroy(&self, logical_device: &ash::Device) {
        unsafe {
            for memory in &self.buffers_memory {
                logical_device.unmap_memory(*memory);
            }
            for buffer in &self.buffers {
                logical_device.destroy_buffer(*buffer, None);
            }
            for memory in &self.buffers_memory {
                logical_device.free_memory(*memory, None);
            }
        }
    }
}

/// Index of the first memory type allowed by `type_bits` that has all `flags`
pub fn find_memory_type(
    device_mem_properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    flags: vk::MemoryPropertyFlags,
) -> Result<u32> {
    device_mem_properties.memory_types[..device_mem_properties.memory_type_count as usize]
        .iter()
        .enumerate()
        .find(|(i, mt)| (type_bits & (1 << i)) != 0 && mt.property_flags.contains(flags))
        .map(|(i, _)| i as u32)
        .context("No suitable memory type")
}
