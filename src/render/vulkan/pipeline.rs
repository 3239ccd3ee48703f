use crate::sketch::BasisFamily;
use anyhow::{Context, Result};
use ash::vk;

const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/spirv/");

//==================================================
//=== Topology
//==================================================

/// How the samples of a curve are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points,
    LineStrip,
}

impl Topology {
    pub const ALL: [Topology; 2] = [Topology::Points, Topology::LineStrip];

    fn primitive(self) -> vk::PrimitiveTopology {
        match self {
            Topology::Points => vk::PrimitiveTopology::POINT_LIST,
            Topology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
        }
    }

    /// Samples glow where they overlap, segments are plainly alpha blended
    fn blend_attachment(self) -> vk::PipelineColorBlendAttachmentState {
        let dst_color = match self {
            Topology::Points => vk::BlendFactor::ONE,
            Topology::LineStrip => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        };

        vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(true)
            .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
            .dst_color_blend_factor(dst_color)
            .color_blend_op(vk::BlendOp::ADD)
            .src_alpha_blend_factor(vk::BlendFactor::ONE)
            .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
            .alpha_blend_op(vk::BlendOp::ADD)
    }
}

/// Value of the `BASIS` specialization constant in `curve.vert`
fn basis_constant(basis: BasisFamily) -> u32 {
    match basis {
        BasisFamily::Spline => 0,
        BasisFamily::Bezier => 1,
        BasisFamily::CatmullRom => 2,
    }
}

//==================================================
//=== Curve Pipelines
//==================================================

/// One pipeline per basis family and topology, sharing layout and render pass
pub struct CurvePipelines {
    pub layout: vk::PipelineLayout,
    pub render_pass: vk::RenderPass,
    pipelines: Vec<vk::Pipeline>,
}

impl CurvePipelines {
    /// Creates a new [`CurvePipelines`]
    pub fn new(
        logical_device: &ash::Device,
        descriptor_set_layout: vk::DescriptorSetLayout,
        color_format: vk::Format,
        push_constant_range: vk::PushConstantRange,
    ) -> Result<Self> {
        let render_pass = create_render_pass(logical_device, color_format)?;

        let layout = {
            let create_info = vk::PipelineLayoutCreateInfo::default()
                .set_layouts(std::slice::from_ref(&descriptor_set_layout))
                .push_constant_ranges(std::slice::from_ref(&push_constant_range));

            unsafe { logical_device.create_pipeline_layout(&create_info, None) }?
        };

        /* Pipeline Stages */

        let shader_mod_vert = load_shader_module(logical_device, "curve.vert.spv")?;
        let shader_mod_frag = load_shader_module(logical_device, "curve.frag.spv")?;

        let mut pipelines = Vec::with_capacity(BasisFamily::ALL.len() * Topology::ALL.len());
        let mut result = Ok(());

        'outer: for basis in BasisFamily::ALL {
            for topology in Topology::ALL {
                match create_pipeline(
                    logical_device,
                    layout,
                    render_pass,
                    shader_mod_vert,
                    shader_mod_frag,
                    basis,
                    topology,
                ) {
                    Ok(pipeline) => pipelines.push(pipeline),
                    Err(err) => {
                        result = Err(err);
                        break 'outer;
                    }
                }
            }
        }

        /* Pipeline Cleanup */

        unsafe {
            logical_device.destroy_shader_module(shader_mod_frag, None);
            logical_device.destroy_shader_module(shader_mod_vert, None);
        };

        result?;

        log::debug!("Created {} curve pipelines", pipelines.len());

        Ok(Self {
            layout,
            render_pass,
            pipelines,
        })
    }

    /// Pipeline of `basis` drawing `topology`
    pub fn get(&self, basis: BasisFamily, topology: Topology) -> vk::Pipeline {
        let row = basis_constant(basis) as usize;
        let column = match topology {
            Topology::Points => 0,
            Topology::LineStrip => 1,
        };
        self.pipelines[row * Topology::ALL.len() + column]
    }

    pub fn destroy(&self, logical_device: &ash::Device) {
        unsafe {
            for pipeline in &self.pipelines {
                logical_device.destroy_pipeline(*pipeline, None);
            }
            logical_device.destroy_pipeline_layout(self.layout, None);
            logical_device.destroy_render_pass(self.render_pass, None);
        }
    }
}

fn load_shader_module(logical_device: &ash::Device, file_name: &str) -> Result<vk::ShaderModule> {
    let path = format!("{SHADER_DIR}{file_name}");
    let code = std::fs::read(&path).with_context(|| format!("Could not read shader {path}"))?;

    // SPIR-V words are read from bytes, the file buffer may not be 4 aligned
    let words = ash::util::read_spv(&mut std::io::Cursor::new(code))?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(&words);

    Ok(unsafe { logical_device.create_shader_module(&create_info, None) }?)
}

fn create_render_pass(
    logical_device: &ash::Device,
    color_format: vk::Format,
) -> Result<vk::RenderPass> {
    let color_attachment = vk::AttachmentDescription::default()
        .format(color_format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

    let color_attachment_ref = vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(std::slice::from_ref(&color_attachment_ref));

    let subpass_dependency = vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(std::slice::from_ref(&color_attachment))
        .subpasses(std::slice::from_ref(&subpass))
        .dependencies(std::slice::from_ref(&subpass_dependency));

    Ok(unsafe { logical_device.create_render_pass(&create_info, None) }?)
}

fn create_pipeline(
    logical_device: &ash::Device,
    layout: vk::PipelineLayout,
    render_pass: vk::RenderPass,
    shader_mod_vert: vk::ShaderModule,
    shader_mod_frag: vk::ShaderModule,
    basis: BasisFamily,
    topology: Topology,
) -> Result<vk::Pipeline> {
    let basis_data = basis_constant(basis).to_ne_bytes();

    let specialization_entry = vk::SpecializationMapEntry::default()
        .constant_id(0)
        .offset(0)
        .size(std::mem::size_of::<u32>());

    let specialization_info = vk::SpecializationInfo::default()
        .map_entries(std::slice::from_ref(&specialization_entry))
        .data(&basis_data);

    let shader_stages = [
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(shader_mod_vert)
            .name(c"main")
            .specialization_info(&specialization_info),
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(shader_mod_frag)
            .name(c"main"),
    ];

    /* Pipeline States */

    let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
    let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

    let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(topology.primitive())
        .primitive_restart_enable(false);

    // Samples are computed from gl_VertexIndex, there are no vertex buffers
    let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default();

    let viewport_state = vk::PipelineViewportStateCreateInfo::default()
        .viewport_count(1)
        .scissor_count(1);

    let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .line_width(1.0)
        .cull_mode(vk::CullModeFlags::NONE)
        .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
        .depth_bias_enable(false);

    let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
        .sample_shading_enable(false)
        .rasterization_samples(vk::SampleCountFlags::TYPE_1)
        .min_sample_shading(1.0);

    let color_blend_attachment_state = topology.blend_attachment();

    let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
        .logic_op_enable(false)
        .logic_op(vk::LogicOp::COPY)
        .attachments(std::slice::from_ref(&color_blend_attachment_state));

    /* Pipeline Finalization */

    let create_info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&shader_stages)
        .input_assembly_state(&input_assembly_state)
        .vertex_input_state(&vertex_input_state)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization_state)
        .multisample_state(&multisample_state)
        .color_blend_state(&color_blend_state)
        .dynamic_state(&dynamic_state)
        .layout(layout)
        .render_pass(render_pass)
        .subpass(0);

    let pipelines = unsafe {
        logical_device.create_graphics_pipelines(
            vk::PipelineCache::null(),
            std::slice::from_ref(&create_info),
            None,
        )
    }
    .map_err(|(_, err)| err)
    .with_context(|| format!("Could not create the {} {:?} pipeline", basis.name(), topology))?;

    pipelines
        .into_iter()
        .next()
        .context("Could not find the graphics pipeline")
}
