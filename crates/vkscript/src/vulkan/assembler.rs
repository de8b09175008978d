//! Pipeline assembly
//!
//! Turns a parsed script plus compiled shader modules into the concrete
//! Vulkan objects a run needs: descriptor set layouts grouped per set, a
//! descriptor pool the runtime can reset, the pipeline layout with the
//! push-constant range, a per-run pipeline cache, and one pipeline per
//! deduplicated key. When a script has several graphics pipelines the first
//! one allows derivatives and the rest derive from it.

use std::ffi::CString;

use ash::vk;

use crate::pipeline::{PipelineKey, PipelineType, VertexSource};
use crate::script::{BufferType, Script};
use crate::stage::Stage;
use crate::vulkan::shader::StageModules;
use crate::vulkan::{RectVertex, VulkanError, VulkanResult};

fn create_failure(object: &'static str) -> impl FnOnce(vk::Result) -> VulkanError {
    move |result| VulkanError::CreateFailure { object, result }
}

/// Union of the stage bits for every stage the script provides code for
fn script_stage_flags(script: &Script) -> vk::ShaderStageFlags {
    Stage::ALL
        .into_iter()
        .filter(|stage| !script.stage_code(*stage).is_empty())
        .fold(vk::ShaderStageFlags::empty(), |flags, stage| {
            flags | stage.vk_flags()
        })
}

/// Vertex input state for one key, per its vertex source
fn vertex_input_descriptions(
    script: &Script,
    key: &PipelineKey,
) -> (
    Vec<vk::VertexInputBindingDescription>,
    Vec<vk::VertexInputAttributeDescription>,
) {
    match key.source() {
        VertexSource::Rectangle => (
            vec![vk::VertexInputBindingDescription {
                binding: 0,
                stride: std::mem::size_of::<RectVertex>() as u32,
                input_rate: vk::VertexInputRate::VERTEX,
            }],
            vec![vk::VertexInputAttributeDescription {
                binding: 0,
                location: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: 0,
            }],
        ),
        VertexSource::VertexData => match &script.vertex_data {
            None => (Vec::new(), Vec::new()),
            Some(vbo) => (
                vec![vk::VertexInputBindingDescription {
                    binding: 0,
                    stride: vbo.stride as u32,
                    input_rate: vk::VertexInputRate::VERTEX,
                }],
                vbo.attributes
                    .iter()
                    .map(|attribute| vk::VertexInputAttributeDescription {
                        binding: 0,
                        location: attribute.location,
                        format: attribute.format.format,
                        offset: attribute.offset as u32,
                    })
                    .collect(),
            ),
        },
    }
}

/// Every Vulkan object built for one script, destroyed in reverse order
pub struct PipelineSet {
    device: ash::Device,
    set_layouts: Vec<vk::DescriptorSetLayout>,
    descriptor_pool: vk::DescriptorPool,
    layout: vk::PipelineLayout,
    cache: vk::PipelineCache,
    pipelines: Vec<vk::Pipeline>,
    modules: StageModules,
}

impl PipelineSet {
    /// Build every object for `script`; `render_pass` must be compatible
    /// with the script's window format.
    pub fn new(
        device: &ash::Device,
        render_pass: vk::RenderPass,
        script: &Script,
        modules: StageModules,
    ) -> VulkanResult<PipelineSet> {
        let mut set = PipelineSet {
            device: device.clone(),
            set_layouts: Vec::new(),
            descriptor_pool: vk::DescriptorPool::null(),
            layout: vk::PipelineLayout::null(),
            cache: vk::PipelineCache::null(),
            pipelines: Vec::new(),
            modules,
        };
        // a failed step leaves a partial set; Drop unwinds what exists
        set.build(render_pass, script)?;
        Ok(set)
    }

    /// The pipeline layout shared by every pipeline
    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }

    /// The descriptor pool, null when the script declares no buffers
    pub fn descriptor_pool(&self) -> vk::DescriptorPool {
        self.descriptor_pool
    }

    /// One layout per descriptor set, empty sets included
    pub fn set_layouts(&self) -> &[vk::DescriptorSetLayout] {
        &self.set_layouts
    }

    /// Pipelines parallel to the script's key list
    pub fn pipelines(&self) -> &[vk::Pipeline] {
        &self.pipelines
    }

    /// The compiled shader modules
    pub fn modules(&self) -> &StageModules {
        &self.modules
    }

    fn build(&mut self, render_pass: vk::RenderPass, script: &Script) -> VulkanResult<()> {
        let stage_flags = script_stage_flags(script);

        self.create_set_layouts(script, stage_flags)?;
        self.create_descriptor_pool(script)?;
        self.create_pipeline_layout(script, stage_flags)?;

        let cache_info = vk::PipelineCacheCreateInfo::builder();
        self.cache = unsafe {
            self.device
                .create_pipeline_cache(&cache_info, None)
                .map_err(create_failure("pipeline cache"))?
        };

        let n_graphics = script
            .pipeline_keys
            .iter()
            .filter(|key| key.pipeline_type() == PipelineType::Graphics)
            .count();
        let mut first_graphics = None;
        for key in &script.pipeline_keys {
            let pipeline = match key.pipeline_type() {
                PipelineType::Graphics => self.create_graphics_pipeline(
                    render_pass,
                    script,
                    key,
                    n_graphics,
                    first_graphics,
                )?,
                PipelineType::Compute => self.create_compute_pipeline(key)?,
            };
            if key.pipeline_type() == PipelineType::Graphics && first_graphics.is_none() {
                first_graphics = Some(pipeline);
            }
            self.pipelines.push(pipeline);
        }
        log::debug!(
            "[PIPELINE] Built {} pipelines ({} graphics)",
            self.pipelines.len(),
            n_graphics
        );
        Ok(())
    }

    fn create_set_layouts(
        &mut self,
        script: &Script,
        stage_flags: vk::ShaderStageFlags,
    ) -> VulkanResult<()> {
        let n_layouts = script
            .buffers
            .iter()
            .map(|b| b.desc_set + 1)
            .max()
            .unwrap_or(0);
        for set_index in 0..n_layouts {
            let bindings: Vec<vk::DescriptorSetLayoutBinding> = script
                .buffers
                .iter()
                .filter(|b| b.desc_set == set_index)
                .map(|b| {
                    vk::DescriptorSetLayoutBinding::builder()
                        .binding(b.binding)
                        .descriptor_type(descriptor_type(b.buffer_type))
                        .descriptor_count(1)
                        .stage_flags(stage_flags)
                        .build()
                })
                .collect();
            let info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&bindings);
            let layout = unsafe {
                self.device
                    .create_descriptor_set_layout(&info, None)
                    .map_err(create_failure("descriptor set layout"))?
            };
            self.set_layouts.push(layout);
        }
        Ok(())
    }

    fn create_descriptor_pool(&mut self, script: &Script) -> VulkanResult<()> {
        let mut pool_sizes = Vec::new();
        for buffer_type in [BufferType::Ubo, BufferType::Ssbo] {
            let count = script
                .buffers
                .iter()
                .filter(|b| b.buffer_type == buffer_type)
                .count() as u32;
            if count > 0 {
                pool_sizes.push(vk::DescriptorPoolSize {
                    ty: descriptor_type(buffer_type),
                    descriptor_count: count,
                });
            }
        }
        if pool_sizes.is_empty() {
            return Ok(());
        }
        let info = vk::DescriptorPoolCreateInfo::builder()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(self.set_layouts.len() as u32)
            .pool_sizes(&pool_sizes);
        self.descriptor_pool = unsafe {
            self.device
                .create_descriptor_pool(&info, None)
                .map_err(create_failure("descriptor pool"))?
        };
        Ok(())
    }

    fn create_pipeline_layout(
        &mut self,
        script: &Script,
        stage_flags: vk::ShaderStageFlags,
    ) -> VulkanResult<()> {
        let push_constant_size = script.push_constant_size();
        let push_constant_range = vk::PushConstantRange {
            stage_flags,
            offset: 0,
            size: push_constant_size as u32,
        };
        let mut info = vk::PipelineLayoutCreateInfo::builder().set_layouts(&self.set_layouts);
        if push_constant_size > 0 {
            info = info.push_constant_ranges(std::slice::from_ref(&push_constant_range));
        }
        self.layout = unsafe {
            self.device
                .create_pipeline_layout(&info, None)
                .map_err(create_failure("pipeline layout"))?
        };
        Ok(())
    }

    fn create_graphics_pipeline(
        &mut self,
        render_pass: vk::RenderPass,
        script: &Script,
        key: &PipelineKey,
        n_graphics: usize,
        first_graphics: Option<vk::Pipeline>,
    ) -> VulkanResult<vk::Pipeline> {
        let state = key.to_fixed_function_state();

        let blend_attachments = [state.blend_attachment];
        let mut color_blend = state.color_blend;
        color_blend.attachment_count = blend_attachments.len() as u32;
        color_blend.p_attachments = blend_attachments.as_ptr();

        let extent = vk::Extent2D {
            width: script.window_format.width,
            height: script.window_format.height,
        };
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewports(std::slice::from_ref(&viewport))
            .scissors(std::slice::from_ref(&scissor));

        let multisample = vk::PipelineMultisampleStateCreateInfo::builder()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let (bindings, attributes) = vertex_input_descriptions(script, key);
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let graphics_stages: Vec<Stage> = self
            .modules
            .present()
            .filter(|stage| *stage != Stage::Compute)
            .collect();
        let entry_names: Vec<CString> = graphics_stages
            .iter()
            .map(|stage| entry_name(key.entrypoint(*stage)))
            .collect::<VulkanResult<_>>()?;
        let stage_infos: Vec<vk::PipelineShaderStageCreateInfo> = graphics_stages
            .iter()
            .zip(&entry_names)
            .map(|(stage, name)| {
                vk::PipelineShaderStageCreateInfo::builder()
                    .stage(stage.vk_flags())
                    .module(self.modules.get(*stage).expect("stage is present"))
                    .name(name)
                    .build()
            })
            .collect();

        let mut flags = vk::PipelineCreateFlags::empty();
        let mut info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stage_infos)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&state.input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&state.rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&state.depth_stencil)
            .color_blend_state(&color_blend)
            .layout(self.layout)
            .render_pass(render_pass)
            .subpass(0);
        let has_tessellation = graphics_stages.iter().any(|s| s.is_tessellation());
        if has_tessellation {
            info = info.tessellation_state(&state.tessellation);
        }
        if n_graphics > 1 {
            match first_graphics {
                None => flags |= vk::PipelineCreateFlags::ALLOW_DERIVATIVES,
                Some(base) => {
                    flags |= vk::PipelineCreateFlags::DERIVATIVE;
                    info = info.base_pipeline_handle(base).base_pipeline_index(-1);
                }
            }
        }
        let info = info.flags(flags);

        let pipelines = unsafe {
            self.device
                .create_graphics_pipelines(self.cache, std::slice::from_ref(&info), None)
                .map_err(|(_, result)| VulkanError::CreateFailure {
                    object: "graphics pipeline",
                    result,
                })?
        };
        Ok(pipelines[0])
    }

    fn create_compute_pipeline(&mut self, key: &PipelineKey) -> VulkanResult<vk::Pipeline> {
        let module = self
            .modules
            .get(Stage::Compute)
            .ok_or(VulkanError::CreateFailure {
                object: "compute pipeline",
                result: vk::Result::ERROR_INITIALIZATION_FAILED,
            })?;
        let name = entry_name(key.entrypoint(Stage::Compute))?;
        let stage_info = vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::COMPUTE)
            .module(module)
            .name(&name);
        let info = vk::ComputePipelineCreateInfo::builder()
            .stage(stage_info.build())
            .layout(self.layout);
        let pipelines = unsafe {
            self.device
                .create_compute_pipelines(self.cache, std::slice::from_ref(&info), None)
                .map_err(|(_, result)| VulkanError::CreateFailure {
                    object: "compute pipeline",
                    result,
                })?
        };
        Ok(pipelines[0])
    }
}

fn descriptor_type(buffer_type: BufferType) -> vk::DescriptorType {
    match buffer_type {
        BufferType::Ubo => vk::DescriptorType::UNIFORM_BUFFER,
        BufferType::Ssbo => vk::DescriptorType::STORAGE_BUFFER,
    }
}

fn entry_name(name: &str) -> VulkanResult<CString> {
    CString::new(name).map_err(|_| VulkanError::CreateFailure {
        object: "shader entrypoint name",
        result: vk::Result::ERROR_INITIALIZATION_FAILED,
    })
}

impl Drop for PipelineSet {
    fn drop(&mut self) {
        unsafe {
            for pipeline in self.pipelines.drain(..).rev() {
                self.device.destroy_pipeline(pipeline, None);
            }
            if self.cache != vk::PipelineCache::null() {
                self.device.destroy_pipeline_cache(self.cache, None);
            }
            if self.layout != vk::PipelineLayout::null() {
                self.device.destroy_pipeline_layout(self.layout, None);
            }
            if self.descriptor_pool != vk::DescriptorPool::null() {
                self.device.destroy_descriptor_pool(self.descriptor_pool, None);
            }
            for layout in self.set_layouts.drain(..).rev() {
                self.device.destroy_descriptor_set_layout(layout, None);
            }
        }
        // the shader modules drop themselves afterwards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_string;

    #[test]
    fn test_stage_flags_union() {
        let script = parse_string(
            "flags",
            "[vertex shader passthrough]\n\
             [fragment shader]\n\
             void main() {}\n",
        )
        .unwrap();
        assert_eq!(
            script_stage_flags(&script),
            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT
        );
    }

    #[test]
    fn test_rectangle_vertex_input() {
        let script = parse_string("rect", "[test]\ndraw rect 0 0 1 1\n").unwrap();
        let key = &script.pipeline_keys[0];
        let (bindings, attributes) = vertex_input_descriptions(&script, key);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].stride, 12);
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(attributes[0].location, 0);
    }

    #[test]
    fn test_vertex_data_vertex_input() {
        let script = parse_string(
            "vbo",
            "[vertex data]\n\
             0/R32G32_SFLOAT 2/R8G8B8A8_UNORM\n\
             0 0 1.0 0 0 1.0\n\
             [test]\n\
             draw arrays GL_TRIANGLES 0 1\n",
        )
        .unwrap();
        let key = &script.pipeline_keys[0];
        let (bindings, attributes) = vertex_input_descriptions(&script, key);
        assert_eq!(bindings[0].stride, 12);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].location, 0);
        assert_eq!(attributes[1].location, 2);
        assert_eq!(attributes[1].format, vk::Format::R8G8B8A8_UNORM);
        assert_eq!(attributes[1].offset, 8);
    }

    #[test]
    fn test_vertex_data_missing_gives_empty_input() {
        let script = parse_string("empty", "[test]\ndraw arrays GL_TRIANGLES 0 3\n").unwrap();
        let key = &script.pipeline_keys[0];
        let (bindings, attributes) = vertex_input_descriptions(&script, key);
        assert!(bindings.is_empty());
        assert!(attributes.is_empty());
    }
}
