//! Shader module creation
//!
//! Wraps `vkCreateShaderModule` for the per-stage SPIR-V produced by the
//! shader toolchain, with RAII cleanup of every module.

use ash::vk;

use crate::script::Script;
use crate::stage::Stage;
use crate::tooling::{ToolError, Toolchain};
use crate::vulkan::{VulkanError, VulkanResult};

/// Compiled shader modules, at most one per stage
pub struct StageModules {
    device: ash::Device,
    modules: [Option<vk::ShaderModule>; Stage::COUNT],
}

impl StageModules {
    /// Empty set for `device`
    pub fn new(device: &ash::Device) -> StageModules {
        StageModules {
            device: device.clone(),
            modules: [None; Stage::COUNT],
        }
    }

    /// Compile every stage of `script` and create its module.
    ///
    /// GLSL and SPIR-V assembly go through the external toolchain; binary
    /// sections are used verbatim.
    pub fn compile_from_script(
        device: &ash::Device,
        script: &Script,
        toolchain: &Toolchain,
    ) -> Result<StageModules, StageModulesError> {
        let mut modules = StageModules::new(device);
        for stage in Stage::ALL {
            let code = script.stage_code(stage);
            if code.is_empty() {
                continue;
            }
            let words = toolchain.compile_stage(stage, code)?;
            modules.add(stage, &words)?;
        }
        Ok(modules)
    }

    /// Create the module for `stage` from SPIR-V words
    pub fn add(&mut self, stage: Stage, words: &[u32]) -> VulkanResult<()> {
        log::debug!(
            "[SHADER] Creating {} module from {} words",
            stage.script_name(),
            words.len()
        );
        let create_info = vk::ShaderModuleCreateInfo::builder().code(words);
        let module = unsafe {
            self.device
                .create_shader_module(&create_info, None)
                .map_err(|result| VulkanError::CreateFailure {
                    object: "shader module",
                    result,
                })?
        };
        if let Some(old) = self.modules[stage.index()].replace(module) {
            unsafe { self.device.destroy_shader_module(old, None) };
        }
        Ok(())
    }

    /// The module for `stage`, if the script provided one
    pub fn get(&self, stage: Stage) -> Option<vk::ShaderModule> {
        self.modules[stage.index()]
    }

    /// Stages that have a module, in pipeline order
    pub fn present(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.modules[stage.index()].is_some())
    }
}

impl Drop for StageModules {
    fn drop(&mut self) {
        for module in self.modules.iter().flatten() {
            unsafe { self.device.destroy_shader_module(*module, None) };
        }
    }
}

/// Failure while producing stage modules
#[derive(thiserror::Error, Debug)]
pub enum StageModulesError {
    /// The external compiler or assembler failed
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// `vkCreateShaderModule` failed
    #[error(transparent)]
    Vulkan(#[from] VulkanError),
}
