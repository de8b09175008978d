//! Physical device feature requirements
//!
//! The `[require]` section names members of `VkPhysicalDeviceFeatures`
//! verbatim (`shaderFloat64`, `geometryShader`, ...). Requirements are kept
//! as a bit-set over the table below and expanded to the ash struct when the
//! device-creation subsystem asks for it.

use ash::vk;

/// One requirable device feature
pub struct Feature {
    /// Member name as it appears in scripts
    pub name: &'static str,
    set: fn(&mut vk::PhysicalDeviceFeatures),
}

macro_rules! feature_table {
    ($( $script:ident => $field:ident ),+ $(,)?) => {
        /// Every member of `VkPhysicalDeviceFeatures`
        pub static FEATURES: &[Feature] = &[
            $(
                Feature {
                    name: stringify!($script),
                    set: |f| f.$field = vk::TRUE,
                }
            ),+
        ];
    };
}

feature_table! {
    robustBufferAccess => robust_buffer_access,
    fullDrawIndexUint32 => full_draw_index_uint32,
    imageCubeArray => image_cube_array,
    independentBlend => independent_blend,
    geometryShader => geometry_shader,
    tessellationShader => tessellation_shader,
    sampleRateShading => sample_rate_shading,
    dualSrcBlend => dual_src_blend,
    logicOp => logic_op,
    multiDrawIndirect => multi_draw_indirect,
    drawIndirectFirstInstance => draw_indirect_first_instance,
    depthClamp => depth_clamp,
    depthBiasClamp => depth_bias_clamp,
    fillModeNonSolid => fill_mode_non_solid,
    depthBounds => depth_bounds,
    wideLines => wide_lines,
    largePoints => large_points,
    alphaToOne => alpha_to_one,
    multiViewport => multi_viewport,
    samplerAnisotropy => sampler_anisotropy,
    textureCompressionETC2 => texture_compression_etc2,
    textureCompressionASTC_LDR => texture_compression_astc_ldr,
    textureCompressionBC => texture_compression_bc,
    occlusionQueryPrecise => occlusion_query_precise,
    pipelineStatisticsQuery => pipeline_statistics_query,
    vertexPipelineStoresAndAtomics => vertex_pipeline_stores_and_atomics,
    fragmentStoresAndAtomics => fragment_stores_and_atomics,
    shaderTessellationAndGeometryPointSize => shader_tessellation_and_geometry_point_size,
    shaderImageGatherExtended => shader_image_gather_extended,
    shaderStorageImageExtendedFormats => shader_storage_image_extended_formats,
    shaderStorageImageMultisample => shader_storage_image_multisample,
    shaderStorageImageReadWithoutFormat => shader_storage_image_read_without_format,
    shaderStorageImageWriteWithoutFormat => shader_storage_image_write_without_format,
    shaderUniformBufferArrayDynamicIndexing => shader_uniform_buffer_array_dynamic_indexing,
    shaderSampledImageArrayDynamicIndexing => shader_sampled_image_array_dynamic_indexing,
    shaderStorageBufferArrayDynamicIndexing => shader_storage_buffer_array_dynamic_indexing,
    shaderStorageImageArrayDynamicIndexing => shader_storage_image_array_dynamic_indexing,
    shaderClipDistance => shader_clip_distance,
    shaderCullDistance => shader_cull_distance,
    shaderFloat64 => shader_float64,
    shaderInt64 => shader_int64,
    shaderInt16 => shader_int16,
    shaderResourceResidency => shader_resource_residency,
    shaderResourceMinLod => shader_resource_min_lod,
    sparseBinding => sparse_binding,
    sparseResidencyBuffer => sparse_residency_buffer,
    sparseResidencyImage2D => sparse_residency_image2_d,
    sparseResidencyImage3D => sparse_residency_image3_d,
    sparseResidency2Samples => sparse_residency2_samples,
    sparseResidency4Samples => sparse_residency4_samples,
    sparseResidency8Samples => sparse_residency8_samples,
    sparseResidency16Samples => sparse_residency16_samples,
    sparseResidencyAliased => sparse_residency_aliased,
    variableMultisampleRate => variable_multisample_rate,
    inheritedQueries => inherited_queries,
}

/// Bit-set of required features, indexed by table position
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    bits: u64,
}

impl FeatureSet {
    /// Empty requirement set
    pub fn new() -> FeatureSet {
        FeatureSet::default()
    }

    /// Mark `name` as required; false when the name is not a feature
    pub fn enable(&mut self, name: &str) -> bool {
        match FEATURES.iter().position(|f| f.name == name) {
            Some(index) => {
                self.bits |= 1 << index;
                true
            }
            None => false,
        }
    }

    /// True when nothing is required
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Expand to the struct handed to `vkCreateDevice`
    pub fn to_vk(&self) -> vk::PhysicalDeviceFeatures {
        let mut features = vk::PhysicalDeviceFeatures::default();
        for (index, feature) in FEATURES.iter().enumerate() {
            if self.bits & (1 << index) != 0 {
                (feature.set)(&mut features);
            }
        }
        features
    }

    /// Names of every required feature, in table order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        FEATURES
            .iter()
            .enumerate()
            .filter(|(index, _)| self.bits & (1 << index) != 0)
            .map(|(_, f)| f.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_known_feature() {
        let mut set = FeatureSet::new();
        assert!(set.enable("shaderFloat64"));
        assert!(set.enable("geometryShader"));
        assert!(!set.enable("warpDrive"));
        let vk_features = set.to_vk();
        assert_eq!(vk_features.shader_float64, vk::TRUE);
        assert_eq!(vk_features.geometry_shader, vk::TRUE);
        assert_eq!(vk_features.shader_int64, vk::FALSE);
    }

    #[test]
    fn test_names_round_trip() {
        let mut set = FeatureSet::new();
        set.enable("depthBounds");
        set.enable("wideLines");
        let names: Vec<_> = set.names().collect();
        assert_eq!(names, vec!["depthBounds", "wideLines"]);
    }

    #[test]
    fn test_table_fits_bitset() {
        assert!(FEATURES.len() <= 64);
    }
}
