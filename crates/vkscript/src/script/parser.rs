//! Section-driven script interpreter
//!
//! Walks the logical lines of a script, switching behaviour on `[section]`
//! headers. Shader bodies accumulate verbatim until the next section;
//! `[require]` and `[test]` lines are parsed one directive or command at a
//! time. The parser aborts on the first error with the file and line it
//! happened on.

use std::path::Path;

use ash::vk;

use crate::pipeline::{PipelineKey, PipelineType, VertexSource};
use crate::script::base64::Decoder;
use crate::script::command::{Command, Operation};
use crate::script::data_type::{CompareOp, DataType, Tolerance};
use crate::script::parse;
use crate::script::passthrough::PASSTHROUGH_VERTEX_SHADER;
use crate::script::stream::LineStream;
use crate::script::vbo::VboBuilder;
use crate::script::{
    BufferRequirement, BufferType, ParseError, ParseErrorKind, Script, ShaderCode, SourceType,
    WindowFormat,
};
use crate::stage::Stage;

/// Parse a script file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Script, ParseError> {
    let filename = path.as_ref().display().to_string();
    let stream = LineStream::from_file(&path).map_err(|e| ParseError {
        file: filename.clone(),
        line: 0,
        kind: ParseErrorKind::Io(e),
    })?;
    parse_stream(filename, stream)
}

/// Parse an in-memory script; `name` only labels diagnostics
pub fn parse_string(name: impl Into<String>, text: &str) -> Result<Script, ParseError> {
    parse_stream(name.into(), LineStream::from_string(text))
}

/// Parse from a configured stream (token replacements already registered)
pub fn parse_stream(filename: String, stream: LineStream) -> Result<Script, ParseError> {
    Parser::new(filename, stream).run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Comment,
    Require,
    Shader(Stage, SourceType),
    NoContent,
    VertexData,
    Indices,
    Test,
}

struct Parser {
    filename: String,
    stream: LineStream,
    section: Section,
    section_line: u32,
    seen_other_section: bool,

    window_format: WindowFormat,
    required_features: crate::features::FeatureSet,
    extensions: Vec<String>,
    stages: [Vec<ShaderCode>; Stage::COUNT],
    vertex_data: Option<crate::script::vbo::Vbo>,
    indices: Vec<u16>,
    buffers: Vec<BufferRequirement>,
    commands: Vec<Command>,
    pipeline_keys: Vec<PipelineKey>,

    shader_body: String,
    vbo_builder: Option<VboBuilder>,

    current_key: PipelineKey,
    tolerance: Tolerance,
    clear_color: [f32; 4],
    clear_depth: f32,
    clear_stencil: u32,
}

impl Parser {
    fn new(filename: String, stream: LineStream) -> Parser {
        Parser {
            filename,
            stream,
            section: Section::None,
            section_line: 0,
            seen_other_section: false,
            window_format: WindowFormat::default(),
            required_features: crate::features::FeatureSet::new(),
            extensions: Vec::new(),
            stages: Default::default(),
            vertex_data: None,
            indices: Vec::new(),
            buffers: Vec::new(),
            commands: Vec::new(),
            pipeline_keys: Vec::new(),
            shader_body: String::new(),
            vbo_builder: None,
            current_key: PipelineKey::default(),
            tolerance: Tolerance::default(),
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
        }
    }

    fn run(mut self) -> Result<Script, ParseError> {
        loop {
            let line = match self.stream.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    let kind = e.into();
                    log::error!(
                        "[PARSER] {}:{}: {}",
                        self.filename,
                        self.stream.line_number(),
                        kind
                    );
                    return Err(self.error(kind));
                }
            };
            if let Err(kind) = self.process_line(&line) {
                log::error!("[PARSER] {}:{}: {}", self.filename, self.stream.line_number(), kind);
                return Err(self.error(kind));
            }
        }
        if let Err(kind) = self.end_section() {
            let line = self.section_line;
            log::error!("[PARSER] {}:{}: {}", self.filename, line, kind);
            return Err(ParseError {
                file: self.filename,
                line,
                kind,
            });
        }
        self.buffers
            .sort_by_key(|b| (b.desc_set, b.binding));
        log::debug!(
            "[PARSER] {}: {} commands, {} pipeline keys, {} buffers",
            self.filename,
            self.commands.len(),
            self.pipeline_keys.len(),
            self.buffers.len()
        );
        Ok(Script {
            filename: self.filename,
            window_format: self.window_format,
            required_features: self.required_features,
            extensions: self.extensions,
            stages: self.stages,
            vertex_data: self.vertex_data,
            indices: self.indices,
            buffers: self.buffers,
            commands: self.commands,
            pipeline_keys: self.pipeline_keys,
        })
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            file: self.filename.clone(),
            line: self.stream.line_number(),
            kind,
        }
    }

    fn process_line(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        if line.starts_with('[') {
            self.end_section()?;
            self.start_section(line)?;
            return Ok(());
        }
        match self.section {
            Section::Comment => Ok(()),
            Section::Shader(..) => {
                self.shader_body.push_str(line);
                if !line.ends_with('\n') {
                    self.shader_body.push('\n');
                }
                Ok(())
            }
            Section::NoContent | Section::None => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    Ok(())
                } else {
                    Err(ParseErrorKind::InvalidFormat(format!(
                        "unexpected content outside a section: {:?}",
                        trimmed
                    )))
                }
            }
            Section::Require => self.process_require_line(line),
            Section::VertexData => {
                let builder = self.vbo_builder.as_mut().expect("vbo builder present");
                builder.add_line(line).map_err(ParseErrorKind::InvalidValue)
            }
            Section::Indices => self.process_indices_line(line),
            Section::Test => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    Ok(())
                } else {
                    self.process_test_line(trimmed)
                }
            }
        }
    }

    fn start_section(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let close = line.find(']').ok_or_else(|| {
            ParseErrorKind::InvalidFormat("missing ] on section header".to_string())
        })?;
        if !parse::is_end(&line[close + 1..]) {
            return Err(ParseErrorKind::InvalidFormat(
                "trailing text after section header".to_string(),
            ));
        }
        let name = &line[1..close];
        let words: Vec<&str> = name.split_whitespace().collect();

        self.section_line = self.stream.line_number();
        self.section = match words.as_slice() {
            ["comment"] => Section::Comment,
            ["require"] => {
                if self.seen_other_section {
                    return Err(ParseErrorKind::RequireNotFirst);
                }
                Section::Require
            }
            ["vertex", "data"] => {
                if self.vertex_data.is_some() || self.vbo_builder.is_some() {
                    return Err(ParseErrorKind::DuplicateVertexData);
                }
                self.vbo_builder = Some(VboBuilder::new());
                Section::VertexData
            }
            ["vertex", "shader", "passthrough"] => {
                self.add_shader(
                    Stage::Vertex,
                    ShaderCode::SpirvBinary(PASSTHROUGH_VERTEX_SHADER.to_vec()),
                )?;
                Section::NoContent
            }
            ["indices"] => Section::Indices,
            ["test"] => Section::Test,
            _ => match parse_shader_section(&words) {
                Some((stage, source_type)) => Section::Shader(stage, source_type),
                None => return Err(ParseErrorKind::UnknownSection(name.to_string())),
            },
        };
        if !matches!(self.section, Section::Comment | Section::Require) {
            self.seen_other_section = true;
        }
        Ok(())
    }

    fn end_section(&mut self) -> Result<(), ParseErrorKind> {
        match self.section {
            Section::Shader(stage, source_type) => {
                let body = std::mem::take(&mut self.shader_body);
                let code = match source_type {
                    SourceType::Glsl => ShaderCode::Glsl(body),
                    SourceType::SpirvAssembly => ShaderCode::SpirvAssembly(body),
                    SourceType::SpirvBinary => ShaderCode::SpirvBinary(
                        parse::parse_hex_words(&body).map_err(ParseErrorKind::InvalidValue)?,
                    ),
                };
                self.add_shader(stage, code)?;
            }
            Section::VertexData => {
                let builder = self.vbo_builder.take().expect("vbo builder present");
                let vbo = builder.finish().map_err(ParseErrorKind::InvalidValue)?;
                self.vertex_data = Some(vbo);
            }
            _ => (),
        }
        self.section = Section::None;
        Ok(())
    }

    fn add_shader(&mut self, stage: Stage, code: ShaderCode) -> Result<(), ParseErrorKind> {
        let list = &mut self.stages[stage.index()];
        let adding_spirv = code.source_type() != SourceType::Glsl;
        let has_spirv = list
            .iter()
            .any(|existing| existing.source_type() != SourceType::Glsl);
        // GLSL fragments link into one module; SPIR-V stages are single-entry
        if (adding_spirv && !list.is_empty()) || has_spirv {
            return Err(ParseErrorKind::InvalidValue(format!(
                "the {} stage already has a shader and SPIR-V stages accept only one",
                stage.script_name()
            )));
        }
        list.push(code);
        Ok(())
    }

    fn process_require_line(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }
        let mut c = trimmed;
        if parse::looking_at_word(&mut c, "fbsize") {
            let width = parse_u32(&mut c)?;
            let height = parse_u32(&mut c)?;
            ensure_end(c)?;
            self.window_format.width = width;
            self.window_format.height = height;
            return Ok(());
        }
        if parse::looking_at_word(&mut c, "framebuffer") {
            self.window_format.color_format = self.parse_format(&mut c)?;
            return Ok(());
        }
        if parse::looking_at_word(&mut c, "depthstencil") {
            self.window_format.depth_stencil_format = Some(self.parse_format(&mut c)?);
            return Ok(());
        }

        let mut c = trimmed;
        let word = parse::next_word(&mut c).expect("line is not empty");
        if !parse::is_end(c) {
            return Err(ParseErrorKind::InvalidFormat(format!(
                "invalid require directive: {:?}",
                trimmed
            )));
        }
        if self.required_features.enable(word) {
            return Ok(());
        }
        if !word.is_empty()
            && word
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            if !self.extensions.iter().any(|e| e == word) {
                self.extensions.push(word.to_string());
            }
            return Ok(());
        }
        Err(ParseErrorKind::InvalidFormat(format!(
            "invalid require directive: {:?}",
            trimmed
        )))
    }

    fn parse_format(&mut self, c: &mut &str) -> Result<vk::Format, ParseErrorKind> {
        let name = parse::next_word(c).ok_or_else(|| {
            ParseErrorKind::InvalidFormat("missing format name".to_string())
        })?;
        let info = crate::formats::lookup(name)
            .ok_or_else(|| ParseErrorKind::UnknownFormat(name.to_string()))?;
        ensure_end(c)?;
        Ok(info.format)
    }

    fn process_indices_line(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }
        let mut c = trimmed;
        while !parse::is_end(c) {
            let index = parse::parse_u16(&mut c).map_err(|e| {
                ParseErrorKind::InvalidValue(format!("invalid index: {}", e))
            })?;
            self.indices.push(index);
        }
        Ok(())
    }

    fn process_test_line(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let line_no = self.stream.line_number();
        let mut c = line;

        if parse::looking_at_word(&mut c, "patch") {
            if !(parse::looking_at_word(&mut c, "parameter")
                && parse::looking_at_word(&mut c, "vertices"))
            {
                return Err(invalid_command(line));
            }
            let n = parse_u32(&mut c)?;
            ensure_end(c)?;
            self.current_key.set_int("patchControlPoints", n);
            return Ok(());
        }

        if parse::looking_at_word(&mut c, "clear") {
            if parse::looking_at_word(&mut c, "color") {
                for slot in &mut self.clear_color {
                    *slot = parse_f32(&mut c)?;
                }
                return ensure_end(c);
            }
            if parse::looking_at_word(&mut c, "depth") {
                self.clear_depth = parse_f32(&mut c)?;
                return ensure_end(c);
            }
            if parse::looking_at_word(&mut c, "stencil") {
                self.clear_stencil = parse_u32(&mut c)?;
                return ensure_end(c);
            }
            ensure_end(c)?;
            self.commands.push(Command {
                line: line_no,
                op: Operation::Clear {
                    color: self.clear_color,
                    depth: self.clear_depth,
                    stencil: self.clear_stencil,
                },
            });
            return Ok(());
        }

        if parse::looking_at_word(&mut c, "ssbo") {
            let (desc_set, binding) = parse_binding(&mut c)?;
            if parse::looking_at_word(&mut c, "subdata") {
                let (offset, data) = parse_payload(&mut c)?;
                let buffer = self.get_buffer(desc_set, binding, BufferType::Ssbo)?;
                buffer.size = buffer.size.max(offset + data.len());
                self.commands.push(Command {
                    line: line_no,
                    op: Operation::SetBufferSubdata {
                        desc_set,
                        binding,
                        offset,
                        data,
                    },
                });
            } else {
                let size = parse_u32(&mut c)? as usize;
                ensure_end(c)?;
                let buffer = self.get_buffer(desc_set, binding, BufferType::Ssbo)?;
                buffer.size = buffer.size.max(size);
            }
            return Ok(());
        }

        if parse::looking_at_word(&mut c, "tolerance") {
            return self.parse_tolerance(&mut c);
        }

        for stage in Stage::ALL {
            let mut c = line;
            let stage_matches = stage
                .script_name()
                .split_whitespace()
                .all(|word| parse::looking_at_word(&mut c, word));
            if stage_matches && parse::looking_at_word(&mut c, "entrypoint") {
                let name = parse::next_word(&mut c)
                    .ok_or_else(|| invalid_command(line))?
                    .to_string();
                ensure_end(c)?;
                self.current_key.set_entrypoint(stage, name);
                return Ok(());
            }
        }

        let ident_end = line
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'))
            .unwrap_or(line.len());
        let ident = &line[..ident_end];
        if !ident.is_empty() {
            match self.current_key.set_property(ident, &line[ident_end..]) {
                Ok(true) => return Ok(()),
                Ok(false) => (),
                Err(e) => return Err(ParseErrorKind::InvalidValue(e.to_string())),
            }
        }

        if parse::looking_at_word(&mut c, "draw") {
            if parse::looking_at_word(&mut c, "rect") {
                return self.parse_draw_rect(line_no, &mut c);
            }
            if parse::looking_at_word(&mut c, "arrays") {
                return self.parse_draw_arrays(line_no, &mut c);
            }
            return Err(invalid_command(line));
        }

        let relative = parse::looking_at_word(&mut c, "relative");
        if parse::looking_at_word(&mut c, "probe") {
            return self.parse_probe(line_no, relative, &mut c, line);
        }
        if relative {
            return Err(invalid_command(line));
        }

        if parse::looking_at_word(&mut c, "compute") {
            let x = parse_u32(&mut c)?;
            let y = parse_u32(&mut c)?;
            let z = parse_u32(&mut c)?;
            ensure_end(c)?;
            let mut key = self.current_key.clone();
            key.set_pipeline_type(PipelineType::Compute);
            let key = self.add_pipeline_key(key);
            self.commands.push(Command {
                line: line_no,
                op: Operation::DispatchCompute { key, x, y, z },
            });
            return Ok(());
        }

        if parse::looking_at_word(&mut c, "uniform") {
            if parse::looking_at_word(&mut c, "ubo") {
                let (desc_set, binding) = parse_binding(&mut c)?;
                let (offset, data) = parse_payload(&mut c)?;
                let buffer = self.get_buffer(desc_set, binding, BufferType::Ubo)?;
                buffer.size = buffer.size.max(offset + data.len());
                self.commands.push(Command {
                    line: line_no,
                    op: Operation::SetBufferSubdata {
                        desc_set,
                        binding,
                        offset,
                        data,
                    },
                });
            } else {
                let (offset, data) = parse_payload(&mut c)?;
                self.commands.push(Command {
                    line: line_no,
                    op: Operation::SetPushConstant { offset, data },
                });
            }
            return Ok(());
        }

        Err(invalid_command(line))
    }

    fn parse_tolerance(&mut self, c: &mut &str) -> Result<(), ParseErrorKind> {
        let mut values = Vec::new();
        let mut n_percent = 0usize;
        loop {
            let value = parse_f64(c)?;
            if value < 0.0 {
                return Err(ParseErrorKind::InvalidValue(
                    "tolerance must not be negative".to_string(),
                ));
            }
            if parse::looking_at(c, "%") {
                n_percent += 1;
            }
            values.push(value);
            if parse::is_end(c) {
                break;
            }
            if values.len() >= 4 {
                return Err(ParseErrorKind::InvalidValue(
                    "tolerance takes 1 or 4 values".to_string(),
                ));
            }
        }
        if values.len() != 1 && values.len() != 4 {
            return Err(ParseErrorKind::InvalidValue(
                "tolerance takes 1 or 4 values".to_string(),
            ));
        }
        if n_percent != 0 && n_percent != values.len() {
            return Err(ParseErrorKind::InvalidValue(
                "tolerance mixes percent and absolute values".to_string(),
            ));
        }
        let spread = if values.len() == 1 {
            [values[0]; 4]
        } else {
            [values[0], values[1], values[2], values[3]]
        };
        self.tolerance = Tolerance {
            values: spread,
            is_percent: n_percent != 0,
        };
        Ok(())
    }

    fn parse_draw_rect(&mut self, line_no: u32, c: &mut &str) -> Result<(), ParseErrorKind> {
        let ortho = parse::looking_at_word(c, "ortho");
        let patch = parse::looking_at_word(c, "patch");
        let mut x = parse_f32(c)?;
        let mut y = parse_f32(c)?;
        let mut w = parse_f32(c)?;
        let mut h = parse_f32(c)?;
        ensure_end(c)?;
        if ortho {
            // pixel coordinates to normalised device coordinates
            let fb_w = self.window_format.width as f32;
            let fb_h = self.window_format.height as f32;
            x = x * 2.0 / fb_w - 1.0;
            y = y * 2.0 / fb_h - 1.0;
            w = w * 2.0 / fb_w;
            h = h * 2.0 / fb_h;
        }
        let mut key = self.current_key.clone();
        key.set_pipeline_type(PipelineType::Graphics);
        key.set_source(VertexSource::Rectangle);
        let topology = if patch {
            vk::PrimitiveTopology::PATCH_LIST
        } else {
            vk::PrimitiveTopology::TRIANGLE_STRIP
        };
        key.set_int("topology", topology.as_raw() as u32);
        key.set_int("patchControlPoints", 4);
        let key = self.add_pipeline_key(key);
        self.commands.push(Command {
            line: line_no,
            op: Operation::DrawRect { key, x, y, w, h },
        });
        Ok(())
    }

    fn parse_draw_arrays(&mut self, line_no: u32, c: &mut &str) -> Result<(), ParseErrorKind> {
        let instanced = parse::looking_at_word(c, "instanced");
        let indexed = parse::looking_at_word(c, "indexed");
        let topology_name = parse::next_word(c).ok_or_else(|| {
            ParseErrorKind::InvalidValue("draw arrays needs a topology".to_string())
        })?;
        let topology = crate::pipeline::enums::lookup_topology(topology_name).ok_or_else(|| {
            ParseErrorKind::InvalidValue(format!("unknown topology {:?}", topology_name))
        })?;
        let first_vertex = parse_u32(c)?;
        let vertex_count = parse_u32(c)?;
        let instance_count = if instanced { parse_u32(c)? } else { 1 };
        ensure_end(c)?;
        let mut key = self.current_key.clone();
        key.set_pipeline_type(PipelineType::Graphics);
        key.set_source(VertexSource::VertexData);
        key.set_int("topology", topology.as_raw() as u32);
        let key = self.add_pipeline_key(key);
        self.commands.push(Command {
            line: line_no,
            op: Operation::DrawArrays {
                key,
                indexed,
                first_vertex,
                vertex_count,
                instance_count,
            },
        });
        Ok(())
    }

    fn parse_probe(
        &mut self,
        line_no: u32,
        relative: bool,
        c: &mut &str,
        line: &str,
    ) -> Result<(), ParseErrorKind> {
        if parse::looking_at_word(c, "ssbo") {
            if relative {
                return Err(ParseErrorKind::InvalidValue(
                    "relative is not valid for ssbo probes".to_string(),
                ));
            }
            let type_name = parse::next_word(c).ok_or_else(|| invalid_command(line))?;
            let data_type = DataType::from_name(type_name).ok_or_else(|| {
                ParseErrorKind::InvalidValue(format!("unknown type {:?}", type_name))
            })?;
            let (desc_set, binding) = parse_binding(c)?;
            let offset = parse_u32(c)? as usize;
            let op = CompareOp::parse(c).ok_or_else(|| {
                ParseErrorKind::InvalidValue("missing comparison operator".to_string())
            })?;
            let data = data_type
                .parse_values_packed(c)
                .map_err(|e| ParseErrorKind::InvalidValue(e.to_string()))?;
            self.commands.push(Command {
                line: line_no,
                op: Operation::ProbeSsbo {
                    desc_set,
                    binding,
                    offset,
                    op,
                    data_type,
                    data,
                    tolerance: self.tolerance,
                },
            });
            return Ok(());
        }

        let is_rect = parse::looking_at_word(c, "rect");
        let is_all = !is_rect && parse::looking_at_word(c, "all");
        let n_components = if parse::looking_at_word(c, "rgba") {
            4
        } else if parse::looking_at_word(c, "rgb") {
            3
        } else {
            return Err(invalid_command(line));
        };

        let fb_w = self.window_format.width;
        let fb_h = self.window_format.height;
        let (x, y, w, h) = if is_all {
            if relative {
                return Err(ParseErrorKind::InvalidValue(
                    "relative is not valid with probe all".to_string(),
                ));
            }
            (0, 0, fb_w, fb_h)
        } else if is_rect {
            let v = parse_tuple(c, 4)?;
            if relative {
                (
                    (v[0] * fb_w as f64) as u32,
                    (v[1] * fb_h as f64) as u32,
                    (v[2] * fb_w as f64) as u32,
                    (v[3] * fb_h as f64) as u32,
                )
            } else {
                (v[0] as u32, v[1] as u32, v[2] as u32, v[3] as u32)
            }
        } else {
            let v = parse_tuple(c, 2)?;
            if relative {
                ((v[0] * fb_w as f64) as u32, (v[1] * fb_h as f64) as u32, 1, 1)
            } else {
                (v[0] as u32, v[1] as u32, 1, 1)
            }
        };

        let mut color = [0.0f64; 4];
        let values = if c.trim_start().starts_with('(') {
            parse_tuple(c, n_components as usize)?
        } else {
            let mut values = Vec::new();
            for _ in 0..n_components {
                values.push(parse_f64(c)?);
            }
            values
        };
        color[..n_components as usize].copy_from_slice(&values);
        ensure_end(c)?;

        self.commands.push(Command {
            line: line_no,
            op: Operation::ProbeRect {
                n_components,
                x,
                y,
                w,
                h,
                color,
                tolerance: self.tolerance,
            },
        });
        Ok(())
    }

    fn get_buffer(
        &mut self,
        desc_set: u32,
        binding: u32,
        buffer_type: BufferType,
    ) -> Result<&mut BufferRequirement, ParseErrorKind> {
        if let Some(index) = self
            .buffers
            .iter()
            .position(|b| b.desc_set == desc_set && b.binding == binding)
        {
            if self.buffers[index].buffer_type != buffer_type {
                return Err(ParseErrorKind::BufferBindingTypeMismatch { desc_set, binding });
            }
            return Ok(&mut self.buffers[index]);
        }
        self.buffers.push(BufferRequirement {
            desc_set,
            binding,
            buffer_type,
            size: 0,
        });
        Ok(self.buffers.last_mut().expect("just pushed"))
    }

    fn add_pipeline_key(&mut self, key: PipelineKey) -> usize {
        match self.pipeline_keys.iter().position(|k| *k == key) {
            Some(index) => index,
            None => {
                self.pipeline_keys.push(key);
                self.pipeline_keys.len() - 1
            }
        }
    }
}

fn parse_shader_section(words: &[&str]) -> Option<(Stage, SourceType)> {
    for stage in Stage::ALL {
        let stage_words: Vec<&str> = stage.script_name().split_whitespace().collect();
        if words.len() < stage_words.len() + 1 || words[..stage_words.len()] != stage_words[..] {
            continue;
        }
        let rest = &words[stage_words.len()..];
        return match rest {
            ["shader"] => Some((stage, SourceType::Glsl)),
            ["shader", "spirv"] => Some((stage, SourceType::SpirvAssembly)),
            ["shader", "binary"] => Some((stage, SourceType::SpirvBinary)),
            _ => None,
        };
    }
    None
}

fn invalid_command(line: &str) -> ParseErrorKind {
    ParseErrorKind::InvalidValue(format!("invalid test command: {:?}", line))
}

fn ensure_end(c: &str) -> Result<(), ParseErrorKind> {
    if parse::is_end(c) {
        Ok(())
    } else {
        Err(ParseErrorKind::InvalidValue(format!(
            "trailing text: {:?}",
            c.trim()
        )))
    }
}

fn parse_u32(c: &mut &str) -> Result<u32, ParseErrorKind> {
    parse::parse_u32(c).map_err(|e| ParseErrorKind::InvalidValue(e.to_string()))
}

fn parse_f32(c: &mut &str) -> Result<f32, ParseErrorKind> {
    parse::parse_f32(c).map_err(|e| ParseErrorKind::InvalidValue(e.to_string()))
}

fn parse_f64(c: &mut &str) -> Result<f64, ParseErrorKind> {
    parse::parse_f64(c).map_err(|e| ParseErrorKind::InvalidValue(e.to_string()))
}

fn parse_binding(c: &mut &str) -> Result<(u32, u32), ParseErrorKind> {
    let first = parse_u32(c)?;
    if parse::looking_at(c, ":") {
        Ok((first, parse_u32(c)?))
    } else {
        Ok((0, first))
    }
}

/// Payload of a buffer or push-constant write: `<type> OFFSET values...`
/// with `b64 OFFSET <base64>` accepting raw bytes.
fn parse_payload(c: &mut &str) -> Result<(usize, Vec<u8>), ParseErrorKind> {
    let type_name = parse::next_word(c).ok_or_else(|| {
        ParseErrorKind::InvalidValue("missing value type".to_string())
    })?;
    if type_name == "b64" {
        let offset = parse_u32(c)? as usize;
        let data = Decoder::decode_all(*c)
            .map_err(|e| ParseErrorKind::InvalidValue(e.to_string()))?;
        *c = "";
        return Ok((offset, data));
    }
    let data_type = DataType::from_name(type_name).ok_or_else(|| {
        ParseErrorKind::InvalidValue(format!("unknown type {:?}", type_name))
    })?;
    let offset = parse_u32(c)? as usize;
    let data = data_type
        .parse_values(c)
        .map_err(|e| ParseErrorKind::InvalidValue(e.to_string()))?;
    Ok((offset, data))
}

fn parse_tuple(c: &mut &str, n: usize) -> Result<Vec<f64>, ParseErrorKind> {
    if !parse::looking_at(c, "(") {
        return Err(ParseErrorKind::InvalidValue(
            "expected ( before coordinate list".to_string(),
        ));
    }
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        values.push(parse_f64(c)?);
        if i + 1 < n && !parse::looking_at(c, ",") {
            return Err(ParseErrorKind::InvalidValue(
                "expected , between values".to_string(),
            ));
        }
    }
    if !parse::looking_at(c, ")") {
        return Err(ParseErrorKind::InvalidValue(
            "expected ) after value list".to_string(),
        ));
    }
    Ok(values)
}
