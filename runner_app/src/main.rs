//! Command-line checker for shader test scripts
//!
//! Parses each script, optionally runs the shader toolchain over its
//! stages, and prints one `pass` / `fail` line per file. Device bring-up
//! and command execution belong to the embedding runtime, so this binary
//! validates the declarative surface only.

use std::process::ExitCode;

use vkscript::prelude::*;

const USAGE: &str = "usage: vkscript-check [OPTIONS] SCRIPT...\n\
                     \n\
                     options:\n  \
                     -c FILE         load runner configuration (.toml or .ron)\n  \
                     -D TOK=REPL     replace TOK with REPL while reading scripts\n  \
                     -s              compile shader stages with the SPIR-V toolchain\n  \
                     -d              dump disassembly of every compiled stage (implies -s)\n";

struct Options {
    config: RunnerConfig,
    compile: bool,
    dump: bool,
    replacements: Vec<(String, String)>,
    scripts: Vec<String>,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        config: RunnerConfig::default(),
        compile: false,
        dump: false,
        replacements: Vec::new(),
        scripts: Vec::new(),
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" => {
                let path = args.next().ok_or("-c needs a file argument")?;
                options.config = RunnerConfig::load_from_file(&path)
                    .map_err(|e| format!("{}: {}", path, e))?;
            }
            "-D" => {
                let pair = args.next().ok_or("-D needs TOK=REPL")?;
                let (token, replacement) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("-D argument {:?} has no =", pair))?;
                options
                    .replacements
                    .push((token.to_string(), replacement.to_string()));
            }
            "-s" => options.compile = true,
            "-d" => {
                options.compile = true;
                options.dump = true;
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with('-') => {
                return Err(format!("unknown option {:?}\n{}", other, USAGE));
            }
            script => options.scripts.push(script.to_string()),
        }
    }
    if options.scripts.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(options)
}

fn run_script(path: &str, options: &Options) -> TestResult {
    let mut stream = match LineStream::from_file(path) {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("{}: {}", path, e);
            return TestResult::Fail;
        }
    };
    for (token, replacement) in &options.replacements {
        stream.add_replacement(token.clone(), replacement.clone());
    }

    // the parser logs its own file:line diagnostic on failure
    let script = match parse_stream(path.to_string(), stream) {
        Ok(script) => script,
        Err(_) => return TestResult::Fail,
    };
    log::info!(
        "{}: {} commands, {} pipeline keys, {} buffers",
        path,
        script.commands.len(),
        script.pipeline_keys.len(),
        script.buffers.len()
    );

    if !options.compile {
        return TestResult::Pass;
    }
    let toolchain = Toolchain::from_config(&options.config);
    for stage in Stage::ALL {
        let code = script.stage_code(stage);
        if code.is_empty() {
            continue;
        }
        let words = match toolchain.compile_stage(stage, code) {
            Ok(words) => words,
            Err(e) => {
                log::error!("{}: {} stage: {}", path, stage.script_name(), e);
                return TestResult::Fail;
            }
        };
        if options.dump || options.config.dump_disassembly {
            match toolchain.disassemble(&words) {
                Ok(text) => {
                    println!("; {} {} stage", path, stage.script_name());
                    println!("{}", text);
                }
                Err(e) => {
                    log::error!("{}: {} stage: {}", path, stage.script_name(), e);
                    return TestResult::Fail;
                }
            }
        }
    }
    TestResult::Pass
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    let mut overall = TestResult::Pass;
    for path in &options.scripts {
        let result = run_script(path, &options);
        println!("{}: {}", path, result);
        overall = overall.merge(result);
    }
    if options.scripts.len() > 1 {
        println!("overall: {}", overall);
    }
    match overall {
        TestResult::Fail => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
