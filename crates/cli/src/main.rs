#![deny(unsafe_code)]
//! CLI for the glesbed offscreen GLES test context.
//!
//! Subcommands:
//! - `probe` -- attempt to create the offscreen context and report what
//!   the machine can do (always exits 0; the report carries the outcome)
//! - `snapshot` -- create the context, clear the pbuffer through the
//!   reactor, and write the result as a PNG

mod error;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use error::CliError;
use glesbed_core::api::{ConfigRequest, EglApi};
use glesbed_core::reactor::{ReactOutcome, ReactorContext};
use glesbed_core::scheduler::TaskLoop;
use glesbed_core::surface::{FboInfo, FrameInfo, FramebufferInfo, GlSurfaceDelegate};
use glesbed_offscreen::snapshot;
use glesbed_offscreen::{try_create, CreateError, FactoryOptions, SystemEgl, TestContext};

#[derive(Parser)]
#[command(name = "glesbed", about = "Offscreen GLES test context probe")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Attempt to create the offscreen context and report the result.
    Probe {
        /// Also write the JSON report to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Create the context, clear the pbuffer, and write a PNG snapshot.
    Snapshot {
        /// Output file path.
        #[arg(short, long, default_value = "snapshot.png")]
        output: PathBuf,

        /// Clear color as R,G,B,A floats in [0, 1].
        #[arg(long, default_value = "0,0,0,1")]
        clear: String,
    },
}

/// What a successful probe learned about the context.
struct ProbeInfo {
    config: ConfigRequest,
    framebuffer: FramebufferInfo,
    fbo: FboInfo,
    shaders: Vec<String>,
    resolved_procs: usize,
}

fn gather_probe_info(context: &TestContext) -> ProbeInfo {
    let delegate = context.delegate();
    let backend = context.backend_context();
    ProbeInfo {
        config: ConfigRequest::es2_pbuffer(),
        framebuffer: delegate.framebuffer_info(),
        fbo: delegate.fbo_info(FrameInfo {
            width: 1,
            height: 1,
        }),
        shaders: backend
            .shader_blobs()
            .iter()
            .map(|blob| blob.name.to_string())
            .collect(),
        resolved_procs: backend.proc_table().len(),
    }
}

fn report_value(outcome: &Result<ProbeInfo, CreateError>) -> Result<serde_json::Value, CliError> {
    Ok(match outcome {
        Ok(info) => serde_json::json!({
            "created": true,
            "config": serde_json::to_value(info.config)?,
            "framebuffer": serde_json::to_value(info.framebuffer)?,
            "fbo": serde_json::to_value(info.fbo)?,
            "shaders": info.shaders,
            "resolved_procs": info.resolved_procs,
        }),
        Err(e) => serde_json::json!({
            "created": false,
            "error": e.to_string(),
        }),
    })
}

fn write_report(path: &Path, value: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)
        .map_err(|e| CliError::Io(format!("could not write {}: {e}", path.display())))
}

fn run_probe(json: bool, out: Option<PathBuf>) -> Result<(), CliError> {
    let scheduler = Rc::new(TaskLoop::new());
    let outcome = SystemEgl::load()
        .and_then(|api| try_create(FactoryOptions::new(api, scheduler)))
        .map(|context| gather_probe_info(&context));

    let value = report_value(&outcome)?;
    if let Some(path) = out.as_deref() {
        write_report(path, &value)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        match &outcome {
            Ok(info) => {
                println!("offscreen context created");
                println!(
                    "  readback supported: {}",
                    info.framebuffer.supports_readback
                );
                println!("  default framebuffer id: {}", info.fbo.id);
                println!("  shader blobs: {}", info.shaders.join(", "));
                println!("  resolved GL entry points: {}", info.resolved_procs);
            }
            Err(e) => println!("offscreen context unavailable: {e}"),
        }
    }

    Ok(())
}

fn parse_clear(text: &str) -> Result<[f32; 4], CliError> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 4 {
        return Err(CliError::Input(format!("expected R,G,B,A, got '{text}'")));
    }
    let mut rgba = [0.0f32; 4];
    for (slot, part) in rgba.iter_mut().zip(&parts) {
        let value: f32 = part
            .trim()
            .parse()
            .map_err(|_| CliError::Input(format!("invalid color component '{part}'")))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(CliError::Input(format!(
                "color component {value} outside [0, 1]"
            )));
        }
        *slot = value;
    }
    Ok(rgba)
}

fn write_snapshot(
    backend: &Rc<ReactorContext>,
    api: &dyn EglApi,
    rgba: [f32; 4],
    output: &Path,
) -> Result<(), CliError> {
    // Submitting makes the reactor's worker bind the context for the rest
    // of this task; the worker releases it when the task finishes.
    let gl = snapshot::load_gl(api);
    let outcome = backend
        .submit(Box::new(move |_| snapshot::clear(&gl, rgba)))
        .map_err(|e| CliError::Create(CreateError::from(e)))?;
    if outcome != ReactOutcome::Reacted {
        return Err(CliError::Create(CreateError::MakeCurrent));
    }

    // The context is still current within this task; read the result back.
    let gl = snapshot::load_gl(api);
    snapshot::write_png(&gl, 1, 1, output)?;
    Ok(())
}

fn run_snapshot(json: bool, output: PathBuf, clear: &str) -> Result<(), CliError> {
    let rgba = parse_clear(clear)?;
    let scheduler = Rc::new(TaskLoop::new());
    let api = SystemEgl::load()?;
    let context = try_create(FactoryOptions::new(api.clone(), scheduler.clone()))?;
    let backend = context.backend_context();

    let mut result: Option<Result<(), CliError>> = None;
    scheduler.run_task(|| {
        result = Some(write_snapshot(&backend, api.as_ref(), rgba, &output));
    });
    result.unwrap_or_else(|| Err(CliError::Io("snapshot task did not run".into())))?;

    if json {
        let value = serde_json::json!({
            "output": output.display().to_string(),
            "clear": rgba,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        eprintln!("wrote {}", output.display());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Probe { out } => run_probe(cli.json, out),
        Command::Snapshot { output, clear } => run_snapshot(cli.json, output, &clear),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> ProbeInfo {
        ProbeInfo {
            config: ConfigRequest::es2_pbuffer(),
            framebuffer: FramebufferInfo {
                supports_readback: true,
                supports_partial_repaint: false,
            },
            fbo: FboInfo {
                id: 0,
                multisampled: false,
            },
            shaders: vec!["blit_vertex".into(), "blit_fragment".into()],
            resolved_procs: 12,
        }
    }

    #[test]
    fn report_for_a_created_context_carries_capabilities() {
        let value = report_value(&Ok(sample_info())).unwrap();
        assert_eq!(value["created"], true);
        assert_eq!(value["framebuffer"]["supports_readback"], true);
        assert_eq!(value["fbo"]["id"], 0);
        assert_eq!(value["config"]["depth_bits"], 24);
        assert_eq!(value["resolved_procs"], 12);
    }

    #[test]
    fn report_for_a_failed_probe_carries_the_error() {
        let value = report_value(&Err(CreateError::NoMatchingConfig)).unwrap();
        assert_eq!(value["created"], false);
        assert!(value["error"].as_str().unwrap().contains("config"));
    }

    #[test]
    fn write_report_produces_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.json");
        let value = report_value(&Ok(sample_info())).unwrap();

        write_report(&path, &value).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let reread: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reread["created"], true);
    }

    #[test]
    fn parse_clear_accepts_four_components() {
        assert_eq!(parse_clear("0,0,0,1").unwrap(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            parse_clear("0.25, 0.5, 0.75, 1").unwrap(),
            [0.25, 0.5, 0.75, 1.0]
        );
    }

    #[test]
    fn parse_clear_rejects_bad_input() {
        assert!(parse_clear("1,2").is_err());
        assert!(parse_clear("a,b,c,d").is_err());
        assert!(parse_clear("0,0,0,1.5").is_err());
    }

    #[test]
    fn cli_arguments_parse() {
        let cli = Cli::try_parse_from(["glesbed", "--json", "probe"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Probe { out: None }));

        let cli =
            Cli::try_parse_from(["glesbed", "snapshot", "--output", "x.png", "--clear", "1,0,0,1"])
                .unwrap();
        match cli.command {
            Command::Snapshot { output, clear } => {
                assert_eq!(output, PathBuf::from("x.png"));
                assert_eq!(clear, "1,0,0,1");
            }
            _ => panic!("expected snapshot subcommand"),
        }
    }
}
