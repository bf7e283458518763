use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use toonletter::{SessionController, SessionEvent};

#[derive(Parser, Debug)]
#[command(name = "toonletter", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a file and print its document summary.
    Inspect(InspectArgs),
    /// Letter a file from a script and write the re-encoded container.
    Letter(LetterArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input file (.lyr, .lyrb, .png, .jpg).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Viewport width used for balloon seeding.
    #[arg(long, default_value_t = 800.0)]
    viewport_width: f64,
}

#[derive(Parser, Debug)]
struct LetterArgs {
    /// Input file (.lyr, .lyrb, .png, .jpg).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Script file: one line of balloon text per detected dialogue anchor.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Output path; the extension is chosen by the input's container variant.
    #[arg(long)]
    out: PathBuf,

    /// Viewport width used for balloon seeding and export scaling.
    #[arg(long, default_value_t = 800.0)]
    viewport_width: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Letter(args) => cmd_letter(args),
    }
}

/// Poll the controller until `done` reports true, failing on session errors.
fn pump_until(
    controller: &mut SessionController,
    mut done: impl FnMut(&SessionController, &SessionEvent) -> bool,
) -> anyhow::Result<()> {
    loop {
        let events = controller.pump();
        for event in &events {
            if let SessionEvent::Failed(reason) = event {
                anyhow::bail!("background work failed: {reason}");
            }
            if done(controller, event) {
                return Ok(());
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn open(args_in: &PathBuf, viewport_width: f64) -> anyhow::Result<SessionController> {
    let bytes = std::fs::read(args_in)
        .with_context(|| format!("read input '{}'", args_in.display()))?;
    let name = args_in
        .file_name()
        .and_then(|n| n.to_str())
        .context("input path has no file name")?;

    let mut controller = SessionController::new(viewport_width);
    controller.open_file(name, bytes)?;
    pump_until(&mut controller, |_, event| {
        matches!(event, SessionEvent::DialogueSeeded { .. })
    })?;
    Ok(controller)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let controller = open(&args.in_path, args.viewport_width)?;

    let composite = controller.composite().context("no composite decoded")?;
    println!(
        "{}: {}x{} px",
        controller.file_name().unwrap_or("?"),
        composite.width,
        composite.height
    );
    println!("balloons seeded from dialogue: {}", controller.boxes().len());
    for b in controller.boxes() {
        println!(
            "  [{}] ({:.0},{:.0}) {:.0}x{:.0} {:?}",
            b.id.0, b.left, b.top, b.width, b.height, b.text
        );
    }
    Ok(())
}

fn cmd_letter(args: LetterArgs) -> anyhow::Result<()> {
    let mut controller = open(&args.in_path, args.viewport_width)?;

    if let Some(script) = &args.script {
        let text = std::fs::read_to_string(script)
            .with_context(|| format!("read script '{}'", script.display()))?;
        let ids: Vec<_> = controller.boxes().iter().map(|b| b.id).collect();
        for (id, line) in ids.into_iter().zip(text.lines()) {
            controller.set_text(id, line);
        }
    }

    let stem = args
        .out
        .file_stem()
        .and_then(|s| s.to_str())
        .context("output path has no file stem")?
        .to_string();
    controller.request_export(&stem)?;
    pump_until(&mut controller, |_, event| {
        matches!(event, SessionEvent::DownloadReady(_))
    })?;

    let artifact = controller.download().context("export produced no artifact")?;
    let out = args.out.with_file_name(&artifact.file_name);
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &artifact.bytes)
        .with_context(|| format!("write output '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}
