use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use socialgen::{
    AppConfig, EnvCredentials, ExportFormat, GenerateOutcome, ImageRef, Platform, Resolution,
    SessionController, SessionState, Style, WatermarkOutcome, WatermarkSettings,
};

#[derive(Parser, Debug)]
#[command(name = "socialgen", version)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark an existing image (URL, path, or data URL).
    Watermark(WatermarkArgs),
    /// Generate posts with Gemini, watermark them, and save them.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// Watermark text; defaults to the configured text.
    #[arg(long)]
    text: Option<String>,

    /// Watermark opacity in [0, 1].
    #[arg(long)]
    opacity: Option<f32>,

    /// Skip the watermark overlay.
    #[arg(long, default_value_t = false)]
    hidden: bool,

    /// Output format.
    #[arg(long, default_value = "png")]
    format: ExportFormat,
}

#[derive(Args, Debug)]
struct WatermarkArgs {
    /// Source image.
    #[arg(long = "in")]
    input: String,

    /// Output file.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    overlay: OverlayArgs,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// What the images should show.
    #[arg(long)]
    prompt: String,

    /// Aspect ratio: 1:1, 9:16, 4:3 or 16:9.
    #[arg(long)]
    platform: Option<Platform>,

    /// 1K, 2K or 4K.
    #[arg(long)]
    resolution: Option<Resolution>,

    /// Preset key or label, or free text.
    #[arg(long)]
    style: Option<Style>,

    /// Number of images (1-4).
    #[arg(long)]
    count: Option<u32>,

    /// Directory for the downloaded images.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[command(flatten)]
    overlay: OverlayArgs,
}

impl OverlayArgs {
    fn apply(&self, base: &WatermarkSettings) -> anyhow::Result<WatermarkSettings> {
        let settings = WatermarkSettings::new(
            self.text.clone().unwrap_or_else(|| base.text.clone()),
            self.opacity.unwrap_or(base.opacity),
            base.visible && !self.hidden,
        )?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socialgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).with_context(|| "load configuration")?;
    match cli.cmd {
        Command::Watermark(args) => cmd_watermark(&config, args).await,
        Command::Generate(args) => cmd_generate(&config, args).await,
    }
}

async fn cmd_watermark(config: &AppConfig, args: WatermarkArgs) -> anyhow::Result<()> {
    let overlay = args.overlay.apply(&config.defaults.watermark)?;
    let compositor = config.compositor(reqwest::Client::new())?;
    let source = ImageRef::parse(&args.input)?;

    let composite = compositor
        .composite(&source, &overlay)
        .await
        .with_context(|| format!("watermark '{}'", args.input))?;
    let encoded = socialgen::export_image(
        compositor.loader().as_ref(),
        &composite.to_image_ref(),
        args.overlay.format,
    )
    .await?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &encoded.bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_generate(config: &AppConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let http = reqwest::Client::new();
    let credentials = Arc::new(EnvCredentials::default());
    let gemini = Arc::new(config.gemini_client(http.clone(), credentials.clone()));

    let mut settings = config.defaults.clone();
    settings.watermark = args.overlay.apply(&settings.watermark)?;
    let mut ctl = SessionController::new(
        SessionState::new(settings)?,
        gemini.clone(),
        gemini,
        credentials,
        config.compositor(http)?,
    );
    if let Some(p) = args.platform {
        ctl.set_platform(p);
    }
    if let Some(r) = args.resolution {
        ctl.set_resolution(r);
    }
    if let Some(s) = args.style {
        ctl.set_style(s);
    }
    if let Some(n) = args.count {
        ctl.set_count(n)?;
    }
    ctl.set_prompt(args.prompt);

    ctl.initialize().await;
    if !ctl.state().api_key_selected() {
        ctl.open_key_selector().await?;
    }

    match ctl.generate().await {
        GenerateOutcome::Generated { posts } => {
            eprintln!("{} ({posts} posts)", ctl.state().status_message());
        }
        GenerateOutcome::Blocked(reason) => anyhow::bail!("generation blocked: {reason:?}"),
        GenerateOutcome::CredentialRejected => {
            anyhow::bail!("the API key was rejected; set GEMINI_API_KEY to a valid key")
        }
        GenerateOutcome::Failed { message } => anyhow::bail!("{message}"),
    }

    for outcome in ctl.settle().await {
        if let WatermarkOutcome::Failed { post, error, .. } = outcome {
            tracing::warn!(%post, %error, "watermark not applied; saving the original image");
        }
    }

    save_posts(&ctl, args.overlay.format, &args.out_dir).await
}

async fn save_posts(
    ctl: &SessionController,
    format: ExportFormat,
    dir: &Path,
) -> anyhow::Result<()> {
    for post in ctl.state().posts() {
        let path = ctl
            .download(&post.id, format, dir)
            .await
            .with_context(|| format!("save post {}", post.id))?;
        println!("{}\t{}", post.id, path.display());
        println!("{}", post.caption);
        println!();
    }
    Ok(())
}
