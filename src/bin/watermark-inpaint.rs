use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use watermark_inpaint::{
    default_output_path, InpaintEngine, MaskSource, ProcessOptions, ProcessResult, Quality,
    Region, DEFAULT_REGION_PADDING,
};

#[derive(Parser)]
#[command(
    name = "watermark-inpaint",
    about = "Erase watermarks, logos and overlays by content-aware inpainting",
    version,
    after_help = "Simple usage: watermark-inpaint <image> --region x,y,w,h\n\n\
                  A directory input is treated as a sequence of frames: the same mask\n\
                  is filled in every supported image and written to --output."
)]
struct Cli {
    /// Input image file or directory of frames
    input: String,

    /// Output file or directory (default: {name}_inpainted.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// Mask image: translucent overlay (alpha > 30) or black/white (white = fill)
    #[arg(short, long, conflicts_with = "region")]
    mask: Option<PathBuf>,

    /// Rectangle to fill, as x,y,w,h
    #[arg(short, long)]
    region: Option<Region>,

    /// Pixels added around --region on every side
    #[arg(long, default_value_t = DEFAULT_REGION_PADDING)]
    padding: u32,

    /// Fill quality preset
    #[arg(short = 'Q', long, value_enum, default_value_t = QualityArg::Quality)]
    quality: QualityArg,

    /// Override the preset's propagation pass cap
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    /// Plain distance-weighted fill, 4 passes
    PlainFast,
    /// Plain distance-weighted fill, 8 passes
    Plain,
    /// Content-aware fill with fewer passes
    Fast,
    /// Content-aware fill, edge-biased with seam blending
    Quality,
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::PlainFast => Quality::PlainFast,
            QualityArg::Plain => Quality::PlainStandard,
            QualityArg::Fast => Quality::ContentAwareFast,
            QualityArg::Quality => Quality::ContentAwareQuality,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut params = Quality::from(cli.quality).params();
    if let Some(n) = cli.iterations {
        params = params.with_iterations(n);
    }
    let opts = ProcessOptions {
        padding: cli.padding,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let mask_source = match (&cli.mask, cli.region) {
        (Some(path), _) => match MaskSource::from_file(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Error: Failed to load mask {}: {e}", path.display());
                process::exit(1);
            }
        },
        (None, Some(region)) => MaskSource::Region(region),
        (None, None) => {
            eprintln!("Error: Either --mask or --region is required");
            process::exit(1);
        }
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let engine = InpaintEngine::new(params);

    if !opts.quiet {
        let params = engine.params();
        eprintln!(
            "{:?} fill, up to {} passes",
            params.strategy, params.max_iterations
        );
        eprintln!();
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: watermark-inpaint <input_dir> --region x,y,w,h -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &mask_source, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![engine.process_file(input_path, &mask_source, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !opts.quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !opts.quiet {
            eprintln!("[OK] {filename} ({} px)", result.filled);
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
