use clap::Parser;

/// Parallel stencil compute harness: run a pluggable kernel over a tiled
/// grid using one of several executor strategies.
#[derive(Parser, Debug, Clone)]
#[command(name = "harness", version)]
pub struct CliOptions {
    /// Payload passed to the kernel's draw hook
    #[arg(short, long)]
    pub arg: Option<String>,

    /// Enable one-letter debug channels (e.g. "cs" for compute+scheduler)
    #[arg(short, long, value_name = "FLAGS")]
    pub debug_flags: Option<String>,

    /// Write the final image as PNG when the run finishes
    #[arg(long = "dump", visible_short_alias = 'u')]
    pub dump: bool,

    /// Enable first-touch warm-up (requires kernel support)
    #[arg(long = "first-touch", visible_alias = "ft")]
    pub first_touch: bool,

    /// Use G x G tiles
    #[arg(short, long, default_value_t = 8)]
    pub grain: usize,

    /// Stop after N iterations
    #[arg(short = 'i', long = "iterations")]
    pub iterations: Option<u64>,

    /// Select kernel (overrides KERNEL env var)
    #[arg(short, long)]
    pub kernel: Option<String>,

    /// Seed the grid from a PNG file instead of the kernel's draw hook
    #[arg(short = 'l', long = "load-image", value_name = "PATH")]
    pub load_image: Option<String>,

    /// Enable the thread-activity monitoring overlay
    #[arg(short, long)]
    pub monitoring: bool,

    /// Run headless (no windowing backend is implemented by this harness;
    /// this flag is accepted for interface fidelity and a warning is
    /// logged when it is not given)
    #[arg(short, long = "no-display")]
    pub no_display: bool,

    /// Disable vsync (accepted for interface fidelity; has no effect
    /// without a display backend)
    #[arg(long = "no-vsync", visible_alias = "nvs")]
    pub no_vsync: bool,

    /// Use the GPU backend (not implemented by this harness)
    #[arg(short = 'o', long = "ocl")]
    pub ocl: bool,

    /// Pause between iterations (not meaningful in headless mode)
    #[arg(short, long)]
    pub pause: bool,

    /// Show only 1/Nth of images (headless runs ignore this; retained for
    /// interface fidelity with the graphical driver loop)
    #[arg(short, long = "refresh-rate", default_value_t = 1)]
    pub refresh_rate: u64,

    /// Square grid side
    #[arg(short, long, default_value_t = 512)]
    pub size: usize,

    /// Select the executor/kernel variant
    #[arg(short = 'v', long = "version", default_value = "seq")]
    pub variant: String,

    /// Number of worker threads (overrides OMP_NUM_THREADS env var and the
    /// detected core count)
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,
}
