use scheduler::{ExecutorKind, HarnessError};

use crate::cli::CliOptions;

/// Resolved, validated configuration: CLI options merged with environment
/// fallbacks (`KERNEL`, `OMP_NUM_THREADS`), cross-field validated once
/// before any buffer or worker thread is created.
#[derive(Debug, Clone)]
pub struct Config {
    pub kernel: String,
    pub variant: String,
    pub arg: Option<String>,
    pub dim: usize,
    pub grain: usize,
    pub iterations: Option<u64>,
    pub refresh_rate: u64,
    pub first_touch: bool,
    pub dump: bool,
    pub load_image: Option<String>,
    pub monitoring: bool,
    pub no_display: bool,
    pub ocl: bool,
    pub pause: bool,
    pub debug_flags: String,
    pub threads: usize,
}

const LANE_WIDTH: usize = 4;

impl Config {
    pub fn from_cli(cli: CliOptions) -> Result<Self, HarnessError> {
        let kernel = cli
            .kernel
            .or_else(|| std::env::var("KERNEL").ok())
            .unwrap_or_else(|| "mandel".to_string());

        let threads = match cli.threads {
            Some(t) => t,
            None => match std::env::var("OMP_NUM_THREADS").ok().and_then(|s| s.parse().ok()) {
                Some(t) => t,
                None => core_affinity::get_core_ids().map(|v| v.len()).unwrap_or(1).max(1),
            },
        };

        let config = Config {
            kernel,
            variant: cli.variant,
            arg: cli.arg,
            dim: cli.size,
            grain: cli.grain,
            iterations: cli.iterations,
            refresh_rate: cli.refresh_rate,
            first_touch: cli.first_touch,
            dump: cli.dump,
            load_image: cli.load_image,
            monitoring: cli.monitoring,
            no_display: cli.no_display,
            ocl: cli.ocl,
            pause: cli.pause,
            debug_flags: cli.debug_flags.unwrap_or_default(),
            threads,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), HarnessError> {
        if self.dim == 0 {
            return Err(HarnessError::config("grid size must be nonzero"));
        }
        if self.grain == 0 || self.dim % self.grain != 0 {
            return Err(HarnessError::config(format!(
                "grid size {} is not divisible by grain {}",
                self.dim, self.grain
            )));
        }
        if self.variant == "vec" && (self.dim / self.grain) % LANE_WIDTH != 0 {
            return Err(HarnessError::config(format!(
                "tile side {} is not divisible by SIMD lane width {LANE_WIDTH} required by the vectorized variant",
                self.dim / self.grain
            )));
        }
        if self.ocl {
            return Err(HarnessError::config(
                "the GPU backend (--ocl) is not implemented by this harness",
            ));
        }
        if self.threads == 0 {
            return Err(HarnessError::config("thread count must be nonzero"));
        }
        Ok(())
    }

    /// Map the `--version` token to the executor it selects, and the
    /// kernel-binding variant token used to resolve a kernel implementation.
    pub fn executor_kind(&self) -> Result<ExecutorKind, HarnessError> {
        let kind = match self.variant.as_str() {
            "seq" => ExecutorKind::Sequential,
            "vec" => ExecutorKind::VectorizedSequential,
            "block" => ExecutorKind::BlockThreaded { threads: self.threads },
            "cyclic" => ExecutorKind::CyclicThreaded { threads: self.threads },
            "line" => ExecutorKind::DynamicLine { threads: self.threads },
            "tiled" => ExecutorKind::DynamicTiled { threads: self.threads },
            "parfor" => ExecutorKind::ParallelFor { threads: self.threads },
            "sched" => ExecutorKind::CustomScheduler {
                workers: self.threads,
                first_touch: self.first_touch,
            },
            other => {
                return Err(HarnessError::config(format!(
                    "unknown executor variant '{other}'"
                )))
            }
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> CliOptions {
        CliOptions {
            arg: None,
            debug_flags: None,
            dump: false,
            first_touch: false,
            grain: 8,
            iterations: None,
            kernel: Some("life".to_string()),
            load_image: None,
            monitoring: false,
            no_display: true,
            no_vsync: false,
            ocl: false,
            pause: false,
            refresh_rate: 1,
            size: 64,
            variant: "seq".to_string(),
            threads: Some(4),
        }
    }

    #[test]
    fn rejects_non_dividing_grain() {
        let mut cli = base_cli();
        cli.grain = 7;
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn rejects_ocl() {
        let mut cli = base_cli();
        cli.ocl = true;
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn rejects_vec_variant_with_bad_lane_width() {
        let mut cli = base_cli();
        cli.variant = "vec".to_string();
        cli.size = 66;
        cli.grain = 11;
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn accepts_valid_config_and_maps_executor_kind() {
        let cfg = Config::from_cli(base_cli()).unwrap();
        assert_eq!(cfg.executor_kind().unwrap(), ExecutorKind::Sequential);
    }
}
