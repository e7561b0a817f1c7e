//! Headless driver loop. This harness never implements a windowing
//! backend, so it always runs the collapsed "non-graphical version" of
//! the original driver: advance `refresh_rate` iterations at a time until
//! either the kernel reports stabilization or `max_iter` is reached.

use std::sync::Arc;

use anyhow::{Context, Result};
use scheduler::{Executor, Kernel};

use crate::config::Config;
use crate::image_io;

pub struct RunReport {
    pub iterations: u64,
    pub stabilized_at: Option<u64>,
    pub pixels: Vec<u32>,
}

pub fn run(config: &Config) -> Result<RunReport> {
    if !config.no_display {
        log::warn!(
            "no windowing backend is implemented by this harness; running headless regardless of --no-display"
        );
    }
    if config.monitoring {
        log::warn!("thread-activity monitoring overlay has no effect without a display backend");
    }
    if config.pause {
        log::warn!("--pause has no effect in headless mode");
    }

    let executor_kind = config.executor_kind()?;
    let mut kernel: Arc<dyn Kernel> =
        kernels::resolve(&config.kernel, Some(executor_kind.variant_name()))
            .with_context(|| format!("binding kernel '{}'", config.kernel))?;

    log::info!(
        "using kernel [{}], variant [{}]",
        config.kernel,
        executor_kind.variant_name()
    );

    // `kernel` must stay at refcount 1 for these `Arc::get_mut` calls, so
    // seed the initial image into a standalone buffer before handing a
    // clone of the kernel to the executor.
    let kernel_mut = Arc::get_mut(&mut kernel).expect("sole owner before executor construction");
    kernel_mut.init(config.dim);

    let mut seed = vec![0u32; config.dim * config.dim];
    if let Some(path) = &config.load_image {
        seed = image_io::load_png(path, config.dim)?;
    } else {
        kernel_mut.draw(&mut seed, config.dim, config.arg.as_deref());
    }

    let mut executor = Executor::new(kernel.clone(), config.dim, config.grain, executor_kind)
        .context("constructing executor")?;
    executor.grid_mut().current_mut().copy_from_slice(&seed);

    let refresh_rate = if config.iterations.is_some() {
        config.iterations.unwrap()
    } else {
        config.refresh_rate
    };

    let mut iterations = 0u64;
    let mut stabilized_at = None;

    loop {
        if let Some(max_iter) = config.iterations {
            if iterations >= max_iter {
                log::info!("stopping after {iterations} iterations");
                break;
            }
        }

        match executor.run(refresh_rate) {
            Some(n) => {
                iterations += n;
                stabilized_at = Some(iterations);
                log::info!("computation stabilized after {iterations} iterations");
                break;
            }
            None => iterations += refresh_rate,
        }
    }

    let pixels = executor.grid().current().to_vec();

    if config.dump {
        let filename = format!(
            "dump-{}-{}-dim-{}-iter-{}.png",
            config.kernel,
            executor_kind.variant_name(),
            config.dim,
            iterations
        );
        image_io::dump_png(&filename, &pixels, config.dim)?;
        log::info!("dumped final image to {filename}");
    }

    Ok(RunReport {
        iterations,
        stabilized_at,
        pixels,
    })
}
