//! Kernel name/variant resolution.
//!
//! The original harness treated kernel binding as six independently
//! resolved roles (init/draw/compute/finalize/...), each looked up by a
//! `"{kernel}_{variant}"` then `"{kernel}"` name. Here only one role needs
//! runtime name resolution — which [`scheduler::Kernel`] object to
//! construct — since the other roles are just trait methods on whatever
//! object gets resolved.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use scheduler::{HarnessError, Kernel};

use crate::life::Life;
use crate::mandel::{Mandelbrot, MandelbrotVec};

type Factory = fn() -> Arc<dyn Kernel>;

static REGISTRY: Lazy<HashMap<&'static str, Factory>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Factory> = HashMap::new();
    m.insert("mandel", || Arc::new(Mandelbrot::new()));
    m.insert("mandel_vec", || Arc::new(MandelbrotVec::new(4)));
    m.insert("life", || Arc::new(Life::new()));
    m
});

/// Resolve a kernel, trying `"{kernel}_{variant}"` before falling back to
/// the bare `kernel` name. `variant` is typically the executor's kernel
/// flavor (e.g. `"vec"` for the vectorized Mandelbrot).
pub fn resolve(kernel: &str, variant: Option<&str>) -> Result<Arc<dyn Kernel>, HarnessError> {
    if let Some(variant) = variant {
        let qualified = format!("{kernel}_{variant}");
        if let Some(factory) = REGISTRY.get(qualified.as_str()) {
            return Ok(factory());
        }
    }
    REGISTRY
        .get(kernel)
        .map(|factory| factory())
        .ok_or_else(|| HarnessError::binding(format!("no kernel registered for '{kernel}'")))
}

pub fn available() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_bare_name() {
        let k = resolve("life", None).unwrap();
        assert_eq!(k.name(), "life");
    }

    #[test]
    fn resolves_qualified_before_bare() {
        let k = resolve("mandel", Some("vec")).unwrap();
        assert_eq!(k.name(), "mandel");
    }

    #[test]
    fn falls_back_to_bare_when_qualified_missing() {
        let k = resolve("life", Some("vec")).unwrap();
        assert_eq!(k.name(), "life");
    }

    #[test]
    fn unknown_kernel_is_a_binding_error() {
        assert!(resolve("nonexistent", None).is_err());
    }
}
