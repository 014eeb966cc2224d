//! The production optimization set.
//!
//! One value describes every optimization a build applies, and both targets
//! consume the same value. A target never picks optimizations of its own.

use rolldown::{BundlerOptions, RawMinifyOptions};

/// Value injected for `process.env.NODE_ENV` in every artifact.
pub const NODE_ENV: &str = "production";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionOptimizations {
    /// Minify scripts and extracted stylesheets
    pub minify: bool,
    /// Statically replace `process.env.NODE_ENV` with `"production"`
    pub inline_node_env: bool,
    /// Drop stylesheet modules whose output is byte-identical to one already collected
    pub dedupe_stylesheets: bool,
    /// Order extracted stylesheets by chunk execution order instead of load order
    pub stable_ids: bool,
}

impl ProductionOptimizations {
    /// Everything on. This is what both targets use.
    pub const fn full() -> Self {
        Self {
            minify: true,
            inline_node_env: true,
            dedupe_stylesheets: true,
            stable_ids: true,
        }
    }

    /// Apply the script-level optimizations to a Rolldown configuration.
    pub fn apply(&self, options: &mut BundlerOptions) {
        if self.minify {
            options.minify = Some(RawMinifyOptions::from(true));
        }

        if self.inline_node_env {
            options.define = Some(
                [("process.env.NODE_ENV".to_string(), format!("\"{NODE_ENV}\""))]
                    .into_iter()
                    .collect(),
            );
        }
    }
}

impl Default for ProductionOptimizations {
    fn default() -> Self {
        Self::full()
    }
}
