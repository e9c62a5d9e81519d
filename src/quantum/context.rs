//! Shared numeric context
//!
//! Every backing representation is created against a [`NumericContext`].
//! One process-wide context is created lazily on first use and lives until
//! the process exits; callers that want different tolerances can either
//! install their own global before first use or inject a private context.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::ContextConfig;

static GLOBAL_CONTEXT: OnceLock<Arc<NumericContext>> = OnceLock::new();
static NEXT_CONTEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Work context handed to every attached state.
#[derive(Debug)]
pub struct NumericContext {
    id: usize,
    config: ContextConfig,
}

impl NumericContext {
    /// Create a private context, independent of the global one.
    pub fn new(config: ContextConfig) -> Arc<Self> {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!(context = id, ?config, "created numeric context");
        Arc::new(NumericContext { id, config })
    }

    /// The process-wide context, created with the default config on first call.
    pub fn global() -> Arc<Self> {
        GLOBAL_CONTEXT
            .get_or_init(|| NumericContext::new(ContextConfig::default()))
            .clone()
    }

    /// Install the process-wide context with `config`.
    ///
    /// Returns `Err` carrying the existing context if one was already created.
    pub fn init_global(config: ContextConfig) -> Result<Arc<Self>, Arc<Self>> {
        let mut created = false;
        let context = GLOBAL_CONTEXT.get_or_init(|| {
            created = true;
            NumericContext::new(config)
        });

        if created {
            Ok(context.clone())
        } else {
            Err(context.clone())
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }
}
