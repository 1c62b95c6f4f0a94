//! Lazily-initialized condensation engine handles.
//!
//! Building an engine can be costly (HTTP client, tokenizer tables), so it is
//! deferred until the first text actually needs condensing. Runs that end in
//! a status message never build one.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::condenser::{Condenser, CondenserError, LengthBudget};

type InitFn = Box<dyn Fn() -> Result<Arc<dyn Condenser>, CondenserError> + Send + Sync>;

static SHARED: OnceLock<Arc<dyn Condenser>> = OnceLock::new();

/// Process-wide condenser, built by `init` on the first call only.
///
/// Later calls return the same handle and ignore their `init`.
pub fn shared_condenser<F>(init: F) -> Arc<dyn Condenser>
where
    F: FnOnce() -> Arc<dyn Condenser>,
{
    SHARED
        .get_or_init(|| {
            info!("Initializing shared condensation engine");
            init()
        })
        .clone()
}

/// Condenser that builds its inner engine on first use.
///
/// A failed build is reported as the condense error and retried on the next
/// call; a successful one is kept for the life of the handle.
pub struct LazyCondenser {
    name: String,
    init: InitFn,
    inner: OnceCell<Arc<dyn Condenser>>,
}

impl LazyCondenser {
    pub fn new<F>(name: impl Into<String>, init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Condenser>, CondenserError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            init: Box::new(init),
            inner: OnceCell::new(),
        }
    }

    /// Whether the inner engine has been built yet.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized()
    }

    async fn engine(&self) -> Result<&Arc<dyn Condenser>, CondenserError> {
        self.inner
            .get_or_try_init(|| async {
                debug!(engine = %self.name, "Building condensation engine");
                (self.init)()
            })
            .await
    }
}

#[async_trait]
impl Condenser for LazyCondenser {
    async fn condense(&self, text: &str, budget: LengthBudget) -> Result<String, CondenserError> {
        self.engine().await?.condense(text, budget).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
