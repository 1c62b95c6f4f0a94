//! # research-summarizer
//!
//! Condensation engines and the summary dispatcher.
//!
//! ## Modules
//!
//! - [`condenser`]: the `Condenser` trait plus API, extractive and mock engines
//! - [`engine`]: lazily-built and process-wide engine handles
//! - [`dispatcher`]: picks truncation or condensation per retrieval method

pub mod condenser;
pub mod dispatcher;
pub mod engine;

pub use condenser::{
    count_tokens, ApiCondenser, ApiCondenserConfig, Condenser, CondenserError,
    ExtractiveCondenser, LengthBudget, MockCondenser,
};
pub use dispatcher::{BudgetMode, SummaryConfig, SummaryDispatcher, NOT_ENOUGH_DATA};
pub use engine::{shared_condenser, LazyCondenser};
