pub mod data;
pub mod engine;
pub mod features;
pub mod guide;
pub mod ml;
pub mod parser;
pub mod system;

pub use data::{Sentence, Token};
pub use engine::{Config, ExecutionOptions, ParseStats, ParserEngine};
pub use features::{AggregateGenerator, FeatureGenerator, TemplateError};
pub use guide::{Guide, HashingGuide};
pub use ml::{LinearModel, RankingModel, SparseVector};
pub use parser::{GreedyParser, Parse};
pub use system::{
    transition_system, Configuration, DependencyArc, DependencySet, LabelNumberer, ParserError,
    Transition, TransitionSystem,
};
