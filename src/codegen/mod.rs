//! Generator tasks that render the metadata graph into text

mod model_generator;
mod naming;
mod seed_generator;

pub use model_generator::{
    generate_models, TimestampsOptions, TimestampsTemplate, CLASS_NAME_KEY,
};
pub use naming::*;
pub use seed_generator::generate_seed;
