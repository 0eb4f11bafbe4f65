// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod dispatch;
pub mod feedback;
pub mod forms;
pub mod ids;
pub mod model;
pub mod query;
pub mod results;
pub mod state;

pub use dispatch::*;
pub use feedback::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use query::*;
pub use results::*;
pub use state::*;
