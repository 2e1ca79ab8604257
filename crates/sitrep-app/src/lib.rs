// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod draft;
pub mod filter;
pub mod ids;
pub mod model;
pub mod overlay;
pub mod selection;
pub mod state;
pub mod store;

pub use draft::*;
pub use filter::*;
pub use ids::*;
pub use model::*;
pub use overlay::*;
pub use selection::*;
pub use state::*;
pub use store::*;
