// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod model;
pub mod sort;
pub mod table;

pub use model::*;
pub use sort::*;
pub use table::*;
