//! Elixir frameworks

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFEST: &[&str] = &["mix.exs"];

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::Phoenix, MANIFEST, 4000, AppType::Fullstack)
            .with_pattern(DependencyPattern::exact(Ecosystem::Hex, "phoenix")),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::Elixir, MANIFEST, 4000, AppType::Backend)
}
