//! Rust web frameworks

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFEST: &[&str] = &["Cargo.toml"];

fn krate(name: &str) -> DependencyPattern {
    DependencyPattern::exact(Ecosystem::Cargo, name)
}

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::ActixWeb, MANIFEST, 8080, AppType::Backend)
            .with_pattern(krate("actix-web")),
        FrameworkSignature::new(FrameworkId::Axum, MANIFEST, 3000, AppType::Backend)
            .with_pattern(krate("axum")),
        FrameworkSignature::new(FrameworkId::Rocket, MANIFEST, 8000, AppType::Backend)
            .with_pattern(krate("rocket")),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::Rust, MANIFEST, 8080, AppType::Backend)
}
