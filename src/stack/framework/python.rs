//! Python frameworks

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFESTS: &[&str] = &["requirements.txt", "pyproject.toml", "Pipfile"];

fn pypi(name: &str) -> DependencyPattern {
    DependencyPattern::exact(Ecosystem::Pypi, name)
}

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::Django, MANIFESTS, 8000, AppType::Backend)
            .with_pattern(pypi("django")),
        FrameworkSignature::new(FrameworkId::FastApi, MANIFESTS, 8000, AppType::Backend)
            .with_pattern(pypi("fastapi")),
        FrameworkSignature::new(FrameworkId::Flask, MANIFESTS, 5000, AppType::Backend)
            .with_pattern(pypi("flask")),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::Python, MANIFESTS, 8000, AppType::Backend)
}
