//! PHP frameworks

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFEST: &[&str] = &["composer.json"];

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::Laravel, MANIFEST, 8000, AppType::Backend)
            .with_pattern(DependencyPattern::exact(Ecosystem::Composer, "laravel/framework")),
        FrameworkSignature::new(FrameworkId::Symfony, MANIFEST, 8000, AppType::Backend)
            .with_pattern(DependencyPattern::exact(
                Ecosystem::Composer,
                "symfony/framework-bundle",
            )),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::Php, MANIFEST, 8000, AppType::Backend)
}
