//! Ruby frameworks

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFEST: &[&str] = &["Gemfile"];

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::Rails, MANIFEST, 3000, AppType::Fullstack)
            .with_pattern(DependencyPattern::exact(Ecosystem::Rubygems, "rails")),
        FrameworkSignature::new(FrameworkId::Sinatra, MANIFEST, 4567, AppType::Backend)
            .with_pattern(DependencyPattern::exact(Ecosystem::Rubygems, "sinatra")),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::Ruby, MANIFEST, 3000, AppType::Backend)
}
