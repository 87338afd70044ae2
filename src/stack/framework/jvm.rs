//! Java/Kotlin frameworks for Maven and Gradle builds

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFESTS: &[&str] = &["pom.xml", "build.gradle", "build.gradle.kts"];

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::SpringBoot, MANIFESTS, 8080, AppType::Backend)
            .with_pattern(DependencyPattern::contains(
                Ecosystem::Maven,
                "org.springframework.boot:",
            )),
        FrameworkSignature::new(FrameworkId::Quarkus, MANIFESTS, 8080, AppType::Backend)
            .with_pattern(DependencyPattern::contains(Ecosystem::Maven, "io.quarkus")),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::Java, MANIFESTS, 8080, AppType::Backend)
}
