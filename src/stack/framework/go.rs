//! Go frameworks

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFEST: &[&str] = &["go.mod"];

// Module paths carry a major-version suffix (`/v4`), hence prefix matching
fn module(path: &str) -> DependencyPattern {
    DependencyPattern::prefix(Ecosystem::Go, path)
}

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::Gin, MANIFEST, 8080, AppType::Backend)
            .with_pattern(module("github.com/gin-gonic/gin")),
        FrameworkSignature::new(FrameworkId::Echo, MANIFEST, 8080, AppType::Backend)
            .with_pattern(module("github.com/labstack/echo")),
        FrameworkSignature::new(FrameworkId::Fiber, MANIFEST, 3000, AppType::Backend)
            .with_pattern(module("github.com/gofiber/fiber")),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::Go, MANIFEST, 8080, AppType::Backend)
}
