//! Node.js frameworks

use super::{DependencyPattern, FrameworkSignature};
use crate::detection::types::{AppType, Ecosystem};
use crate::stack::FrameworkId;

const MANIFEST: &[&str] = &["package.json"];

fn npm(name: &str) -> DependencyPattern {
    DependencyPattern::exact(Ecosystem::Npm, name)
}

pub fn frameworks() -> Vec<FrameworkSignature> {
    vec![
        FrameworkSignature::new(FrameworkId::NextJs, MANIFEST, 3000, AppType::Fullstack)
            .with_pattern(npm("next"))
            .with_build("npm run build"),
        FrameworkSignature::new(FrameworkId::Nuxt, MANIFEST, 3000, AppType::Fullstack)
            .with_pattern(npm("nuxt"))
            .with_pattern(npm("nuxt3"))
            .with_build("npm run build"),
        FrameworkSignature::new(FrameworkId::Remix, MANIFEST, 3000, AppType::Fullstack)
            .with_pattern(DependencyPattern::prefix(Ecosystem::Npm, "@remix-run/"))
            .with_build("npm run build"),
        FrameworkSignature::new(FrameworkId::SvelteKit, MANIFEST, 3000, AppType::Fullstack)
            .with_pattern(npm("@sveltejs/kit"))
            .with_build("npm run build"),
        FrameworkSignature::new(FrameworkId::Astro, MANIFEST, 4321, AppType::Frontend)
            .with_pattern(npm("astro"))
            .with_build("npm run build")
            .with_static_output("dist"),
        FrameworkSignature::new(FrameworkId::Gatsby, MANIFEST, 8000, AppType::Frontend)
            .with_pattern(npm("gatsby"))
            .with_build("npm run build")
            .with_static_output("public"),
        FrameworkSignature::new(FrameworkId::Angular, MANIFEST, 4200, AppType::Frontend)
            .with_pattern(npm("@angular/core"))
            .with_build("npm run build")
            .with_static_output("dist"),
        FrameworkSignature::new(FrameworkId::NestJs, MANIFEST, 3000, AppType::Backend)
            .with_pattern(npm("@nestjs/core"))
            .with_build("npm run build"),
        FrameworkSignature::new(FrameworkId::CreateReactApp, MANIFEST, 3000, AppType::Frontend)
            .with_pattern(npm("react-scripts"))
            .with_build("npm run build")
            .with_static_output("build"),
        FrameworkSignature::new(FrameworkId::Vite, MANIFEST, 5173, AppType::Frontend)
            .with_pattern(npm("vite"))
            .with_build("npm run build")
            .with_static_output("dist"),
        FrameworkSignature::new(FrameworkId::Express, MANIFEST, 3000, AppType::Backend)
            .with_pattern(npm("express")),
        FrameworkSignature::new(FrameworkId::Fastify, MANIFEST, 3000, AppType::Backend)
            .with_pattern(npm("fastify")),
        FrameworkSignature::new(FrameworkId::Koa, MANIFEST, 3000, AppType::Backend)
            .with_pattern(npm("koa")),
    ]
}

pub fn generic() -> FrameworkSignature {
    FrameworkSignature::new(FrameworkId::NodeJs, MANIFEST, 3000, AppType::Backend)
}
