crate::define_id_enum! {
    /// Framework identifier; `Custom` covers frameworks outside the signature table
    FrameworkId {
        NextJs => "nextjs" : "Next.js" | "next",
        Nuxt => "nuxt" : "Nuxt",
        Remix => "remix" : "Remix",
        SvelteKit => "sveltekit" : "SvelteKit",
        Astro => "astro" : "Astro",
        Gatsby => "gatsby" : "Gatsby",
        Angular => "angular" : "Angular",
        CreateReactApp => "create-react-app" : "Create React App" | "cra",
        Vite => "vite" : "Vite",
        NestJs => "nestjs" : "NestJS",
        Express => "express" : "Express",
        Fastify => "fastify" : "Fastify",
        Koa => "koa" : "Koa",
        NodeJs => "nodejs" : "Node.js" | "node",
        Django => "django" : "Django",
        FastApi => "fastapi" : "FastAPI",
        Flask => "flask" : "Flask",
        Python => "python" : "Python",
        Laravel => "laravel" : "Laravel",
        Symfony => "symfony" : "Symfony",
        Php => "php" : "PHP",
        Rails => "rails" : "Rails",
        Sinatra => "sinatra" : "Sinatra",
        Ruby => "ruby" : "Ruby",
        Gin => "gin" : "Gin",
        Echo => "echo" : "Echo",
        Fiber => "fiber" : "Fiber",
        Go => "go" : "Go" | "golang",
        ActixWeb => "actix-web" : "Actix Web" | "actix",
        Axum => "axum" : "Axum",
        Rocket => "rocket" : "Rocket",
        Rust => "rust" : "Rust",
        SpringBoot => "spring-boot" : "Spring Boot",
        Quarkus => "quarkus" : "Quarkus",
        Java => "java" : "Java",
        Phoenix => "phoenix" : "Phoenix",
        Elixir => "elixir" : "Elixir",
        StaticSite => "static" : "Static Site",
        Docker => "docker" : "Dockerfile",
        DockerCompose => "docker-compose" : "Docker Compose",
        Unknown => "unknown" : "Unknown",
    }
}
