pub mod analyzer;
pub mod app;
pub mod dependency;
pub mod monorepo;
pub mod rules;
pub mod types;

pub use analyzer::RepositoryAnalyzer;
pub use app::AppDetector;
pub use dependency::DependencyAnalyzer;
pub use monorepo::MonorepoDetector;
pub use rules::{DriverRule, EnvCategoryRule, ServiceRule};
pub use types::{
    AnalysisResult, AppDependency, AppType, BuildPack, CIConfig, DependencyAnalysisResult,
    DetectedApp, DetectedDatabase, DetectedEnvVariable, DetectedHealthCheck,
    DetectedPersistentVolume, DetectedService, DockerComposeService, DockerfileInfo, Ecosystem,
    EnvCategory, MonorepoInfo,
};
