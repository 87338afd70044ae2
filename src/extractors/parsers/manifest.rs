//! Package manifest parsing
//!
//! Every manifest present in an app directory contributes [`AppDependency`] entries.
//! Structured formats (JSON, TOML, XML) fail with [`ParseError`] when malformed;
//! line-oriented formats (requirements.txt, Gemfile, go.mod, Gradle, mix.exs) are
//! read leniently.

use super::read_optional;
use crate::detection::types::{AppDependency, Ecosystem};
use crate::error::ParseError;
use crate::fs::FileSystem;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

/// Manifest files inspected, in the order their package name is preferred
pub const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "pyproject.toml",
    "Cargo.toml",
    "composer.json",
    "pom.xml",
    "go.mod",
    "requirements.txt",
    "Pipfile",
    "Gemfile",
    "build.gradle",
    "build.gradle.kts",
    "mix.exs",
];

/// What the manifests of one directory declare
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestData {
    /// Package name from the first manifest that declares one
    pub package_name: Option<String>,
    pub dependencies: Vec<AppDependency>,
    /// Manifest file names that were found
    pub manifests: Vec<String>,
}

impl ManifestData {
    pub fn has_manifest(&self) -> bool {
        !self.manifests.is_empty()
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }

    fn absorb(&mut self, file: &str, name: Option<String>, deps: Vec<AppDependency>) {
        self.manifests.push(file.to_string());
        if self.package_name.is_none() {
            self.package_name = name.filter(|n| !n.trim().is_empty());
        }
        for dep in deps {
            if !self
                .dependencies
                .iter()
                .any(|d| d.name == dep.name && d.ecosystem == dep.ecosystem)
            {
                self.dependencies.push(dep);
            }
        }
    }
}

/// Parse every known manifest in `dir`
pub fn parse_manifests(fs: &dyn FileSystem, dir: &Path) -> Result<ManifestData, ParseError> {
    let mut data = ManifestData::default();

    for file in MANIFEST_FILES {
        let path = dir.join(file);
        let Some(content) = read_optional(fs, &path)? else {
            continue;
        };

        let (name, deps) = match *file {
            "package.json" => parse_package_json(&path, &content)?,
            "pyproject.toml" => parse_pyproject(&path, &content)?,
            "Cargo.toml" => parse_cargo_toml(&path, &content)?,
            "composer.json" => parse_composer_json(&path, &content)?,
            "pom.xml" => parse_pom(&path, &content)?,
            "go.mod" => parse_go_mod(&content),
            "requirements.txt" => (None, parse_requirements(&content)),
            "Pipfile" => (None, parse_pipfile(&path, &content)?),
            "Gemfile" => (None, parse_gemfile(&content)),
            "build.gradle" | "build.gradle.kts" => (None, parse_gradle(&content)),
            "mix.exs" => parse_mix_exs(&content),
            _ => continue,
        };

        data.absorb(file, name, deps);
    }

    Ok(data)
}

type Parsed = (Option<String>, Vec<AppDependency>);

fn json(path: &Path, content: &str) -> Result<Value, ParseError> {
    serde_json::from_str(content).map_err(|e| ParseError::new(path, e.to_string()))
}

fn toml_value(path: &Path, content: &str) -> Result<toml::Value, ParseError> {
    toml::from_str(content).map_err(|e| ParseError::new(path, e.to_string()))
}

fn json_object_deps(value: &Value, keys: &[&str], ecosystem: Ecosystem) -> Vec<AppDependency> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_object()))
        .flat_map(|deps| deps.iter())
        .map(|(name, version)| {
            AppDependency::new(name.clone(), version.as_str().map(String::from), ecosystem)
        })
        .collect()
}

/// `@scope/name` → `name`
pub fn strip_npm_scope(name: &str) -> &str {
    match name.strip_prefix('@') {
        Some(scoped) => scoped.split_once('/').map(|(_, n)| n).unwrap_or(scoped),
        None => name,
    }
}

fn parse_package_json(path: &Path, content: &str) -> Result<Parsed, ParseError> {
    let value = json(path, content)?;
    if !value.is_object() {
        return Err(ParseError::new(path, "expected a JSON object"));
    }

    let name = value
        .get("name")
        .and_then(|n| n.as_str())
        .map(|n| strip_npm_scope(n).to_string());
    let deps = json_object_deps(
        &value,
        &["dependencies", "devDependencies", "peerDependencies"],
        Ecosystem::Npm,
    );
    Ok((name, deps))
}

fn parse_composer_json(path: &Path, content: &str) -> Result<Parsed, ParseError> {
    let value = json(path, content)?;

    let name = value
        .get("name")
        .and_then(|n| n.as_str())
        .map(|n| n.rsplit('/').next().unwrap_or(n).to_string());
    let deps = json_object_deps(&value, &["require", "require-dev"], Ecosystem::Composer)
        .into_iter()
        .filter(|d| d.name != "php" && !d.name.starts_with("ext-"))
        .collect();
    Ok((name, deps))
}

/// PEP 508 requirement → (normalized name, pinned version)
fn parse_requirement(spec: &str) -> Option<(String, Option<String>)> {
    let spec = spec.split(';').next()?.trim();
    let end = spec
        .find(|c: char| "=<>!~[ @(".contains(c))
        .unwrap_or(spec.len());
    let name = spec[..end].trim();
    if name.is_empty() {
        return None;
    }

    let version = spec
        .find("==")
        .map(|idx| spec[idx + 2..].trim().trim_end_matches(')').to_string())
        .filter(|v| !v.is_empty());

    Some((name.to_lowercase().replace('_', "-"), version))
}

fn parse_requirements(content: &str) -> Vec<AppDependency> {
    content
        .lines()
        .map(|line| line.split(" #").next().unwrap_or("").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(parse_requirement)
        .map(|(name, version)| AppDependency::new(name, version, Ecosystem::Pypi))
        .collect()
}

fn toml_table_deps(
    table: Option<&toml::Value>,
    ecosystem: Ecosystem,
    skip: &[&str],
) -> Vec<AppDependency> {
    table
        .and_then(|t| t.as_table())
        .map(|t| {
            t.iter()
                .filter(|(name, _)| !skip.contains(&name.as_str()))
                .map(|(name, spec)| {
                    let version = match spec {
                        toml::Value::String(v) => Some(v.clone()),
                        toml::Value::Table(t) => {
                            t.get("version").and_then(|v| v.as_str()).map(String::from)
                        }
                        _ => None,
                    }
                    .filter(|v| v != "*");
                    let name = match ecosystem {
                        Ecosystem::Pypi => name.to_lowercase().replace('_', "-"),
                        _ => name.clone(),
                    };
                    AppDependency::new(name, version, ecosystem)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_pyproject(path: &Path, content: &str) -> Result<Parsed, ParseError> {
    let value = toml_value(path, content)?;
    let project = value.get("project");
    let poetry = value.get("tool").and_then(|t| t.get("poetry"));

    let name = project
        .and_then(|p| p.get("name"))
        .or_else(|| poetry.and_then(|p| p.get("name")))
        .and_then(|n| n.as_str())
        .map(String::from);

    let mut deps: Vec<AppDependency> = project
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(parse_requirement)
                .map(|(name, version)| AppDependency::new(name, version, Ecosystem::Pypi))
                .collect()
        })
        .unwrap_or_default();

    if let Some(poetry) = poetry {
        for key in ["dependencies", "dev-dependencies"] {
            deps.extend(toml_table_deps(poetry.get(key), Ecosystem::Pypi, &["python"]));
        }
    }

    Ok((name, deps))
}

fn parse_pipfile(path: &Path, content: &str) -> Result<Vec<AppDependency>, ParseError> {
    let value = toml_value(path, content)?;
    let mut deps = toml_table_deps(value.get("packages"), Ecosystem::Pypi, &[]);
    deps.extend(toml_table_deps(value.get("dev-packages"), Ecosystem::Pypi, &[]));
    Ok(deps)
}

fn parse_cargo_toml(path: &Path, content: &str) -> Result<Parsed, ParseError> {
    let value = toml_value(path, content)?;

    let name = value
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(String::from);

    let mut deps = Vec::new();
    for key in ["dependencies", "dev-dependencies"] {
        deps.extend(toml_table_deps(value.get(key), Ecosystem::Cargo, &[]));
    }
    deps.extend(toml_table_deps(
        value.get("workspace").and_then(|w| w.get("dependencies")),
        Ecosystem::Cargo,
        &[],
    ));
    Ok((name, deps))
}

fn parse_pom(path: &Path, content: &str) -> Result<Parsed, ParseError> {
    let doc =
        roxmltree::Document::parse(content).map_err(|e| ParseError::new(path, e.to_string()))?;
    let project = doc.root_element();

    let child_text = |node: roxmltree::Node, tag: &str| -> Option<String> {
        node.children()
            .find(|n| n.tag_name().name() == tag)
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
    };

    let name = child_text(project, "artifactId");

    let coordinates = |node: roxmltree::Node| -> Option<AppDependency> {
        let group = child_text(node, "groupId")?;
        let artifact = child_text(node, "artifactId")?;
        Some(AppDependency::new(
            format!("{}:{}", group, artifact),
            child_text(node, "version"),
            Ecosystem::Maven,
        ))
    };

    let mut deps: Vec<AppDependency> = project
        .children()
        .filter(|n| n.tag_name().name() == "parent")
        .filter_map(coordinates)
        .collect();

    // <dependencies> and <dependencyManagement><dependencies> both count
    deps.extend(
        project
            .descendants()
            .filter(|n| n.tag_name().name() == "dependency")
            .filter_map(coordinates),
    );

    Ok((name, deps))
}

fn parse_go_mod(content: &str) -> Parsed {
    let mut name = None;
    let mut deps = Vec::new();
    let mut in_require = false;

    let mut push = |spec: &str| {
        let mut parts = spec.split_whitespace();
        if let Some(module) = parts.next() {
            deps.push(AppDependency::new(
                module,
                parts.next().map(String::from),
                Ecosystem::Go,
            ));
        }
    };

    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if in_require {
            if line.starts_with(')') {
                in_require = false;
            } else {
                push(line);
            }
        } else if let Some(module) = line.strip_prefix("module ") {
            let module = module.trim().trim_matches('"');
            name = module.rsplit('/').next().map(String::from);
        } else if let Some(rest) = line.strip_prefix("require") {
            let rest = rest.trim();
            if rest.starts_with('(') {
                in_require = true;
            } else {
                push(rest);
            }
        }
    }

    (name, deps)
}

fn parse_gemfile(content: &str) -> Vec<AppDependency> {
    static GEM: OnceLock<Regex> = OnceLock::new();
    let re = GEM.get_or_init(|| {
        Regex::new(r#"^\s*gem\s+['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#).expect("valid regex")
    });

    content
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|cap| {
            let name = cap.get(1)?.as_str();
            let version = cap.get(2).map(|v| v.as_str().to_string());
            Some(AppDependency::new(name, version, Ecosystem::Rubygems))
        })
        .collect()
}

fn parse_gradle(content: &str) -> Vec<AppDependency> {
    static COORDINATE: OnceLock<Regex> = OnceLock::new();
    static PLUGIN: OnceLock<Regex> = OnceLock::new();
    let coordinate = COORDINATE.get_or_init(|| {
        Regex::new(
            r#"(?:implementation|api|compileOnly|runtimeOnly|developmentOnly|testImplementation|annotationProcessor|kapt)\s*\(?\s*(?:platform\()?["']([^"':]+):([^"':]+)(?::([^"']+))?["']"#,
        )
        .expect("valid regex")
    });
    let plugin = PLUGIN.get_or_init(|| {
        Regex::new(r#"\bid\s*\(?\s*["']([\w.\-]+)["']"#).expect("valid regex")
    });

    let mut deps: Vec<AppDependency> = coordinate
        .captures_iter(content)
        .filter_map(|cap| {
            let group = cap.get(1)?.as_str();
            let artifact = cap.get(2)?.as_str();
            Some(AppDependency::new(
                format!("{}:{}", group, artifact),
                cap.get(3).map(|v| v.as_str().to_string()),
                Ecosystem::Maven,
            ))
        })
        .collect();

    // Plugins are recorded as `<plugin id>:plugin` so group-based patterns still match
    deps.extend(plugin.captures_iter(content).filter_map(|cap| {
        let id = cap.get(1)?.as_str();
        Some(AppDependency::new(
            format!("{}:plugin", id),
            None,
            Ecosystem::Maven,
        ))
    }));

    deps
}

fn parse_mix_exs(content: &str) -> Parsed {
    static DEP: OnceLock<Regex> = OnceLock::new();
    static APP: OnceLock<Regex> = OnceLock::new();
    let dep = DEP.get_or_init(|| {
        Regex::new(r#"\{\s*:(\w+)\s*,\s*(?:"([^"]+)")?"#).expect("valid regex")
    });
    let app = APP.get_or_init(|| Regex::new(r"app:\s*:(\w+)").expect("valid regex"));

    let name = app
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string());

    let deps = dep
        .captures_iter(content)
        .filter_map(|cap| {
            let name = cap.get(1)?.as_str();
            Some(AppDependency::new(
                name,
                cap.get(2).map(|v| v.as_str().to_string()),
                Ecosystem::Hex,
            ))
        })
        .collect();

    (name, deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn names(data: &ManifestData) -> Vec<&str> {
        data.dependencies.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_package_json() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "package.json",
            r#"{
  "name": "@acme/web",
  "dependencies": { "next": "14.1.0", "pg": "^8.11.0" },
  "devDependencies": { "typescript": "^5.3.0" }
}"#,
        );

        let data = parse_manifests(&fs, Path::new("/mock")).unwrap();
        assert_eq!(data.package_name.as_deref(), Some("web"));
        assert_eq!(names(&data), vec!["next", "pg", "typescript"]);
        assert_eq!(data.dependencies[0].version.as_deref(), Some("14.1.0"));
        assert_eq!(data.manifests, vec!["package.json"]);
    }

    #[test]
    fn test_malformed_package_json() {
        let fs = MockFileSystem::new();
        fs.add_file("package.json", r#"{"name": "web", "dependencies": {"#);

        let err = parse_manifests(&fs, Path::new("/mock")).unwrap_err();
        assert!(err.file.ends_with("package.json"));
    }

    #[test]
    fn test_requirements_txt() {
        let deps = parse_requirements(
            "# web\nDjango==5.0.1\npsycopg2-binary>=2.9 # driver\n-r base.txt\nrequests[socks]\nuvicorn ; python_version > '3.8'\n",
        );
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["django", "psycopg2-binary", "requests", "uvicorn"]);
        assert_eq!(deps[0].version.as_deref(), Some("5.0.1"));
    }

    #[test]
    fn test_pyproject_pep621_and_poetry() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "pyproject.toml",
            r#"
[project]
name = "svc"
dependencies = ["fastapi>=0.110", "asyncpg==0.29.0"]

[tool.poetry.dependencies]
python = "^3.11"
Redis = "^5.0"
"#,
        );

        let data = parse_manifests(&fs, Path::new("/mock")).unwrap();
        assert_eq!(data.package_name.as_deref(), Some("svc"));
        assert_eq!(names(&data), vec!["fastapi", "asyncpg", "redis"]);
    }

    #[test]
    fn test_cargo_toml() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "Cargo.toml",
            r#"
[package]
name = "api"

[dependencies]
axum = "0.7"
sqlx = { version = "0.7", features = ["postgres"] }
"#,
        );

        let data = parse_manifests(&fs, Path::new("/mock")).unwrap();
        assert_eq!(data.package_name.as_deref(), Some("api"));
        assert!(data.has_dependency("axum"));
        assert_eq!(data.dependencies[1].version.as_deref(), Some("0.7"));
    }

    #[test]
    fn test_invalid_cargo_toml() {
        let fs = MockFileSystem::new();
        fs.add_file("Cargo.toml", "[package\nname = ");
        assert!(parse_manifests(&fs, Path::new("/mock")).is_err());
    }

    #[test]
    fn test_pom_xml() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "pom.xml",
            r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <parent>
    <groupId>org.springframework.boot</groupId>
    <artifactId>spring-boot-starter-parent</artifactId>
    <version>3.2.0</version>
  </parent>
  <artifactId>orders</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.postgresql</groupId>
      <artifactId>postgresql</artifactId>
    </dependency>
  </dependencies>
</project>"#,
        );

        let data = parse_manifests(&fs, Path::new("/mock")).unwrap();
        assert_eq!(data.package_name.as_deref(), Some("orders"));
        assert_eq!(
            names(&data),
            vec![
                "org.springframework.boot:spring-boot-starter-parent",
                "org.postgresql:postgresql"
            ]
        );
    }

    #[test]
    fn test_go_mod() {
        let (name, deps) = parse_go_mod(
            "module github.com/acme/api\n\ngo 1.22\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n\tgithub.com/lib/pq v1.10.9 // indirect\n)\n\nrequire github.com/redis/go-redis/v9 v9.4.0\n",
        );
        assert_eq!(name.as_deref(), Some("api"));
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "github.com/gin-gonic/gin",
                "github.com/lib/pq",
                "github.com/redis/go-redis/v9"
            ]
        );
        assert_eq!(deps[0].version.as_deref(), Some("v1.9.1"));
    }

    #[test]
    fn test_gemfile() {
        let deps = parse_gemfile("source 'https://rubygems.org'\ngem 'rails', '~> 7.1'\n  gem \"pg\"\n");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "rails");
        assert_eq!(deps[0].version.as_deref(), Some("~> 7.1"));
        assert_eq!(deps[1].name, "pg");
    }

    #[test]
    fn test_gradle() {
        let deps = parse_gradle(
            r#"
plugins {
    id("io.quarkus")
}
dependencies {
    implementation("org.springframework.boot:spring-boot-starter-web")
    runtimeOnly 'org.postgresql:postgresql:42.7.1'
}
"#,
        );
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "org.springframework.boot:spring-boot-starter-web",
                "org.postgresql:postgresql",
                "io.quarkus:plugin"
            ]
        );
    }

    #[test]
    fn test_mix_exs() {
        let (name, deps) = parse_mix_exs(
            r#"
def project do
  [app: :shop, version: "0.1.0"]
end
defp deps do
  [
    {:phoenix, "~> 1.7.10"},
    {:postgrex, ">= 0.0.0"},
    {:jason, "~> 1.2"}
  ]
end
"#,
        );
        assert_eq!(name.as_deref(), Some("shop"));
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["phoenix", "postgrex", "jason"]);
    }

    #[test]
    fn test_strip_npm_scope() {
        assert_eq!(strip_npm_scope("@acme/api"), "api");
        assert_eq!(strip_npm_scope("api"), "api");
    }

    #[test]
    fn test_no_manifests() {
        let fs = MockFileSystem::new();
        let data = parse_manifests(&fs, Path::new("/mock")).unwrap();
        assert!(!data.has_manifest());
        assert!(data.dependencies.is_empty());
    }
}
