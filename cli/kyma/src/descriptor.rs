//! kyma.json project descriptor

use anyhow::{bail, Context, Result};
use reconcile::FunctionDeployment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Descriptor file name inside a project directory
pub const DESCRIPTOR_FILE: &str = "kyma.json";

const PACKAGE_FILE: &str = "package.json";

fn default_namespace() -> String {
    "default".to_string()
}

/// Contents of a project's kyma.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Source file, relative to the project directory
    pub file: String,
    #[serde(default)]
    pub expose: bool,
    #[serde(default)]
    pub cluster_domain: Option<String>,
}

impl ProjectDescriptor {
    /// Read `<workdir>/kyma.json`
    pub fn load(workdir: &Path) -> Result<Self> {
        let path = workdir.join(DESCRIPTOR_FILE);
        if !path.is_file() {
            bail!("{} does not exist at {}", DESCRIPTOR_FILE, path.display());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let descriptor: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Cannot parse {}", path.display()))?;
        debug!("Loaded {} for function {}/{}", path.display(), descriptor.namespace, descriptor.name);
        Ok(descriptor)
    }

    fn source_path(&self, workdir: &Path) -> PathBuf {
        workdir.join(&self.file)
    }

    /// Everything needed to deploy the project's function
    pub fn deployment(&self, workdir: &Path) -> Result<FunctionDeployment> {
        let source_path = self.source_path(workdir);
        if !source_path.is_file() {
            bail!(
                "Referenced file in {} does not exist at {}",
                DESCRIPTOR_FILE,
                source_path.display()
            );
        }
        let source = std::fs::read_to_string(&source_path)
            .with_context(|| format!("Cannot read {}", source_path.display()))?;

        Ok(FunctionDeployment {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            source,
            dependencies: read_dependencies(workdir)?,
            expose: self.expose,
            cluster_domain: self.cluster_domain.clone().filter(|d| !d.trim().is_empty()),
        })
    }
}

/// The `dependencies` object of `<workdir>/package.json`, wrapped as the
/// document kubeless expects in `spec.deps`
fn read_dependencies(workdir: &Path) -> Result<Option<String>> {
    let path = workdir.join(PACKAGE_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let package: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Cannot parse {}", path.display()))?;

    match package.get("dependencies") {
        Some(deps) => {
            let deps = serde_json::to_string(deps)?;
            Ok(Some(format!("{{\n \"dependencies\": {deps} \n}}")))
        }
        None => Ok(None),
    }
}
