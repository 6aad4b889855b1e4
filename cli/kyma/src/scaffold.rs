//! Lambda project scaffolding
//!
//! Every file of a template tree is rendered with Go template syntax into
//! `<output-root>/<name>`. Directories are mirrored, a trailing `.tmpl` is
//! dropped from file names and files that already exist are never touched.

use anyhow::{anyhow, Context as _, Result};
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Values available to templates as `{{.Name}}`, `{{.Namespace}}`, `{{.Expose}}`, `{{.ClusterDomain}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameters {
    pub name: String,
    pub namespace: String,
    pub expose: bool,
    pub cluster_domain: String,
}

impl TemplateParameters {
    fn context(&self) -> Context {
        let map = HashMap::from([
            ("Name".to_string(), Value::String(self.name.clone())),
            ("Namespace".to_string(), Value::String(self.namespace.clone())),
            ("Expose".to_string(), Value::Bool(self.expose)),
            ("ClusterDomain".to_string(), Value::String(self.cluster_domain.clone())),
        ]);
        Context::from(Value::Map(map))
    }
}

/// Paths written and paths left alone
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl ScaffoldReport {
    fn create(&mut self, path: PathBuf) {
        info!("[CREATE] {}", path.display());
        self.created.push(path);
    }

    fn skip(&mut self, path: PathBuf) {
        info!("[SKIP] {}", path.display());
        self.skipped.push(path);
    }
}

/// Render `template_root` into `<output_root>/<params.name>`
pub fn scaffold(template_root: &Path, output_root: &Path, params: &TemplateParameters) -> Result<ScaffoldReport> {
    if !template_root.is_dir() {
        return Err(anyhow!("template root {} is not a directory", template_root.display()));
    }
    let project = output_root.join(&params.name);
    let context = params.context();
    let mut report = ScaffoldReport::default();

    ensure_dir(&project, &mut report)?;
    for entry in WalkDir::new(template_root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Could not walk {}", template_root.display()))?;
        let relative = entry
            .path()
            .strip_prefix(template_root)
            .with_context(|| format!("{} is outside the template root", entry.path().display()))?;

        if entry.file_type().is_dir() {
            ensure_dir(&project.join(relative), &mut report)?;
        } else if entry.file_type().is_file() {
            let output = project.join(output_name(relative));
            render_file(entry.path(), output, &context, &mut report)?;
        }
    }
    Ok(report)
}

fn output_name(relative: &Path) -> PathBuf {
    relative
        .to_str()
        .and_then(|s| s.strip_suffix(TEMPLATE_SUFFIX))
        .map_or_else(|| relative.to_path_buf(), PathBuf::from)
}

fn ensure_dir(path: &Path, report: &mut ScaffoldReport) -> Result<()> {
    if path.exists() {
        report.skip(path.to_path_buf());
        return Ok(());
    }
    std::fs::create_dir_all(path).with_context(|| format!("Could not create directory {}", path.display()))?;
    report.create(path.to_path_buf());
    Ok(())
}

fn render_file(template: &Path, output: PathBuf, context: &Context, report: &mut ScaffoldReport) -> Result<()> {
    if output.exists() {
        report.skip(output);
        return Ok(());
    }
    let raw = std::fs::read_to_string(template)
        .with_context(|| format!("Cannot read template {}", template.display()))?;

    let mut tmpl = Template::default();
    tmpl.parse(&raw)
        .map_err(|e| anyhow!("Cannot parse template {}: {:?}", template.display(), e))?;
    let rendered = tmpl
        .render(context)
        .map_err(|e| anyhow!("Cannot execute template {}: {:?}", template.display(), e))?;

    std::fs::write(&output, rendered).with_context(|| format!("Failed to create {}", output.display()))?;
    report.create(output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn params() -> TemplateParameters {
        TemplateParameters {
            name: "orders".to_string(),
            namespace: "sales".to_string(),
            expose: true,
            cluster_domain: "foo.example.com".to_string(),
        }
    }

    fn template_tree() -> TempDir {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join("kyma.json.tmpl"),
            r#"{"name": "{{.Name}}", "namespace": "{{.Namespace}}", "expose": {{if .Expose}}true{{else}}false{{end}}, "clusterDomain": "{{.ClusterDomain}}"}"#,
        )
        .unwrap();
        fs::create_dir(root.path().join("test")).unwrap();
        fs::write(root.path().join("test").join("handler.test.js.tmpl"), "// tests for {{.Name}}").unwrap();
        fs::write(root.path().join("README.md"), "plain").unwrap();
        root
    }

    #[test]
    fn test_renders_tree() {
        let templates = template_tree();
        let out = TempDir::new().unwrap();

        let report = scaffold(templates.path(), out.path(), &params()).unwrap();
        let project = out.path().join("orders");

        let descriptor = fs::read_to_string(project.join("kyma.json")).unwrap();
        assert_eq!(
            descriptor,
            r#"{"name": "orders", "namespace": "sales", "expose": true, "clusterDomain": "foo.example.com"}"#
        );
        assert_eq!(
            fs::read_to_string(project.join("test").join("handler.test.js")).unwrap(),
            "// tests for orders"
        );
        assert_eq!(fs::read_to_string(project.join("README.md")).unwrap(), "plain");
        assert!(!project.join("kyma.json.tmpl").exists());
        assert_eq!(report.created.len(), 5);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_existing_files_are_not_overwritten() {
        let templates = template_tree();
        let out = TempDir::new().unwrap();
        let project = out.path().join("orders");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("kyma.json"), "mine").unwrap();

        let report = scaffold(templates.path(), out.path(), &params()).unwrap();
        assert_eq!(fs::read_to_string(project.join("kyma.json")).unwrap(), "mine");
        assert!(report.skipped.contains(&project));
        assert!(report.skipped.contains(&project.join("kyma.json")));
        assert!(report.created.contains(&project.join("test").join("handler.test.js")));
    }

    #[test]
    fn test_second_run_skips_everything() {
        let templates = template_tree();
        let out = TempDir::new().unwrap();
        scaffold(templates.path(), out.path(), &params()).unwrap();

        let report = scaffold(templates.path(), out.path(), &params()).unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.skipped.len(), 5);
    }

    #[test]
    fn test_bundled_template_yields_deployable_project() {
        let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/lambda-javascript");
        let out = TempDir::new().unwrap();
        scaffold(&templates, out.path(), &params()).unwrap();

        let project = out.path().join("orders");
        let descriptor = crate::descriptor::ProjectDescriptor::load(&project).unwrap();
        assert_eq!(descriptor.namespace, "sales");
        assert!(descriptor.expose);
        let deployment = descriptor.deployment(&project).unwrap();
        assert!(deployment.source.contains("Hello from orders"));
        assert_eq!(deployment.dependencies.as_deref(), Some("{\n \"dependencies\": {} \n}"));
    }

    #[test]
    fn test_missing_template_root() {
        let out = TempDir::new().unwrap();
        let err = scaffold(&out.path().join("absent"), out.path(), &params()).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_broken_template_fails() {
        let templates = TempDir::new().unwrap();
        fs::write(templates.path().join("bad.tmpl"), "{{if .Name}}").unwrap();
        let out = TempDir::new().unwrap();

        assert!(scaffold(templates.path(), out.path(), &params()).is_err());
    }
}
