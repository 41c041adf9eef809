//! Maven `pom.xml` edits and reads.
//!
//! Dependency versions are rewritten in place with `xmlstarlet` so the rest
//! of the file (comments, formatting) is left alone. The project version is
//! read back with `roxmltree`.

use std::path::{Path, PathBuf};

use prdeps_core::{CommandOutput, CommandRunner, CommandSpec, PrDepsError, Result};

pub const DESCRIPTOR_FILE: &str = "pom.xml";

/// Descriptor path for a component checkout.
pub fn descriptor_path(component_dir: &Path) -> PathBuf {
    component_dir.join(DESCRIPTOR_FILE)
}

/// XPath of `<version>` for dependency `artifact` under `/project/dependencies`.
pub fn dependency_version_xpath(artifact: &str) -> String {
    format!("/_:project/_:dependencies/_:dependency[_:artifactId='{artifact}']/_:version")
}

/// XPath of `<version>` for dependency `artifact` under
/// `/project/dependencyManagement/dependencies`.
pub fn managed_dependency_version_xpath(artifact: &str) -> String {
    format!(
        "/_:project/_:dependencyManagement/_:dependencies/_:dependency[_:artifactId='{artifact}']/_:version"
    )
}

/// The in-place edit setting both the direct and managed version of
/// `artifact` to `version`.
pub fn update_command(xml_tool: &str, pom: &Path, artifact: &str, version: &str) -> CommandSpec {
    CommandSpec::new(xml_tool).args([
        "ed".to_string(),
        "--inplace".to_string(),
        "-u".to_string(),
        dependency_version_xpath(artifact),
        "-v".to_string(),
        version.to_string(),
        "-u".to_string(),
        managed_dependency_version_xpath(artifact),
        "-v".to_string(),
        version.to_string(),
        pom.to_string_lossy().to_string(),
    ])
}

/// Point every dependency on `artifact` in `pom` at `version`.
///
/// Returns the tool's output; a non-zero exit is left for the caller to
/// report.
pub async fn update_dependency_version(
    runner: &dyn CommandRunner,
    xml_tool: &str,
    pom: &Path,
    artifact: &str,
    version: &str,
) -> Result<(CommandSpec, CommandOutput)> {
    let spec = update_command(xml_tool, pom, artifact, version);
    let output = runner.run(&spec).await?;
    Ok((spec, output))
}

/// Parse the `<project><version>` out of pom content.
pub fn parse_project_version(content: &str) -> std::result::Result<String, String> {
    let doc = roxmltree::Document::parse(content).map_err(|e| e.to_string())?;
    let root = doc.root_element();
    if !root.has_tag_name("project") {
        return Err(format!(
            "root element is <{}>, expected <project>",
            root.tag_name().name()
        ));
    }

    // Only direct children: <parent><version> is the parent's version.
    root.children()
        .find(|child| child.is_element() && child.tag_name().name() == "version")
        .and_then(|v| v.text())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| "no <version> under <project>".to_string())
}

/// Read the project version from the pom at `pom`.
pub fn read_project_version(pom: &Path) -> Result<String> {
    let descriptor_err = |reason: String| PrDepsError::Descriptor {
        path: pom.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(pom).map_err(|e| descriptor_err(e.to_string()))?;
    parse_project_version(&content).map_err(descriptor_err)
}
