use std::path::Path;

use anyhow::{anyhow, Context, Result};
use genmake_pdsc::Dependencies;

/// The files a generated Makefile builds, relative to its directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFiles {
    pub sources: Vec<String>,
    pub objects: Vec<String>,
    /// Linker script passed with `-T`.
    pub linker_script: Option<String>,
}

/// Copies the template, system and startup sources and the linker scripts
/// of `dependencies` into `dest`.
///
/// Nothing is copied and no files are listed when `copy` is false; the
/// Makefile then only carries the device specific flags.
pub fn materialize(dependencies: &Dependencies, copy: bool, dest: &Path) -> Result<ProjectFiles> {
    let mut files = ProjectFiles::default();
    if !copy {
        return Ok(files);
    }

    let sources = [
        &dependencies.template,
        &dependencies.system,
        &dependencies.startup,
    ];
    for source in sources.into_iter().flatten() {
        let name = copy_into(source, dest)?;
        files.objects.push(object_name(&name));
        files.sources.push(name);
    }

    if let Some(linker_script) = &dependencies.linker_script {
        files.linker_script = Some(copy_into(linker_script, dest)?);

        // Included by the main linker script on dual core devices.
        for other in &dependencies.other {
            copy_into(other, dest)?;
        }
    }

    Ok(files)
}

fn copy_into(source: &Path, dest: &Path) -> Result<String> {
    let name = source
        .file_name()
        .ok_or_else(|| anyhow!("'{}' does not name a file.", source.display()))?;
    let target = dest.join(name);

    let same_file = match (source.canonicalize(), target.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if same_file {
        tracing::debug!("{} is already in place", target.display());
    } else {
        std::fs::copy(source, &target).with_context(|| {
            format!(
                "Failed to copy '{}' to '{}'.",
                source.display(),
                target.display()
            )
        })?;
        tracing::info!("Copied {}", target.display());
    }

    Ok(name.to_string_lossy().into_owned())
}

fn object_name(source: &str) -> String {
    Path::new(source)
        .with_extension("o")
        .to_string_lossy()
        .into_owned()
}
