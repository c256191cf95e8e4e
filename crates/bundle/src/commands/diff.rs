//! Diff command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use bundle_config::{Change, diff};

/// Execute the diff command
pub fn execute(left: &Path, right: &Path) -> Result<()> {
    let left = bundle_yaml::load_file(left)
        .with_context(|| format!("Failed to load {}", left.display()))?;
    let right = bundle_yaml::load_file(right)
        .with_context(|| format!("Failed to load {}", right.display()))?;

    let changes = diff(&left, &right);
    if !changes.is_empty() {
        println!("{}", render_changes(&changes));
    }
    Ok(())
}

/// One line per change: `<kind> <path>`.
fn render_changes(changes: &[Change]) -> String {
    changes
        .iter()
        .map(|change| {
            let path = if change.path.is_empty() {
                "<root>".to_string()
            } else {
                change.path.to_string()
            };
            format!("{} {}", change.kind, path)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_changes() {
        let dir = tempfile::tempdir().unwrap();
        let left = bundle_yaml::load(
            "resources:\n  jobs:\n    job0:\n      name: a\n    job1:\n      name: b\n",
            &dir.path().join("left.yml"),
        )
        .unwrap();
        let right = bundle_yaml::load(
            "resources:\n  jobs:\n    job0:\n      name: c\n    job2:\n      name: d\n",
            &dir.path().join("right.yml"),
        )
        .unwrap();

        assert_eq!(
            render_changes(&diff(&left, &right)),
            "update resources.jobs.job0.name\ndelete resources.jobs.job1\ninsert resources.jobs.job2"
        );
    }

    #[test]
    fn test_root_change() {
        let file = Path::new("/b/x.yml");
        let left = bundle_yaml::load("1", file).unwrap();
        let right = bundle_yaml::load("2", file).unwrap();
        assert_eq!(render_changes(&diff(&left, &right)), "update <root>");
    }
}
