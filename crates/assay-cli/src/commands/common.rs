//! Helpers shared by commands

use anyhow::{Context, Result};
use assay_core::SuiteFile;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Load the suite named by `--suite`, or the one in the project directory
pub(crate) fn load_suite(global: &GlobalArgs) -> Result<SuiteFile> {
    match &global.suite {
        Some(path) => SuiteFile::load(Path::new(path))
            .with_context(|| format!("Failed to load suite file {path}")),
        None => SuiteFile::load_from_dir(Path::new(&global.project_dir))
            .with_context(|| format!("Failed to load suite from {}", global.project_dir)),
    }
}

/// Split a comma-separated filter into names
pub(crate) fn parse_filter(filter: Option<&str>) -> Option<Vec<String>> {
    filter.map(|f| {
        f.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(None), None);
        assert_eq!(
            parse_filter(Some(" orders, ,refunds ")),
            Some(vec!["orders".to_string(), "refunds".to_string()])
        );
    }
}
