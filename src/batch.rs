//! Parallel compilation of many files

use rayon::prelude::*;
use tracing::debug;

use common::{Diagnostic, TransformOptions};

use crate::{transform_internal, TransformOutput};

/// One input file
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub filename: &'a str,
    pub source: &'a str,
}

/// Compile every file with `options` (the filename is taken from each file).
/// Results come back in input order; one failure never affects another file.
pub fn transform_batch(
    files: &[SourceFile],
    options: &TransformOptions,
) -> Vec<Result<TransformOutput, Diagnostic>> {
    debug!(files = files.len(), "batch transform");
    files
        .par_iter()
        .map(|file| transform_internal(file.source, &options.with_filename(file.filename)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_keep_input_order() {
        let files = [
            SourceFile {
                filename: "a.zx",
                source: "const a = (<br/>);",
            },
            SourceFile {
                filename: "b.zx",
                source: "const b = (<a></b>);",
            },
            SourceFile {
                filename: "c.zx",
                source: "const c = 1;",
            },
        ];
        let results = transform_batch(&files, &TransformOptions::zigx_defaults());
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().code.contains("__zx_blk0"));
        assert_eq!(results[1].as_ref().unwrap_err().file, "b.zx");
        assert_eq!(results[2].as_ref().unwrap().code, "const c = 1;");
    }

    #[test]
    fn each_file_counts_labels_from_zero() {
        let source = "const a = (<div>{if (x) (<p/>)}</div>);";
        let files = vec![
            SourceFile {
                filename: "one.zx",
                source,
            };
            8
        ];
        let results = transform_batch(&files, &TransformOptions::zigx_defaults());
        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert_eq!(result.as_ref().unwrap(), first);
        }
        assert!(!first.code.contains("__zx_blk2"));
    }
}
