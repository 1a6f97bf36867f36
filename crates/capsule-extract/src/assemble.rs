//! Construction of the final compilation descriptor.

use std::path::Path;

use capsule_common::config::ExtractorConfig;
use capsule_common::constants::{
    CLASSPATH_FLAG, SEARCH_PATH_FLAGS, SEARCH_PATH_SEPARATOR, SOURCEPATH_FLAG,
};
use capsule_common::types::VirtualPath;
use capsule_pack::unit::{CompilationDescriptor, FileInput, FileRecord, Package};

use crate::request::CompilationRequest;
use crate::results::AnalysisResults;
use crate::uri::try_make_relative;

/// Removes every occurrence of each flag in `flags` together with its
/// argument. A flag in last position has no argument and is kept.
#[must_use]
pub fn strip_flags<S: AsRef<str>>(options: &[String], flags: &[S]) -> Vec<String> {
    let mut stripped = Vec::with_capacity(options.len());
    let mut iter = options.iter().peekable();
    while let Some(option) = iter.next() {
        if flags.iter().any(|f| f.as_ref() == option.as_str()) && iter.peek().is_some() {
            let _ = iter.next();
            continue;
        }
        stripped.push(option.clone());
    }
    stripped
}

/// Returns the path a source input is referenced by: its stored path with
/// the basename replaced when the declaring source has a different one.
#[must_use]
pub fn corrected_path(
    path: &VirtualPath,
    declared_basename: Option<&str>,
    config: &ExtractorConfig,
) -> VirtualPath {
    match declared_basename {
        Some(basename)
            if config.is_source_path(path.as_str()) && path.file_name() != basename =>
        {
            path.with_file_name(basename)
        }
        _ => path.clone(),
    }
}

/// Builds the package for `request` from the collected results.
#[must_use]
pub fn assemble(
    request: &CompilationRequest,
    results: AnalysisResults,
    config: &ExtractorConfig,
) -> Package {
    let without_outputs = strip_flags(&request.options, &config.output_dir_flags);
    let mut arguments = strip_flags(&without_outputs, SEARCH_PATH_FLAGS);
    arguments.push(SOURCEPATH_FLAG.to_string());
    arguments.push(join_roots(&results.source_roots));
    arguments.push(CLASSPATH_FLAG.to_string());
    arguments.push(join_roots(&results.class_roots));

    let mut entries: Vec<(FileInput, FileRecord)> = results
        .files
        .into_entries()
        .map(|(path, entry)| {
            let input_path = corrected_path(&path, entry.declared_basename.as_deref(), config);
            if input_path != path {
                tracing::debug!(stored = %path, corrected = %input_path, "source basename corrected");
            }
            let record = FileRecord::new(path, entry.content);
            let input = FileInput {
                info: record.info.clone(),
                path: input_path,
                relative_path: entry.relative_path,
            };
            (input, record)
        })
        .collect();
    entries.sort_by(|(a, _), (b, _)| {
        (&a.path, &a.info.path, &a.info.digest).cmp(&(&b.path, &b.info.path, &b.info.digest))
    });
    let (required_inputs, files): (Vec<_>, Vec<_>) = entries.into_iter().unzip();

    let mut source_files = results.explicit_sources;
    for generated in results.generated_sources {
        if !source_files.contains(&generated) {
            source_files.push(generated);
        }
    }

    let descriptor = CompilationDescriptor {
        target: request.target.clone(),
        language: config.language.clone(),
        arguments,
        required_inputs,
        source_files,
        output_key: try_make_relative(&config.root_directory, Path::new(&request.output_path)),
        has_compile_errors: results.has_compile_errors,
        unused_dependencies: results.unused_dependencies,
    };
    tracing::info!(
        target = %descriptor.target,
        inputs = descriptor.required_inputs.len(),
        "compilation descriptor assembled"
    );
    Package { descriptor, files }
}

fn join_roots<'a>(roots: impl IntoIterator<Item = &'a String>) -> String {
    roots
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(SEARCH_PATH_SEPARATOR)
}
