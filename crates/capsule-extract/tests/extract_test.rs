//! End-to-end tests for the extraction engine.
//!
//! Each test lays out a small project in a temporary root directory, records
//! what a compiler would have seen in a [`Trace`], and runs the full
//! pipeline:
//! 1. Drive the front-end (options, processors, scratch directory)
//! 2. Force wildcard imports
//! 3. Classify touched files and minimize search paths
//! 4. Detect unused archives
//! 5. Assemble and serialize the package

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use capsule_common::config::ExtractorConfig;
use capsule_common::error::Phase;
use capsule_common::types::FileKind;
use capsule_extract::frontend::processor::ProcessorRegistry;
use capsule_extract::frontend::trace::{Trace, TraceFile, TraceFrontEnd};
use capsule_extract::frontend::{FrontEnd, Import, Location, ParsedUnit, SymbolOrigin};
use capsule_extract::{CompilationRequest, Extractor};
use capsule_pack::unit::Package;

// ── Fixture ──────────────────────────────────────────────────────────

struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    fn config(&self) -> ExtractorConfig {
        ExtractorConfig {
            platform_root: Some(self.path("jdk")),
            ..ExtractorConfig::with_root(self.root())
        }
    }

    /// Writes a file on disk and returns its trace entry.
    fn disk(&self, rel: &str, kind: FileKind, content: &str) -> TraceFile {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, content).expect("write");
        TraceFile {
            uri: format!("file:{}", path.display()),
            kind,
            location: None,
            binary_name: None,
            opened: true,
            content: None,
        }
    }

    /// Trace entry for a member of an archive under the root.
    fn member(&self, archive: &str, member: &str, kind: FileKind, content: &str) -> TraceFile {
        TraceFile {
            uri: format!("jar:file:{}!/{member}", self.path(archive).display()),
            kind,
            location: None,
            binary_name: None,
            opened: true,
            content: Some(content.into()),
        }
    }

    /// Writes a zip archive under the root holding `entries`.
    fn jar(&self, rel: &str, entries: &[(&str, &[u8])]) {
        use std::io::Write;

        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        let mut jar = zip::ZipWriter::new(std::fs::File::create(&path).expect("create jar"));
        for (name, content) in entries {
            jar.start_file(*name, zip::write::FileOptions::default())
                .expect("start entry");
            jar.write_all(content).expect("write entry");
        }
        let _ = jar.finish().expect("finish jar");
    }

    fn unit(&self, rel: &str, package: &str, imports: &[&str]) -> ParsedUnit {
        ParsedUnit {
            source_uri: format!("file:{}", self.path(rel).display()),
            package: Some(package.into()),
            imports: imports
                .iter()
                .map(|name| Import {
                    name: (*name).into(),
                    is_static: false,
                })
                .collect(),
        }
    }

    fn request(&self) -> CompilationRequest {
        CompilationRequest::builder("//acme:main")
            .source(self.path("src/com/acme/Main.java").display().to_string())
            .classpath(self.path("lib/guava.jar").display().to_string())
            .classpath(self.path("lib/unused.jar").display().to_string())
            .classpath(self.path("build/classes").display().to_string())
            .sourcepath(self.path("src").display().to_string())
            .options(["-g", "-d", "/host/out", "-s", "/host/gen"])
            .output_path(self.path("out/main.jar").display().to_string())
            .build()
            .expect("request")
    }

    /// A compilation of `Main.java` that uses one class from an archive and
    /// one class compiled to disk.
    fn trace(&self) -> Trace {
        let mut util = self.disk(
            "build/classes/com/acme/util/Util.class",
            FileKind::Class,
            "\u{ca}\u{fe}",
        );
        util.location = Some(Location::ClassPath);
        util.binary_name = Some("com.acme.util.Util".into());
        Trace {
            files: vec![
                self.disk(
                    "src/com/acme/Main.java",
                    FileKind::Source,
                    "package com.acme;\nimport com.google.*;\nclass Main {}\n",
                ),
                self.member("lib/guava.jar", "com/google/Lists.class", FileKind::Class, "lists"),
                util,
            ],
            units: vec![self.unit("src/com/acme/Main.java", "com.acme", &["com.google.*"])],
            ..Trace::default()
        }
    }
}

fn input_paths(package: &Package) -> Vec<&str> {
    package
        .descriptor
        .required_inputs
        .iter()
        .map(|input| input.path.as_str())
        .collect()
}

fn option_after<'a>(package: &'a Package, flag: &str) -> &'a str {
    let args = &package.descriptor.arguments;
    let index = args.iter().rposition(|a| a == flag).expect("flag present");
    &args[index + 1]
}

// ── Pipeline ─────────────────────────────────────────────────────────

#[test]
fn extraction_produces_minimal_replayable_package() {
    let project = Project::new();
    let mut frontend = TraceFrontEnd::new(project.trace());
    let extractor = Extractor::new(project.config());

    let package = extractor
        .extract(&mut frontend, &project.request())
        .expect("extract");

    assert_eq!(
        input_paths(&package),
        vec![
            "!jar!/com/google/Lists.class",
            "build/classes/com/acme/util/Util.class",
            "src/com/acme/Main.java",
        ]
    );
    assert_eq!(option_after(&package, "-sourcepath"), "src");
    assert_eq!(option_after(&package, "-cp"), "!jar!:build/classes");
    assert_eq!(&package.descriptor.arguments[..1], ["-g"]);
    assert!(!package.descriptor.arguments.iter().any(|a| a.starts_with("/host")));
    assert_eq!(package.descriptor.source_files, vec!["src/com/acme/Main.java"]);
    assert_eq!(package.descriptor.output_key, "out/main.jar");
    assert!(!package.descriptor.has_compile_errors);

    let guava = package
        .descriptor
        .input("!jar!/com/google/Lists.class")
        .expect("archive input");
    assert_eq!(guava.relative_path, "lib/guava.jar!/com/google/Lists.class");
    assert!(package.verify().is_ok());
}

#[test]
fn front_end_sees_complete_options() {
    let project = Project::new();
    let mut frontend = TraceFrontEnd::new(project.trace());
    let extractor = Extractor::new(project.config());
    let _ = extractor
        .extract(&mut frontend, &project.request())
        .expect("extract");

    let options = frontend.last_options();
    assert!(options.windows(2).any(|w| w[0] == "-encoding" && w[1] == "UTF-8"));
    assert_eq!(options.iter().filter(|o| *o == "-d").count(), 1);
    let scratch = frontend.last_scratch_dir().expect("scratch");
    assert_eq!(options.last().map(String::as_str), Some(scratch.to_str().expect("utf-8")));
}

#[test]
fn package_roundtrips_through_kindex_file() {
    let project = Project::new();
    let mut frontend = TraceFrontEnd::new(project.trace());
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");

    let path = capsule_pack::codec::index_filename(&project.path("index"), "main");
    capsule_pack::codec::write_to_file(&package, &path).expect("write");
    let decoded = capsule_pack::codec::read_from_file(&path).expect("read");
    assert_eq!(decoded, package);
    assert!(decoded.verify().is_ok());
}

// ── Properties ───────────────────────────────────────────────────────

#[test]
fn descriptor_is_independent_of_usage_order() {
    let project = Project::new();
    let extractor = Extractor::new(project.config());

    let trace = project.trace();
    let mut reversed = trace.clone();
    reversed.files.reverse();

    let first = extractor
        .extract(&mut TraceFrontEnd::new(trace), &project.request())
        .expect("extract");
    let second = extractor
        .extract(&mut TraceFrontEnd::new(reversed), &project.request())
        .expect("extract");

    assert_eq!(first.descriptor, second.descriptor);
    assert_eq!(first.files, second.files);
}

#[test]
fn every_root_is_witnessed_by_an_input() {
    let project = Project::new();
    let mut frontend = TraceFrontEnd::new(project.trace());
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");

    for flag in ["-sourcepath", "-cp"] {
        for root in option_after(&package, flag).split(':').filter(|r| !r.is_empty()) {
            let witnessed = package
                .descriptor
                .required_inputs
                .iter()
                .any(|input| input.info.path.as_str().starts_with(&format!("{root}/")));
            assert!(witnessed, "root {root} of {flag} has no input");
        }
    }
    assert!(!option_after(&package, "-cp").contains("unused.jar"));
}

#[test]
fn same_member_of_different_archives_shares_virtual_path() {
    let project = Project::new();
    let mut trace = project.trace();
    trace.files.push(project.member(
        "third_party/guava-copy.jar",
        "com/google/Lists.class",
        FileKind::Class,
        "lists",
    ));
    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");

    let members: Vec<&str> = input_paths(&package)
        .into_iter()
        .filter(|p| p.ends_with("Lists.class"))
        .collect();
    assert_eq!(members, vec!["!jar!/com/google/Lists.class"]);
}

#[test]
fn platform_files_are_never_embedded() {
    let project = Project::new();
    let mut trace = project.trace();
    trace.files.push(project.member(
        "jdk/lib/rt.jar",
        "java/lang/Object.class",
        FileKind::Class,
        "object",
    ));
    let mut string = project.disk("jdk/src/java/lang/String.java", FileKind::Source, "");
    string.location = Some(Location::PlatformClassPath);
    trace.files.push(string);

    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");

    assert!(
        package
            .descriptor
            .required_inputs
            .iter()
            .all(|input| !input.relative_path.starts_with("jdk/"))
    );
    assert!(input_paths(&package).iter().all(|p| !p.contains("java/lang")));
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn unresolvable_wildcard_import_is_not_fatal() {
    let project = Project::new();
    let mut trace = project.trace();
    trace.units = vec![project.unit(
        "src/com/acme/Main.java",
        "com.acme",
        &["com.nowhere.*"],
    )];
    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");
    assert!(input_paths(&package).iter().all(|p| !p.contains("com/nowhere")));
}

#[test]
fn unused_wildcard_import_is_forced_into_the_package() {
    let project = Project::new();
    let mut trace = project.trace();
    let mut candidate = project.member(
        "lib/guava.jar",
        "com/google/Sets.class",
        FileKind::Class,
        "sets",
    );
    candidate.opened = false;
    candidate.location = Some(Location::ClassPath);
    candidate.binary_name = Some("com.google.Sets".into());
    trace.files.push(candidate);

    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");
    assert!(input_paths(&package).contains(&"!jar!/com/google/Sets.class"));
}

#[test]
fn unreferenced_archive_is_reported_unused() {
    let project = Project::new();
    let config = ExtractorConfig {
        track_unused_dependencies: true,
        ..project.config()
    };
    let mut frontend = TraceFrontEnd::new(project.trace());
    let package = Extractor::new(config)
        .extract(&mut frontend, &project.request())
        .expect("extract");
    assert_eq!(
        package.descriptor.unused_dependencies,
        Some(vec!["lib/unused.jar".to_string()])
    );
}

#[test]
fn source_basename_is_corrected_from_declaring_source() {
    let project = Project::new();
    let mut trace = project.trace();
    let widget = project.disk(
        "src/com/acme/Widget.java",
        FileKind::Source,
        "package com.acme;\nclass Widget {}\n",
    );
    trace.symbol_origins.push(SymbolOrigin {
        file_uri: widget.uri.clone(),
        source_uri: format!("file:{}", project.path("src/com/acme/Helper.java").display()),
    });
    trace.files.push(widget);

    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");

    let input = package
        .descriptor
        .input("src/com/acme/Widget.java")
        .expect("widget input");
    assert_eq!(input.path.as_str(), "src/com/acme/Helper.java");
    assert_eq!(input.info.path.as_str(), "src/com/acme/Widget.java");
    assert!(package.file("src/com/acme/Widget.java").is_some());
}

#[test]
fn generated_sources_are_listed_and_rooted() {
    let project = Project::new();
    let mut trace = project.trace();
    trace.files.push(project.disk(
        "out/api-gensrc.jar.files/com/acme/Gen.java",
        FileKind::Source,
        "package com.acme;\nclass Gen {}\n",
    ));
    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");

    assert_eq!(
        package.descriptor.source_files,
        vec![
            "src/com/acme/Main.java",
            "out/api-gensrc.jar.files/com/acme/Gen.java"
        ]
    );
    assert_eq!(
        option_after(&package, "-sourcepath"),
        "out/api-gensrc.jar.files:src"
    );
}

#[test]
fn empty_source_is_recorded() {
    let project = Project::new();
    let mut trace = project.trace();
    trace
        .files
        .push(project.disk("src/com/acme/Empty.java", FileKind::Source, ""));
    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");
    let record = package.file("src/com/acme/Empty.java").expect("record");
    assert!(record.content.is_empty());
}

// ── Failures and cleanup ─────────────────────────────────────────────

#[test]
fn scratch_directory_is_removed_after_success() {
    let project = Project::new();
    let mut frontend = TraceFrontEnd::new(project.trace());
    let _ = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");
    let scratch = frontend.last_scratch_dir().expect("scratch");
    assert!(!scratch.exists());
}

#[test]
fn front_end_abort_is_fatal_and_removes_scratch() {
    let project = Project::new();
    let mut trace = project.trace();
    trace.abort = Some("symbol table corrupt".into());
    let mut frontend = TraceFrontEnd::new(trace);

    let err = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .unwrap_err();
    assert_eq!(err.phase(), Some(Phase::FrontEnd));
    assert!(!err.is_retryable());
    assert!(!frontend.last_scratch_dir().expect("scratch").exists());
}

#[test]
fn missing_disk_input_is_fatal_for_accumulate() {
    let project = Project::new();
    let mut trace = project.trace();
    let mut ghost = project.disk("src/com/acme/Ghost.java", FileKind::Source, "x");
    std::fs::remove_file(project.path("src/com/acme/Ghost.java")).expect("remove");
    ghost.opened = true;
    trace.files.push(ghost);

    let mut frontend = TraceFrontEnd::new(trace);
    let err = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .unwrap_err();
    assert_eq!(err.phase(), Some(Phase::Accumulate));
    assert!(err.to_string().contains("Ghost.java"));
}

#[test]
fn processors_are_loaded_through_the_injected_loader() {
    let project = Project::new();
    let request = CompilationRequest {
        processorpath: vec![project.path("lib/proc.jar").display().to_string()],
        processors: vec!["com.acme.AutoProc".into()],
        ..project.request()
    };
    let extractor = Extractor::with_loader(
        project.config(),
        Box::new(ProcessorRegistry::from_names(["com.acme.AutoProc"])),
    );
    let mut frontend = TraceFrontEnd::new(project.trace());
    let _ = extractor.extract(&mut frontend, &request).expect("extract");
    assert_eq!(frontend.last_processors(), ["com.acme.AutoProc"]);
}

#[test]
fn unknown_processor_is_fatal_for_driver() {
    let project = Project::new();
    let request = CompilationRequest {
        processors: vec!["com.acme.Missing".into()],
        ..project.request()
    };
    let mut frontend = TraceFrontEnd::new(project.trace());
    let err = Extractor::new(project.config())
        .extract(&mut frontend, &request)
        .unwrap_err();
    assert_eq!(err.phase(), Some(Phase::Driver));
    assert!(!err.is_retryable());
    assert!(frontend.usages().is_empty());
}

#[test]
fn archive_members_are_read_from_real_jars() {
    let project = Project::new();
    let class_bytes: &[u8] = &[0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x34, 0xff];
    project.jar(
        "lib/guava.jar",
        &[
            ("com/google/Lists.class", class_bytes),
            ("com/google/Maps.class", b"maps"),
        ],
    );
    let mut lists = project.member("lib/guava.jar", "com/google/Lists.class", FileKind::Class, "");
    lists.content = None;
    let mut trace = project.trace();
    trace.files[1] = lists;

    let mut frontend = TraceFrontEnd::new(trace);
    let package = Extractor::new(project.config())
        .extract(&mut frontend, &project.request())
        .expect("extract");

    let record = package
        .file("!jar!/com/google/Lists.class")
        .expect("archive member embedded");
    assert_eq!(record.content, class_bytes);
    assert!(package.file("!jar!/com/google/Maps.class").is_none());
    assert!(package.verify().is_ok());
}
