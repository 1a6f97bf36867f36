//! System-wide constants and defaults.

/// Synthetic root marker prepended to every archive-member virtual path.
pub const ARCHIVE_ROOT: &str = "!jar!";

/// URI scheme the front-end uses for files read out of an archive.
pub const ARCHIVE_SCHEME: &str = "jar";

/// URI scheme for plain files on disk.
pub const FILE_SCHEME: &str = "file";

/// Separator between the archive location and the member path in an archive URI.
pub const ARCHIVE_MEMBER_SEPARATOR: char = '!';

/// Path segment identifying extracted generated-source archives.
pub const GENERATED_SOURCES_MARKER: &str = "-gensrc.jar.files/";

/// Default extension of source files (without the dot).
pub const DEFAULT_SOURCE_EXTENSION: &str = "java";

/// Default extension of dependency archives (without the dot).
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "jar";

/// Default language recorded in the compilation descriptor.
pub const DEFAULT_LANGUAGE: &str = "java";

/// Packages every compilation unit imports implicitly.
pub const DEFAULT_IMPLICIT_IMPORTS: &[&str] = &["java.lang"];

/// Options whose argument names a host-specific output directory.
pub const DEFAULT_OUTPUT_DIR_FLAGS: &[&str] = &["-d", "-s"];

/// Encoding passed to the front-end when the request does not name one.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Option naming the source encoding.
pub const ENCODING_FLAG: &str = "-encoding";

/// Option naming the class search path.
pub const CLASSPATH_FLAG: &str = "-cp";

/// Option naming the source search path.
pub const SOURCEPATH_FLAG: &str = "-sourcepath";

/// Search path options of the request, replaced by the minimized paths in
/// the replay arguments.
pub const SEARCH_PATH_FLAGS: &[&str] = &[
    "-cp",
    "-classpath",
    "--class-path",
    "-sourcepath",
    "--source-path",
];

/// Option naming the class output directory.
pub const OUTPUT_DIR_FLAG: &str = "-d";

/// Separator used when flattening search path entries into one option.
pub const SEARCH_PATH_SEPARATOR: &str = ":";

/// Prefix of the invocation-local scratch directory.
pub const SCRATCH_DIR_PREFIX: &str = "capsule_extractor";

/// File extension of serialized packages.
pub const INDEX_FILE_EXT: &str = ".kindex";

/// Default upper bound on one framed record in a package stream (4 GiB).
pub const MAX_RECORD_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Width of the little-endian length prefix in front of every record.
pub const RECORD_PREFIX_LEN: usize = 8;

/// Digest recorded for directory entries in an input file tree.
pub const DIRECTORY_DIGEST: &str = "<dir>";

/// SHA-256 digest length in hex characters.
pub const SHA256_HEX_LENGTH: usize = 64;
