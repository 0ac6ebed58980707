//! Classification of search hits by file type

/// Extensions that are never treated as programming source files
static NON_PROGRAMMING_EXTENSIONS: &[&str] = &[
    // Documents and markup
    "md", "markdown", "txt", "doc", "docx", "pdf", "html", "htm", "css", "scss", "sass",
    // Data
    "csv", "json", "xml", "yaml", "yml",
    // Media
    "png", "jpg", "jpeg", "gif", "svg", "mp3", "mp4", "wav", "avi",
    // Archives
    "zip", "tar", "gz", "rar",
];

/// Extract the lowercase extension of the final path segment
fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Whether a path looks like a programming source file.
///
/// Anything with an extension that is not on the denylist counts; files
/// without an extension do not.
pub fn is_programming_file(path: &str) -> bool {
    match extension_of(path) {
        Some(extension) => !NON_PROGRAMMING_EXTENSIONS.contains(&extension.as_str()),
        None => false,
    }
}
