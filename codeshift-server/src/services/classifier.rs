//! File classification: decide whether a file goes to translation
//!
//! Policy is "translate unless clearly non-code": a single canonical
//! deny-list of suffixes known to be binary assets, documents, archives,
//! media, fonts, lockfiles, and tool dotfiles. Everything else — including
//! extensionless files like `Dockerfile` or `Makefile` — is eligible.
//! Contents are never inspected.

/// Suffixes that are never sent for translation. Matched case-insensitively
/// against the end of the file name, so both plain extensions (".png") and
/// full names ("package-lock.json", ".gitignore") work.
const SKIP_SUFFIXES: &[&str] = &[
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico", ".bmp", ".tiff",
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // Archives
    ".zip", ".tar", ".gz", ".7z", ".rar",
    // Audio / video
    ".mp3", ".mp4", ".wav", ".avi", ".mov",
    // Fonts
    ".ttf", ".otf", ".woff", ".woff2", ".eot",
    // Compiled binaries
    ".so", ".dll", ".exe", ".bin",
    // Lockfiles
    "package-lock.json", "yarn.lock", "pnpm-lock.yaml",
    // Tool dotfiles
    ".gitignore", ".env", ".env.example", ".env.local",
    ".prettierrc", ".eslintrc", ".babelrc",
];

/// Whether a file should be sent for translation
pub fn should_translate(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    !SKIP_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}
