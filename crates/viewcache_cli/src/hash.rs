//! `viewcache hash`: print content fingerprints.

use std::path::PathBuf;

use viewcache_common::ContentHash;

/// Prints `<hash>  <path>` for each file, in `sha256sum` layout.
///
/// Unreadable files are reported and skipped. Returns 1 if any failed.
pub fn run(files: &[PathBuf]) -> Result<i32, Box<dyn std::error::Error>> {
    let mut code = 0;
    for file in files {
        match std::fs::read(file) {
            Ok(content) => println!("{}  {}", ContentHash::of(&content), file.display()),
            Err(e) => {
                eprintln!("error: {}: {e}", file.display());
                code = 1;
            }
        }
    }
    Ok(code)
}
