//! Writes the rendered page to its output path.

use std::fs;
use std::io;
use std::path::Path;

/// Write the page atomically: write to `<output>.tmp`, then rename into place.
///
/// The parent directory is created if it does not exist.
pub fn write_page(output: &Path, html: &str) -> io::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = output.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, html)?;
    fs::rename(tmp_path, output).map_err(|e| {
        let _ = fs::remove_file(tmp_path);
        e
    })
}
