use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Compile a `.tex` report with the local TeX toolchain.
///
/// Runs pdflatex, biber (when a bibliography is used), then pdflatex twice
/// to settle references. Any missing tool or non-zero exit is an error; the
/// caller keeps the `.tex` file either way.
pub fn compile_pdf(tex_path: &Path, run_biber: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = tex_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = tex_path.file_name().ok_or("report path has no file name")?;
    let stem = tex_path.file_stem().ok_or("report path has no file stem")?;
    let nonstop = OsStr::new("-interaction=nonstopmode");

    run_tool("pdflatex", &[nonstop, file_name], dir)?;
    if run_biber {
        run_tool("biber", &[stem], dir)?;
    }
    run_tool("pdflatex", &[nonstop, file_name], dir)?;
    run_tool("pdflatex", &[nonstop, file_name], dir)?;

    let pdf = tex_path.with_extension("pdf");
    if pdf.exists() {
        Ok(pdf)
    } else {
        Err(format!("pdflatex finished but {} was not produced", pdf.display()).into())
    }
}

fn run_tool(program: &str, args: &[&OsStr], dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    debug!(program, ?args, dir = %dir.display(), "running TeX toolchain step");
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| format!("failed to launch {program}: {e}"))?;
    if !status.success() {
        return Err(format!("{program} exited with {status}").into());
    }
    Ok(())
}
