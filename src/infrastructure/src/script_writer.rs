use chrono::Local;
use shared::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write commands to a `.pml` file, one per line, trailing whitespace trimmed.
pub fn write_pml(path: &Path, commands: &[String]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    for command in commands {
        writeln!(file, "{}", command.trim_end())?;
    }
    file.flush()?;
    tracing::info!(path = %path.display(), count = commands.len(), "wrote PyMOL script");
    Ok(())
}

/// A complete `.pml` script with a comment header describing where it came from.
pub fn render_script(request: &str, model: &str, commands: &[String]) -> String {
    let mut script = String::new();
    script.push_str("# PyMOL visualization script\n");
    script.push_str(&format!(
        "# Generated by molscribe ({}) on {}\n",
        model,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    for line in request.lines().filter(|l| !l.trim().is_empty()) {
        script.push_str(&format!("# Request: {}\n", line.trim()));
    }
    script.push('\n');
    for command in commands {
        script.push_str(command.trim_end());
        script.push('\n');
    }
    script
}
