use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "VaxForm";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filename of the form template the filler draws onto.
pub const TEMPLATE_FILE: &str = "VaccineHistory.pdf";

/// Filename of the filled output. Constant across runs — each fill overwrites it.
pub const OUTPUT_FILE: &str = "filled_form.pdf";

/// Get the application data directory
/// ~/VaxForm/ on all platforms (user-visible, mirrors the shell's storage dir)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("VaxForm")
}

/// Get the assets directory (holds the blank form template)
pub fn assets_dir() -> PathBuf {
    app_data_dir().join("assets")
}

/// Full path to the blank form template.
pub fn template_path() -> PathBuf {
    assets_dir().join(TEMPLATE_FILE)
}

/// Get the directory filled PDFs are written to
pub fn output_dir() -> PathBuf {
    app_data_dir().join("pdfs")
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "info,vaxform_core=debug"
}
