/// Controls how declaration files are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Maximum bytes allowed per declaration file.
    pub max_file_size: usize,
    /// When false, a reference naming a symlink is rejected.
    pub allow_symlinks: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: 256 * 1024,
            allow_symlinks: false,
        }
    }
}
