/// Local disk helpers: bootstrap directories and per-command scratch files
pub struct FileSystem;
