mod archive;
mod content;
mod files;
mod images;
mod navigation;
mod upload;
