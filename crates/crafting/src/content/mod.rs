mod compiler;
mod discovery;

pub use compiler::{
    compile_catalog_dir, compile_catalog_file, compile_catalog_path, compile_catalog_str,
    ContentCompileError, ContentErrorCode, SourceLocation,
};
