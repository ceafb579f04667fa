pub mod formatter;

pub use formatter::{
    format_repository, format_repository_list, format_results, should_use_colors,
};
