pub mod audio;
pub mod chunk;
pub mod config;
pub mod cut;
pub mod error;
pub mod pipeline;
pub mod timeline;
pub mod transcript;
pub mod transform;

pub use config::Config;
pub use error::{AudiocutError, Result};
pub use pipeline::{
    convert_voice, cut_keywords, print_convert_summary, print_cut_summary, ConvertReport,
    CutOutcome, CutReport,
};
