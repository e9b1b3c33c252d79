//! TasteCheck Common Library
//!
//! サーバーとCLIで共有される型・プロンプト・応答パーサー

pub mod content;
pub mod error;
pub mod media;
pub mod parser;
pub mod prompts;
pub mod types;

pub use content::{build_vision_request, ContentBlock, ImageSource, VisionRequest};
pub use error::{Error, Result};
pub use media::{detect_media_type, strip_data_url, ImageAsset};
pub use parser::{extract_score, parse_response, scan_markers, MarkerScan};
pub use prompts::{build_prompt, style_instruction};
pub use types::{
    AnalysisResult, AnalysisTask, AnalyzeRequest, ManualAnswers, Mode, ModeRequest, Style,
    DEFAULT_SCORE, FAILURE_SCORE,
};
