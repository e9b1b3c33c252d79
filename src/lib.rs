//! TasteCheck
//!
//! 音楽ストリーミングの年間まとめ（スクリーンショット）やテキスト回答を
//! ビジョンモデルに渡し、スコアと講評を返すサーバー

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod server;
