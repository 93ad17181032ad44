//! DocSnap: 処方箋画像の解析CLIとプロキシサーバ

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod output;
pub mod scanner;
pub mod server;
